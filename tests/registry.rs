use std::fs;
use std::path::{Path, PathBuf};

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use axum_test::TestServer;
use serde_json::{Value, json};
use tempfile::TempDir;

use assemblage::{
    COMPONENT_SNIPPET_NAME, ComponentPlugin, ComponentRegistry, EngineConfig, HookError,
    ManifestError, OverrideStore, PluginTable, RegistryError,
};

/// A component directory plus an override store, both under one temp dir.
struct Fixture {
    tmp: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir(tmp.path().join("component")).unwrap();
        Self { tmp }
    }

    fn component_dir(&self) -> PathBuf {
        self.tmp.path().join("component")
    }

    fn config(&self) -> EngineConfig {
        EngineConfig {
            component_dir: self.component_dir(),
            config_db_path: self.tmp.path().join("var").join("config.db"),
            ..EngineConfig::default()
        }
    }

    /// Creates `dir` with a manifest for `uuid` routed at `route`.
    fn component(&self, dir: &str, uuid: &str, route: &str) -> PathBuf {
        let path = self.component_dir().join(dir);
        fs::create_dir_all(&path).unwrap();
        write_json(
            &path.join("manifest.json"),
            &json!({
                "uuid": uuid,
                "name": dir,
                "description": "fixture component",
                "version": "0.0.1",
                "route": route
            }),
        );
        path
    }

    async fn store(&self) -> OverrideStore {
        OverrideStore::ensure(&self.config().config_db_path).await
    }

    async fn build(&self, plugins: &PluginTable) -> Result<ComponentRegistry, RegistryError> {
        let store = self.store().await;
        ComponentRegistry::build(&self.config(), &store, plugins).await
    }
}

fn write_json(path: &Path, value: &Value) {
    fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

#[tokio::test]
async fn minimal_component_end_to_end() {
    let fixture = Fixture::new();
    fixture.component("cmp_1000_demo", "demo_0001", "/demo");

    let registry = fixture.build(&PluginTable::new()).await.unwrap();
    assert_eq!(registry.components().len(), 1);
    let component = registry.component("demo_0001").unwrap();
    assert_eq!(component.name, "cmp_1000_demo");
    assert!(component.route_group.is_none());
    assert!(component.init_template.is_none());
    assert_eq!(registry.component_schema("demo_0001"), Some(&serde_json::Map::new()));
    assert!(registry.route_table().is_empty());

    let schema = registry.schema();
    assert_eq!(
        schema.pointer("/data/COMPONENTS_MAP_BY_NAME/cmp_1000_demo"),
        Some(&json!("demo_0001"))
    );
    assert_eq!(
        schema.pointer("/data/COMPONENTS_MAP_BY_UUID/demo_0001"),
        Some(&json!("cmp_1000_demo"))
    );
    assert_eq!(
        schema.pointer("/data/demo_0001/manifest/route"),
        Some(&json!("/demo"))
    );
    assert_eq!(
        schema.pointer("/data/cmp_1000_demo/name"),
        Some(&json!("cmp_1000_demo"))
    );
    assert_eq!(
        schema.snippets().unwrap().get(COMPONENT_SNIPPET_NAME),
        Some(&json!(""))
    );
}

#[tokio::test]
async fn empty_component_directory_builds_default_tree() {
    let fixture = Fixture::new();
    let registry = fixture.build(&PluginTable::new()).await.unwrap();
    assert!(registry.components().is_empty());
    assert_eq!(registry.schema().pointer("/config"), Some(&json!({})));
    assert_eq!(
        registry.schema().pointer("/data/COMPONENTS_MAP_BY_NAME"),
        Some(&json!({}))
    );
}

#[tokio::test]
async fn disabled_and_foreign_directories_are_skipped() {
    let fixture = Fixture::new();
    fixture.component("cmp_1000_demo", "demo_0001", "/demo");
    fixture.component("_cmp_2000_off", "off_00001", "/off");
    fs::create_dir(fixture.component_dir().join("assets")).unwrap();
    fs::write(fixture.component_dir().join("README"), "not a component").unwrap();

    let registry = fixture.build(&PluginTable::new()).await.unwrap();
    let names: Vec<&str> = registry.components().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["cmp_1000_demo"]);
    assert!(registry.component("off_00001").is_none());
}

#[tokio::test]
async fn discovery_follows_directory_name_order() {
    let fixture = Fixture::new();
    fixture.component("cmp_7000_second", "second_001", "/b");
    fixture.component("cmp_0100_first", "first_0001", "/a");
    fixture.component("cmp_9100_last", "last_00001", "/");

    let registry = fixture.build(&PluginTable::new()).await.unwrap();
    let names: Vec<&str> = registry.components().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["cmp_0100_first", "cmp_7000_second", "cmp_9100_last"]);
}

#[tokio::test]
async fn schema_files_merge_in_discovery_order() {
    let fixture = Fixture::new();
    let first = fixture.component("cmp_1000_first", "first_0001", "/a");
    let second = fixture.component("cmp_2000_second", "second_001", "/b");
    write_json(
        &first.join("schema.json"),
        &json!({"config": {"theme": "light", "site": {"title": "A", "lang": "en"}}}),
    );
    write_json(
        &second.join("schema.json"),
        &json!({"config": {"site": {"title": "B"}}, "data": {"extra": [1, 2]}}),
    );

    let registry = fixture.build(&PluginTable::new()).await.unwrap();
    assert_eq!(
        registry.schema().pointer("/config"),
        Some(&json!({"theme": "light", "site": {"title": "B", "lang": "en"}}))
    );
    assert_eq!(registry.schema().pointer("/data/extra"), Some(&json!([1, 2])));
}

#[tokio::test]
async fn store_override_wins_over_custom_file() {
    let fixture = Fixture::new();
    let path = fixture.component("cmp_1000_demo", "demo_0001", "/demo");
    write_json(
        &path.join("schema.json"),
        &json!({"config": {"demo": {"greeting": "hello", "count": 1}}}),
    );
    write_json(
        &path.join("custom.json"),
        &json!({
            "manifest": {"route": "/custom"},
            "schema": {"config": {"demo": {"greeting": "from file", "color": "red"}}}
        }),
    );
    let store = fixture.store().await;
    let stored = json!({"schema": {"config": {"demo": {"greeting": "from store"}}}});
    store
        .upsert("demo_0001", stored.as_object().unwrap(), true)
        .await
        .unwrap();

    let registry = fixture.build(&PluginTable::new()).await.unwrap();
    assert_eq!(
        registry.schema().pointer("/config/demo"),
        Some(&json!({"greeting": "from store", "count": 1, "color": "red"}))
    );
    assert_eq!(
        registry.component("demo_0001").unwrap().manifest.route(),
        "/custom"
    );
}

#[tokio::test]
async fn disabled_store_override_is_inert() {
    let fixture = Fixture::new();
    let path = fixture.component("cmp_1000_demo", "demo_0001", "/demo");
    write_json(&path.join("schema.json"), &json!({"config": {"demo": {"on": false}}}));
    let store = fixture.store().await;
    let stored = json!({"schema": {"config": {"demo": {"on": true}}}});
    store
        .upsert("demo_0001", stored.as_object().unwrap(), false)
        .await
        .unwrap();

    let registry = fixture.build(&PluginTable::new()).await.unwrap();
    assert_eq!(registry.schema().pointer("/config/demo/on"), Some(&json!(false)));

    assert!(store.set_enabled("demo_0001", true).await.unwrap());
    let registry = fixture.build(&PluginTable::new()).await.unwrap();
    assert_eq!(registry.schema().pointer("/config/demo/on"), Some(&json!(true)));
}

#[tokio::test]
async fn override_cannot_change_uuid() {
    let fixture = Fixture::new();
    let path = fixture.component("cmp_1000_demo", "demo_0001", "/demo");
    write_json(
        &path.join("custom.json"),
        &json!({"manifest": {"uuid": "hijack_0001", "version": "9"}}),
    );

    let registry = fixture.build(&PluginTable::new()).await.unwrap();
    let component = registry.component("demo_0001").unwrap();
    assert_eq!(component.manifest.uuid().as_str(), "demo_0001");
    assert_eq!(component.manifest.get("version"), Some(&json!("9")));
    assert!(registry.component("hijack_0001").is_none());
}

#[tokio::test]
async fn override_schema_without_schema_file_is_ignored() {
    let fixture = Fixture::new();
    let path = fixture.component("cmp_1000_demo", "demo_0001", "/demo");
    write_json(
        &path.join("custom.json"),
        &json!({"schema": {"config": {"ghost": true}}}),
    );

    let registry = fixture.build(&PluginTable::new()).await.unwrap();
    assert!(registry.schema().pointer("/config/ghost").is_none());
}

#[tokio::test]
async fn builds_are_byte_identical() {
    let fixture = Fixture::new();
    let first = fixture.component("cmp_1000_first", "first_0001", "/a");
    fixture.component("cmp_2000_second", "second_001", "/b");
    write_json(
        &first.join("schema.json"),
        &json!({"config": {"z": 1, "a": {"y": "[:; data -> COMPONENTS_MAP_BY_UUID -> first_0001 :]"}}}),
    );
    fs::create_dir(first.join("neutral")).unwrap();
    fs::write(first.join("neutral").join("component-init.ntpl"), "{:;first:}").unwrap();

    let one = fixture.build(&PluginTable::new()).await.unwrap();
    let two = fixture.build(&PluginTable::new()).await.unwrap();
    assert_eq!(
        one.schema().to_canonical_string(),
        two.schema().to_canonical_string()
    );
    assert_eq!(one.snippet(), two.snippet());
}

#[tokio::test]
async fn substitution_resolves_against_merged_tree() {
    let fixture = Fixture::new();
    let first = fixture.component("cmp_1000_first", "first_0001", "/a");
    let second = fixture.component("cmp_2000_second", "second_001", "/b");
    write_json(&first.join("schema.json"), &json!({"config": {"site": "example.org"}}));
    write_json(
        &second.join("schema.json"),
        &json!({
            "config": {
                "home": "https://[:; config -> site :]/",
                "owner": "[:; data -> COMPONENTS_MAP_BY_UUID -> first_0001 :]"
            }
        }),
    );

    let registry = fixture.build(&PluginTable::new()).await.unwrap();
    assert_eq!(
        registry.schema().pointer("/config/home"),
        Some(&json!("https://example.org/"))
    );
    assert_eq!(
        registry.schema().pointer("/config/owner"),
        Some(&json!("cmp_1000_first"))
    );
    assert_eq!(
        registry.component_schema("second_001").unwrap()["config"]["home"],
        json!("https://example.org/")
    );
}

#[tokio::test]
async fn unresolvable_reference_aborts_build() {
    let fixture = Fixture::new();
    let path = fixture.component("cmp_1000_demo", "demo_0001", "/demo");
    write_json(
        &path.join("schema.json"),
        &json!({"config": {"broken": "[:; config -> missing :]"}}),
    );

    let err = fixture.build(&PluginTable::new()).await.unwrap_err();
    assert!(matches!(err, RegistryError::Substitution { .. }), "{err}");
    assert!(err.to_string().contains("missing"));
}

#[tokio::test]
async fn missing_manifest_is_fatal() {
    let fixture = Fixture::new();
    fs::create_dir(fixture.component_dir().join("cmp_1000_empty")).unwrap();

    let err = fixture.build(&PluginTable::new()).await.unwrap_err();
    assert!(matches!(
        err,
        RegistryError::Manifest(ManifestError::MissingManifest { .. })
    ));
}

#[tokio::test]
async fn invalid_uuid_is_fatal() {
    let fixture = Fixture::new();
    fixture.component("cmp_1000_demo", "bad uuid!", "/demo");

    let err = fixture.build(&PluginTable::new()).await.unwrap_err();
    assert!(matches!(
        err,
        RegistryError::Manifest(ManifestError::ValidationFailed { .. })
    ));
}

#[tokio::test]
async fn malformed_directory_name_is_fatal() {
    let fixture = Fixture::new();
    fixture.component("cmp_12_short", "short_0001", "/s");

    let err = fixture.build(&PluginTable::new()).await.unwrap_err();
    assert!(matches!(err, RegistryError::InvalidDirectoryName(ref name) if name == "cmp_12_short"));
}

#[tokio::test]
async fn duplicate_uuid_is_fatal() {
    let fixture = Fixture::new();
    fixture.component("cmp_1000_one", "same_0001", "/one");
    fixture.component("cmp_2000_two", "same_0001", "/two");

    let err = fixture.build(&PluginTable::new()).await.unwrap_err();
    match err {
        RegistryError::DuplicateUuid { uuid, first, second } => {
            assert_eq!(uuid, "same_0001");
            assert_eq!(first, "cmp_1000_one");
            assert_eq!(second, "cmp_2000_two");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn invalid_custom_file_is_fatal() {
    let fixture = Fixture::new();
    let path = fixture.component("cmp_1000_demo", "demo_0001", "/demo");
    fs::write(path.join("custom.json"), "{ not json").unwrap();

    let err = fixture.build(&PluginTable::new()).await.unwrap_err();
    assert!(matches!(err, RegistryError::Custom(_)));
}

#[tokio::test]
async fn invalid_schema_file_is_fatal() {
    let fixture = Fixture::new();
    let path = fixture.component("cmp_1000_demo", "demo_0001", "/demo");
    fs::write(path.join("schema.json"), "[1, 2]").unwrap();

    let err = fixture.build(&PluginTable::new()).await.unwrap_err();
    assert!(matches!(
        err,
        RegistryError::InvalidSchemaFile { ref component, .. } if component == "cmp_1000_demo"
    ));
}

#[tokio::test]
async fn missing_component_directory_is_fatal() {
    let fixture = Fixture::new();
    let mut config = fixture.config();
    config.component_dir = fixture.tmp.path().join("nowhere");
    let store = fixture.store().await;

    let err = ComponentRegistry::build(&config, &store, &PluginTable::new())
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::ComponentDir { .. }));
}

#[tokio::test]
async fn unavailable_store_degrades_to_file_overrides() {
    let fixture = Fixture::new();
    let path = fixture.component("cmp_1000_demo", "demo_0001", "/demo");
    write_json(&path.join("schema.json"), &json!({"config": {"v": 1}}));
    write_json(&path.join("custom.json"), &json!({"schema": {"config": {"v": 2}}}));
    let blocker = fixture.tmp.path().join("blocker");
    fs::write(&blocker, "file, not a directory").unwrap();
    let store = OverrideStore::ensure(&blocker.join("config.db")).await;
    assert!(!store.is_ready());

    let registry = ComponentRegistry::build(&fixture.config(), &store, &PluginTable::new())
        .await
        .unwrap();
    assert_eq!(registry.schema().pointer("/config/v"), Some(&json!(2)));
}

#[tokio::test]
async fn default_schema_seeds_the_tree() {
    let fixture = Fixture::new();
    let path = fixture.component("cmp_1000_demo", "demo_0001", "/demo");
    write_json(&path.join("schema.json"), &json!({"config": {"b": 2}}));
    let base = fixture.tmp.path().join("default-schema.json");
    write_json(
        &base,
        &json!({"config": {"a": 1, "b": 1}, "inherit": {"snippets": {"base:layout": "<html>"}}}),
    );
    let mut config = fixture.config();
    config.default_schema = Some(base);
    let store = fixture.store().await;

    let registry = ComponentRegistry::build(&config, &store, &PluginTable::new())
        .await
        .unwrap();
    assert_eq!(registry.schema().pointer("/config"), Some(&json!({"a": 1, "b": 2})));
    let snippets = registry.schema().snippets().unwrap();
    assert_eq!(snippets.get("base:layout"), Some(&json!("<html>")));
    assert!(snippets.contains_key(COMPONENT_SNIPPET_NAME));
}

#[tokio::test]
async fn init_templates_aggregate_in_discovery_order() {
    let fixture = Fixture::new();
    for (dir, uuid, text) in [
        ("cmp_2000_two", "two_00001", "two"),
        ("cmp_1000_one", "one_00001", "one"),
    ] {
        let path = fixture.component(dir, uuid, "/");
        fs::create_dir(path.join("neutral")).unwrap();
        fs::write(path.join("neutral").join("component-init.ntpl"), text).unwrap();
    }
    fixture.component("cmp_3000_none", "none_0001", "/none");

    let registry = fixture.build(&PluginTable::new()).await.unwrap();
    assert_eq!(registry.snippet(), "one\ntwo\n");
    assert_eq!(
        registry
            .schema()
            .snippets()
            .unwrap()
            .get(COMPONENT_SNIPPET_NAME),
        Some(&json!("one\ntwo\n"))
    );
    assert!(registry.component("one_00001").unwrap().init_template.is_some());
    assert!(registry.component("none_0001").unwrap().init_template.is_none());
}

#[tokio::test]
async fn init_hook_mutation_is_merged_back() {
    let fixture = Fixture::new();
    let first = fixture.component("cmp_1000_first", "first_0001", "/a");
    let second = fixture.component("cmp_2000_second", "second_001", "/b");
    write_json(&first.join("schema.json"), &json!({"config": {"first": {"ready": false}}}));
    write_json(&second.join("schema.json"), &json!({"config": {"second": {}}}));

    let mut plugins = PluginTable::new();
    plugins.register(
        "first_0001",
        ComponentPlugin::new().with_init(|component, fragment, _schema| {
            fragment.insert(
                "config".to_string(),
                json!({"first": {"ready": true, "by": component.name}}),
            );
            Ok(())
        }),
    );
    plugins.register(
        "second_001",
        ComponentPlugin::new().with_init(|_component, fragment, schema| {
            let seen = schema.pointer("/config/first/ready").cloned().unwrap_or(Value::Null);
            fragment.insert("config".to_string(), json!({"second": {"saw_first": seen}}));
            Ok(())
        }),
    );

    let registry = fixture.build(&plugins).await.unwrap();
    assert_eq!(
        registry.schema().pointer("/config/first"),
        Some(&json!({"ready": true, "by": "cmp_1000_first"}))
    );
    assert_eq!(
        registry.schema().pointer("/config/second/saw_first"),
        Some(&json!(true))
    );
    assert_eq!(
        registry.component_schema("first_0001").unwrap()["config"]["first"]["ready"],
        json!(true)
    );
}

#[tokio::test]
async fn failing_hook_aborts_build() {
    let fixture = Fixture::new();
    fixture.component("cmp_1000_demo", "demo_0001", "/demo");
    let mut plugins = PluginTable::new();
    plugins.register(
        "demo_0001",
        ComponentPlugin::new().with_init(|_, _, _| Err(HookError::new("no database"))),
    );

    let err = fixture.build(&plugins).await.unwrap_err();
    match err {
        RegistryError::Hook { hook, component, source } => {
            assert_eq!(hook, "init");
            assert_eq!(component, "cmp_1000_demo");
            assert_eq!(source, HookError::new("no database"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

fn text_plugin(body: &'static str) -> ComponentPlugin {
    ComponentPlugin::new().with_routes(move |_component, _fragment, _schema| {
        Ok(Some(Router::new().route("/", get(move || async move { body }))))
    })
}

#[tokio::test]
async fn route_groups_register_catch_all_last() {
    let fixture = Fixture::new();
    fixture.component("cmp_1000_o1", "ordinary_01", "/o1");
    fixture.component("cmp_2000_o2", "ordinary_02", "/o2");
    fixture.component("cmp_9000_c1", "catchall_01", "/");
    fixture.component("cmp_9500_c2", "catchall_02", "/");
    fixture.component("cmp_3000_quiet", "quiet_0001", "/quiet");

    let mut plugins = PluginTable::new();
    plugins.register("ordinary_01", text_plugin("o1"));
    plugins.register("ordinary_02", text_plugin("o2"));
    plugins.register("catchall_01", text_plugin("c1"));
    plugins.register("catchall_02", text_plugin("c2"));
    plugins.register(
        "quiet_0001",
        ComponentPlugin::new().with_routes(|_, _, _| Ok(None)),
    );

    let mut registry = fixture.build(&plugins).await.unwrap();
    assert_eq!(
        registry.route_table().names(),
        vec!["bp_cmp_2000_o2", "bp_cmp_1000_o1", "bp_cmp_9500_c2", "bp_cmp_9000_c1"]
    );
    assert_eq!(
        registry.component("ordinary_01").unwrap().route_group.as_deref(),
        Some("bp_cmp_1000_o1")
    );
    assert!(registry.component("quiet_0001").unwrap().route_group.is_none());

    let server = TestServer::new(registry.take_route_table().into_router()).unwrap();
    assert_eq!(server.get("/o1").await.text(), "o1");
    assert_eq!(server.get("/o2").await.text(), "o2");
    assert_eq!(server.get("/").await.text(), "c2");
}

#[tokio::test]
async fn route_hook_sees_final_fragment() {
    let fixture = Fixture::new();
    let path = fixture.component("cmp_1000_demo", "demo_0001", "/demo");
    write_json(&path.join("schema.json"), &json!({"config": {"demo": {"title": "raw"}}}));

    let mut plugins = PluginTable::new();
    plugins.register(
        "demo_0001",
        ComponentPlugin::new()
            .with_init(|_, fragment, _| {
                fragment.insert("config".to_string(), json!({"demo": {"title": "final"}}));
                Ok(())
            })
            .with_routes(|_, fragment, _| {
                let title = fragment["config"]["demo"]["title"]
                    .as_str()
                    .unwrap_or_default()
                    .to_string();
                Ok(Some(Router::new().route(
                    "/",
                    get(move || {
                        let title = title.clone();
                        async move { title }
                    }),
                )))
            }),
    );

    let mut registry = fixture.build(&plugins).await.unwrap();
    let server = TestServer::new(registry.take_route_table().into_router()).unwrap();
    assert_eq!(server.get("/demo").await.text(), "final");
    server
        .get("/elsewhere")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

fn routes_plugin(path: &'static str, body: &'static str) -> ComponentPlugin {
    ComponentPlugin::new().with_routes(move |_component, _fragment, _schema| {
        Ok(Some(Router::new().route(path, get(move || async move { body }))))
    })
}

#[tokio::test]
async fn catch_all_serves_what_earlier_groups_leave() {
    let fixture = Fixture::new();
    fixture.component("cmp_2300_ftoken", "ftoken_001", "/ftoken");
    fixture.component("cmp_5100_home", "home_00001", "");
    fixture.component("cmp_9100_catch_all", "catch_0001", "/");

    let mut plugins = PluginTable::new();
    plugins.register("ftoken_001", routes_plugin("/x", "ftoken"));
    plugins.register("home_00001", routes_plugin("/", "home"));
    plugins.register("catch_0001", routes_plugin("/*rest", "catch-all"));

    let mut registry = fixture.build(&plugins).await.unwrap();
    assert_eq!(
        registry.route_table().names(),
        vec!["bp_cmp_5100_home", "bp_cmp_2300_ftoken", "bp_cmp_9100_catch_all"]
    );

    let server = TestServer::new(registry.take_route_table().into_router()).unwrap();
    assert_eq!(server.get("/").await.text(), "home");
    assert_eq!(server.get("/ftoken/x").await.text(), "ftoken");
    assert_eq!(server.get("/ftoken/missing").await.text(), "catch-all");
    assert_eq!(server.get("/unknown").await.text(), "catch-all");
}

#[tokio::test]
async fn unmatched_ordinary_path_reaches_catch_all() {
    let fixture = Fixture::new();
    fixture.component("cmp_1000_o1", "ordinary_01", "/o1");
    fixture.component("cmp_9000_c1", "catchall_01", "/");

    let mut plugins = PluginTable::new();
    plugins.register("ordinary_01", routes_plugin("/", "o1"));
    plugins.register("catchall_01", routes_plugin("/*rest", "c1"));

    let mut registry = fixture.build(&plugins).await.unwrap();
    let server = TestServer::new(registry.take_route_table().into_router()).unwrap();
    assert_eq!(server.get("/o1").await.text(), "o1");
    assert_eq!(server.get("/o1/missing").await.text(), "c1");
}

#[tokio::test]
async fn wildcard_route_is_a_startup_error() {
    let fixture = Fixture::new();
    let path = fixture.component("cmp_1000_demo", "demo_0001", "/demo");
    write_json(
        &path.join("custom.json"),
        &json!({"manifest": {"route": "/demo/*rest"}}),
    );
    let mut plugins = PluginTable::new();
    plugins.register("demo_0001", routes_plugin("/", "demo"));

    let err = fixture.build(&plugins).await.unwrap_err();
    match err {
        RegistryError::InvalidRoute { component, route, .. } => {
            assert_eq!(component, "cmp_1000_demo");
            assert_eq!(route, "/demo/*rest");
        }
        other => panic!("unexpected error: {other}"),
    }
}
