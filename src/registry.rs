//! # Component Registry
//!
//! The startup pass that turns a directory of components into a merged [`GlobalSchema`] and a
//! [`RouteTable`]. [`ComponentRegistry::build`] runs these steps, in order, and aborts on the
//! first fatal error:
//!
//! 1. discover `cmp_NNNN_name` directories in name order (`_cmp_` directories are disabled)
//! 2. load each manifest
//! 3. resolve overrides (`custom.json`, then the override store) and merge their `manifest`
//!    fragment onto the manifest
//! 4. record a [`ComponentDescriptor`] per component
//! 5. attach `neutral/component-init.ntpl` when present
//! 6. load `schema.json`, merge the override `schema` fragment onto it and the result into the
//!    tree
//! 7. write the identity maps and per-uuid / per-name entries into `data`
//! 8. substitute variables in the tree, then in every fragment
//! 9. run init hooks in discovery order, merging each fragment back into the tree
//! 10. aggregate init templates into the `core:include-components-register-ntpl` snippet
//! 11. register route groups (catch-all components last)
//!
//! Building twice from the same inputs produces byte-identical trees.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::component_dir::{self, ComponentDirName, DISABLED_PREFIX, ENABLED_PREFIX};
use crate::config::EngineConfig;
use crate::custom::resolve_custom;
use crate::errors::RegistryError;
use crate::manifest::{ComponentUuid, Manifest, load_manifest};
use crate::override_store::OverrideStore;
use crate::plugin::PluginTable;
use crate::routes::{RouteGroup, RouteTable, registration_order, route_group_name};
use crate::schema::{COMPONENT_SNIPPET_NAME, GlobalSchema, json_type_name};
use crate::substitute::substitute_tree;

/// File name of a component's schema contribution.
pub const SCHEMA_FILE: &str = "schema.json";
/// Directory of a component's templates.
pub const TEMPLATE_DIR: &str = "neutral";
/// File name of a component's init template inside [`TEMPLATE_DIR`].
pub const INIT_TEMPLATE_FILE: &str = "component-init.ntpl";

/// A loaded component.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentDescriptor {
    /// Directory name, e.g. `cmp_7000_hellocomp`.
    pub name: String,
    /// Parsed directory name.
    #[serde(skip)]
    pub dir_name: ComponentDirName,
    /// Stable component identity.
    #[serde(skip)]
    pub uuid: ComponentUuid,
    /// Component directory.
    pub path: PathBuf,
    /// Manifest with the override `manifest` fragment applied.
    pub manifest: Manifest,
    /// Init template, if the component ships one.
    #[serde(rename = "ntpl", skip_serializing_if = "Option::is_none")]
    pub init_template: Option<PathBuf>,
    /// Name of the registered route group, if any.
    #[serde(rename = "bp", skip_serializing_if = "Option::is_none")]
    pub route_group: Option<String>,
}

impl ComponentDescriptor {
    /// The `{name, path, manifest, ntpl?}` object written into the tree's `data` namespace.
    pub fn tree_entry(&self) -> Map<String, Value> {
        let mut entry = Map::new();
        entry.insert("name".to_string(), Value::String(self.name.clone()));
        entry.insert(
            "path".to_string(),
            Value::String(self.path.to_string_lossy().into_owned()),
        );
        entry.insert(
            "manifest".to_string(),
            Value::Object(self.manifest.as_object().clone()),
        );
        if let Some(ntpl) = &self.init_template {
            entry.insert(
                "ntpl".to_string(),
                Value::String(ntpl.to_string_lossy().into_owned()),
            );
        }
        entry
    }
}

/// Reads a JSON object file; `Ok(None)` when the file does not exist.
fn read_object_file(path: &Path) -> Result<Option<Map<String, Value>>, String> {
    if !path.is_file() {
        return Ok(None);
    }
    let text = fs::read_to_string(path).map_err(|e| e.to_string())?;
    match serde_json::from_str::<Value>(&text).map_err(|e| e.to_string())? {
        Value::Object(map) => Ok(Some(map)),
        other => Err(format!("expected a JSON object, found {}", json_type_name(&other))),
    }
}

fn object_fragment<'a>(
    custom: &'a Map<String, Value>,
    key: &str,
    component: &str,
) -> Option<&'a Map<String, Value>> {
    match custom.get(key) {
        Some(Value::Object(fragment)) => Some(fragment),
        Some(other) => {
            tracing::warn!(
                component,
                key,
                found = json_type_name(other),
                "override fragment is not an object; ignored"
            );
            None
        }
        None => None,
    }
}

/// The result of a startup pass.
#[derive(Debug)]
pub struct ComponentRegistry {
    schema: GlobalSchema,
    components: Vec<ComponentDescriptor>,
    fragments: Vec<Map<String, Value>>,
    index: BTreeMap<ComponentUuid, usize>,
    snippet: String,
    routes: RouteTable,
}

impl ComponentRegistry {
    /// Runs the startup pass over `config.component_dir`.
    ///
    /// Two checks are stricter than loaders that accept any `cmp_*` directory and let a later
    /// duplicate uuid replace an earlier one: an enabled directory whose name is not
    /// `cmp_NNNN_name` fails with [`RegistryError::InvalidDirectoryName`], and a uuid declared
    /// twice fails with [`RegistryError::DuplicateUuid`]. Trees migrated from such loaders may
    /// need their directories renamed or their uuids made unique.
    ///
    /// A route hook whose component declares a wildcard `route` fails with
    /// [`RegistryError::InvalidRoute`].
    pub async fn build(
        config: &EngineConfig,
        store: &OverrideStore,
        plugins: &PluginTable,
    ) -> Result<Self, RegistryError> {
        let mut schema = match &config.default_schema {
            Some(path) => {
                let base = read_object_file(path)
                    .and_then(|found| found.ok_or_else(|| "file not found".to_string()))
                    .map_err(|reason| RegistryError::InvalidSchemaFile {
                        component: path.display().to_string(),
                        reason,
                    })?;
                GlobalSchema::from_base(&base)
            }
            None => GlobalSchema::default(),
        };

        // steps 1-4
        let mut components: Vec<ComponentDescriptor> = Vec::new();
        let mut customs: Vec<Map<String, Value>> = Vec::new();
        let mut index: BTreeMap<ComponentUuid, usize> = BTreeMap::new();
        let entries = component_dir::sorted_subdirectories(&config.component_dir).map_err(
            |source| RegistryError::ComponentDir {
                path: config.component_dir.clone(),
                source,
            },
        )?;
        for (name, path) in entries {
            if name.starts_with(DISABLED_PREFIX) {
                tracing::debug!(component = %name, "skipping disabled component");
                continue;
            }
            if !name.starts_with(ENABLED_PREFIX) {
                tracing::debug!(entry = %name, "skipping directory without component prefix");
                continue;
            }
            let dir_name = ComponentDirName::parse(&name)
                .ok_or_else(|| RegistryError::InvalidDirectoryName(name.clone()))?;
            let mut manifest = load_manifest(&path, &name)?;
            let uuid = manifest.uuid();
            if let Some(&first) = index.get(&uuid) {
                return Err(RegistryError::DuplicateUuid {
                    uuid: uuid.to_string(),
                    first: components[first].name.clone(),
                    second: name,
                });
            }
            let custom = resolve_custom(&path, &name, uuid.as_str(), store).await?;
            if let Some(fragment) = object_fragment(&custom, "manifest", &name) {
                manifest.merge_override(fragment);
            }
            tracing::debug!(component = %name, uuid = %uuid, "manifest loaded");
            index.insert(uuid.clone(), components.len());
            components.push(ComponentDescriptor {
                name,
                dir_name,
                uuid,
                path,
                manifest,
                init_template: None,
                route_group: None,
            });
            customs.push(custom);
        }

        // step 5
        for component in &mut components {
            let ntpl = component.path.join(TEMPLATE_DIR).join(INIT_TEMPLATE_FILE);
            if ntpl.is_file() {
                tracing::debug!(component = %component.name, "init template found");
                component.init_template = Some(ntpl);
            }
        }

        // step 6
        let mut fragments: Vec<Map<String, Value>> = Vec::with_capacity(components.len());
        for (component, custom) in components.iter().zip(&customs) {
            let loaded = read_object_file(&component.path.join(SCHEMA_FILE)).map_err(|reason| {
                RegistryError::InvalidSchemaFile {
                    component: component.name.clone(),
                    reason,
                }
            })?;
            match loaded {
                Some(mut fragment) => {
                    if let Some(overlay) = object_fragment(custom, "schema", &component.name) {
                        crate::merge::merge_objects(&mut fragment, overlay);
                    }
                    schema.merge(&fragment);
                    tracing::debug!(component = %component.name, "schema merged");
                    fragments.push(fragment);
                }
                None => {
                    if custom.contains_key("schema") {
                        tracing::debug!(
                            component = %component.name,
                            "override schema ignored: component has no schema.json"
                        );
                    }
                    fragments.push(Map::new());
                }
            }
        }

        // step 7
        schema.reset_identity_maps();
        for component in &components {
            schema.register_component(
                component.uuid.as_str(),
                &component.name,
                &component.tree_entry(),
            );
        }

        // step 8
        schema
            .substitute()
            .map_err(|source| RegistryError::Substitution {
                scope: "global schema".to_string(),
                source,
            })?;
        let root = schema.to_value();
        for (component, fragment) in components.iter().zip(fragments.iter_mut()) {
            let mut value = Value::Object(std::mem::take(fragment));
            substitute_tree(&mut value, &root).map_err(|source| RegistryError::Substitution {
                scope: format!("component {}", component.name),
                source,
            })?;
            if let Value::Object(map) = value {
                *fragment = map;
            }
        }

        // step 9
        for (component, fragment) in components.iter().zip(fragments.iter_mut()) {
            if let Some(hook) = plugins.init_hook(component.uuid.as_str()) {
                hook.init(component, fragment, &schema)
                    .map_err(|source| RegistryError::Hook {
                        hook: "init",
                        component: component.name.clone(),
                        source,
                    })?;
                tracing::debug!(component = %component.name, "init hook ran");
            }
            schema.merge(fragment);
        }

        // step 10
        let mut snippet = String::new();
        for component in &components {
            if let Some(ntpl) = &component.init_template {
                let content =
                    fs::read_to_string(ntpl).map_err(|source| RegistryError::InitTemplate {
                        path: ntpl.clone(),
                        source,
                    })?;
                snippet.push_str(&content);
                snippet.push('\n');
            }
        }
        schema.set_snippet(COMPONENT_SNIPPET_NAME, snippet.clone());

        // step 11
        let mut routes = RouteTable::new();
        for idx in registration_order(&components) {
            let component = &components[idx];
            let Some(hook) = plugins.route_hook(component.uuid.as_str()) else {
                continue;
            };
            let group = hook
                .routes(component, &fragments[idx], &schema)
                .map_err(|source| RegistryError::Hook {
                    hook: "routes",
                    component: component.name.clone(),
                    source,
                })?;
            match group {
                Some(router) => {
                    let name = route_group_name(&component.name);
                    let group = RouteGroup::new(
                        name.clone(),
                        component.manifest.route(),
                        component.uuid.as_str(),
                        router,
                    )
                    .map_err(|reason| RegistryError::InvalidRoute {
                        component: component.name.clone(),
                        route: component.manifest.route().to_string(),
                        reason,
                    })?;
                    routes.mount(group);
                    components[idx].route_group = Some(name);
                }
                None => {
                    tracing::debug!(component = %component.name, "route hook returned no group");
                }
            }
        }

        tracing::info!(
            components = components.len(),
            route_groups = routes.len(),
            "component registry built"
        );
        Ok(Self {
            schema,
            components,
            fragments,
            index,
            snippet,
            routes,
        })
    }

    /// The merged tree.
    pub fn schema(&self) -> &GlobalSchema {
        &self.schema
    }

    /// The component with `uuid`.
    pub fn component(&self, uuid: &str) -> Option<&ComponentDescriptor> {
        let idx = self.position(uuid)?;
        self.components.get(idx)
    }

    /// Every component in discovery order.
    pub fn components(&self) -> &[ComponentDescriptor] {
        &self.components
    }

    /// The final schema fragment of the component with `uuid`.
    pub fn component_schema(&self, uuid: &str) -> Option<&Map<String, Value>> {
        let idx = self.position(uuid)?;
        self.fragments.get(idx)
    }

    /// The aggregated init templates.
    pub fn snippet(&self) -> &str {
        &self.snippet
    }

    /// The mounted route groups.
    pub fn route_table(&self) -> &RouteTable {
        &self.routes
    }

    /// Moves the route table out, leaving an empty one behind.
    pub fn take_route_table(&mut self) -> RouteTable {
        std::mem::take(&mut self.routes)
    }

    /// Splits the registry into tree, components and route table.
    pub fn into_parts(self) -> (GlobalSchema, Vec<ComponentDescriptor>, RouteTable) {
        (self.schema, self.components, self.routes)
    }

    fn position(&self, uuid: &str) -> Option<usize> {
        let uuid = ComponentUuid::new(uuid)?;
        self.index.get(&uuid).copied()
    }
}
