//! # Manifest Loader
//!
//! Every component ships a `manifest.json` object with at least these fields:
//!
//! ```json
//! {
//!     "uuid": "hellocomp_0yt2sa",
//!     "name": "Hello Component",
//!     "description": "Example component",
//!     "version": "0.0.1",
//!     "route": "/HelloComponent",
//!     "config": {}
//! }
//! ```
//!
//! `config` and any other keys are optional and kept verbatim. The uuid is the component's stable
//! identity and must satisfy [`is_valid_uuid`].

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::ManifestError;
use crate::merge::merge_objects;
use crate::schema::json_type_name;

/// File name of the manifest inside a component directory.
pub const MANIFEST_FILE: &str = "manifest.json";
/// Fields every manifest must declare.
pub const REQUIRED_FIELDS: [&str; 5] = ["uuid", "name", "description", "version", "route"];
/// Shortest accepted uuid.
pub const UUID_MIN_LEN: usize = 9;
/// Longest accepted uuid.
pub const UUID_MAX_LEN: usize = 50;

/// Returns true when `candidate` is an acceptable component uuid.
///
/// The rule: length within [`UUID_MIN_LEN`]..=[`UUID_MAX_LEN`], at least one underscore, and only
/// lowercase ASCII letters, digits and underscores.
pub fn is_valid_uuid(candidate: &str) -> bool {
    (UUID_MIN_LEN..=UUID_MAX_LEN).contains(&candidate.len())
        && candidate.contains('_')
        && candidate
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_')
}

/// A validated component uuid.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ComponentUuid(String);

impl ComponentUuid {
    /// Validates and wraps a uuid.
    pub fn new(uuid: &str) -> Option<Self> {
        is_valid_uuid(uuid).then(|| Self(uuid.to_string()))
    }

    /// The uuid as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ComponentUuid {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or_else(|| format!("invalid component uuid '{}'", s))
    }
}

impl TryFrom<String> for ComponentUuid {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ComponentUuid> for String {
    fn from(uuid: ComponentUuid) -> Self {
        uuid.0
    }
}

/// A parsed and validated manifest.
///
/// The manifest stays an open JSON object so overrides can merge arbitrary keys onto it; the
/// accessors read the well-known fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Manifest(Map<String, Value>);

impl Manifest {
    /// Validates a JSON object as a manifest for the component in directory `component`.
    pub fn from_object(component: &str, object: Map<String, Value>) -> Result<Self, ManifestError> {
        for field in REQUIRED_FIELDS {
            if !object.contains_key(field) {
                return Err(ManifestError::ValidationFailed {
                    component: component.to_string(),
                    reason: format!("field {} not found in manifest", field),
                });
            }
        }
        let uuid = object.get("uuid").unwrap_or(&Value::Null);
        if !uuid.as_str().is_some_and(is_valid_uuid) {
            return Err(ManifestError::ValidationFailed {
                component: component.to_string(),
                reason: format!("invalid uuid {}", uuid),
            });
        }
        Ok(Self(object))
    }

    /// The component uuid.
    pub fn uuid(&self) -> ComponentUuid {
        // validated in from_object and never overwritten by merge_override
        ComponentUuid(self.str_field("uuid").unwrap_or_default().to_string())
    }

    /// The display name.
    pub fn name(&self) -> &str {
        self.str_field("name").unwrap_or_default()
    }

    /// The route prefix under which the component mounts its route group.
    pub fn route(&self) -> &str {
        self.str_field("route").unwrap_or_default()
    }

    /// The component-specific `config` object, if any.
    pub fn config(&self) -> Option<&Map<String, Value>> {
        self.0.get("config").and_then(Value::as_object)
    }

    /// Looks up any top-level manifest key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The manifest as a JSON object.
    pub fn as_object(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Deep-merges an override `manifest` fragment onto this manifest.
    ///
    /// The uuid is identity and is restored if the fragment tries to change it.
    pub fn merge_override(&mut self, fragment: &Map<String, Value>) {
        let uuid = self.0.get("uuid").cloned();
        merge_objects(&mut self.0, fragment);
        if let Some(uuid) = uuid
            && self.0.get("uuid") != Some(&uuid)
        {
            tracing::warn!(uuid = %uuid, "override attempted to change the manifest uuid; ignored");
            self.0.insert("uuid".to_string(), uuid);
        }
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }
}

/// Reads and validates `manifest.json` from a component directory.
///
/// `component` is the directory name, used in error messages.
pub fn load_manifest(dir: &Path, component: &str) -> Result<Manifest, ManifestError> {
    let path = dir.join(MANIFEST_FILE);
    if !path.is_file() {
        return Err(ManifestError::MissingManifest {
            component: component.to_string(),
        });
    }
    let invalid = |reason: String| ManifestError::InvalidManifest {
        component: component.to_string(),
        reason,
    };
    let text = fs::read_to_string(&path).map_err(|e| invalid(e.to_string()))?;
    match serde_json::from_str::<Value>(&text).map_err(|e| invalid(e.to_string()))? {
        Value::Object(object) => Manifest::from_object(component, object),
        other => Err(invalid(format!("found {}", json_type_name(&other)))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write_manifest(dir: &Path, content: &str) {
        fs::write(dir.join(MANIFEST_FILE), content).unwrap();
    }

    fn valid() -> Value {
        json!({
            "uuid": "demo_0001xx",
            "name": "Demo",
            "description": "d",
            "version": "1",
            "route": "/demo"
        })
    }

    #[test]
    fn uuid_length_bounds() {
        let min = format!("ab_1{}", "0".repeat(UUID_MIN_LEN - 4));
        assert_eq!(min.len(), UUID_MIN_LEN);
        assert!(is_valid_uuid(&min));
        assert!(!is_valid_uuid(&min[..UUID_MIN_LEN - 1]));

        let max = format!("a_{}", "b".repeat(UUID_MAX_LEN - 2));
        assert!(is_valid_uuid(&max));
        assert!(!is_valid_uuid(&format!("{}c", max)));
    }

    #[test]
    fn uuid_requires_underscore_and_charset() {
        assert!(!is_valid_uuid("abcdefghijkl"));
        assert!(!is_valid_uuid("Hellocomp_0yt2sa"));
        assert!(!is_valid_uuid("hello-comp_0yt2sa"));
        assert!(!is_valid_uuid("hellocomp_0yt2sá"));
        assert!(is_valid_uuid("hellocomp_0yt2sa"));
    }

    #[test]
    fn component_uuid_parses_and_serializes() {
        let uuid: ComponentUuid = "hellocomp_0yt2sa".parse().unwrap();
        assert_eq!(serde_json::to_value(&uuid).unwrap(), json!("hellocomp_0yt2sa"));
        assert!(serde_json::from_value::<ComponentUuid>(json!("BAD")).is_err());
    }

    #[test]
    fn loads_valid_manifest() {
        let tmp = tempfile::tempdir().unwrap();
        write_manifest(tmp.path(), &valid().to_string());
        let manifest = load_manifest(tmp.path(), "cmp_1000_demo").unwrap();
        assert_eq!(manifest.uuid().as_str(), "demo_0001xx");
        assert_eq!(manifest.route(), "/demo");
        assert_eq!(manifest.name(), "Demo");
        assert!(manifest.config().is_none());
    }

    #[test]
    fn missing_manifest() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_manifest(tmp.path(), "cmp_1000_demo"),
            Err(ManifestError::MissingManifest { .. })
        ));
    }

    #[test]
    fn manifest_must_be_object() {
        let tmp = tempfile::tempdir().unwrap();
        write_manifest(tmp.path(), "[1, 2]");
        assert!(matches!(
            load_manifest(tmp.path(), "cmp_1000_demo"),
            Err(ManifestError::InvalidManifest { .. })
        ));
        write_manifest(tmp.path(), "{oops");
        assert!(matches!(
            load_manifest(tmp.path(), "cmp_1000_demo"),
            Err(ManifestError::InvalidManifest { .. })
        ));
    }

    #[test]
    fn every_required_field_is_checked() {
        for field in REQUIRED_FIELDS {
            let mut object = valid().as_object().unwrap().clone();
            object.remove(field);
            let err = Manifest::from_object("cmp_1000_demo", object).unwrap_err();
            assert!(err.to_string().contains(field), "{err}");
        }
    }

    #[test]
    fn non_string_uuid_is_rejected() {
        let mut object = valid().as_object().unwrap().clone();
        object.insert("uuid".to_string(), json!(1234567890123u64));
        assert!(matches!(
            Manifest::from_object("cmp_1000_demo", object),
            Err(ManifestError::ValidationFailed { .. })
        ));
    }

    #[test]
    fn override_merges_but_keeps_uuid() {
        let mut manifest =
            Manifest::from_object("cmp_1000_demo", valid().as_object().unwrap().clone()).unwrap();
        let fragment = json!({"route": "/other", "uuid": "evil_000000", "config": {"k": 1}});
        manifest.merge_override(fragment.as_object().unwrap());
        assert_eq!(manifest.route(), "/other");
        assert_eq!(manifest.uuid().as_str(), "demo_0001xx");
        assert_eq!(manifest.config().unwrap()["k"], json!(1));
    }
}
