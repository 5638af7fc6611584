//! # Global Schema Tree
//!
//! The merged configuration document every component contributes to. It always carries these
//! namespaces:
//!
//! ```json
//! {
//!     "config": {},
//!     "data": {},
//!     "inherit": {"data": {}, "snippets": {}}
//! }
//! ```
//!
//! `data` holds runtime values and, after a registry build, the component identity maps
//! (`COMPONENTS_MAP_BY_NAME`, `COMPONENTS_MAP_BY_UUID`) plus one descriptor entry per uuid and per
//! directory name. `inherit` is copied into every request's working state.
//!
//! The tree is built once at startup and read-only afterwards. Request handlers that need to
//! mutate it take a [`GlobalSchema::request_copy`].

use serde::Serialize;
use serde_json::{Map, Value};

use crate::errors::SubstitutionError;
use crate::merge::merge_objects;
use crate::substitute::substitute_tree;

/// Snippet name under which the aggregated component init templates are registered.
pub const COMPONENT_SNIPPET_NAME: &str = "core:include-components-register-ntpl";
/// `data` key of the directory-name to uuid map.
pub const MAP_BY_NAME: &str = "COMPONENTS_MAP_BY_NAME";
/// `data` key of the uuid to directory-name map.
pub const MAP_BY_UUID: &str = "COMPONENTS_MAP_BY_UUID";

/// Name of a JSON value's type, for error messages.
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn object_at<'a>(map: &'a mut Map<String, Value>, key: &str) -> &'a mut Map<String, Value> {
    let slot = map
        .entry(key.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !slot.is_object() {
        tracing::warn!(key, found = json_type_name(slot), "replacing non-object namespace");
    }
    force_object(slot)
}

fn force_object(slot: &mut Value) -> &mut Map<String, Value> {
    match slot {
        Value::Object(inner) => inner,
        other => {
            *other = Value::Object(Map::new());
            force_object(other)
        }
    }
}

/// The merged configuration document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct GlobalSchema(Map<String, Value>);

impl Default for GlobalSchema {
    fn default() -> Self {
        let mut tree = Map::new();
        tree.insert("config".to_string(), Value::Object(Map::new()));
        tree.insert("data".to_string(), Value::Object(Map::new()));
        let mut inherit = Map::new();
        inherit.insert("data".to_string(), Value::Object(Map::new()));
        inherit.insert("snippets".to_string(), Value::Object(Map::new()));
        tree.insert("inherit".to_string(), Value::Object(inherit));
        Self(tree)
    }
}

impl GlobalSchema {
    /// The engine defaults with `base` merged over them.
    pub fn from_base(base: &Map<String, Value>) -> Self {
        let mut schema = Self::default();
        schema.merge(base);
        // restore the namespaces in case `base` replaced one with a scalar
        schema.data_mut();
        schema.snippets_mut();
        object_at(object_at(&mut schema.0, "inherit"), "data");
        object_at(&mut schema.0, "config");
        schema
    }

    /// Deep-merges a fragment into the tree.
    pub fn merge(&mut self, fragment: &Map<String, Value>) {
        merge_objects(&mut self.0, fragment);
    }

    /// The whole tree.
    pub fn as_object(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Follows a JSON pointer such as `/data/COMPONENTS_MAP_BY_NAME`.
    ///
    /// Segments are unescaped (`~1` is `/`, `~0` is `~`). The empty pointer names the whole tree,
    /// which is not a [`Value`], so it yields `None`.
    pub fn pointer(&self, pointer: &str) -> Option<&Value> {
        let path = pointer.strip_prefix('/')?;
        let (head, rest) = match path.find('/') {
            Some(idx) => path.split_at(idx),
            None => (path, ""),
        };
        let value = self.0.get(&head.replace("~1", "/").replace("~0", "~"))?;
        if rest.is_empty() {
            Some(value)
        } else {
            value.pointer(rest)
        }
    }

    /// The `data` namespace.
    pub fn data(&self) -> Option<&Map<String, Value>> {
        self.0.get("data").and_then(Value::as_object)
    }

    /// The `data` namespace, created if missing.
    pub fn data_mut(&mut self) -> &mut Map<String, Value> {
        object_at(&mut self.0, "data")
    }

    /// The `inherit.snippets` namespace.
    pub fn snippets(&self) -> Option<&Map<String, Value>> {
        self.0
            .get("inherit")
            .and_then(|inherit| inherit.get("snippets"))
            .and_then(Value::as_object)
    }

    fn snippets_mut(&mut self) -> &mut Map<String, Value> {
        object_at(object_at(&mut self.0, "inherit"), "snippets")
    }

    /// Registers a named snippet, leaving other snippets in place.
    pub fn set_snippet(&mut self, name: &str, text: String) {
        self.snippets_mut().insert(name.to_string(), Value::String(text));
    }

    /// Records one component in the identity maps and under `data.<uuid>` and `data.<name>`.
    ///
    /// Existing entries under those keys are updated key by key rather than replaced.
    pub fn register_component(&mut self, uuid: &str, name: &str, descriptor: &Map<String, Value>) {
        let data = self.data_mut();
        object_at(data, MAP_BY_NAME).insert(name.to_string(), Value::String(uuid.to_string()));
        object_at(data, MAP_BY_UUID).insert(uuid.to_string(), Value::String(name.to_string()));
        for key in [uuid, name] {
            let entry = object_at(data, key);
            for (field, value) in descriptor {
                entry.insert(field.clone(), value.clone());
            }
        }
    }

    /// Starts both identity maps empty.
    pub fn reset_identity_maps(&mut self) {
        let data = self.data_mut();
        data.insert(MAP_BY_NAME.to_string(), Value::Object(Map::new()));
        data.insert(MAP_BY_UUID.to_string(), Value::Object(Map::new()));
    }

    /// Runs variable substitution over the whole tree.
    ///
    /// Every reference resolves against the tree as it was before this call.
    pub fn substitute(&mut self) -> Result<(), SubstitutionError> {
        let snapshot = Value::Object(self.0.clone());
        let mut tree = Value::Object(std::mem::take(&mut self.0));
        let result = substitute_tree(&mut tree, &snapshot);
        if let Value::Object(map) = tree {
            self.0 = map;
        }
        result
    }

    /// An independent deep copy for request-local mutation.
    pub fn request_copy(&self) -> Self {
        self.clone()
    }

    /// Compact JSON with sorted keys; equal trees render to equal strings.
    pub fn to_canonical_string(&self) -> String {
        Value::Object(self.0.clone()).to_string()
    }

    /// The tree as a JSON value.
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }

    /// Consumes the schema into its JSON object.
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}
