//! Two-layer override resolution for one component.
//!
//! A component may ship a `custom.json` next to its manifest; an operator may store an override
//! for the same uuid in the [`OverrideStore`]. The stored override is merged over the file, so
//! runtime administration always wins over shipped presets. The result is shaped as
//! `{"manifest": {...}, "schema": {...}}`, both keys optional.

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use crate::errors::CustomError;
use crate::merge::merge_objects;
use crate::override_store::OverrideStore;
use crate::schema::json_type_name;

/// File name of the shipped override inside a component directory.
pub const CUSTOM_FILE: &str = "custom.json";

/// Reads `custom.json` from `dir`, or an empty object when the file does not exist.
pub fn load_custom_file(dir: &Path, component: &str) -> Result<Map<String, Value>, CustomError> {
    let path = dir.join(CUSTOM_FILE);
    if !path.is_file() {
        return Ok(Map::new());
    }
    let invalid = |reason: String| CustomError::InvalidCustomFile {
        component: component.to_string(),
        reason,
    };
    let text = fs::read_to_string(&path).map_err(|e| invalid(e.to_string()))?;
    match serde_json::from_str::<Value>(&text).map_err(|e| invalid(e.to_string()))? {
        Value::Object(map) => Ok(map),
        other => Err(invalid(format!("found {}", json_type_name(&other)))),
    }
}

/// Resolves the effective override fragment for a component.
///
/// `dir` is the component directory and `component` its directory name (for errors).
pub async fn resolve_custom(
    dir: &Path,
    component: &str,
    uuid: &str,
    store: &OverrideStore,
) -> Result<Map<String, Value>, CustomError> {
    let mut custom = load_custom_file(dir, component)?;
    let stored = store.get_override(uuid).await;
    if !stored.is_empty() {
        tracing::debug!(component, uuid, "applying stored override");
        merge_objects(&mut custom, &stored);
    }
    Ok(custom)
}
