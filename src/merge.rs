//! # Deep Merge
//!
//! Recursive merge of JSON objects. The target is mutated in place and the source wins every
//! conflict, except that two objects meeting at the same key are merged key by key instead of
//! replaced. Arrays are values like any other: a source array replaces the target array.
//!
//! ```rust
//! use assemblage::merge_objects;
//! use serde_json::json;
//!
//! let mut target = json!({"a": {"x": 1, "y": 2}, "keep": true});
//! let source = json!({"a": {"y": 3}, "list": [1]});
//! merge_objects(target.as_object_mut().unwrap(), source.as_object().unwrap());
//! assert_eq!(target, json!({"a": {"x": 1, "y": 3}, "keep": true, "list": [1]}));
//! ```

use serde_json::{Map, Value};

/// Merges `source` into `target`, source winning on conflicts.
pub fn merge_objects(target: &mut Map<String, Value>, source: &Map<String, Value>) {
    for (key, value) in source {
        match (target.get_mut(key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                merge_objects(existing, incoming);
            }
            _ => {
                target.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Merges `source` into `target` when both are objects.
///
/// Any other combination replaces `target` with a copy of `source`, which is the same rule
/// [`merge_objects`] applies one level down.
pub fn merge_values(target: &mut Value, source: &Value) {
    match (target, source) {
        (Value::Object(existing), Value::Object(incoming)) => merge_objects(existing, incoming),
        (target, source) => *target = source.clone(),
    }
}

/// Consuming variant of [`merge_objects`] for owned overrides.
pub fn merged(mut base: Map<String, Value>, overlay: &Map<String, Value>) -> Map<String, Value> {
    merge_objects(&mut base, overlay);
    base
}
