//! # Variable Substitution
//!
//! Configuration values may reference other values of the merged tree by path:
//!
//! ```text
//! "[:; data -> current -> template -> dir :]/layout"
//! ```
//!
//! Everything between `[:;` and `:]` is a path expression: keys separated by `->`, each trimmed.
//! The path is resolved against a lookup root and the resolved scalar replaces the reference
//! as text. Strings are inserted verbatim, numbers and booleans in their JSON spelling, null as
//! the empty string. Objects and arrays cannot be interpolated.
//!
//! [`substitute`] works on a single string. [`substitute_tree`] applies it to every string of a
//! JSON value in place (object keys included), so substituted text never has to round-trip
//! through JSON quoting.
//!
//! ```rust
//! use assemblage::substitute;
//! use serde_json::json;
//!
//! let root = json!({"a": {"b": "value"}});
//! assert_eq!(substitute("x[:;a->b:]y", &root).unwrap(), "xvaluey");
//! ```

use serde_json::{Map, Value};

use crate::errors::SubstitutionError;
use crate::schema::json_type_name;

/// Opens a variable reference.
pub const START_DELIMITER: &str = "[:;";
/// Closes a variable reference.
pub const END_DELIMITER: &str = ":]";
/// Separates keys in a path expression.
pub const PATH_SEPARATOR: &str = "->";

fn lookup_root(root: &Value) -> Result<&Map<String, Value>, SubstitutionError> {
    root.as_object()
        .ok_or_else(|| SubstitutionError::InvalidLookupRoot {
            found: json_type_name(root),
        })
}

/// Replaces every variable reference in `template` with the value it names in `root`.
///
/// # Errors
/// * `UnclosedDelimiter` - a `[:;` has no `:]` after it
/// * `EmptyKeyInPath` - a path contains an empty key
/// * `KeyNotFound` - a key is missing; the error names the traversed prefix and the keys that
///   were available at that level
/// * `UnsupportedSubstitutionType` - the path resolves to an object or array
/// * `InvalidLookupRoot` - `root` is not an object
pub fn substitute(template: &str, root: &Value) -> Result<String, SubstitutionError> {
    let root = lookup_root(root)?;
    substitute_in(template, root)
}

fn substitute_in(template: &str, root: &Map<String, Value>) -> Result<String, SubstitutionError> {
    let mut out = String::with_capacity(template.len());
    let mut cursor = 0;
    while let Some(offset) = template[cursor..].find(START_DELIMITER) {
        let start = cursor + offset;
        out.push_str(&template[cursor..start]);
        let path_start = start + START_DELIMITER.len();
        let end = template[path_start..]
            .find(END_DELIMITER)
            .map(|o| path_start + o)
            .ok_or(SubstitutionError::UnclosedDelimiter { position: start })?;
        let path = &template[path_start..end];
        let value = resolve_path(root, path)?;
        render_scalar(path, value, &mut out)?;
        cursor = end + END_DELIMITER.len();
    }
    out.push_str(&template[cursor..]);
    Ok(out)
}

/// Splits a path expression into trimmed keys.
pub fn parse_path(path: &str) -> Result<Vec<&str>, SubstitutionError> {
    let keys: Vec<&str> = path.split(PATH_SEPARATOR).map(str::trim).collect();
    if keys.iter().any(|k| k.is_empty()) {
        return Err(SubstitutionError::EmptyKeyInPath {
            path: path.to_string(),
        });
    }
    Ok(keys)
}

/// Resolves a path expression against `root`, returning whatever value it names.
pub fn resolve_path<'a>(
    root: &'a Map<String, Value>,
    path: &str,
) -> Result<&'a Value, SubstitutionError> {
    let keys = parse_path(path)?;
    let mut level = root;
    let mut found: Option<&Value> = None;
    for (idx, key) in keys.iter().enumerate() {
        if let Some(previous) = found {
            level = match previous.as_object() {
                Some(map) => map,
                None => return Err(not_found(&keys, idx, None, path)),
            };
        }
        match level.get(*key) {
            Some(value) => found = Some(value),
            None => return Err(not_found(&keys, idx, Some(level), path)),
        }
    }
    // parse_path never yields an empty key list
    found.ok_or_else(|| SubstitutionError::EmptyKeyInPath {
        path: path.to_string(),
    })
}

fn not_found(
    keys: &[&str],
    idx: usize,
    level: Option<&Map<String, Value>>,
    path: &str,
) -> SubstitutionError {
    let traversed = if idx == 0 {
        "root".to_string()
    } else {
        keys[..idx].join(PATH_SEPARATOR)
    };
    SubstitutionError::KeyNotFound {
        key: keys[idx].to_string(),
        traversed,
        available: level
            .map(|map| map.keys().cloned().collect())
            .unwrap_or_default(),
        path: path.to_string(),
    }
}

fn render_scalar(path: &str, value: &Value, out: &mut String) -> Result<(), SubstitutionError> {
    match value {
        Value::String(s) => out.push_str(s),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Null => {}
        Value::Array(_) | Value::Object(_) => {
            return Err(SubstitutionError::UnsupportedSubstitutionType {
                path: path.to_string(),
                found: json_type_name(value),
            });
        }
    }
    Ok(())
}

/// Substitutes every string inside `value`, object keys included, resolving against `root`.
///
/// `root` is read as-is, so references always see the values as they were before this pass;
/// pass a snapshot when `value` and `root` are the same document.
pub fn substitute_tree(value: &mut Value, root: &Value) -> Result<(), SubstitutionError> {
    let root = lookup_root(root)?;
    walk(value, root)
}

fn walk(value: &mut Value, root: &Map<String, Value>) -> Result<(), SubstitutionError> {
    match value {
        Value::String(s) if s.contains(START_DELIMITER) => {
            *s = substitute_in(s, root)?;
        }
        Value::Array(items) => {
            for item in items {
                walk(item, root)?;
            }
        }
        Value::Object(map) if map.keys().any(|k| k.contains(START_DELIMITER)) => {
            let original = std::mem::take(map);
            for (key, mut item) in original {
                let key = if key.contains(START_DELIMITER) {
                    substitute_in(&key, root)?
                } else {
                    key
                };
                walk(&mut item, root)?;
                map.insert(key, item);
            }
        }
        Value::Object(map) => {
            for item in map.values_mut() {
                walk(item, root)?;
            }
        }
        _ => {}
    }
    Ok(())
}
