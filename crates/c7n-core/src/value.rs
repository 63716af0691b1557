//! Copy-on-write helpers over parameter value maps.
//!
//! A clause's parameters are a JSON object. Updates never mutate the map they
//! are given: each helper returns a fresh map, leaving the caller's snapshot
//! intact. A `null` or empty value removes its key instead of being stored.

use serde_json::{Map, Value};

/// Mapping from property name to typed value.
pub type ValueMap = Map<String, Value>;

/// Returns true for values that mean "unset": `null`, `""`, `[]` and `{}`.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Set `key` to `value`, or remove it when the value is empty.
pub fn upsert(map: &ValueMap, key: &str, value: Value) -> ValueMap {
    let mut next = map.clone();
    if is_empty_value(&value) {
        next.shift_remove(key);
    } else {
        next.insert(key.to_string(), value);
    }
    next
}

/// Upsert through nested mappings.
///
/// Missing intermediate mappings are created; a mapping left empty by a
/// removal is removed from its parent in turn. Siblings at every level are
/// preserved.
pub fn upsert_path<S: AsRef<str>>(map: &ValueMap, path: &[S], value: Value) -> ValueMap {
    match path {
        [] => map.clone(),
        [key] => upsert(map, key.as_ref(), value),
        [head, rest @ ..] => {
            let child = match map.get(head.as_ref()) {
                Some(Value::Object(inner)) => inner.clone(),
                _ => ValueMap::new(),
            };
            let child = upsert_path(&child, rest, value);
            upsert(map, head.as_ref(), Value::Object(child))
        }
    }
}

/// Remove the value at `path`, pruning mappings left empty.
pub fn remove_path<S: AsRef<str>>(map: &ValueMap, path: &[S]) -> ValueMap {
    upsert_path(map, path, Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> ValueMap {
        match value {
            Value::Object(m) => m,
            _ => panic!("fixture must be an object"),
        }
    }

    #[test]
    fn test_empty_values() {
        assert!(is_empty_value(&Value::Null));
        assert!(is_empty_value(&json!("")));
        assert!(is_empty_value(&json!([])));
        assert!(is_empty_value(&json!({})));
        assert!(!is_empty_value(&json!(false)));
        assert!(!is_empty_value(&json!(0)));
        assert!(!is_empty_value(&json!(" ")));
    }

    #[test]
    fn test_upsert_sets_and_removes() {
        let original = map(json!({"key": "Name", "value": "web"}));

        let updated = upsert(&original, "value", json!("db"));
        assert_eq!(updated, map(json!({"key": "Name", "value": "db"})));

        let cleared = upsert(&updated, "value", Value::Null);
        assert_eq!(cleared, map(json!({"key": "Name"})));

        // The original snapshot is untouched.
        assert_eq!(original, map(json!({"key": "Name", "value": "web"})));
    }

    #[test]
    fn test_upsert_keeps_insertion_order() {
        let original = map(json!({"a": 1, "b": 2, "c": 3}));
        let updated = upsert(&original, "b", Value::Null);
        let keys: Vec<&String> = updated.keys().collect();
        assert_eq!(keys, vec!["a", "c"]);
    }

    #[test]
    fn test_upsert_path_creates_intermediate_maps() {
        let original = map(json!({"type": "tag"}));
        let updated = upsert_path(&original, &["tags", "env"], json!("prod"));
        assert_eq!(updated, map(json!({"type": "tag", "tags": {"env": "prod"}})));
    }

    #[test]
    fn test_upsert_path_preserves_siblings() {
        let original = map(json!({"tags": {"env": "prod", "team": "core"}}));
        let updated = remove_path(&original, &["tags", "env"]);
        assert_eq!(updated, map(json!({"tags": {"team": "core"}})));
    }

    #[test]
    fn test_remove_path_prunes_empty_parents() {
        let original = map(json!({"type": "tag", "tags": {"env": "prod"}}));
        let updated = remove_path(&original, &["tags", "env"]);
        assert_eq!(updated, map(json!({"type": "tag"})));
    }
}
