//! State-side structural primitives over the JSON attribute tree.
//!
//! Fields are addressed by dotted path. An intermediate segment resolving
//! to a JSON array fans out over every element, which is how a repeated
//! state block is reached. Key order of surrounding objects is preserved;
//! removals use `shift_remove` so sibling order never changes.

use serde_json::{Map, Number, Value};

/// Apply `f` to the parent object and final field name of every location
/// the dotted path resolves to.
pub(crate) fn with_field<F>(value: &mut Value, path: &str, f: &mut F)
where
    F: FnMut(&mut Map<String, Value>, &str),
{
    let segments: Vec<&str> = path.split('.').collect();
    descend(value, &segments, f);
}

fn descend<F>(value: &mut Value, segments: &[&str], f: &mut F)
where
    F: FnMut(&mut Map<String, Value>, &str),
{
    match value {
        Value::Array(items) => {
            for item in items.iter_mut() {
                descend(item, segments, f);
            }
        }
        Value::Object(map) => {
            if segments.len() == 1 {
                f(map, segments[0]);
            } else if let Some(child) = map.get_mut(segments[0]) {
                descend(child, &segments[1..], f);
            }
        }
        _ => {}
    }
}

/// Collapse a MaxItems:1 array field: a one-element array becomes its sole
/// element, an empty array deletes the field. No-op for anything else, so
/// already-collapsed input passes through unchanged.
pub fn collapse_singleton_array(attrs: &mut Value, path: &str) {
    with_field(attrs, path, &mut |map, field| {
        let Some(Value::Array(items)) = map.get_mut(field) else {
            return;
        };
        if items.is_empty() {
            map.shift_remove(field);
        } else if items.len() == 1 {
            let element = items.remove(0);
            map[field] = element;
        }
    });
}

/// Collapse a whole MaxItems:1 chain, outermost level first, so that a
/// collapsed object's own fields are collapsed in the same call. Handles
/// arbitrary nesting depth (`"a.b.c.d"` applies at `a`, `a.b`, `a.b.c`,
/// `a.b.c.d`).
pub fn collapse_singleton_chain(attrs: &mut Value, path: &str) {
    let segments: Vec<&str> = path.split('.').collect();
    for depth in 1..=segments.len() {
        collapse_singleton_array(attrs, &segments[..depth].join("."));
    }
}

/// Widen an integer JSON number to its floating representation. State
/// numeric precision is always safely representable in a 64-bit float.
pub fn convert_to_float64(attrs: &mut Value, path: &str) {
    with_field(attrs, path, &mut |map, field| {
        let Some(value) = map.get_mut(field) else {
            return;
        };
        let Value::Number(n) = &*value else {
            return;
        };
        if n.is_f64() {
            return;
        }
        if let Some(widened) = n.as_f64().and_then(Number::from_f64) {
            *value = Value::Number(widened);
        }
    });
}

/// Rename a field, keeping its position among its siblings. No-op when the
/// field is absent or the new name is taken.
pub fn rename_field(attrs: &mut Value, path: &str, to: &str) {
    let to = to.to_string();
    with_field(attrs, path, &mut |map, field| {
        if !map.contains_key(field) || map.contains_key(&to) {
            return;
        }
        let mut renamed = Map::new();
        for (key, value) in map.iter() {
            if key == field {
                renamed.insert(to.clone(), value.clone());
            } else {
                renamed.insert(key.clone(), value.clone());
            }
        }
        *map = renamed;
    });
}

/// Remove a field. No-op when absent.
pub fn remove_field(attrs: &mut Value, path: &str) {
    with_field(attrs, path, &mut |map, field| {
        map.shift_remove(field);
    });
}

/// Collapse an array of `{key_field, value_field}` objects into one object
/// keyed by the key values. The array stays untouched unless every entry
/// has a string key and a value.
pub fn collapse_keyed_array(attrs: &mut Value, path: &str, key_field: &str, value_field: &str) {
    with_field(attrs, path, &mut |map, field| {
        let Some(Value::Array(items)) = map.get(field) else {
            return;
        };
        let mut collapsed = Map::new();
        for item in items {
            let Value::Object(entry) = item else {
                return;
            };
            let Some(Value::String(key)) = entry.get(key_field) else {
                return;
            };
            let Some(value) = entry.get(value_field) else {
                return;
            };
            collapsed.insert(key.clone(), value.clone());
        }
        map[field] = Value::Object(collapsed);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn collapse_singleton_unwraps_and_deletes() {
        let mut attrs = json!({"disk": [{"size": 20}], "nic": []});
        collapse_singleton_array(&mut attrs, "disk");
        collapse_singleton_array(&mut attrs, "nic");
        assert_eq!(attrs, json!({"disk": {"size": 20}}));
        // Idempotent on already-collapsed input.
        collapse_singleton_array(&mut attrs, "disk");
        assert_eq!(attrs, json!({"disk": {"size": 20}}));
    }

    #[test]
    fn collapse_chain_reaches_depth_four() {
        let mut attrs = json!({"a": [{"b": [{"c": [{"d": [{"leaf": 1}]}]}]}]});
        collapse_singleton_chain(&mut attrs, "a.b.c.d");
        assert_eq!(attrs, json!({"a": {"b": {"c": {"d": {"leaf": 1}}}}}));
    }

    #[test]
    fn intermediate_arrays_fan_out() {
        let mut attrs = json!({"rule": [{"port": [{"n": 1}]}, {"port": [{"n": 2}]}]});
        collapse_singleton_array(&mut attrs, "rule.port");
        assert_eq!(
            attrs,
            json!({"rule": [{"port": {"n": 1}}, {"port": {"n": 2}}]})
        );
    }

    #[test]
    fn widen_integer_to_float() {
        let mut attrs = json!({"weight": 10, "ratio": 1.5, "name": "x"});
        convert_to_float64(&mut attrs, "weight");
        convert_to_float64(&mut attrs, "ratio");
        convert_to_float64(&mut attrs, "name");
        assert_eq!(attrs["weight"], json!(10.0));
        assert_eq!(attrs["ratio"], json!(1.5));
        assert_eq!(attrs["name"], json!("x"));
    }

    #[test]
    fn rename_preserves_sibling_order() {
        let mut attrs = json!({"a": 1, "old": 2, "z": 3});
        rename_field(&mut attrs, "old", "new");
        let keys: Vec<&String> = attrs.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["a", "new", "z"]);
        // Absent source and taken destination are both no-ops.
        rename_field(&mut attrs, "missing", "other");
        rename_field(&mut attrs, "a", "z");
        assert_eq!(attrs, json!({"a": 1, "new": 2, "z": 3}));
    }

    #[test]
    fn keyed_array_collapses_to_map() {
        let mut attrs = json!({"header": [{"header": "Host", "values": ["a.com"]}]});
        collapse_keyed_array(&mut attrs, "header", "header", "values");
        assert_eq!(attrs, json!({"header": {"Host": ["a.com"]}}));
        // Second application is a no-op: the field is no longer an array.
        collapse_keyed_array(&mut attrs, "header", "header", "values");
        assert_eq!(attrs, json!({"header": {"Host": ["a.com"]}}));
    }

    #[test]
    fn keyed_array_with_dynamic_entry_is_untouched() {
        let mut attrs = json!({"header": [{"header": 5, "values": []}]});
        collapse_keyed_array(&mut attrs, "header", "header", "values");
        assert_eq!(attrs, json!({"header": [{"header": 5, "values": []}]}));
    }
}
