//! Key-level access to `serde_json::Value` containers.
//!
//! Objects are addressed by their keys, arrays by decimal index strings.
//! Everything else is a leaf.

use serde_json::Value;

pub fn is_container(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_))
}

pub fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Parse an array key. Leading zeros and signs are not indices.
pub fn parse_index(key: &str) -> Option<usize> {
    if key.is_empty() || (key.len() > 1 && key.starts_with('0')) {
        return None;
    }
    if !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    key.parse().ok()
}

pub fn child<'v>(node: &'v Value, key: &str) -> Option<&'v Value> {
    match node {
        Value::Object(map) => map.get(key),
        Value::Array(items) => parse_index(key).and_then(|i| items.get(i)),
        _ => None,
    }
}

pub fn child_mut<'v>(node: &'v mut Value, key: &str) -> Option<&'v mut Value> {
    match node {
        Value::Object(map) => map.get_mut(key),
        Value::Array(items) => match parse_index(key) {
            Some(index) => items.get_mut(index),
            None => None,
        },
        _ => None,
    }
}

/// All keys of a container in iteration order; empty for leaves.
pub fn child_keys(node: &Value) -> Vec<String> {
    match node {
        Value::Object(map) => map.keys().cloned().collect(),
        Value::Array(items) => (0..items.len()).map(|i| i.to_string()).collect(),
        _ => Vec::new(),
    }
}

/// Keys whose values are themselves containers.
pub fn container_keys(node: &Value) -> Vec<String> {
    match node {
        Value::Object(map) => map
            .iter()
            .filter(|(_, v)| is_container(v))
            .map(|(k, _)| k.clone())
            .collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .filter(|(_, v)| is_container(v))
            .map(|(i, _)| i.to_string())
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn object_and_array_children() {
        let val = json!({"a": [10, {"b": true}]});
        assert_eq!(child(&val, "a").and_then(|a| child(a, "1")), Some(&json!({"b": true})));
        assert_eq!(child(&val, "missing"), None);
        assert_eq!(child(&json!([1, 2]), "x"), None);
        assert_eq!(child(&json!("leaf"), "a"), None);
    }

    #[test]
    fn index_parsing() {
        assert_eq!(parse_index("0"), Some(0));
        assert_eq!(parse_index("42"), Some(42));
        assert_eq!(parse_index("01"), None);
        assert_eq!(parse_index("-1"), None);
        assert_eq!(parse_index("+1"), None);
        assert_eq!(parse_index(""), None);
    }

    #[test]
    fn keys_in_insertion_order() {
        let val = json!({"zeta": 1, "alpha": {"x": 1}, "mid": [1]});
        assert_eq!(child_keys(&val), vec!["zeta", "alpha", "mid"]);
        assert_eq!(container_keys(&val), vec!["alpha", "mid"]);
        assert_eq!(child_keys(&json!(["a", "b"])), vec!["0", "1"]);
        assert!(child_keys(&json!(3)).is_empty());
    }
}
