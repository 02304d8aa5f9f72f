use serde_json::{Map, Number, Value};
use serde_yaml::Value as Yaml;

use crate::error::TreeError;

/// Load YAML into a tree root.
///
/// Mapping keys become path keys, so scalar keys are rendered to text
/// (`1: x` is addressed as `1`) and composite keys are rejected.
pub fn parse(input: &str) -> Result<Value, TreeError> {
    let document: Yaml = serde_yaml::from_str(input).map_err(|e| TreeError::Parse(e.to_string()))?;
    into_node(document)
}

fn into_node(yaml: Yaml) -> Result<Value, TreeError> {
    Ok(match yaml {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => number(&n),
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(items) => Value::Array(
            items
                .into_iter()
                .map(into_node)
                .collect::<Result<_, _>>()?,
        ),
        Yaml::Mapping(mapping) => {
            let mut map = Map::with_capacity(mapping.len());
            for (key, value) in mapping {
                map.insert(mapping_key(key)?, into_node(value)?);
            }
            Value::Object(map)
        }
        Yaml::Tagged(tagged) => into_node(tagged.value)?,
    })
}

fn number(n: &serde_yaml::Number) -> Value {
    if let Some(i) = n.as_i64() {
        Value::from(i)
    } else if let Some(u) = n.as_u64() {
        Value::from(u)
    } else {
        n.as_f64()
            .and_then(Number::from_f64)
            .map_or(Value::Null, Value::Number)
    }
}

fn mapping_key(key: Yaml) -> Result<String, TreeError> {
    match key {
        Yaml::String(s) => Ok(s),
        Yaml::Number(n) => Ok(n.to_string()),
        Yaml::Bool(b) => Ok(b.to_string()),
        Yaml::Null => Ok("null".to_string()),
        Yaml::Tagged(tagged) => mapping_key(tagged.value),
        Yaml::Sequence(_) | Yaml::Mapping(_) => {
            Err(TreeError::Parse("composite YAML mapping keys cannot be path keys".into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::Path;

    #[test]
    fn nested_mappings_are_addressable() {
        let root = parse("server:\n  ports:\n    - 80\n    - 443\n  name: edge").unwrap();
        let port = Path::parse("server>ports>1").unwrap().resolve(&root).unwrap();
        assert_eq!(port, Some(&Value::from(443)));
        assert_eq!(root["server"]["name"], "edge");
    }

    #[test]
    fn scalar_keys_become_text() {
        let root = parse("1: one\ntrue: yes\n~: nothing").unwrap();
        assert_eq!(root["1"], "one");
        assert_eq!(root["true"], "yes");
        assert_eq!(root["null"], "nothing");
    }

    #[test]
    fn composite_keys_are_rejected() {
        assert!(parse("? [a, b]\n: value").is_err());
    }

    #[test]
    fn floats_and_tags() {
        let root = parse("ratio: 0.5\ntagged: !custom 7").unwrap();
        assert_eq!(root["ratio"], 0.5);
        assert_eq!(root["tagged"], 7);
    }

    #[test]
    fn mapping_order_is_kept() {
        let root = parse("zeta: 1\nalpha: 2").unwrap();
        let keys: Vec<_> = root.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
    }

    #[test]
    fn invalid_yaml_errors() {
        assert!(parse("key: [unterminated").is_err());
    }
}
