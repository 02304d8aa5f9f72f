use serde_json::{Number, Value};

use crate::error::TreeError;

/// Load TOML into a tree root. Datetimes become their RFC 3339 text.
pub fn parse(input: &str) -> Result<Value, TreeError> {
    let document: toml::Table = toml::from_str(input).map_err(|e| TreeError::Parse(e.to_string()))?;
    Ok(into_node(toml::Value::Table(document)))
}

fn into_node(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::from(i),
        toml::Value::Float(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(into_node).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(key, value)| (key, into_node(value)))
                .collect(),
        ),
    }
}
