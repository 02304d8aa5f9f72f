use serde_json::Value;

use crate::error::TreeError;

pub fn parse(input: &str) -> Result<Value, TreeError> {
    serde_json::from_str(input).map_err(|e| TreeError::Parse(e.to_string()))
}
