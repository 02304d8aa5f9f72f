pub mod json;
#[cfg(feature = "toml")]
pub mod toml;
#[cfg(feature = "yaml")]
pub mod yaml;

use serde_json::Value;

use crate::error::TreeError;
use crate::format::Format;

/// Parse input text into a tree root based on format.
pub fn parse(input: &str, format: Format) -> Result<Value, TreeError> {
    match format {
        Format::Json => json::parse(input),
        #[cfg(feature = "yaml")]
        Format::Yaml => yaml::parse(input),
        #[cfg(feature = "toml")]
        Format::Toml => toml::parse(input),
        #[allow(unreachable_patterns)]
        other => Err(TreeError::UnsupportedFormat(other.to_string())),
    }
}
