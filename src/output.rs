use serde_json::Value;

use crate::error::TreeError;
use crate::format::Format;

/// Render a tree root in the given format.
///
/// `compact` only affects JSON; YAML and TOML have a single layout.
pub fn format_value(value: &Value, format: Format, compact: bool) -> Result<String, TreeError> {
    match format {
        Format::Json => {
            let result = if compact {
                serde_json::to_string(value)
            } else {
                serde_json::to_string_pretty(value)
            };
            result.map_err(|e| TreeError::Render(e.to_string()))
        }
        #[cfg(feature = "yaml")]
        Format::Yaml => serde_yaml::to_string(value).map_err(|e| TreeError::Render(e.to_string())),
        #[cfg(feature = "toml")]
        Format::Toml => {
            // TOML has no null and needs a table at the top.
            if !value.is_object() {
                return Err(TreeError::Render(
                    "TOML output needs an object at the root".into(),
                ));
            }
            toml::to_string(value).map_err(|e| TreeError::Render(e.to_string()))
        }
        #[allow(unreachable_patterns)]
        other => Err(TreeError::UnsupportedFormat(other.to_string())),
    }
}
