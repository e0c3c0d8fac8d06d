use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse engine config: {0}")]
    Parse(#[source] serde_json::Error),
}

/// Options applied when turning a submission into its cleaned form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    /// Drop attachment-backed values and content-element flags, as used for
    /// lightweight payloads such as draft duplicate checks.
    #[serde(default)]
    pub strip_binary_data: bool,
}

impl EngineConfig {
    /// Parses a JSON config; blank input yields the defaults.
    pub fn from_json_str(config_json: &str) -> Result<Self, ConfigError> {
        if config_json.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(config_json).map_err(ConfigError::Parse)
    }
}
