//! Gateway configuration from TOML (`[gateway]` section)

use crate::gateway::GatewaySettings;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw gateway configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGatewayConfig {
    /// Messages endpoint
    pub endpoint: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Upper bound on one call, in seconds
    pub timeout_secs: u64,
    pub max_tokens: u32,
    /// Value of the `anthropic-version` header
    pub api_version: String,
}

impl Default for FileGatewayConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.anthropic.com/v1/messages".to_string(),
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
            timeout_secs: 60,
            max_tokens: 1024,
            api_version: "2023-06-01".to_string(),
        }
    }
}

impl FileGatewayConfig {
    /// The API key from `api_key_env`, if set and non-empty
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }

    pub fn to_settings(&self, api_key: String) -> GatewaySettings {
        GatewaySettings {
            endpoint: self.endpoint.clone(),
            api_key,
            api_version: self.api_version.clone(),
            max_tokens: self.max_tokens,
            // Leave the invoker's own timeout room to fire first
            timeout: Duration::from_secs(self.timeout_secs.saturating_add(5)),
        }
    }
}
