//! Configuration file loading for citeguard
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `--config <path>` specified file
//! 2. `CITEGUARD_*` environment variables (`CITEGUARD_QUEUE__BATCH_SIZE=10`)
//! 3. Project root: `./citeguard.toml` or `./.citeguard.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/citeguard/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileAgentEntry, FileConfig, FileEscalationConfig, FileGatewayConfig,
    FileLoggingConfig, FileOutputConfig, FilePanelConfig, FileQueueConfig, FileRetryConfig,
};
pub use loader::ConfigLoader;
