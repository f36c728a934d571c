//! Queue and retry configuration from TOML (`[queue]` and `[retry]` sections)

use citeguard_application::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw queue configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileQueueConfig {
    /// Items claimed per batch
    pub batch_size: usize,
    /// Requeues per item before its job fails
    pub max_item_retries: u32,
}

impl Default for FileQueueConfig {
    fn default() -> Self {
        Self {
            batch_size: 5,
            max_item_retries: 3,
        }
    }
}

/// Raw retry configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRetryConfig {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub jitter: bool,
}

impl Default for FileRetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 1_000,
            max_backoff_ms: 30_000,
            jitter: true,
        }
    }
}

impl FileRetryConfig {
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.max_backoff_ms),
            jitter: self.jitter,
        }
    }
}
