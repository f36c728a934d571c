//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod agents;
mod gateway;
mod logging;
mod output;
mod queue;

pub use agents::{FileAgentEntry, FileEscalationConfig, FilePanelConfig};
pub use gateway::FileGatewayConfig;
pub use logging::FileLoggingConfig;
pub use output::FileOutputConfig;
pub use queue::{FileQueueConfig, FileRetryConfig};

use citeguard_application::PipelineParams;
use citeguard_domain::{ConfigIssue, ConfigIssueCode, has_errors};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Configuration that cannot run
#[derive(Error, Debug)]
#[error("invalid configuration:\n{}", .issues.iter().map(|i| format!("  {}", i)).collect::<Vec<_>>().join("\n"))]
pub struct ConfigValidationError {
    pub issues: Vec<ConfigIssue>,
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Stage-2 panel
    pub panel: FilePanelConfig,
    /// Stage-3 investigators
    pub escalation: FileEscalationConfig,
    /// Batch size and item retry budget
    pub queue: FileQueueConfig,
    /// Backoff for single agent calls
    pub retry: FileRetryConfig,
    /// Oracle endpoint
    pub gateway: FileGatewayConfig,
    /// Audit trail
    pub logging: FileLoggingConfig,
    /// Output settings
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// This is the single entry point for config validation. It checks:
    /// 1. Panel and investigator membership (empty, blank, duplicate, persona)
    /// 2. Queue pacing (batch size)
    /// 3. Gateway and retry timing
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        // 1. Agents
        issues.extend(self.panel.parse().1);
        issues.extend(self.escalation.parse().1);

        // 2. Queue
        if self.queue.batch_size == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroBatchSize,
                "queue.batch_size must be at least 1",
            ));
        }

        // 3. Timing
        if self.gateway.timeout_secs == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroTimeout,
                "gateway.timeout_secs cannot be 0",
            ));
        }
        if self.retry.initial_backoff_ms > self.retry.max_backoff_ms {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::BackoffInverted,
                format!(
                    "retry.initial_backoff_ms ({}) exceeds retry.max_backoff_ms ({}); every wait is capped",
                    self.retry.initial_backoff_ms, self.retry.max_backoff_ms
                ),
            ));
        }

        issues
    }

    /// Validate and build the parameters the use cases run with.
    ///
    /// Warnings are returned alongside; any error rejects the configuration.
    pub fn to_pipeline_params(
        &self,
    ) -> Result<(PipelineParams, Vec<ConfigIssue>), ConfigValidationError> {
        let issues = self.validate();
        if has_errors(&issues) {
            return Err(ConfigValidationError { issues });
        }

        let params = PipelineParams::default()
            .with_panel(self.panel.parse().0)
            .with_investigators(self.escalation.parse().0)
            .with_batch_size(self.queue.batch_size)
            .with_max_item_retries(self.queue.max_item_retries)
            .with_retry(self.retry.to_policy())
            .with_call_timeout(Duration::from_secs(self.gateway.timeout_secs));
        Ok((params, issues))
    }
}
