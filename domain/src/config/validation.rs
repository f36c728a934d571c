//! Configuration issues.
//!
//! Loaders check a configuration before the pipeline starts and report
//! structured issues with severity levels. Any [`Severity::Error`] aborts
//! startup; warnings are logged.

use std::fmt;

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the pipeline cannot run with this configuration.
    Error,
    /// Non-fatal: the pipeline runs but may not behave as expected.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// No panel agents configured.
    EmptyPanel,
    /// No investigators configured.
    EmptyEscalation,
    /// Two agents share an id.
    DuplicateAgentId,
    /// An agent has an empty id or model.
    BlankAgent,
    /// A persona name is not recognized.
    UnknownPersona,
    /// An investigator has no persona; it gets the generic prompt.
    MissingPersona,
    /// Panels of fewer than three agents can only be unanimous or split.
    SmallPanel,
    /// `queue.batch_size` is zero.
    ZeroBatchSize,
    /// `gateway.timeout_secs` is zero.
    ZeroTimeout,
    /// `retry.initial_backoff_ms` exceeds `retry.max_backoff_ms`.
    BackoffInverted,
}

/// A detected issue in the configuration.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {}", label, self.message)
    }
}

pub fn has_errors(issues: &[ConfigIssue]) -> bool {
    issues.iter().any(ConfigIssue::is_error)
}
