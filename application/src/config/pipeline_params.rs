//! Pipeline parameters: who sits on each panel and how work is paced.
//!
//! [`PipelineParams`] is the only configuration the use cases see. The
//! infrastructure layer builds it from the merged config file.

use super::retry_policy::RetryPolicy;
use citeguard_domain::AgentSpec;
use std::time::Duration;

/// Use case control parameters.
///
/// | Field | Used by |
/// |-------|---------|
/// | `panel` | Panel Evaluator |
/// | `investigators` | Escalation Investigator |
/// | `retry`, `call_timeout` | Agent Invoker |
/// | `batch_size`, `max_item_retries` | Job Orchestrator |
#[derive(Debug, Clone)]
pub struct PipelineParams {
    /// Stage-2 panel
    pub panel: Vec<AgentSpec>,
    /// Stage-3 investigators
    pub investigators: Vec<AgentSpec>,
    /// Items claimed per batch
    pub batch_size: usize,
    /// Requeues allowed per queue item before its job fails
    pub max_item_retries: u32,
    /// Backoff policy for one agent call
    pub retry: RetryPolicy,
    /// Upper bound on one oracle call
    pub call_timeout: Duration,
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self {
            panel: AgentSpec::default_panel(),
            investigators: AgentSpec::default_investigators(),
            batch_size: 5,
            max_item_retries: 3,
            retry: RetryPolicy::default(),
            call_timeout: Duration::from_secs(60),
        }
    }
}

impl PipelineParams {
    // ==================== Builder Methods ====================

    pub fn with_panel(mut self, panel: Vec<AgentSpec>) -> Self {
        self.panel = panel;
        self
    }

    pub fn with_investigators(mut self, investigators: Vec<AgentSpec>) -> Self {
        self.investigators = investigators;
        self
    }

    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    pub fn with_max_item_retries(mut self, retries: u32) -> Self {
        self.max_item_retries = retries;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }
}
