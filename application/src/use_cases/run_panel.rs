//! Panel Evaluator (Stage 2)
//!
//! Fans one citation out to every panel agent concurrently and waits for all
//! of them. Agents that fail after their own retries are recorded as missing
//! verdicts; a panel with missing verdicts is incomplete and must not be
//! scored.

use super::invoke_agent::{AgentInvoker, InvokeError, RawOutput};
use crate::ports::agent_gateway::{AgentGateway, TokenUsage};
use citeguard_domain::{
    AgentSpec, AgentVerdict, Citation, ConsensusError, DomainError, validate_agents,
};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum PanelError {
    #[error("No agents configured")]
    NoAgents,

    #[error("Invalid agents: {0}")]
    InvalidAgents(String),

    #[error("Incomplete panel: {received} of {expected} agents answered ({})", .failures.join("; "))]
    Incomplete {
        expected: usize,
        received: usize,
        failures: Vec<String>,
    },

    #[error("Citation was not escalated")]
    NotEscalated,

    #[error(transparent)]
    Consensus(#[from] ConsensusError),
}

pub(crate) fn check_agents(agents: &[AgentSpec]) -> Result<(), PanelError> {
    validate_agents(agents).map_err(|e| match e {
        DomainError::NoAgents => PanelError::NoAgents,
        other => PanelError::InvalidAgents(other.to_string()),
    })
}

/// An agent that produced nothing
#[derive(Debug, Clone)]
pub struct AgentFailure {
    pub agent: String,
    pub error: String,
}

/// Everything a fan-out produced, complete or not
#[derive(Debug, Clone)]
pub struct PanelOutcome<T> {
    pub expected: usize,
    pub results: Vec<T>,
    pub failures: Vec<AgentFailure>,
    pub usage: TokenUsage,
}

impl<T> PanelOutcome<T> {
    pub fn is_complete(&self) -> bool {
        self.results.len() == self.expected && self.failures.is_empty()
    }

    /// The results, only if every agent answered
    pub fn into_complete(self) -> Result<Vec<T>, PanelError> {
        if self.is_complete() {
            return Ok(self.results);
        }
        Err(PanelError::Incomplete {
            expected: self.expected,
            received: self.results.len(),
            failures: self
                .failures
                .iter()
                .map(|f| format!("{}: {}", f.agent, f.error))
                .collect(),
        })
    }
}

/// Collect a fan-out into an outcome. Join errors count as failures of an
/// unknown agent so the panel still reads as incomplete.
pub(crate) async fn collect_panel<T: Send + 'static>(
    mut join_set: JoinSet<(String, Result<(T, RawOutput), InvokeError>)>,
    expected: usize,
) -> PanelOutcome<T> {
    let mut outcome = PanelOutcome {
        expected,
        results: Vec::with_capacity(expected),
        failures: Vec::new(),
        usage: TokenUsage::default(),
    };

    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok((_, Ok((result, output)))) => {
                outcome.usage += output.usage;
                outcome.results.push(result);
            }
            Ok((agent, Err(e))) => {
                warn!("Agent {} produced no verdict: {}", agent, e);
                outcome.failures.push(AgentFailure {
                    agent,
                    error: e.to_string(),
                });
            }
            Err(e) => {
                warn!("Task join error: {}", e);
                outcome.failures.push(AgentFailure {
                    agent: "<unknown>".to_string(),
                    error: e.to_string(),
                });
            }
        }
    }
    outcome
}

/// Use case for running the Stage-2 panel
pub struct PanelEvaluator<G: AgentGateway + 'static> {
    invoker: Arc<AgentInvoker<G>>,
}

impl<G: AgentGateway + 'static> PanelEvaluator<G> {
    pub fn new(invoker: Arc<AgentInvoker<G>>) -> Self {
        Self { invoker }
    }

    pub async fn evaluate(
        &self,
        citation: &Citation,
        agents: &[AgentSpec],
    ) -> Result<PanelOutcome<AgentVerdict>, PanelError> {
        check_agents(agents)?;
        info!(
            "Stage 2: {} agents evaluating citation {}",
            agents.len(),
            citation.id
        );

        let mut join_set = JoinSet::new();
        for agent in agents {
            let invoker = Arc::clone(&self.invoker);
            let agent = agent.clone();
            let citation = citation.clone();

            join_set.spawn(async move {
                let result = invoker.judge(&agent, &citation).await;
                (agent.id, result)
            });
        }

        Ok(collect_panel(join_set, agents.len()).await)
    }
}
