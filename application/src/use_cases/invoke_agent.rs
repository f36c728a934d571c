//! Agent Invoker
//!
//! One agent, one citation, one tier: build the prompt, call the oracle with
//! bounded retries, parse the answer. Parse failures never propagate; they
//! degrade to the conservative verdict for the tier and are audited.

use crate::config::RetryPolicy;
use crate::ports::agent_gateway::{AgentGateway, GatewayError, TokenUsage};
use crate::ports::audit_log::{AuditEvent, AuditLogger, NoAuditLog};
use citeguard_domain::{
    AgentSpec, AgentVerdict, Citation, ConsensusResult, InvestigatorReport, PromptTemplate, Tier,
    parse_investigation_response_or_fallback, parse_panel_response_or_fallback,
};
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors from a single agent invocation (after retries)
#[derive(Error, Debug, Clone)]
pub enum InvokeError {
    #[error("Agent {agent} failed: {source}")]
    Permanent {
        agent: String,
        #[source]
        source: GatewayError,
    },

    #[error("Agent {agent} gave up after {attempts} attempts: {source}")]
    Exhausted {
        agent: String,
        attempts: u32,
        #[source]
        source: GatewayError,
    },
}

impl InvokeError {
    pub fn agent(&self) -> &str {
        match self {
            InvokeError::Permanent { agent, .. } | InvokeError::Exhausted { agent, .. } => agent,
        }
    }

    pub fn gateway_error(&self) -> &GatewayError {
        match self {
            InvokeError::Permanent { source, .. } | InvokeError::Exhausted { source, .. } => source,
        }
    }
}

/// A prompt pair for one call
#[derive(Debug, Clone)]
pub struct AgentRequest {
    pub tier: Tier,
    pub system_prompt: String,
    pub prompt: String,
}

impl AgentRequest {
    pub fn panel(citation: &Citation) -> Self {
        Self {
            tier: Tier::Panel,
            system_prompt: PromptTemplate::panel_system().to_string(),
            prompt: PromptTemplate::panel_prompt(citation),
        }
    }

    pub fn investigation(
        agent: &AgentSpec,
        citation: &Citation,
        consensus: &ConsensusResult,
    ) -> Self {
        Self {
            tier: Tier::Investigation,
            system_prompt: PromptTemplate::investigation_system(agent.persona),
            prompt: PromptTemplate::investigation_prompt(citation, consensus),
        }
    }
}

/// Unparsed answer plus accounting
#[derive(Debug, Clone)]
pub struct RawOutput {
    pub agent: String,
    pub model: String,
    pub text: String,
    pub usage: TokenUsage,
    /// Calls made, including the successful one
    pub attempts: u32,
    pub latency: Duration,
}

/// Calls single agents with retry, timeout and parsing
pub struct AgentInvoker<G: AgentGateway + 'static> {
    gateway: Arc<G>,
    retry: RetryPolicy,
    timeout: Duration,
    audit: Arc<dyn AuditLogger>,
}

impl<G: AgentGateway + 'static> AgentInvoker<G> {
    pub fn new(gateway: Arc<G>, retry: RetryPolicy, timeout: Duration) -> Self {
        Self {
            gateway,
            retry,
            timeout,
            audit: Arc::new(NoAuditLog),
        }
    }

    pub fn with_audit(mut self, audit: Arc<dyn AuditLogger>) -> Self {
        self.audit = audit;
        self
    }

    /// Call the oracle, retrying transient failures with backoff.
    ///
    /// Permanent failures (client errors, malformed requests) return on the
    /// first attempt.
    pub async fn invoke(
        &self,
        agent: &AgentSpec,
        request: &AgentRequest,
    ) -> Result<RawOutput, InvokeError> {
        let started = Instant::now();
        let max_attempts = self.retry.max_retries + 1;

        for attempt in 1..=max_attempts {
            let call = self
                .gateway
                .complete(&agent.model, &request.system_prompt, &request.prompt);
            let result = match tokio::time::timeout(self.timeout, call).await {
                Ok(result) => result,
                Err(_) => Err(GatewayError::Timeout),
            };

            match result {
                Ok(reply) => {
                    debug!(
                        agent = %agent.id,
                        tier = %request.tier,
                        attempt,
                        tokens = reply.usage.total(),
                        "Agent responded"
                    );
                    return Ok(RawOutput {
                        agent: agent.id.clone(),
                        model: agent.model.clone(),
                        text: reply.text,
                        usage: reply.usage,
                        attempts: attempt,
                        latency: started.elapsed(),
                    });
                }
                Err(e) if !e.is_transient() => {
                    warn!(agent = %agent.id, error = %e, "Agent call failed permanently");
                    self.record_agent_failure(agent, request.tier, attempt, &e);
                    return Err(InvokeError::Permanent {
                        agent: agent.id.clone(),
                        source: e,
                    });
                }
                Err(e) if attempt == max_attempts => {
                    warn!(agent = %agent.id, attempts = attempt, error = %e, "Agent retries exhausted");
                    self.record_agent_failure(agent, request.tier, attempt, &e);
                    return Err(InvokeError::Exhausted {
                        agent: agent.id.clone(),
                        attempts: attempt,
                        source: e,
                    });
                }
                Err(e) => {
                    let delay = self.retry.delay_for(attempt - 1);
                    debug!(
                        agent = %agent.id,
                        attempt,
                        max_attempts,
                        ?delay,
                        error = %e,
                        "Transient agent failure, backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }

        // max_attempts >= 1, so the loop always returns
        Err(InvokeError::Exhausted {
            agent: agent.id.clone(),
            attempts: max_attempts,
            source: GatewayError::Timeout,
        })
    }

    /// Stage-2 judgment of one citation
    pub async fn judge(
        &self,
        agent: &AgentSpec,
        citation: &Citation,
    ) -> Result<(AgentVerdict, RawOutput), InvokeError> {
        let output = self.invoke(agent, &AgentRequest::panel(citation)).await?;
        let (parsed, error) = parse_panel_response_or_fallback(&output.text);

        let mut verdict = AgentVerdict::new(&agent.id, &agent.model, parsed.judgment)
            .with_reasoning(parsed.reasoning);
        if let Some(code) = parsed.reason_code {
            verdict = verdict.with_reason_code(code);
        }
        if let Some(error) = error {
            self.record_parse_fallback(&output, Tier::Panel, &citation.text, &error.to_string());
            verdict = verdict.as_fallback();
        }
        Ok((verdict, output))
    }

    /// Stage-3 investigation of one escalated citation
    pub async fn investigate(
        &self,
        agent: &AgentSpec,
        citation: &Citation,
        consensus: &ConsensusResult,
    ) -> Result<(InvestigatorReport, RawOutput), InvokeError> {
        let request = AgentRequest::investigation(agent, citation, consensus);
        let output = self.invoke(agent, &request).await?;
        let (parsed, error) = parse_investigation_response_or_fallback(&output.text);

        let mut report = InvestigatorReport::new(&agent.id, &agent.model, parsed.assessment)
            .with_reasoning(parsed.reasoning);
        if let Some(persona) = agent.persona {
            report = report.with_persona(persona);
        }
        if let Some(link) = parsed.source_link {
            report = report.with_source_link(link);
        }
        if let Some(error) = error {
            self.record_parse_fallback(
                &output,
                Tier::Investigation,
                &citation.text,
                &error.to_string(),
            );
            report = report.as_fallback();
        }
        Ok((report, output))
    }

    fn record_agent_failure(&self, agent: &AgentSpec, tier: Tier, attempts: u32, error: &GatewayError) {
        self.audit.log(AuditEvent::new(
            "agent_failed",
            json!({
                "agent": agent.id,
                "model": agent.model,
                "tier": tier.as_str(),
                "attempts": attempts,
                "transient": error.is_transient(),
                "error": error.to_string(),
            }),
        ));
    }

    fn record_parse_fallback(&self, output: &RawOutput, tier: Tier, citation: &str, error: &str) {
        warn!(
            agent = %output.agent,
            tier = %tier,
            error,
            "Unparseable agent answer, using conservative fallback"
        );
        self.audit.log(AuditEvent::new(
            "parse_fallback",
            json!({
                "agent": output.agent,
                "model": output.model,
                "tier": tier.as_str(),
                "citation": citation,
                "error": error,
                "raw": output.text,
            }),
        ));
    }
}
