//! reqwest-backed oracle client
//!
//! Speaks the Messages API: one system prompt, one user turn, text back.
//! Status codes are classified through [`GatewayError::from_status`] so the
//! Agent Invoker can tell retryable failures from permanent ones.

use super::protocol::{ErrorEnvelope, MessagesRequest, MessagesResponse};
use async_trait::async_trait;
use citeguard_application::{AgentGateway, AgentReply, GatewayError, TokenUsage};
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = concat!("citeguard/", env!("CARGO_PKG_VERSION"));

/// Connection settings resolved from the `[gateway]` config section
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub endpoint: String,
    pub api_key: String,
    pub api_version: String,
    pub max_tokens: u32,
    /// Transport-level ceiling; the invoker applies its own per-call timeout
    pub timeout: Duration,
}

/// HTTP implementation of [`AgentGateway`]
pub struct HttpAgentGateway {
    client: reqwest::Client,
    settings: GatewaySettings,
}

impl HttpAgentGateway {
    pub fn new(settings: GatewaySettings) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(settings.timeout)
            .build()
            .map_err(|e| GatewayError::InvalidRequest(e.to_string()))?;
        Ok(Self { client, settings })
    }

    pub fn endpoint(&self) -> &str {
        &self.settings.endpoint
    }
}

/// Map a transport failure onto the gateway taxonomy
fn classify_transport(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout
    } else if e.is_connect() || e.is_request() {
        GatewayError::ConnectionError(e.to_string())
    } else if e.is_builder() {
        GatewayError::InvalidRequest(e.to_string())
    } else {
        GatewayError::ConnectionError(e.to_string())
    }
}

/// Prefer the API's own error message over the raw body
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .ok()
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.trim().chars().take(500).collect())
}

#[async_trait]
impl AgentGateway for HttpAgentGateway {
    async fn complete(
        &self,
        model: &str,
        system_prompt: &str,
        prompt: &str,
    ) -> Result<AgentReply, GatewayError> {
        let request =
            MessagesRequest::new(model, self.settings.max_tokens, system_prompt, prompt);

        debug!(model, endpoint = %self.settings.endpoint, "Sending agent request");
        let response = self
            .client
            .post(&self.settings.endpoint)
            .header("x-api-key", &self.settings.api_key)
            .header("anthropic-version", &self.settings.api_version)
            .json(&request)
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::from_status(status.as_u16(), error_message(&body)));
        }

        let body: MessagesResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::ConnectionError(format!("unreadable response: {}", e)))?;

        Ok(AgentReply::new(
            body.text(),
            TokenUsage::new(body.usage.input_tokens, body.usage.output_tokens),
        ))
    }
}
