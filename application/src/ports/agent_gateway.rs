//! Agent gateway port
//!
//! Defines the interface for calling an external judgment oracle.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};
use thiserror::Error;

/// Errors that can occur during a gateway call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    #[error("Timeout")]
    Timeout,

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Client error ({status}): {message}")]
    ClientError { status: u16, message: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl GatewayError {
    /// Classify an HTTP status code. 429 and 5xx are worth retrying.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            429 => GatewayError::RateLimited(message),
            500..=599 => GatewayError::ServerError { status, message },
            _ => GatewayError::ClientError { status, message },
        }
    }

    /// Whether a retry might succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            GatewayError::RateLimited(_)
                | GatewayError::ServerError { .. }
                | GatewayError::Timeout
                | GatewayError::ConnectionError(_)
        )
    }
}

/// Token accounting for one or more calls
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    pub fn new(input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }

    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

impl Add for TokenUsage {
    type Output = TokenUsage;

    fn add(self, rhs: TokenUsage) -> TokenUsage {
        TokenUsage::new(
            self.input_tokens + rhs.input_tokens,
            self.output_tokens + rhs.output_tokens,
        )
    }
}

impl AddAssign for TokenUsage {
    fn add_assign(&mut self, rhs: TokenUsage) {
        *self = *self + rhs;
    }
}

impl std::iter::Sum for TokenUsage {
    fn sum<I: Iterator<Item = TokenUsage>>(iter: I) -> Self {
        iter.fold(TokenUsage::default(), Add::add)
    }
}

/// One completed oracle call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentReply {
    pub text: String,
    pub usage: TokenUsage,
}

impl AgentReply {
    pub fn new(text: impl Into<String>, usage: TokenUsage) -> Self {
        Self {
            text: text.into(),
            usage,
        }
    }
}

/// Gateway to the judgment oracle
///
/// This port defines how the application layer reaches evaluation agents.
/// Implementations (adapters) live in the infrastructure layer. A call is a
/// single attempt; retries belong to the caller.
#[async_trait]
pub trait AgentGateway: Send + Sync {
    /// Send one prompt to `model` and return its raw answer
    async fn complete(
        &self,
        model: &str,
        system_prompt: &str,
        prompt: &str,
    ) -> Result<AgentReply, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(GatewayError::from_status(429, "slow down").is_transient());
        assert!(GatewayError::from_status(503, "unavailable").is_transient());
        assert!(!GatewayError::from_status(400, "bad request").is_transient());
        assert!(!GatewayError::from_status(401, "unauthorized").is_transient());
        assert!(GatewayError::Timeout.is_transient());
        assert!(!GatewayError::InvalidRequest("empty prompt".into()).is_transient());
    }

    #[test]
    fn test_usage_sums() {
        let total: TokenUsage = [TokenUsage::new(10, 2), TokenUsage::new(5, 1)]
            .into_iter()
            .sum();
        assert_eq!(total, TokenUsage::new(15, 3));
        assert_eq!(total.total(), 18);
    }
}
