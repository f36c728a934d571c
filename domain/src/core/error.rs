//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("No agents configured for the panel")]
    NoAgents,

    #[error("Invalid agent spec: {0}")]
    InvalidAgent(String),

    #[error("Unknown value '{value}' for {field}")]
    UnknownValue { field: &'static str, value: String },
}

impl DomainError {
    pub(crate) fn unknown(field: &'static str, value: impl Into<String>) -> Self {
        DomainError::UnknownValue {
            field,
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_value_display() {
        let error = DomainError::unknown("risk_level", "SOMEWHAT_RISKY");
        assert_eq!(
            error.to_string(),
            "Unknown value 'SOMEWHAT_RISKY' for risk_level"
        );
    }
}
