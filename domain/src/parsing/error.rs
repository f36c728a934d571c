//! Parse errors

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Which parser layer produced (or failed to produce) a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseLayer {
    Json,
    Regex,
    Keyword,
    /// Nothing matched; the conservative default was substituted
    Fallback,
}

impl fmt::Display for ParseLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ParseLayer::Json => "json",
            ParseLayer::Regex => "regex",
            ParseLayer::Keyword => "keyword",
            ParseLayer::Fallback => "fallback",
        })
    }
}

/// Why one layer passed on a response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerMiss {
    pub layer: ParseLayer,
    pub reason: String,
}

impl LayerMiss {
    pub fn new(layer: ParseLayer, reason: impl Into<String>) -> Self {
        Self {
            layer,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for LayerMiss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.layer, self.reason)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Empty response")]
    Empty,

    #[error("Unrecognized response ({})", .0.iter().map(|m| m.to_string()).collect::<Vec<_>>().join("; "))]
    Unrecognized(Vec<LayerMiss>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unrecognized_lists_every_layer() {
        let err = ParseError::Unrecognized(vec![
            LayerMiss::new(ParseLayer::Json, "no object"),
            LayerMiss::new(ParseLayer::Regex, "no SCORE line"),
        ]);
        assert_eq!(
            err.to_string(),
            "Unrecognized response (json: no object; regex: no SCORE line)"
        );
    }
}
