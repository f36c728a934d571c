//! Verdict value objects

use super::reason::ReasonCode;
use crate::core::error::DomainError;
use crate::core::time::now_millis;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Categorical verdict (legacy panel format)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Valid,
    Invalid,
    Uncertain,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Valid => "VALID",
            Verdict::Invalid => "INVALID",
            Verdict::Uncertain => "UNCERTAIN",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verdict {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "VALID" => Ok(Verdict::Valid),
            "INVALID" => Ok(Verdict::Invalid),
            "UNCERTAIN" => Ok(Verdict::Uncertain),
            other => Err(DomainError::unknown("verdict", other)),
        }
    }
}

/// Score bucket for numeric panels: high (>= 8), medium (5-7), low (< 5)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    Low,
    Medium,
    High,
}

impl ScoreBand {
    pub fn of(score: u8) -> Self {
        match score {
            8..=u8::MAX => ScoreBand::High,
            5..=7 => ScoreBand::Medium,
            _ => ScoreBand::Low,
        }
    }
}

/// Which way a judgment leans, independent of format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Authentic,
    Unsure,
    Fabricated,
}

/// An agent's judgment in either historical format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(
    tag = "format",
    content = "value",
    rename_all = "snake_case",
    try_from = "StoredJudgment"
)]
pub enum Judgment {
    /// Current format: 1-10 authenticity score
    Score(u8),
    /// Legacy format: categorical label
    Categorical(Verdict),
}

/// Wire shape of [`Judgment`] before the score range is checked
#[derive(Deserialize)]
#[serde(tag = "format", content = "value", rename_all = "snake_case")]
enum StoredJudgment {
    Score(u8),
    Categorical(Verdict),
}

impl TryFrom<StoredJudgment> for Judgment {
    type Error = String;

    fn try_from(stored: StoredJudgment) -> Result<Self, Self::Error> {
        match stored {
            StoredJudgment::Score(s @ 1..=10) => Ok(Judgment::Score(s)),
            StoredJudgment::Score(s) => Err(format!("score {} outside 1..=10", s)),
            StoredJudgment::Categorical(v) => Ok(Judgment::Categorical(v)),
        }
    }
}

impl Judgment {
    /// Build a score judgment, clamping into 1..=10
    pub fn score(score: u8) -> Self {
        Judgment::Score(score.clamp(1, 10))
    }

    pub fn as_score(&self) -> Option<u8> {
        match self {
            Judgment::Score(s) => Some(*s),
            Judgment::Categorical(_) => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Judgment::Score(_))
    }

    /// Normalizing accessor: score band or label mapped to a direction.
    pub fn direction(&self) -> Direction {
        match self {
            Judgment::Score(s) => match ScoreBand::of(*s) {
                ScoreBand::High => Direction::Authentic,
                ScoreBand::Medium => Direction::Unsure,
                ScoreBand::Low => Direction::Fabricated,
            },
            Judgment::Categorical(Verdict::Valid) => Direction::Authentic,
            Judgment::Categorical(Verdict::Uncertain) => Direction::Unsure,
            Judgment::Categorical(Verdict::Invalid) => Direction::Fabricated,
        }
    }

    /// Normalizing accessor: the categorical verdict this judgment amounts to.
    pub fn verdict(&self) -> Verdict {
        match self.direction() {
            Direction::Authentic => Verdict::Valid,
            Direction::Unsure => Verdict::Uncertain,
            Direction::Fabricated => Verdict::Invalid,
        }
    }

    /// Low score or INVALID
    pub fn is_negative(&self) -> bool {
        self.direction() == Direction::Fabricated
    }

    /// Comparable token used by consistency statistics ("9", "INVALID", ...)
    pub fn token(&self) -> String {
        match self {
            Judgment::Score(s) => s.to_string(),
            Judgment::Categorical(v) => v.as_str().to_string(),
        }
    }
}

impl fmt::Display for Judgment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Judgment::Score(s) => write!(f, "{}/10", s),
            Judgment::Categorical(v) => write!(f, "{}", v),
        }
    }
}

/// One agent's judgment of one citation at one tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentVerdict {
    /// Agent identity (from [`AgentSpec::id`](crate::agent::AgentSpec))
    pub agent: String,
    /// Model that produced the answer
    pub model: String,
    pub judgment: Judgment,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason_code: Option<ReasonCode>,
    #[serde(default)]
    pub reasoning: String,
    /// Set when the answer could not be parsed and the verdict is the fallback
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub parse_fallback: bool,
    /// Milliseconds since epoch
    pub timestamp: u64,
}

impl AgentVerdict {
    pub fn new(agent: impl Into<String>, model: impl Into<String>, judgment: Judgment) -> Self {
        Self {
            agent: agent.into(),
            model: model.into(),
            judgment,
            reason_code: None,
            reasoning: String::new(),
            parse_fallback: false,
            timestamp: now_millis(),
        }
    }

    pub fn scored(agent: impl Into<String>, score: u8) -> Self {
        let agent = agent.into();
        Self::new(agent.clone(), agent, Judgment::score(score))
    }

    pub fn labelled(agent: impl Into<String>, verdict: Verdict) -> Self {
        let agent = agent.into();
        Self::new(agent.clone(), agent, Judgment::Categorical(verdict))
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = reasoning.into();
        self
    }

    pub fn with_reason_code(mut self, code: ReasonCode) -> Self {
        self.reason_code = Some(code);
        self
    }

    pub fn as_fallback(mut self) -> Self {
        self.parse_fallback = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_bands() {
        assert_eq!(ScoreBand::of(10), ScoreBand::High);
        assert_eq!(ScoreBand::of(8), ScoreBand::High);
        assert_eq!(ScoreBand::of(7), ScoreBand::Medium);
        assert_eq!(ScoreBand::of(5), ScoreBand::Medium);
        assert_eq!(ScoreBand::of(4), ScoreBand::Low);
        assert_eq!(ScoreBand::of(1), ScoreBand::Low);
    }

    #[test]
    fn test_score_is_clamped() {
        assert_eq!(Judgment::score(0), Judgment::Score(1));
        assert_eq!(Judgment::score(42), Judgment::Score(10));
    }

    #[test]
    fn test_direction_normalizes_both_formats() {
        assert_eq!(Judgment::Score(9).direction(), Direction::Authentic);
        assert_eq!(
            Judgment::Categorical(Verdict::Valid).direction(),
            Direction::Authentic
        );
        assert_eq!(Judgment::Score(6).verdict(), Verdict::Uncertain);
        assert_eq!(Judgment::Score(2).verdict(), Verdict::Invalid);
        assert!(Judgment::Categorical(Verdict::Invalid).is_negative());
        assert!(!Judgment::Score(5).is_negative());
    }

    #[test]
    fn test_judgment_serde_is_tagged() {
        let json = serde_json::to_value(Judgment::Score(7)).unwrap();
        assert_eq!(json, serde_json::json!({"format": "score", "value": 7}));

        let legacy: Judgment =
            serde_json::from_value(serde_json::json!({"format": "categorical", "value": "INVALID"}))
                .unwrap();
        assert_eq!(legacy, Judgment::Categorical(Verdict::Invalid));
    }

    #[test]
    fn test_stored_score_out_of_range_is_rejected() {
        for bad in [0, 11, 255] {
            let result: Result<Judgment, _> =
                serde_json::from_value(serde_json::json!({"format": "score", "value": bad}));
            assert!(result.is_err(), "score {} accepted", bad);
        }
        let edge: Judgment =
            serde_json::from_value(serde_json::json!({"format": "score", "value": 10})).unwrap();
        assert_eq!(edge, Judgment::Score(10));
    }

    #[test]
    fn test_tokens() {
        assert_eq!(Judgment::Score(9).token(), "9");
        assert_eq!(Judgment::Categorical(Verdict::Uncertain).token(), "UNCERTAIN");
    }
}
