//! Risk scales

use crate::consensus::Recommendation;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stage-3 severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    LowRisk,
    ModerateRisk,
    NeedsAdditionalReview,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 3] = [
        RiskLevel::LowRisk,
        RiskLevel::ModerateRisk,
        RiskLevel::NeedsAdditionalReview,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::LowRisk => "LOW_RISK",
            RiskLevel::ModerateRisk => "MODERATE_RISK",
            RiskLevel::NeedsAdditionalReview => "NEEDS_ADDITIONAL_REVIEW",
        }
    }

    /// The legacy status this level corresponds to
    pub fn status(&self) -> LegacyStatus {
        match self {
            RiskLevel::LowRisk => LegacyStatus::Valid,
            RiskLevel::ModerateRisk => LegacyStatus::Warn,
            RiskLevel::NeedsAdditionalReview => LegacyStatus::Fail,
        }
    }

    /// Risk implied by a Stage-2 recommendation for citations that never escalated
    pub fn from_recommendation(recommendation: Recommendation) -> Self {
        match recommendation {
            Recommendation::CitationLikelyValid => RiskLevel::LowRisk,
            Recommendation::CitationUncertain => RiskLevel::ModerateRisk,
            Recommendation::CitationLikelyHallucinated => RiskLevel::NeedsAdditionalReview,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "LOW_RISK" | "LOW" => Ok(RiskLevel::LowRisk),
            "MODERATE_RISK" | "MODERATE" | "MEDIUM_RISK" => Ok(RiskLevel::ModerateRisk),
            "NEEDS_ADDITIONAL_REVIEW" | "HIGH_RISK" | "NEEDS_REVIEW" => {
                Ok(RiskLevel::NeedsAdditionalReview)
            }
            _ => Err(DomainError::unknown("risk_level", s.trim())),
        }
    }
}

/// Legacy Stage-3 status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LegacyStatus {
    Valid,
    Warn,
    Fail,
}

impl LegacyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LegacyStatus::Valid => "VALID",
            LegacyStatus::Warn => "WARN",
            LegacyStatus::Fail => "FAIL",
        }
    }

    pub fn risk_level(&self) -> RiskLevel {
        match self {
            LegacyStatus::Valid => RiskLevel::LowRisk,
            LegacyStatus::Warn => RiskLevel::ModerateRisk,
            LegacyStatus::Fail => RiskLevel::NeedsAdditionalReview,
        }
    }
}

impl fmt::Display for LegacyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LegacyStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "VALID" | "PASS" => Ok(LegacyStatus::Valid),
            "WARN" | "WARNING" => Ok(LegacyStatus::Warn),
            "FAIL" | "INVALID" => Ok(LegacyStatus::Fail),
            other => Err(DomainError::unknown("status", other)),
        }
    }
}

/// Legacy confidence label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegacyConfidence {
    High,
    Medium,
    Low,
}

impl LegacyConfidence {
    pub fn score(&self) -> f64 {
        match self {
            LegacyConfidence::High => 0.9,
            LegacyConfidence::Medium => 0.6,
            LegacyConfidence::Low => 0.3,
        }
    }

    pub fn from_score(score: f64) -> Self {
        if score >= 0.75 {
            LegacyConfidence::High
        } else if score >= 0.45 {
            LegacyConfidence::Medium
        } else {
            LegacyConfidence::Low
        }
    }
}

impl FromStr for LegacyConfidence {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" => Ok(LegacyConfidence::High),
            "medium" | "moderate" => Ok(LegacyConfidence::Medium),
            "low" => Ok(LegacyConfidence::Low),
            other => Err(DomainError::unknown("confidence", other)),
        }
    }
}
