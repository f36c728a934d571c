//! Stage-3 value objects

use super::risk::{LegacyConfidence, LegacyStatus, RiskLevel};
use crate::agent::InvestigatorPersona;
use crate::consensus::AgreementLevel;
use crate::core::time::now_millis;
use serde::{Deserialize, Serialize};

/// An investigator's (or the resolved) risk call, in either format.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum Assessment {
    Current {
        risk_level: RiskLevel,
        confidence_score: f64,
    },
    Legacy {
        verdict: LegacyStatus,
        confidence: LegacyConfidence,
    },
}

impl Assessment {
    pub fn current(risk_level: RiskLevel, confidence_score: f64) -> Self {
        Assessment::Current {
            risk_level,
            confidence_score: confidence_score.clamp(0.0, 1.0),
        }
    }

    pub fn legacy(verdict: LegacyStatus, confidence: LegacyConfidence) -> Self {
        Assessment::Legacy {
            verdict,
            confidence,
        }
    }

    pub fn risk_level(&self) -> RiskLevel {
        match self {
            Assessment::Current { risk_level, .. } => *risk_level,
            Assessment::Legacy { verdict, .. } => verdict.risk_level(),
        }
    }

    pub fn status(&self) -> LegacyStatus {
        self.risk_level().status()
    }

    pub fn confidence_score(&self) -> f64 {
        match self {
            Assessment::Current {
                confidence_score, ..
            } => *confidence_score,
            Assessment::Legacy { confidence, .. } => confidence.score(),
        }
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, Assessment::Legacy { .. })
    }
}

/// One investigator's Stage-3 finding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestigatorReport {
    pub agent: String,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona: Option<InvestigatorPersona>,
    pub assessment: Assessment,
    #[serde(default)]
    pub reasoning: String,
    /// Located source for case citations, when found
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_link: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub parse_fallback: bool,
    pub timestamp: u64,
}

impl InvestigatorReport {
    pub fn new(agent: impl Into<String>, model: impl Into<String>, assessment: Assessment) -> Self {
        Self {
            agent: agent.into(),
            model: model.into(),
            persona: None,
            assessment,
            reasoning: String::new(),
            source_link: None,
            parse_fallback: false,
            timestamp: now_millis(),
        }
    }

    /// Shorthand for tests and fixtures: current-format report at the given level
    pub fn at_level(agent: impl Into<String>, level: RiskLevel) -> Self {
        let agent = agent.into();
        Self::new(agent.clone(), agent, Assessment::current(level, 0.8))
    }

    pub fn with_persona(mut self, persona: InvestigatorPersona) -> Self {
        self.persona = Some(persona);
        self
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = reasoning.into();
        self
    }

    pub fn with_source_link(mut self, link: impl Into<String>) -> Self {
        self.source_link = Some(link.into());
        self
    }

    pub fn as_fallback(mut self) -> Self {
        self.parse_fallback = true;
        self
    }

    pub fn risk_level(&self) -> RiskLevel {
        self.assessment.risk_level()
    }
}

/// Resolved Stage-3 outcome for one citation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tier3Result {
    /// Reports sorted by agent id
    pub reports: Vec<InvestigatorReport>,
    pub agreement_level: AgreementLevel,
    /// Resolved call, in legacy shape only when every report was legacy
    pub final_assessment: Assessment,
    pub resolved_at: u64,
}

impl Tier3Result {
    pub fn final_risk_level(&self) -> RiskLevel {
        self.final_assessment.risk_level()
    }

    pub fn final_status(&self) -> LegacyStatus {
        self.final_assessment.status()
    }

    /// First source link any investigator located
    pub fn source_link(&self) -> Option<&str> {
        self.reports.iter().find_map(|r| r.source_link.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors_normalize_both_shapes() {
        let current = Assessment::current(RiskLevel::ModerateRisk, 0.7);
        let legacy = Assessment::legacy(LegacyStatus::Warn, LegacyConfidence::Medium);

        assert_eq!(current.risk_level(), legacy.risk_level());
        assert_eq!(current.status(), LegacyStatus::Warn);
        assert_eq!(legacy.confidence_score(), 0.6);
        assert!(legacy.is_legacy());
        assert!(!current.is_legacy());
    }

    #[test]
    fn test_assessment_serde_shapes() {
        let legacy: Assessment = serde_json::from_value(serde_json::json!({
            "format": "legacy",
            "verdict": "FAIL",
            "confidence": "high"
        }))
        .unwrap();
        assert_eq!(legacy.risk_level(), RiskLevel::NeedsAdditionalReview);

        let current: Assessment = serde_json::from_value(serde_json::json!({
            "format": "current",
            "risk_level": "LOW_RISK",
            "confidence_score": 0.85
        }))
        .unwrap();
        assert_eq!(current.status(), LegacyStatus::Valid);
    }

    #[test]
    fn test_confidence_is_clamped() {
        assert_eq!(
            Assessment::current(RiskLevel::LowRisk, 3.0).confidence_score(),
            1.0
        );
    }
}
