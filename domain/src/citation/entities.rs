//! Citation entity

use crate::consensus::ConsensusResult;
use crate::core::ids::CitationId;
use crate::escalation::{RiskLevel, Tier3Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CitationKind {
    #[default]
    Case,
    Statute,
    Regulation,
    Other,
}

impl CitationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CitationKind::Case => "case",
            CitationKind::Statute => "statute",
            CitationKind::Regulation => "regulation",
            CitationKind::Other => "other",
        }
    }
}

/// Structural components extracted upstream. All optional: statutes have no
/// reporter, some cases have no pin cite.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CitationComponents {
    pub case_name: Option<String>,
    pub volume: Option<String>,
    pub reporter: Option<String>,
    pub page: Option<String>,
    pub pin_cite: Option<String>,
    pub court: Option<String>,
    pub year: Option<String>,
    pub title: Option<String>,
    pub section: Option<String>,
}

impl CitationComponents {
    /// `key: value` lines for the populated components
    pub fn describe(&self) -> Vec<(&'static str, &str)> {
        [
            ("case name", &self.case_name),
            ("volume", &self.volume),
            ("reporter", &self.reporter),
            ("page", &self.page),
            ("pin cite", &self.pin_cite),
            ("court", &self.court),
            ("year", &self.year),
            ("title", &self.title),
            ("section", &self.section),
        ]
        .into_iter()
        .filter_map(|(k, v)| v.as_deref().map(|v| (k, v)))
        .collect()
    }
}

/// Tier-1 format check, produced by the upstream extractor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatCheck {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<String>,
}

impl Default for FormatCheck {
    fn default() -> Self {
        Self {
            valid: true,
            issues: Vec::new(),
        }
    }
}

/// A citation and its three result slots.
///
/// `tier1` comes from upstream; `tier2` and `tier3` are written only by the
/// pipeline stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub id: CitationId,
    pub text: String,
    #[serde(default)]
    pub kind: CitationKind,
    #[serde(default)]
    pub components: CitationComponents,
    /// Surrounding document text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default)]
    pub tier1: FormatCheck,
    #[serde(default, rename = "validation", skip_serializing_if = "Option::is_none")]
    pub tier2: Option<ConsensusResult>,
    #[serde(default, rename = "tier_3", skip_serializing_if = "Option::is_none")]
    pub tier3: Option<Tier3Result>,
}

impl Citation {
    pub fn new(id: impl Into<CitationId>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            kind: CitationKind::default(),
            components: CitationComponents::default(),
            context: None,
            tier1: FormatCheck::default(),
            tier2: None,
            tier3: None,
        }
    }

    pub fn with_kind(mut self, kind: CitationKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_components(mut self, components: CitationComponents) -> Self {
        self.components = components;
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Whether Stage 2 asked for an investigation
    pub fn is_escalated(&self) -> bool {
        self.tier2.as_ref().is_some_and(|c| c.escalation_trigger)
    }

    /// Whether every stage this citation needs has written its result
    pub fn is_resolved(&self) -> bool {
        match &self.tier2 {
            None => false,
            Some(c) if c.escalation_trigger => self.tier3.is_some(),
            Some(_) => true,
        }
    }

    /// Stage-3 call when escalated, otherwise the risk implied by Stage 2
    pub fn effective_risk_level(&self) -> Option<RiskLevel> {
        if let Some(t3) = &self.tier3 {
            return Some(t3.final_risk_level());
        }
        self.tier2
            .as_ref()
            .map(|c| RiskLevel::from_recommendation(c.recommendation))
    }

    /// Key used to match the same citation across independent runs
    pub fn match_key(&self) -> String {
        normalize_text(&self.text)
    }
}

/// Lowercase, collapse whitespace, drop trailing punctuation
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end_matches(['.', ',', ';'])
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consensus::ConsensusCalculator;
    use crate::escalation::{FinalStatusResolver, InvestigatorReport};
    use crate::verdict::AgentVerdict;

    fn consensus(scores: &[u8]) -> ConsensusResult {
        let verdicts = scores
            .iter()
            .enumerate()
            .map(|(i, s)| AgentVerdict::scored(format!("a{}", i), *s))
            .collect();
        ConsensusCalculator::new(scores.len())
            .calculate(verdicts)
            .unwrap()
    }

    #[test]
    fn test_resolution_state() {
        let mut citation = Citation::new("c1", "Brown v. Board of Education, 347 U.S. 483 (1954)");
        assert!(!citation.is_resolved());
        assert_eq!(citation.effective_risk_level(), None);

        citation.tier2 = Some(consensus(&[9, 9, 9, 9, 9]));
        assert!(citation.is_resolved());
        assert_eq!(citation.effective_risk_level(), Some(RiskLevel::LowRisk));

        citation.tier2 = Some(consensus(&[9, 2, 8, 9, 3]));
        assert!(citation.is_escalated());
        assert!(!citation.is_resolved());

        let reports = vec![
            InvestigatorReport::at_level("x", RiskLevel::NeedsAdditionalReview),
            InvestigatorReport::at_level("y", RiskLevel::NeedsAdditionalReview),
            InvestigatorReport::at_level("z", RiskLevel::LowRisk),
        ];
        citation.tier3 = Some(FinalStatusResolver::new(3).resolve(reports).unwrap());
        assert!(citation.is_resolved());
        assert_eq!(
            citation.effective_risk_level(),
            Some(RiskLevel::NeedsAdditionalReview)
        );
    }

    #[test]
    fn test_match_key_normalizes() {
        let a = Citation::new("1", "Roe v.  Wade, 410 U.S. 113 (1973).");
        let b = Citation::new("2", "roe v. wade, 410 u.s. 113 (1973)");
        assert_eq!(a.match_key(), b.match_key());
    }

    #[test]
    fn test_result_slots_use_document_field_names() {
        let mut citation = Citation::new("c1", "42 U.S.C. § 1983").with_kind(CitationKind::Statute);
        citation.tier2 = Some(consensus(&[8, 8, 8]));
        let json = serde_json::to_value(&citation).unwrap();
        assert!(json.get("validation").is_some());
        assert!(json.get("tier_3").is_none());
        assert_eq!(json["kind"], "statute");
    }

    #[test]
    fn test_describe_components() {
        let components = CitationComponents {
            volume: Some("347".into()),
            reporter: Some("U.S.".into()),
            page: Some("483".into()),
            ..Default::default()
        };
        assert_eq!(
            components.describe(),
            vec![("volume", "347"), ("reporter", "U.S."), ("page", "483")]
        );
    }
}
