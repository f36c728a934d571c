//! Stage-2 result value objects

use super::agreement::AgreementLevel;
use crate::verdict::{AgentVerdict, Direction, ScoreBand};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which answer format the panel used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelFormat {
    /// Every verdict is a 1-10 score
    Numeric,
    /// At least one verdict is a label; scores are bucketed into labels
    Categorical,
}

/// Final Stage-2 recommendation label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    CitationLikelyValid,
    CitationUncertain,
    CitationLikelyHallucinated,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::CitationLikelyValid => "CITATION_LIKELY_VALID",
            Recommendation::CitationUncertain => "CITATION_UNCERTAIN",
            Recommendation::CitationLikelyHallucinated => "CITATION_LIKELY_HALLUCINATED",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Consensus over one citation's Stage-2 panel.
///
/// Immutable once computed: a re-run produces a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusResult {
    /// Verdicts sorted by agent id
    pub verdicts: Vec<AgentVerdict>,
    pub panel_format: PanelFormat,
    pub agreement_level: AgreementLevel,
    /// 0.0 (no confidence) to 1.0
    pub confidence_score: f64,
    pub escalation_trigger: bool,
    pub recommendation: Recommendation,
    /// Mean score for numeric panels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean_score: Option<f64>,
    /// Milliseconds since epoch
    pub computed_at: u64,
}

impl ConsensusResult {
    pub fn panel_size(&self) -> usize {
        self.verdicts.len()
    }

    pub fn is_escalated(&self) -> bool {
        self.escalation_trigger
    }

    /// Count of verdicts leaning each way
    pub fn direction_counts(&self) -> (usize, usize, usize) {
        self.verdicts
            .iter()
            .fold((0, 0, 0), |(a, u, f), v| match v.judgment.direction() {
                Direction::Authentic => (a + 1, u, f),
                Direction::Unsure => (a, u + 1, f),
                Direction::Fabricated => (a, u, f + 1),
            })
    }

    /// Visual summary, one glyph per verdict: `+` authentic, `?` unsure, `-` fabricated
    pub fn vote_summary(&self) -> String {
        let mut summary = String::from("[");
        for verdict in &self.verdicts {
            summary.push(match verdict.judgment.direction() {
                Direction::Authentic => '+',
                Direction::Unsure => '?',
                Direction::Fabricated => '-',
            });
        }
        summary.push(']');
        summary
    }

    /// Human readable breakdown handed to Stage-3 investigators
    pub fn disagreement_summary(&self) -> String {
        let (authentic, unsure, fabricated) = self.direction_counts();
        let mut out = format!(
            "Panel agreement: {} ({} authentic, {} uncertain, {} fabricated; confidence {:.2})\n",
            self.agreement_level, authentic, unsure, fabricated, self.confidence_score
        );
        for verdict in &self.verdicts {
            let band = verdict
                .judgment
                .as_score()
                .map(|s| format!(" [{:?}]", ScoreBand::of(s)).to_lowercase())
                .unwrap_or_default();
            out.push_str(&format!("- {}: {}{}", verdict.agent, verdict.judgment, band));
            if let Some(code) = verdict.reason_code {
                out.push_str(&format!(" ({})", code));
            }
            if !verdict.reasoning.is_empty() {
                out.push_str(&format!(": {}", verdict.reasoning.trim()));
            }
            out.push('\n');
        }
        out
    }
}
