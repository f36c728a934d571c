//! Consensus Calculator

use super::agreement::{AgreementLevel, classify_agreement};
use super::result::{ConsensusResult, PanelFormat, Recommendation};
use crate::core::time::now_millis;
use crate::verdict::{AgentVerdict, Direction, ScoreBand, Verdict};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

/// Population standard deviation of the widest possible 1-10 panel (five 1s
/// and five 10s), used to scale dispersion into a confidence score.
const MAX_SCORE_STDDEV: f64 = 4.5;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsensusError {
    #[error("Cannot compute consensus over an empty panel")]
    EmptyPanel,

    #[error("Incomplete panel: expected {expected} verdicts, got {actual}")]
    IncompletePanel { expected: usize, actual: usize },

    #[error("Agent {0} voted more than once")]
    DuplicateAgent(String),
}

/// Aggregates a complete Stage-2 panel into a [`ConsensusResult`].
///
/// # Example
///
/// ```
/// use citeguard_domain::consensus::{AgreementLevel, ConsensusCalculator, Recommendation};
/// use citeguard_domain::verdict::AgentVerdict;
///
/// let verdicts = [9, 9, 8, 9, 9]
///     .iter()
///     .enumerate()
///     .map(|(i, s)| AgentVerdict::scored(format!("agent-{i}"), *s))
///     .collect();
///
/// let result = ConsensusCalculator::new(5).calculate(verdicts).unwrap();
/// assert_eq!(result.agreement_level, AgreementLevel::Unanimous);
/// assert!(!result.escalation_trigger);
/// assert_eq!(result.recommendation, Recommendation::CitationLikelyValid);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ConsensusCalculator {
    expected_panel: usize,
}

impl ConsensusCalculator {
    pub fn new(expected_panel: usize) -> Self {
        Self { expected_panel }
    }

    pub fn expected_panel(&self) -> usize {
        self.expected_panel
    }

    /// Compute consensus. Partial panels are refused rather than scored.
    pub fn calculate(
        &self,
        mut verdicts: Vec<AgentVerdict>,
    ) -> Result<ConsensusResult, ConsensusError> {
        if verdicts.is_empty() {
            return Err(ConsensusError::EmptyPanel);
        }
        if verdicts.len() != self.expected_panel {
            return Err(ConsensusError::IncompletePanel {
                expected: self.expected_panel,
                actual: verdicts.len(),
            });
        }
        let mut seen = HashSet::new();
        for v in &verdicts {
            if !seen.insert(v.agent.as_str()) {
                return Err(ConsensusError::DuplicateAgent(v.agent.clone()));
            }
        }

        verdicts.sort_by(|a, b| a.agent.cmp(&b.agent));

        let scores: Option<Vec<u8>> = verdicts.iter().map(|v| v.judgment.as_score()).collect();
        let (panel_format, agreement_level, dominant, confidence_score, mean_score) = match scores
        {
            Some(scores) => {
                let (level, dominant) = numeric_agreement(&scores);
                let (mean, stddev) = mean_and_stddev(&scores);
                let confidence = round2((1.0 - stddev / MAX_SCORE_STDDEV).clamp(0.0, 1.0));
                (PanelFormat::Numeric, level, dominant, confidence, Some(round2(mean)))
            }
            None => {
                let (level, dominant, count) = categorical_agreement(&verdicts);
                let confidence = round2(count as f64 / verdicts.len() as f64);
                (PanelFormat::Categorical, level, dominant, confidence, None)
            }
        };

        let escalation_trigger = needs_escalation(agreement_level, &verdicts);
        let recommendation = recommend(agreement_level, dominant);

        Ok(ConsensusResult {
            verdicts,
            panel_format,
            agreement_level,
            confidence_score,
            escalation_trigger,
            recommendation,
            mean_score,
            computed_at: now_millis(),
        })
    }
}

/// Escalate on a split, or when someone calls the citation fabricated while
/// others disagree. A uniformly low panel does not escalate.
fn needs_escalation(level: AgreementLevel, verdicts: &[AgentVerdict]) -> bool {
    if level == AgreementLevel::Split {
        return true;
    }
    let negative = verdicts.iter().filter(|v| v.judgment.is_negative()).count();
    negative > 0 && negative < verdicts.len()
}

fn recommend(level: AgreementLevel, dominant: Direction) -> Recommendation {
    match (level, dominant) {
        (AgreementLevel::Split, _) => Recommendation::CitationUncertain,
        (_, Direction::Authentic) => Recommendation::CitationLikelyValid,
        (_, Direction::Fabricated) => Recommendation::CitationLikelyHallucinated,
        (_, Direction::Unsure) => Recommendation::CitationUncertain,
    }
}

/// Numeric panels: only an all-high or all-low panel is unanimous.
fn numeric_agreement(scores: &[u8]) -> (AgreementLevel, Direction) {
    let mut bands: BTreeMap<ScoreBand, usize> = BTreeMap::new();
    for s in scores {
        *bands.entry(ScoreBand::of(*s)).or_default() += 1;
    }
    let (band, count) = dominant_entry(&bands).unwrap_or((ScoreBand::Medium, 0));
    let mut level = classify_agreement(count, scores.len());
    if level == AgreementLevel::Unanimous && band == ScoreBand::Medium {
        level = AgreementLevel::Strong;
    }
    let direction = match band {
        ScoreBand::High => Direction::Authentic,
        ScoreBand::Medium => Direction::Unsure,
        ScoreBand::Low => Direction::Fabricated,
    };
    (level, direction)
}

fn categorical_agreement(verdicts: &[AgentVerdict]) -> (AgreementLevel, Direction, usize) {
    let mut histogram: BTreeMap<Verdict, usize> = BTreeMap::new();
    for v in verdicts {
        *histogram.entry(v.judgment.verdict()).or_default() += 1;
    }
    let (verdict, count) = dominant_entry(&histogram).unwrap_or((Verdict::Uncertain, 0));
    let direction = match verdict {
        Verdict::Valid => Direction::Authentic,
        Verdict::Uncertain => Direction::Unsure,
        Verdict::Invalid => Direction::Fabricated,
    };
    (classify_agreement(count, verdicts.len()), direction, count)
}

/// Largest bucket. Ties keep the first key; a tie only happens on a split
/// panel, where the dominant bucket does not change the outcome.
fn dominant_entry<K: Copy + Ord>(histogram: &BTreeMap<K, usize>) -> Option<(K, usize)> {
    let mut best: Option<(K, usize)> = None;
    for (key, count) in histogram {
        match best {
            Some((_, c)) if c >= *count => {}
            _ => best = Some((*key, *count)),
        }
    }
    best
}

fn mean_and_stddev(scores: &[u8]) -> (f64, f64) {
    let n = scores.len() as f64;
    let mean = scores.iter().map(|s| *s as f64).sum::<f64>() / n;
    let variance = scores
        .iter()
        .map(|s| (*s as f64 - mean).powi(2))
        .sum::<f64>()
        / n;
    (mean, variance.sqrt())
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
