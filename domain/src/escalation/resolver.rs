//! Final Status Resolver

use super::report::{Assessment, InvestigatorReport, Tier3Result};
use super::risk::{LegacyConfidence, RiskLevel};
use crate::consensus::{ConsensusError, classify_agreement};
use crate::core::time::now_millis;
use std::collections::{BTreeMap, HashSet};

/// Aggregates a complete Stage-3 investigator panel into a [`Tier3Result`].
///
/// The most frequent risk level wins. Ties resolve to the most severe of the
/// tied levels, so an investigator calling for review is never outvoted by an
/// equal number of lenient ones.
#[derive(Debug, Clone, Copy)]
pub struct FinalStatusResolver {
    expected_panel: usize,
}

impl FinalStatusResolver {
    pub fn new(expected_panel: usize) -> Self {
        Self { expected_panel }
    }

    pub fn resolve(
        &self,
        mut reports: Vec<InvestigatorReport>,
    ) -> Result<Tier3Result, ConsensusError> {
        if reports.is_empty() {
            return Err(ConsensusError::EmptyPanel);
        }
        if reports.len() != self.expected_panel {
            return Err(ConsensusError::IncompletePanel {
                expected: self.expected_panel,
                actual: reports.len(),
            });
        }
        let mut seen = HashSet::new();
        for r in &reports {
            if !seen.insert(r.agent.as_str()) {
                return Err(ConsensusError::DuplicateAgent(r.agent.clone()));
            }
        }
        reports.sort_by(|a, b| a.agent.cmp(&b.agent));

        let mut histogram: BTreeMap<RiskLevel, usize> = BTreeMap::new();
        for r in &reports {
            *histogram.entry(r.risk_level()).or_default() += 1;
        }
        // BTreeMap iterates least to most severe; `>=` lets later (more
        // severe) levels take ties.
        let mut final_level = RiskLevel::NeedsAdditionalReview;
        let mut top = 0;
        for (level, count) in &histogram {
            if *count >= top {
                final_level = *level;
                top = *count;
            }
        }

        let agreement_level = classify_agreement(top, reports.len());
        let supporting: Vec<f64> = reports
            .iter()
            .filter(|r| r.risk_level() == final_level)
            .map(|r| r.assessment.confidence_score())
            .collect();
        let share = top as f64 / reports.len() as f64;
        let mean_support = supporting.iter().sum::<f64>() / supporting.len().max(1) as f64;
        let confidence = ((share * mean_support) * 100.0).round() / 100.0;

        let final_assessment = if reports.iter().all(|r| r.assessment.is_legacy()) {
            Assessment::legacy(final_level.status(), LegacyConfidence::from_score(confidence))
        } else {
            Assessment::current(final_level, confidence)
        };

        Ok(Tier3Result {
            reports,
            agreement_level,
            final_assessment,
            resolved_at: now_millis(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consensus::AgreementLevel;
    use crate::escalation::{LegacyStatus, RiskLevel::*};

    fn reports(levels: &[RiskLevel]) -> Vec<InvestigatorReport> {
        levels
            .iter()
            .enumerate()
            .map(|(i, l)| InvestigatorReport::at_level(format!("inv-{}", i), *l))
            .collect()
    }

    fn resolve(levels: &[RiskLevel]) -> Tier3Result {
        FinalStatusResolver::new(levels.len())
            .resolve(reports(levels))
            .unwrap()
    }

    #[test]
    fn test_unanimous_low_risk() {
        let result = resolve(&[LowRisk, LowRisk, LowRisk]);
        assert_eq!(result.final_risk_level(), LowRisk);
        assert_eq!(result.agreement_level, AgreementLevel::Unanimous);
        assert_eq!(result.final_status(), LegacyStatus::Valid);
    }

    #[test]
    fn test_majority_wins() {
        let result = resolve(&[ModerateRisk, ModerateRisk, LowRisk]);
        assert_eq!(result.final_risk_level(), ModerateRisk);
        assert_eq!(result.agreement_level, AgreementLevel::Strong);
    }

    #[test]
    fn test_three_way_tie_goes_to_most_severe() {
        let result = resolve(&[LowRisk, ModerateRisk, NeedsAdditionalReview]);
        assert_eq!(result.final_risk_level(), NeedsAdditionalReview);
        assert_eq!(result.agreement_level, AgreementLevel::Split);
    }

    #[test]
    fn test_two_way_tie_never_downgrades() {
        let result = resolve(&[LowRisk, LowRisk, NeedsAdditionalReview, NeedsAdditionalReview]);
        assert_eq!(result.final_risk_level(), NeedsAdditionalReview);

        let result = resolve(&[LowRisk, ModerateRisk]);
        assert_eq!(result.final_risk_level(), ModerateRisk);
    }

    #[test]
    fn test_all_legacy_reports_resolve_in_legacy_shape() {
        let legacy = vec![
            InvestigatorReport::new(
                "a",
                "m",
                Assessment::legacy(LegacyStatus::Fail, LegacyConfidence::High),
            ),
            InvestigatorReport::new(
                "b",
                "m",
                Assessment::legacy(LegacyStatus::Fail, LegacyConfidence::High),
            ),
            InvestigatorReport::new(
                "c",
                "m",
                Assessment::legacy(LegacyStatus::Warn, LegacyConfidence::Low),
            ),
        ];
        let result = FinalStatusResolver::new(3).resolve(legacy).unwrap();
        assert!(result.final_assessment.is_legacy());
        assert_eq!(result.final_status(), LegacyStatus::Fail);
        assert_eq!(result.final_risk_level(), NeedsAdditionalReview);
    }

    #[test]
    fn test_mixed_shapes_resolve_in_current_shape() {
        let mut mixed = reports(&[ModerateRisk, ModerateRisk]);
        mixed.push(InvestigatorReport::new(
            "inv-9",
            "m",
            Assessment::legacy(LegacyStatus::Warn, LegacyConfidence::Medium),
        ));
        let result = FinalStatusResolver::new(3).resolve(mixed).unwrap();
        assert!(!result.final_assessment.is_legacy());
        assert_eq!(result.final_risk_level(), ModerateRisk);
        assert_eq!(result.agreement_level, AgreementLevel::Unanimous);
    }

    #[test]
    fn test_incomplete_panel_is_refused() {
        let err = FinalStatusResolver::new(3)
            .resolve(reports(&[LowRisk, LowRisk]))
            .unwrap_err();
        assert!(matches!(err, ConsensusError::IncompletePanel { .. }));
    }
}
