//! Consistency Analyzer

use super::report::{AgentConsistency, CitationConsistency, ConsistencyReport, ConsistencySummary};
use super::stats::{categorical_consistency, numeric_consistency, round2};
use crate::citation::{Citation, DocumentCheck};
use crate::core::tier::Tier;
use crate::escalation::RiskLevel;
use crate::verdict::Judgment;
use std::collections::{BTreeMap, HashSet};

/// One thing an agent said about one citation in one run
#[derive(Debug, Clone, PartialEq)]
enum Observation {
    Panel(Judgment),
    Risk(RiskLevel),
}

impl Observation {
    fn token(&self) -> String {
        match self {
            Observation::Panel(j) => j.token(),
            Observation::Risk(level) => level.as_str().to_string(),
        }
    }
}

#[derive(Default)]
struct CitationTally {
    text: String,
    levels: Vec<RiskLevel>,
}

/// Observations of one agent, keyed by citation match key
#[derive(Default)]
struct AgentTally {
    by_citation: BTreeMap<String, Vec<Observation>>,
}

/// Computes per-citation and per-agent reproducibility over completed runs.
///
/// Citations are matched across runs by [`Citation::match_key`], so runs
/// produced from separate uploads of the same document line up even though
/// their citation ids differ.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsistencyAnalyzer;

impl ConsistencyAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, runs: &[DocumentCheck]) -> ConsistencyReport {
        let mut citations: BTreeMap<String, CitationTally> = BTreeMap::new();
        let mut agents: BTreeMap<(Tier, String), AgentTally> = BTreeMap::new();

        for run in runs {
            // One observation per citation per run: a document citing the same
            // authority twice keeps the most severe level and each agent's
            // first answer.
            let mut run_levels: BTreeMap<String, (&str, RiskLevel)> = BTreeMap::new();
            let mut run_agents: HashSet<(Tier, String, String)> = HashSet::new();
            for citation in &run.citations {
                let key = citation.match_key();
                if let Some(level) = citation.effective_risk_level() {
                    run_levels
                        .entry(key.clone())
                        .and_modify(|(_, seen)| *seen = (*seen).max(level))
                        .or_insert((citation.text.as_str(), level));
                }
                collect_agent_observations(citation, &key, &mut run_agents, &mut agents);
            }
            for (key, (text, level)) in run_levels {
                let tally = citations.entry(key).or_default();
                if tally.text.is_empty() {
                    tally.text = text.to_string();
                }
                tally.levels.push(level);
            }
        }

        let citation_stats: Vec<CitationConsistency> = citations
            .into_iter()
            .map(|(key, tally)| citation_consistency(key, tally))
            .collect();
        let agent_stats: Vec<AgentConsistency> = agents
            .into_iter()
            .map(|((tier, agent), tally)| agent_consistency(agent, tier, tally))
            .collect();

        let summary = summarize(runs.len(), &citation_stats, &agent_stats);
        ConsistencyReport {
            summary,
            citations: citation_stats,
            agents: agent_stats,
        }
    }
}

fn collect_agent_observations(
    citation: &Citation,
    key: &str,
    seen_in_run: &mut HashSet<(Tier, String, String)>,
    agents: &mut BTreeMap<(Tier, String), AgentTally>,
) {
    let mut observe = |tier: Tier, agent: &str, observation: Observation| {
        if !seen_in_run.insert((tier, agent.to_string(), key.to_string())) {
            return;
        }
        agents
            .entry((tier, agent.to_string()))
            .or_default()
            .by_citation
            .entry(key.to_string())
            .or_default()
            .push(observation);
    };
    if let Some(consensus) = &citation.tier2 {
        for verdict in &consensus.verdicts {
            observe(Tier::Panel, &verdict.agent, Observation::Panel(verdict.judgment));
        }
    }
    if let Some(investigation) = &citation.tier3 {
        for report in &investigation.reports {
            observe(
                Tier::Investigation,
                &report.agent,
                Observation::Risk(report.risk_level()),
            );
        }
    }
}

fn citation_consistency(key: String, tally: CitationTally) -> CitationConsistency {
    let mut distribution: BTreeMap<RiskLevel, usize> = BTreeMap::new();
    for level in &tally.levels {
        *distribution.entry(*level).or_default() += 1;
    }

    // Iterating least to most severe with `>=` lets the more severe level win ties
    let mut most_common: Option<(RiskLevel, usize)> = None;
    for (level, count) in &distribution {
        if most_common.is_none_or(|(_, best)| *count >= best) {
            most_common = Some((*level, *count));
        }
    }

    let runs_observed = tally.levels.len();
    let agreement_rate = match most_common {
        Some((_, count)) if runs_observed > 0 => round2(count as f64 / runs_observed as f64),
        _ => 0.0,
    };

    CitationConsistency {
        key,
        text: tally.text,
        runs_observed,
        distribution,
        agreement_rate,
        most_common: most_common.map(|(level, _)| level),
    }
}

fn agent_consistency(agent: String, tier: Tier, tally: AgentTally) -> AgentConsistency {
    let mut distribution: BTreeMap<String, usize> = BTreeMap::new();
    let mut per_citation = Vec::new();

    for observations in tally.by_citation.values() {
        for obs in observations {
            *distribution.entry(obs.token()).or_default() += 1;
        }
        if observations.len() >= 2 {
            per_citation.push(observation_consistency(observations));
        }
    }

    let consistency_pct = mean(&per_citation).map(round2);
    AgentConsistency {
        agent,
        tier,
        unique_citations: tally.by_citation.len(),
        multi_run_citations: per_citation.len(),
        consistency_pct,
        distribution,
    }
}

/// Scores compare numerically; anything mixed with a label compares as
/// normalized verdict tokens so legacy and current runs stay comparable.
fn observation_consistency(observations: &[Observation]) -> f64 {
    let scores: Option<Vec<f64>> = observations
        .iter()
        .map(|obs| match obs {
            Observation::Panel(j) => j.as_score().map(f64::from),
            Observation::Risk(_) => None,
        })
        .collect();
    if let Some(scores) = scores {
        return numeric_consistency(&scores);
    }

    let tokens: Vec<&'static str> = observations
        .iter()
        .map(|obs| match obs {
            Observation::Panel(j) => j.verdict().as_str(),
            Observation::Risk(level) => level.as_str(),
        })
        .collect();
    categorical_consistency(&tokens)
}

fn summarize(
    total_runs: usize,
    citations: &[CitationConsistency],
    agents: &[AgentConsistency],
) -> ConsistencySummary {
    let multi_run: Vec<&CitationConsistency> =
        citations.iter().filter(|c| c.is_multi_run()).collect();
    let rates: Vec<f64> = multi_run.iter().map(|c| c.agreement_rate).collect();
    let agent_pcts: Vec<f64> = agents.iter().filter_map(|a| a.consistency_pct).collect();

    ConsistencySummary {
        total_runs,
        total_citations: citations.len(),
        multi_run_citations: multi_run.len(),
        fully_consistent_citations: multi_run
            .iter()
            .filter(|c| c.agreement_rate >= 1.0)
            .count(),
        mean_agreement_rate: mean(&rates).map(round2),
        mean_agent_consistency: mean(&agent_pcts).map(round2),
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consensus::ConsensusCalculator;
    use crate::core::ids::CheckId;
    use crate::escalation::{
        Assessment, FinalStatusResolver, InvestigatorReport, LegacyConfidence, LegacyStatus,
    };
    use crate::verdict::{AgentVerdict, Verdict};

    const BROWN: &str = "Brown v. Board of Education, 347 U.S. 483 (1954)";
    const VARGAS: &str = "Vargas v. Delta Airlines, 523 F.3d 901 (9th Cir. 2011)";

    fn scored(id: &str, text: &str, scores: &[u8]) -> Citation {
        let verdicts = scores
            .iter()
            .enumerate()
            .map(|(i, s)| AgentVerdict::scored(format!("panel-{}", i + 1), *s))
            .collect();
        let mut citation = Citation::new(id, text);
        citation.tier2 = Some(
            ConsensusCalculator::new(scores.len())
                .calculate(verdicts)
                .unwrap(),
        );
        citation
    }

    fn investigated(citation: Citation, reports: Vec<InvestigatorReport>) -> Citation {
        let mut citation = citation;
        citation.tier3 = Some(
            FinalStatusResolver::new(reports.len())
                .resolve(reports)
                .unwrap(),
        );
        citation
    }

    fn run(name: &str, citations: Vec<Citation>) -> DocumentCheck {
        DocumentCheck::new(CheckId::new(name), citations)
    }

    #[test]
    fn test_identical_runs_are_fully_consistent() {
        let runs: Vec<DocumentCheck> = (0..3)
            .map(|i| {
                run(
                    &format!("run-{}", i),
                    vec![scored("c1", BROWN, &[9, 9, 8, 9, 9])],
                )
            })
            .collect();

        let report = ConsistencyAnalyzer::new().analyze(&runs);
        assert_eq!(report.summary.total_runs, 3);
        assert_eq!(report.citations.len(), 1);

        let brown = &report.citations[0];
        assert_eq!(brown.runs_observed, 3);
        assert_eq!(brown.agreement_rate, 1.0);
        assert_eq!(brown.most_common, Some(RiskLevel::LowRisk));

        assert_eq!(report.agents.len(), 5);
        for agent in &report.agents {
            assert_eq!(agent.consistency_pct, Some(100.0));
            assert_eq!(agent.multi_run_citations, 1);
        }
        assert_eq!(report.summary.fully_consistent_citations, 1);
        assert_eq!(report.summary.mean_agent_consistency, Some(100.0));
    }

    #[test]
    fn test_erratic_agent_scores_lower() {
        let runs = vec![
            run("a", vec![scored("c1", BROWN, &[9, 9, 9, 9, 9])]),
            run("b", vec![scored("c1", BROWN, &[1, 9, 9, 9, 9])]),
            run("c", vec![scored("c1", BROWN, &[9, 9, 9, 9, 9])]),
        ];
        let report = ConsistencyAnalyzer::new().analyze(&runs);

        let erratic = report
            .agents
            .iter()
            .find(|a| a.agent == "panel-1")
            .unwrap();
        let pct = erratic.consistency_pct.unwrap();
        assert!(pct < 50.0, "got {}", pct);
        assert_eq!(erratic.distribution.get("9"), Some(&2));
        assert_eq!(erratic.distribution.get("1"), Some(&1));

        let steady = report
            .agents
            .iter()
            .find(|a| a.agent == "panel-2")
            .unwrap();
        assert_eq!(steady.consistency_pct, Some(100.0));
    }

    #[test]
    fn test_citations_match_by_normalized_text() {
        let runs = vec![
            run("a", vec![scored("a-1", BROWN, &[9, 9, 9, 9, 9])]),
            run(
                "b",
                vec![scored("b-7", &format!("  {}. ", BROWN.to_uppercase()), &[9, 9, 9, 9, 9])],
            ),
        ];
        let report = ConsistencyAnalyzer::new().analyze(&runs);
        assert_eq!(report.citations.len(), 1);
        assert_eq!(report.citations[0].runs_observed, 2);
        assert_eq!(report.citations[0].text, BROWN);
    }

    #[test]
    fn test_agreement_rate_and_severe_tie_break() {
        let escalated = |name: &str, level: RiskLevel| {
            investigated(
                scored("c2", VARGAS, &[9, 2, 8, 9, 3]),
                (1..=3)
                    .map(|i| InvestigatorReport::at_level(format!("{}-{}", name, i), level))
                    .collect(),
            )
        };
        let runs = vec![
            run("a", vec![escalated("inv", RiskLevel::ModerateRisk)]),
            run("b", vec![escalated("inv", RiskLevel::NeedsAdditionalReview)]),
        ];
        let report = ConsistencyAnalyzer::new().analyze(&runs);
        let vargas = &report.citations[0];
        assert_eq!(vargas.agreement_rate, 0.5);
        assert_eq!(vargas.most_common, Some(RiskLevel::NeedsAdditionalReview));
        assert_eq!(report.summary.fully_consistent_citations, 0);

        let investigator = report
            .agents
            .iter()
            .find(|a| a.tier == Tier::Investigation && a.agent == "inv-1")
            .unwrap();
        assert_eq!(investigator.consistency_pct, Some(50.0));
    }

    #[test]
    fn test_legacy_and_current_formats_compare() {
        let legacy_run = {
            let verdicts = (1..=5)
                .map(|i| AgentVerdict::labelled(format!("panel-{}", i), Verdict::Valid))
                .collect();
            let mut c = Citation::new("c1", BROWN);
            c.tier2 = Some(ConsensusCalculator::new(5).calculate(verdicts).unwrap());
            run("legacy", vec![c])
        };
        let current_run = run("current", vec![scored("c1", BROWN, &[9, 9, 9, 9, 9])]);

        let report = ConsistencyAnalyzer::new().analyze(&[legacy_run, current_run]);
        assert_eq!(report.citations[0].agreement_rate, 1.0);
        for agent in &report.agents {
            // VALID and 9 both normalize to VALID
            assert_eq!(agent.consistency_pct, Some(100.0));
            assert_eq!(agent.distribution.len(), 2);
        }
    }

    #[test]
    fn test_legacy_investigator_status_is_normalized() {
        let legacy_report = InvestigatorReport::new(
            "inv-1",
            "m",
            Assessment::legacy(LegacyStatus::Fail, LegacyConfidence::High),
        );
        let current_report = InvestigatorReport::at_level("inv-1", RiskLevel::NeedsAdditionalReview);
        let runs = vec![
            run(
                "a",
                vec![investigated(scored("c2", VARGAS, &[9, 2, 8, 9, 3]), vec![legacy_report])],
            ),
            run(
                "b",
                vec![investigated(scored("c2", VARGAS, &[9, 2, 8, 9, 3]), vec![current_report])],
            ),
        ];
        let report = ConsistencyAnalyzer::new().analyze(&runs);
        let inv = report
            .agents
            .iter()
            .find(|a| a.tier == Tier::Investigation)
            .unwrap();
        assert_eq!(inv.consistency_pct, Some(100.0));
        assert_eq!(inv.distribution.get("NEEDS_ADDITIONAL_REVIEW"), Some(&2));
    }

    #[test]
    fn test_repeated_citation_counts_once_per_run() {
        let report = ConsistencyAnalyzer::new().analyze(&[run(
            "a",
            vec![
                scored("c1", BROWN, &[9, 9, 9, 9, 9]),
                scored("c7", BROWN, &[2, 9, 9, 9, 9]),
            ],
        )]);
        assert_eq!(report.summary.total_runs, 1);
        assert_eq!(report.summary.multi_run_citations, 0);

        let brown = &report.citations[0];
        assert_eq!(brown.runs_observed, 1);
        assert_eq!(brown.agreement_rate, 1.0);

        let first = report.agents.iter().find(|a| a.agent == "panel-1").unwrap();
        assert_eq!(first.multi_run_citations, 0);
        assert_eq!(first.consistency_pct, None);
        assert_eq!(first.distribution.get("9"), Some(&1));
        assert_eq!(first.distribution.get("2"), None);
    }

    #[test]
    fn test_repeated_citation_keeps_most_severe_level() {
        let runs = vec![
            run(
                "a",
                vec![
                    scored("c1", BROWN, &[9, 9, 9, 9, 9]),
                    scored("c7", BROWN, &[2, 2, 2, 2, 2]),
                ],
            ),
            run("b", vec![scored("c1", BROWN, &[2, 2, 2, 2, 2])]),
        ];
        let report = ConsistencyAnalyzer::new().analyze(&runs);
        let brown = &report.citations[0];
        assert_eq!(brown.runs_observed, 2);
        assert_eq!(brown.agreement_rate, 1.0);
        assert_eq!(brown.most_common, Some(RiskLevel::NeedsAdditionalReview));
    }

    #[test]
    fn test_single_run_has_no_agent_consistency() {
        let report =
            ConsistencyAnalyzer::new().analyze(&[run("a", vec![scored("c1", BROWN, &[9, 9, 9, 9, 9])])]);
        assert_eq!(report.summary.multi_run_citations, 0);
        assert_eq!(report.summary.mean_agreement_rate, None);
        assert!(report.agents.iter().all(|a| a.consistency_pct.is_none()));
    }

    #[test]
    fn test_unresolved_citations_are_not_observed() {
        let report = ConsistencyAnalyzer::new().analyze(&[
            run("a", vec![Citation::new("c1", BROWN)]),
            run("b", vec![scored("c1", BROWN, &[9, 9, 9, 9, 9])]),
        ]);
        assert_eq!(report.citations[0].runs_observed, 1);
    }
}
