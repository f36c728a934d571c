//! Consistency report shapes (serialized as the JSON report)

use crate::core::tier::Tier;
use crate::escalation::RiskLevel;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How one citation fared across runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitationConsistency {
    /// Normalized text used to match the citation across runs
    pub key: String,
    /// Text as it appeared in the first run that saw it
    pub text: String,
    /// Runs in which the citation had a resolved risk level
    pub runs_observed: usize,
    pub distribution: BTreeMap<RiskLevel, usize>,
    /// Count of the most common level divided by `runs_observed`
    pub agreement_rate: f64,
    pub most_common: Option<RiskLevel>,
}

impl CitationConsistency {
    pub fn is_multi_run(&self) -> bool {
        self.runs_observed >= 2
    }
}

/// How stable one agent's judgments were
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConsistency {
    pub agent: String,
    pub tier: Tier,
    pub unique_citations: usize,
    /// Citations this agent judged in two or more runs
    pub multi_run_citations: usize,
    /// Average per-citation consistency over multi-run citations
    pub consistency_pct: Option<f64>,
    /// Every token the agent produced ("9", "INVALID", "LOW_RISK", ...)
    pub distribution: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsistencySummary {
    pub total_runs: usize,
    pub total_citations: usize,
    pub multi_run_citations: usize,
    /// Multi-run citations whose agreement rate is 1.0
    pub fully_consistent_citations: usize,
    pub mean_agreement_rate: Option<f64>,
    pub mean_agent_consistency: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyReport {
    pub summary: ConsistencySummary,
    pub citations: Vec<CitationConsistency>,
    pub agents: Vec<AgentConsistency>,
}
