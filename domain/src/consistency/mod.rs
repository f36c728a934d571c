//! Cross-run reproducibility statistics.
//!
//! Given K independently completed runs over the same citations, the
//! [`ConsistencyAnalyzer`] reports how often each citation landed on the same
//! risk level and how stable each agent's judgments were. Nothing here is
//! persisted; reports are recomputed on demand.

mod analyzer;
mod report;
mod stats;

pub use analyzer::ConsistencyAnalyzer;
pub use report::{AgentConsistency, CitationConsistency, ConsistencyReport, ConsistencySummary};
pub use stats::{categorical_consistency, numeric_consistency, population_std_dev};
