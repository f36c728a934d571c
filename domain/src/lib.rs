//! Domain layer for citeguard
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Escalating panel
//!
//! Every citation is judged by a Stage-2 panel of independent agents. The
//! [`ConsensusCalculator`] turns their verdicts into an agreement level and an
//! escalation decision. Only disagreement escalates: escalated citations go
//! to a Stage-3 panel of investigators whose reports the
//! [`FinalStatusResolver`] reduces to a risk level, never downgrading on ties.
//!
//! ## Queue
//!
//! A [`ValidationJob`] owns one [`QueueItem`] per citation per tier. Items
//! move `pending → processing → completed | failed`; failed items are
//! requeued a bounded number of times.
//!
//! ## Consistency
//!
//! The [`ConsistencyAnalyzer`] measures how reproducible the pipeline is
//! across independently completed runs.

pub mod agent;
pub mod citation;
pub mod config;
pub mod consensus;
pub mod consistency;
pub mod core;
pub mod escalation;
pub mod parsing;
pub mod prompt;
pub mod queue;
pub mod verdict;

// Re-export commonly used types
pub use agent::{AgentSpec, InvestigatorPersona, validate_agents};
pub use citation::{
    CheckStatus, Citation, CitationComponents, CitationKind, DocumentCheck, FormatCheck,
};
pub use config::{ConfigIssue, ConfigIssueCode, OutputFormat, Severity, has_errors};
pub use consensus::{
    AgreementLevel, ConsensusCalculator, ConsensusError, ConsensusResult, PanelFormat,
    Recommendation,
};
pub use consistency::{
    AgentConsistency, CitationConsistency, ConsistencyAnalyzer, ConsistencyReport,
    ConsistencySummary,
};
pub use core::{
    error::DomainError,
    ids::{CheckId, CitationId, JobId, QueueItemId},
    tier::Tier,
};
pub use escalation::{
    Assessment, FinalStatusResolver, InvestigatorReport, LegacyConfidence, LegacyStatus,
    RiskLevel, Tier3Result,
};
pub use parsing::{
    ParseError, ParseLayer, ParsedInvestigation, ParsedVerdict, parse_investigation_response,
    parse_investigation_response_or_fallback, parse_panel_response,
    parse_panel_response_or_fallback,
};
pub use prompt::PromptTemplate;
pub use queue::{
    JobFailureReport, JobProgress, JobStatus, LedgerError, QueueError, QueueItem, QueueItemStatus,
    QueueLedger, StageResult, ValidationJob,
};
pub use verdict::{AgentVerdict, Direction, Judgment, ReasonCode, ScoreBand, Verdict};
