//! Application layer for citeguard
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{PipelineParams, RetryPolicy};
pub use ports::{
    agent_gateway::{AgentGateway, AgentReply, GatewayError, TokenUsage},
    audit_log::{AuditEvent, AuditLogger, NoAuditLog},
    progress::{NoProgress, PipelineProgress},
    validation_store::{JobCreation, StoreError, ValidationStore},
};
pub use use_cases::analyze_consistency::{AnalyzeConsistencyUseCase, AnalyzeError, analyze_runs};
pub use use_cases::invoke_agent::{AgentInvoker, AgentRequest, InvokeError, RawOutput};
pub use use_cases::orchestrator::{DrainSummary, ItemOutcome, JobOrchestrator, OrchestratorError};
pub use use_cases::run_escalation::EscalationInvestigator;
pub use use_cases::run_panel::{AgentFailure, PanelError, PanelEvaluator, PanelOutcome};
