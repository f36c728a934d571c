//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod analyze_consistency;
pub mod invoke_agent;
pub mod orchestrator;
pub mod run_escalation;
pub mod run_panel;

#[cfg(test)]
pub(crate) mod test_support;
