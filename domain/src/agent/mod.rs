//! Agent domain module
//!
//! Agent specifications for the Stage-2 panel and the Stage-3
//! investigators, and their personas.

mod spec;

pub use spec::{AgentSpec, InvestigatorPersona, validate_agents};
