//! Ports (interfaces) for external dependencies
//!
//! These traits define how the application layer interacts with
//! external systems without depending on concrete implementations.

pub mod agent_gateway;
pub mod audit_log;
pub mod progress;
pub mod validation_store;
