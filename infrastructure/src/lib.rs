//! Infrastructure layer for citeguard
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod gateway;
pub mod input;
pub mod logging;
pub mod store;

// Re-export commonly used types
pub use config::{ConfigLoader, ConfigValidationError, FileConfig};
pub use gateway::{GatewaySettings, HttpAgentGateway};
pub use input::{CitationInput, InputError};
pub use logging::JsonlAuditLogger;
pub use store::{InMemoryValidationStore, RunSnapshot, SnapshotError};
