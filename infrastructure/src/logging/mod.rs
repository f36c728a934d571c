//! Logging infrastructure: the JSONL audit trail.
//!
//! Provides [`JsonlAuditLogger`], an append-only JSONL writer that implements
//! the [`AuditLogger`](citeguard_application::AuditLogger) port.

mod jsonl_audit;

pub use jsonl_audit::JsonlAuditLogger;
