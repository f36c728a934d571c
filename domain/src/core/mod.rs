//! Core domain concepts shared across all subdomains.
//!
//! - [`ids`]: typed identifiers for jobs, queue items, checks and citations
//! - [`error::DomainError`]: domain-level errors
//! - [`tier::Tier`]: which stage a queue item or verdict belongs to
//! - [`time`]: millisecond timestamps used on every persisted record

pub mod error;
pub mod ids;
pub mod tier;
pub mod time;
