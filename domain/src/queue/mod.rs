//! Durable work queue entities.
//!
//! ```text
//!            ┌──────────── requeue (retry budget left) ────────────┐
//!            ▼                                                     │
//!        pending ──► processing ──► completed                      │
//!                        │                                         │
//!                        └────────► failed ────────────────────────┘
//! ```
//!
//! `pending → completed` and `pending → failed` are not transitions.

mod item;
mod job;
mod ledger;

pub use item::{QueueError, QueueItem, QueueItemStatus, StageResult};
pub use job::{JobFailureReport, JobProgress, JobStatus, ValidationJob};
pub use ledger::{LedgerError, QueueLedger};
