//! Validation store port
//!
//! Durable home of document checks, validation jobs and queue items. Every
//! method is one atomic step: implementations must serialize concurrent
//! callers (a lock, a transaction) so counters never lose increments and a
//! check never gets two jobs.

use async_trait::async_trait;
use citeguard_domain::{
    CheckId, DocumentCheck, JobFailureReport, JobId, LedgerError, QueueItem, QueueItemId,
    StageResult, ValidationJob,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Outcome of [`ValidationStore::create_job`]
#[derive(Debug, Clone)]
pub struct JobCreation {
    pub job: ValidationJob,
    /// `false` when the check already had a job
    pub created: bool,
}

#[async_trait]
pub trait ValidationStore: Send + Sync {
    /// Create the job and its tier-2 items, or return the check's existing job
    async fn create_job(&self, check: DocumentCheck) -> Result<JobCreation, StoreError>;

    async fn get_job(&self, job_id: &JobId) -> Result<ValidationJob, StoreError>;

    async fn find_job_by_check(&self, check_id: &CheckId)
    -> Result<Option<ValidationJob>, StoreError>;

    async fn get_check(&self, check_id: &CheckId) -> Result<DocumentCheck, StoreError>;

    async fn list_items(&self, job_id: &JobId) -> Result<Vec<QueueItem>, StoreError>;

    /// Oldest pending item of an open job, without claiming it
    async fn next_pending_item(&self) -> Result<Option<QueueItem>, StoreError>;

    async fn mark_processing(&self, item_id: &QueueItemId) -> Result<QueueItem, StoreError>;

    /// Claim up to `limit` pending items in one step
    async fn dequeue_batch(&self, limit: usize) -> Result<Vec<QueueItem>, StoreError>;

    /// Store the result, write it into the citation and enqueue the tier-3
    /// follow-up when `needs_escalation`. Returns the follow-up item.
    async fn mark_completed(
        &self,
        item_id: &QueueItemId,
        result: StageResult,
        needs_escalation: bool,
    ) -> Result<Option<QueueItem>, StoreError>;

    async fn mark_failed(&self, item_id: &QueueItemId, error: &str)
    -> Result<QueueItem, StoreError>;

    async fn requeue(&self, item_id: &QueueItemId) -> Result<QueueItem, StoreError>;

    async fn fail_job(&self, job_id: &JobId, reason: &str)
    -> Result<JobFailureReport, StoreError>;

    /// Complete the job when nothing under it is outstanding
    async fn check_job_completion(&self, job_id: &JobId) -> Result<bool, StoreError>;

    async fn failure_report(&self, job_id: &JobId)
    -> Result<Option<JobFailureReport>, StoreError>;
}
