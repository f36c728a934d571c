//! In-process validation store
//!
//! A [`QueueLedger`] behind a tokio mutex. Every port method takes the lock
//! once, so counter updates and job creation are serialized the way a
//! database transaction would serialize them.

use super::snapshot::RunSnapshot;
use async_trait::async_trait;
use citeguard_application::{JobCreation, StoreError, ValidationStore};
use citeguard_domain::{
    CheckId, DocumentCheck, JobFailureReport, JobId, LedgerError, QueueItem, QueueItemId,
    QueueLedger, StageResult, ValidationJob,
};
use tokio::sync::Mutex;
use tracing::trace;

#[derive(Default)]
pub struct InMemoryValidationStore {
    ledger: Mutex<QueueLedger>,
}

impl InMemoryValidationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume from a previously captured ledger
    pub fn from_ledger(ledger: QueueLedger) -> Self {
        Self {
            ledger: Mutex::new(ledger),
        }
    }

    /// Copy of the whole ledger
    pub async fn ledger(&self) -> QueueLedger {
        self.ledger.lock().await.clone()
    }

    /// Capture a check and its job as a portable run
    pub async fn snapshot(&self, check_id: &CheckId) -> Result<RunSnapshot, StoreError> {
        let ledger = self.ledger.lock().await;
        let check = ledger.check(check_id)?.clone();
        let job = ledger.job_for_check(check_id).cloned();
        Ok(RunSnapshot::new(check, job))
    }

    async fn with<T>(
        &self,
        op: &'static str,
        f: impl FnOnce(&mut QueueLedger) -> Result<T, LedgerError>,
    ) -> Result<T, StoreError> {
        let mut ledger = self.ledger.lock().await;
        trace!(op, "store");
        Ok(f(&mut ledger)?)
    }
}

#[async_trait]
impl ValidationStore for InMemoryValidationStore {
    async fn create_job(&self, check: DocumentCheck) -> Result<JobCreation, StoreError> {
        self.with("create_job", |l| l.create_job(check))
            .await
            .map(|(job, created)| JobCreation { job, created })
    }

    async fn get_job(&self, job_id: &JobId) -> Result<ValidationJob, StoreError> {
        self.with("get_job", |l| l.job(job_id).cloned()).await
    }

    async fn find_job_by_check(
        &self,
        check_id: &CheckId,
    ) -> Result<Option<ValidationJob>, StoreError> {
        self.with("find_job_by_check", |l| Ok(l.job_for_check(check_id).cloned()))
            .await
    }

    async fn get_check(&self, check_id: &CheckId) -> Result<DocumentCheck, StoreError> {
        self.with("get_check", |l| l.check(check_id).cloned()).await
    }

    async fn list_items(&self, job_id: &JobId) -> Result<Vec<QueueItem>, StoreError> {
        self.with("list_items", |l| Ok(l.items_for_job(job_id))).await
    }

    async fn next_pending_item(&self) -> Result<Option<QueueItem>, StoreError> {
        self.with("next_pending_item", |l| Ok(l.next_pending().cloned()))
            .await
    }

    async fn mark_processing(&self, item_id: &QueueItemId) -> Result<QueueItem, StoreError> {
        self.with("mark_processing", |l| l.mark_processing(item_id))
            .await
    }

    async fn dequeue_batch(&self, limit: usize) -> Result<Vec<QueueItem>, StoreError> {
        self.with("dequeue_batch", |l| l.claim_batch(limit)).await
    }

    async fn mark_completed(
        &self,
        item_id: &QueueItemId,
        result: StageResult,
        needs_escalation: bool,
    ) -> Result<Option<QueueItem>, StoreError> {
        self.with("mark_completed", |l| {
            l.mark_completed(item_id, result, needs_escalation)
        })
        .await
    }

    async fn mark_failed(
        &self,
        item_id: &QueueItemId,
        error: &str,
    ) -> Result<QueueItem, StoreError> {
        self.with("mark_failed", |l| l.mark_failed(item_id, error))
            .await
    }

    async fn requeue(&self, item_id: &QueueItemId) -> Result<QueueItem, StoreError> {
        self.with("requeue", |l| l.requeue(item_id)).await
    }

    async fn fail_job(
        &self,
        job_id: &JobId,
        reason: &str,
    ) -> Result<JobFailureReport, StoreError> {
        self.with("fail_job", |l| l.fail_job(job_id, reason)).await
    }

    async fn check_job_completion(&self, job_id: &JobId) -> Result<bool, StoreError> {
        self.with("check_job_completion", |l| l.check_job_completion(job_id))
            .await
    }

    async fn failure_report(
        &self,
        job_id: &JobId,
    ) -> Result<Option<JobFailureReport>, StoreError> {
        self.with("failure_report", |l| l.failure_report(job_id))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use citeguard_domain::{Citation, JobStatus};
    use std::sync::Arc;

    fn check(id: &str, n: usize) -> DocumentCheck {
        DocumentCheck::new(
            CheckId::new(id),
            (1..=n)
                .map(|i| Citation::new(format!("c{}", i), format!("{} F.3d {}", i, i * 10)))
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_concurrent_creation_yields_one_job() {
        let store = Arc::new(InMemoryValidationStore::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.create_job(check("doc", 3)).await.unwrap()
            }));
        }

        let mut created = 0;
        let mut ids = Vec::new();
        for handle in handles {
            let creation = handle.await.unwrap();
            created += usize::from(creation.created);
            ids.push(creation.job.id);
        }
        assert_eq!(created, 1);
        assert!(ids.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(store.list_items(&ids[0]).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_concurrent_dequeues_never_share_items() {
        let store = Arc::new(InMemoryValidationStore::new());
        store.create_job(check("doc", 20)).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..4 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move { store.dequeue_batch(5).await.unwrap() }));
        }
        let mut claimed = Vec::new();
        for handle in handles {
            claimed.extend(handle.await.unwrap().into_iter().map(|i| i.id));
        }
        claimed.sort();
        claimed.dedup();
        assert_eq!(claimed.len(), 20);
        assert!(store.next_pending_item().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_job_is_a_ledger_error() {
        let store = InMemoryValidationStore::new();
        let err = store.get_job(&JobId::new()).await.unwrap_err();
        assert!(matches!(err, StoreError::Ledger(LedgerError::JobNotFound(_))));
    }

    #[tokio::test]
    async fn test_snapshot_carries_job_and_check() {
        let store = InMemoryValidationStore::new();
        let creation = store.create_job(check("doc", 2)).await.unwrap();

        let snapshot = store.snapshot(&CheckId::new("doc")).await.unwrap();
        assert_eq!(snapshot.check.citations.len(), 2);
        let job = snapshot.job.unwrap();
        assert_eq!(job.id, creation.job.id);
        assert_eq!(job.status, JobStatus::Pending);

        let resumed = InMemoryValidationStore::from_ledger(store.ledger().await);
        assert_eq!(
            resumed.get_job(&creation.job.id).await.unwrap(),
            creation.job
        );
    }
}
