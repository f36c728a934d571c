//! In-process bookkeeping for checks, jobs and queue items.
//!
//! [`QueueLedger`] applies every queue operation as one step over plain
//! data, so a store that serializes access to it (a mutex, a transaction)
//! gets atomic counter updates and race-free job creation for free.

use super::item::{QueueError, QueueItem, QueueItemStatus, StageResult};
use super::job::{JobFailureReport, JobStatus, ValidationJob};
use crate::citation::{CheckStatus, DocumentCheck};
use crate::core::ids::{CheckId, CitationId, JobId, QueueItemId};
use crate::core::tier::Tier;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Job not found: {0}")]
    JobNotFound(JobId),

    #[error("Queue item not found: {0}")]
    ItemNotFound(QueueItemId),

    #[error("Document check not found: {0}")]
    CheckNotFound(CheckId),

    #[error("Citation {citation} not found in check {check}")]
    CitationNotFound { check: CheckId, citation: CitationId },

    #[error("Document check {0} has no citations")]
    NoCitations(CheckId),

    #[error("Duplicate citation id {0}")]
    DuplicateCitation(CitationId),

    #[error(transparent)]
    Queue(#[from] QueueError),
}

/// Checks, jobs and items held together.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueueLedger {
    checks: Vec<DocumentCheck>,
    jobs: Vec<ValidationJob>,
    /// Insertion order is dequeue order
    items: Vec<QueueItem>,
}

impl QueueLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the job for `check` together with one tier-2 item per citation.
    ///
    /// Idempotent per check id: when a job already exists it is returned
    /// unchanged and the flag is `false`.
    pub fn create_job(
        &mut self,
        check: DocumentCheck,
    ) -> Result<(ValidationJob, bool), LedgerError> {
        if let Some(existing) = self.job_for_check(&check.id) {
            return Ok((existing.clone(), false));
        }
        if check.citations.is_empty() {
            return Err(LedgerError::NoCitations(check.id));
        }
        let mut seen = HashSet::new();
        for citation in &check.citations {
            if !seen.insert(&citation.id) {
                return Err(LedgerError::DuplicateCitation(citation.id.clone()));
            }
        }

        let job = ValidationJob::new(check.id.clone(), check.citations.len() as u32);
        self.items.extend(
            check
                .citations
                .iter()
                .map(|c| QueueItem::new(job.id, c.id.clone(), Tier::Panel)),
        );
        let mut check = check;
        check.status = CheckStatus::Processing;
        self.checks.retain(|c| c.id != check.id);
        self.checks.push(check);
        self.jobs.push(job.clone());
        Ok((job, true))
    }

    pub fn job(&self, id: &JobId) -> Result<&ValidationJob, LedgerError> {
        self.jobs
            .iter()
            .find(|j| &j.id == id)
            .ok_or(LedgerError::JobNotFound(*id))
    }

    pub fn job_for_check(&self, check_id: &CheckId) -> Option<&ValidationJob> {
        self.jobs.iter().find(|j| &j.check_id == check_id)
    }

    pub fn jobs(&self) -> &[ValidationJob] {
        &self.jobs
    }

    pub fn check(&self, id: &CheckId) -> Result<&DocumentCheck, LedgerError> {
        self.checks
            .iter()
            .find(|c| &c.id == id)
            .ok_or_else(|| LedgerError::CheckNotFound(id.clone()))
    }

    pub fn item(&self, id: &QueueItemId) -> Result<&QueueItem, LedgerError> {
        self.items
            .iter()
            .find(|i| &i.id == id)
            .ok_or(LedgerError::ItemNotFound(*id))
    }

    pub fn items_for_job(&self, job_id: &JobId) -> Vec<QueueItem> {
        self.items
            .iter()
            .filter(|i| &i.job_id == job_id)
            .cloned()
            .collect()
    }

    /// Items of `job_id` still pending or processing
    pub fn outstanding(&self, job_id: &JobId) -> usize {
        self.items
            .iter()
            .filter(|i| &i.job_id == job_id && i.status.is_outstanding())
            .count()
    }

    /// Oldest pending item whose job is still open
    pub fn next_pending(&self) -> Option<&QueueItem> {
        self.items.iter().find(|item| {
            item.status == QueueItemStatus::Pending
                && self
                    .jobs
                    .iter()
                    .any(|j| j.id == item.job_id && !j.status.is_terminal())
        })
    }

    pub fn mark_processing(&mut self, id: &QueueItemId) -> Result<QueueItem, LedgerError> {
        let item = self.item_mut(id)?;
        item.mark_processing()?;
        let item = item.clone();
        let job = self.job_mut(&item.job_id)?;
        if job.status == JobStatus::Pending {
            job.status = JobStatus::Processing;
        }
        Ok(item)
    }

    /// Claim up to `limit` pending items, moving each to processing.
    pub fn claim_batch(&mut self, limit: usize) -> Result<Vec<QueueItem>, LedgerError> {
        let mut claimed = Vec::new();
        while claimed.len() < limit {
            let Some(next) = self.next_pending().map(|i| i.id) else {
                break;
            };
            claimed.push(self.mark_processing(&next)?);
        }
        Ok(claimed)
    }

    /// Store a finished item's result, bump the job counter, write the result
    /// into the citation and, when asked, enqueue the tier-3 follow-up.
    ///
    /// Returns the new tier-3 item if one was created.
    pub fn mark_completed(
        &mut self,
        id: &QueueItemId,
        result: StageResult,
        needs_escalation: bool,
    ) -> Result<Option<QueueItem>, LedgerError> {
        // Validate everything before touching the ledger so a failed lookup
        // leaves no half-applied completion behind
        let mut updated = self.item(id)?.clone();
        updated.mark_completed(result.clone())?;
        let (job_id, citation_id, tier) = (updated.job_id, updated.citation_id.clone(), updated.tier);
        let check_id = self.job(&job_id)?.check_id.clone();
        let check_index = self
            .checks
            .iter()
            .position(|c| c.id == check_id)
            .ok_or_else(|| LedgerError::CheckNotFound(check_id.clone()))?;
        if self.checks[check_index].citation(&citation_id).is_none() {
            return Err(LedgerError::CitationNotFound {
                check: check_id,
                citation: citation_id,
            });
        }

        *self.item_mut(id)? = updated;
        self.job_mut(&job_id)?.record_completion(tier);
        if let Some(citation) = self.checks[check_index].citation_mut(&citation_id) {
            match result {
                StageResult::Consensus(consensus) => citation.tier2 = Some(consensus),
                StageResult::Investigation(investigation) => citation.tier3 = Some(investigation),
            }
        }

        if !needs_escalation || tier != Tier::Panel {
            return Ok(None);
        }
        let already_escalated = self.items.iter().any(|i| {
            i.job_id == job_id && i.citation_id == citation_id && i.tier == Tier::Investigation
        });
        if already_escalated {
            return Ok(None);
        }

        let follow_up = QueueItem::new(job_id, citation_id, Tier::Investigation);
        self.job_mut(&job_id)?.record_escalation();
        self.items.push(follow_up.clone());
        Ok(Some(follow_up))
    }

    pub fn mark_failed(
        &mut self,
        id: &QueueItemId,
        error: &str,
    ) -> Result<QueueItem, LedgerError> {
        let item = self.item_mut(id)?;
        item.mark_failed(error)?;
        Ok(item.clone())
    }

    pub fn requeue(&mut self, id: &QueueItemId) -> Result<QueueItem, LedgerError> {
        let item = self.item_mut(id)?;
        item.requeue()?;
        Ok(item.clone())
    }

    /// Fail the job without touching results already written.
    pub fn fail_job(
        &mut self,
        job_id: &JobId,
        reason: &str,
    ) -> Result<JobFailureReport, LedgerError> {
        let job = self.job_mut(job_id)?;
        job.fail(reason);
        let check_id = job.check_id.clone();
        if let Some(check) = self.checks.iter_mut().find(|c| c.id == check_id) {
            check.finish(CheckStatus::Failed);
        }
        self.failure_report(job_id)?
            .ok_or(LedgerError::JobNotFound(*job_id))
    }

    /// Close the job if nothing under it is pending or processing.
    ///
    /// Returns whether the job is completed.
    pub fn check_job_completion(&mut self, job_id: &JobId) -> Result<bool, LedgerError> {
        let outstanding = self.outstanding(job_id);
        let job = self.job_mut(job_id)?;
        match job.status {
            JobStatus::Completed => return Ok(true),
            JobStatus::Failed => return Ok(false),
            JobStatus::Pending | JobStatus::Processing => {}
        }
        if outstanding > 0 {
            return Ok(false);
        }
        job.complete();
        let check_id = job.check_id.clone();
        if let Some(check) = self.checks.iter_mut().find(|c| c.id == check_id) {
            check.finish(CheckStatus::Completed);
        }
        Ok(true)
    }

    /// Failure reason and unresolved citations, for failed jobs only
    pub fn failure_report(
        &self,
        job_id: &JobId,
    ) -> Result<Option<JobFailureReport>, LedgerError> {
        let job = self.job(job_id)?;
        if job.status != JobStatus::Failed {
            return Ok(None);
        }
        let check = self.check(&job.check_id)?;
        Ok(Some(JobFailureReport {
            job_id: job.id,
            reason: job.error.clone().unwrap_or_default(),
            unresolved_citations: check.unresolved().map(|c| c.id.clone()).collect(),
        }))
    }

    fn item_mut(&mut self, id: &QueueItemId) -> Result<&mut QueueItem, LedgerError> {
        self.items
            .iter_mut()
            .find(|i| &i.id == id)
            .ok_or(LedgerError::ItemNotFound(*id))
    }

    fn job_mut(&mut self, id: &JobId) -> Result<&mut ValidationJob, LedgerError> {
        self.jobs
            .iter_mut()
            .find(|j| &j.id == id)
            .ok_or(LedgerError::JobNotFound(*id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::citation::Citation;
    use crate::consensus::ConsensusCalculator;
    use crate::escalation::{FinalStatusResolver, InvestigatorReport, RiskLevel};
    use crate::verdict::AgentVerdict;

    fn check(n: usize) -> DocumentCheck {
        DocumentCheck::new(
            CheckId::new("chk-1"),
            (1..=n)
                .map(|i| Citation::new(format!("c{}", i), format!("{} U.S. {}", i, i * 10)))
                .collect(),
        )
    }

    fn consensus(scores: &[u8]) -> StageResult {
        let verdicts = scores
            .iter()
            .enumerate()
            .map(|(i, s)| AgentVerdict::scored(format!("panel-{}", i + 1), *s))
            .collect();
        StageResult::Consensus(ConsensusCalculator::new(scores.len()).calculate(verdicts).unwrap())
    }

    fn investigation() -> StageResult {
        let reports = (1..=3)
            .map(|i| InvestigatorReport::at_level(format!("inv-{}", i), RiskLevel::LowRisk))
            .collect();
        StageResult::Investigation(FinalStatusResolver::new(3).resolve(reports).unwrap())
    }

    #[test]
    fn test_create_job_is_idempotent() {
        let mut ledger = QueueLedger::new();
        let (first, created) = ledger.create_job(check(3)).unwrap();
        assert!(created);
        let (second, created) = ledger.create_job(check(3)).unwrap();
        assert!(!created);
        assert_eq!(first.id, second.id);
        assert_eq!(ledger.items_for_job(&first.id).len(), 3);
    }

    #[test]
    fn test_empty_check_is_rejected() {
        let mut ledger = QueueLedger::new();
        let err = ledger
            .create_job(DocumentCheck::new(CheckId::new("empty"), vec![]))
            .unwrap_err();
        assert!(matches!(err, LedgerError::NoCitations(_)));
        assert!(ledger.jobs().is_empty());
    }

    #[test]
    fn test_claim_batch_is_bounded_and_fifo() {
        let mut ledger = QueueLedger::new();
        ledger.create_job(check(7)).unwrap();

        let batch = ledger.claim_batch(5).unwrap();
        assert_eq!(batch.len(), 5);
        assert_eq!(batch[0].citation_id.as_str(), "c1");
        assert!(batch.iter().all(|i| i.status == QueueItemStatus::Processing));

        let rest = ledger.claim_batch(5).unwrap();
        assert_eq!(rest.len(), 2);
        assert!(ledger.claim_batch(5).unwrap().is_empty());
    }

    #[test]
    fn test_escalation_creates_tier3_item_once() {
        let mut ledger = QueueLedger::new();
        let (job, _) = ledger.create_job(check(1)).unwrap();
        let item = ledger.claim_batch(1).unwrap().remove(0);

        let split = consensus(&[9, 2, 8, 9, 3]);
        assert!(split.needs_escalation());
        let follow_up = ledger
            .mark_completed(&item.id, split, true)
            .unwrap()
            .expect("tier-3 item");
        assert_eq!(follow_up.tier, Tier::Investigation);

        let job = ledger.job(&job.id).unwrap().clone();
        assert_eq!(job.tier2_completed, 1);
        assert_eq!(job.tier3_total, 1);
        assert!(!ledger.check_job_completion(&job.id).unwrap());

        let tier3 = ledger.claim_batch(5).unwrap().remove(0);
        assert_eq!(tier3.id, follow_up.id);
        assert_eq!(ledger.mark_completed(&tier3.id, investigation(), true).unwrap(), None);

        assert!(ledger.check_job_completion(&job.id).unwrap());
        let check = ledger.check(&CheckId::new("chk-1")).unwrap();
        assert_eq!(check.status, CheckStatus::Completed);
        assert!(check.citations[0].tier2.is_some());
        assert!(check.citations[0].tier3.is_some());
    }

    #[test]
    fn test_completion_requires_no_outstanding_items() {
        let mut ledger = QueueLedger::new();
        let (job, _) = ledger.create_job(check(2)).unwrap();
        let batch = ledger.claim_batch(5).unwrap();

        ledger
            .mark_completed(&batch[0].id, consensus(&[9, 9, 8, 9, 9]), false)
            .unwrap();
        assert_eq!(ledger.outstanding(&job.id), 1);
        assert!(!ledger.check_job_completion(&job.id).unwrap());

        ledger
            .mark_completed(&batch[1].id, consensus(&[9, 9, 9, 9, 9]), false)
            .unwrap();
        assert!(ledger.check_job_completion(&job.id).unwrap());
        assert_eq!(ledger.job(&job.id).unwrap().status, JobStatus::Completed);
    }

    #[test]
    fn test_failed_job_keeps_sibling_results() {
        let mut ledger = QueueLedger::new();
        let (job, _) = ledger.create_job(check(2)).unwrap();
        let batch = ledger.claim_batch(5).unwrap();
        ledger
            .mark_completed(&batch[0].id, consensus(&[9, 9, 9, 9, 9]), false)
            .unwrap();
        ledger.mark_failed(&batch[1].id, "gateway down").unwrap();

        let report = ledger.fail_job(&job.id, "retries exhausted").unwrap();
        assert_eq!(report.reason, "retries exhausted");
        assert_eq!(report.unresolved_citations, vec![CitationId::new("c2")]);

        let check = ledger.check(&CheckId::new("chk-1")).unwrap();
        assert_eq!(check.status, CheckStatus::Failed);
        assert!(check.citations[0].tier2.is_some());
        assert!(!ledger.check_job_completion(&job.id).unwrap());
    }

    #[test]
    fn test_items_of_failed_jobs_are_not_dequeued() {
        let mut ledger = QueueLedger::new();
        let (job, _) = ledger.create_job(check(2)).unwrap();
        ledger.fail_job(&job.id, "cancelled").unwrap();
        assert!(ledger.next_pending().is_none());
        assert!(ledger.claim_batch(5).unwrap().is_empty());
    }

    #[test]
    fn test_result_tier_must_match_item() {
        let mut ledger = QueueLedger::new();
        ledger.create_job(check(1)).unwrap();
        let item = ledger.claim_batch(1).unwrap().remove(0);
        let err = ledger
            .mark_completed(&item.id, investigation(), false)
            .unwrap_err();
        assert!(matches!(err, LedgerError::Queue(QueueError::TierMismatch { .. })));
    }

    #[test]
    fn test_failed_completion_leaves_ledger_untouched() {
        let mut ledger = QueueLedger::new();
        ledger.create_job(check(2)).unwrap();
        ledger.claim_batch(5).unwrap();

        // Drop c2 from the stored check so its item points at nothing
        let mut value = serde_json::to_value(&ledger).unwrap();
        value["checks"][0]["citations"]
            .as_array_mut()
            .unwrap()
            .retain(|c| c["id"] != "c2");
        let mut ledger: QueueLedger = serde_json::from_value(value).unwrap();
        let before = ledger.clone();

        let orphan = ledger
            .items
            .iter()
            .find(|i| i.citation_id.as_str() == "c2")
            .unwrap()
            .id;
        let err = ledger
            .mark_completed(&orphan, consensus(&[9, 9, 9, 9, 9]), false)
            .unwrap_err();
        assert!(matches!(err, LedgerError::CitationNotFound { .. }));
        assert_eq!(ledger, before);
        assert_eq!(ledger.item(&orphan).unwrap().status, QueueItemStatus::Processing);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut ledger = QueueLedger::new();
        ledger.create_job(check(2)).unwrap();
        ledger.claim_batch(1).unwrap();
        let json = serde_json::to_string(&ledger).unwrap();
        let restored: QueueLedger = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, ledger);
    }
}
