//! Job Orchestrator
//!
//! Drives a document check through the pipeline: one tier-2 item per
//! citation, a tier-3 item for each escalation, bounded batches until the
//! queue is drained.
//!
//! Two retry budgets apply. The [`AgentInvoker`] retries single oracle calls;
//! this orchestrator retries whole queue items, up to
//! [`PipelineParams::max_item_retries`] requeues, before failing the job.

use super::invoke_agent::AgentInvoker;
use super::run_escalation::EscalationInvestigator;
use super::run_panel::{PanelError, PanelEvaluator};
use crate::config::PipelineParams;
use crate::ports::agent_gateway::AgentGateway;
use crate::ports::audit_log::{AuditEvent, AuditLogger, NoAuditLog};
use crate::ports::progress::{NoProgress, PipelineProgress};
use crate::ports::validation_store::{JobCreation, StoreError, ValidationStore};
use citeguard_domain::{
    CheckId, Citation, CitationId, ConsensusCalculator, DocumentCheck, FinalStatusResolver,
    JobFailureReport, JobId, JobProgress, QueueItem, StageResult, Tier,
};
use futures::future::join_all;
use serde_json::json;
use std::collections::BTreeSet;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("Cannot create a validation job without citations")]
    NoCitations,

    #[error("Citation {citation} of job {job} is missing from its check")]
    CitationMissing { job: JobId, citation: CitationId },

    #[error(transparent)]
    Stage(#[from] PanelError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// How one queue item settled
#[derive(Debug, Clone, PartialEq)]
pub enum ItemOutcome {
    Completed { escalated: bool },
    /// Failed and put back; `retry_count` requeues used so far
    Requeued { retry_count: u32 },
    /// Failed with no retries left, taking its job down
    JobFailed(JobFailureReport),
}

/// Totals for one drain
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainSummary {
    pub batches: usize,
    pub items: usize,
    pub completed: usize,
    pub requeued: usize,
    pub escalated: usize,
    pub errors: usize,
}

impl DrainSummary {
    fn absorb(&mut self, outcome: &Result<ItemOutcome, OrchestratorError>) {
        self.items += 1;
        match outcome {
            Ok(ItemOutcome::Completed { escalated }) => {
                self.completed += 1;
                if *escalated {
                    self.escalated += 1;
                }
            }
            Ok(ItemOutcome::Requeued { .. }) => self.requeued += 1,
            Ok(ItemOutcome::JobFailed(_)) | Err(_) => self.errors += 1,
        }
    }
}

/// Worker that drains the validation queue
pub struct JobOrchestrator<G: AgentGateway + 'static, S: ValidationStore + 'static> {
    store: Arc<S>,
    panel: PanelEvaluator<G>,
    investigator: EscalationInvestigator<G>,
    params: PipelineParams,
    progress: Arc<dyn PipelineProgress>,
    audit: Arc<dyn AuditLogger>,
}

impl<G: AgentGateway + 'static, S: ValidationStore + 'static> JobOrchestrator<G, S> {
    pub fn new(invoker: Arc<AgentInvoker<G>>, store: Arc<S>, params: PipelineParams) -> Self {
        Self {
            store,
            panel: PanelEvaluator::new(Arc::clone(&invoker)),
            investigator: EscalationInvestigator::new(invoker),
            params,
            progress: Arc::new(NoProgress),
            audit: Arc::new(NoAuditLog),
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn PipelineProgress>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_audit(mut self, audit: Arc<dyn AuditLogger>) -> Self {
        self.audit = audit;
        self
    }

    pub fn params(&self) -> &PipelineParams {
        &self.params
    }

    // ==================== Job lifecycle ====================

    /// Create the job for `check_id`, or return the one it already has.
    pub async fn create_validation_job(
        &self,
        check_id: CheckId,
        citations: Vec<Citation>,
    ) -> Result<JobCreation, OrchestratorError> {
        self.submit_check(DocumentCheck::new(check_id, citations))
            .await
    }

    /// Like [`create_validation_job`](Self::create_validation_job) for a
    /// fully built check.
    pub async fn submit_check(
        &self,
        check: DocumentCheck,
    ) -> Result<JobCreation, OrchestratorError> {
        if check.citations.is_empty() {
            return Err(OrchestratorError::NoCitations);
        }
        let check_id = check.id.clone();
        let creation = self.store.create_job(check).await?;
        if creation.created {
            info!(
                job = %creation.job.id,
                check = %check_id,
                citations = creation.job.tier2_total,
                "Validation job created"
            );
        } else {
            debug!(job = %creation.job.id, check = %check_id, "Reusing existing job");
        }
        Ok(creation)
    }

    pub async fn job_progress(&self, job_id: &JobId) -> Result<JobProgress, OrchestratorError> {
        Ok(self.store.get_job(job_id).await?.progress())
    }

    pub async fn failure_report(
        &self,
        job_id: &JobId,
    ) -> Result<Option<JobFailureReport>, OrchestratorError> {
        Ok(self.store.failure_report(job_id).await?)
    }

    /// The check as it stands, results written so far included
    pub async fn check(&self, check_id: &CheckId) -> Result<DocumentCheck, OrchestratorError> {
        Ok(self.store.get_check(check_id).await?)
    }

    // ==================== Draining ====================

    /// Process batches until nothing is pending.
    pub async fn run_until_drained(&self) -> Result<DrainSummary, OrchestratorError> {
        self.drain(None).await
    }

    /// Like [`run_until_drained`](Self::run_until_drained), stopping between
    /// batches once `cancel` fires. A batch in flight always finishes.
    pub async fn run_until_cancelled(
        &self,
        cancel: CancellationToken,
    ) -> Result<DrainSummary, OrchestratorError> {
        self.drain(Some(cancel)).await
    }

    /// Drain on a background task without blocking the caller.
    pub fn spawn_drain(self: Arc<Self>) -> JoinHandle<Result<DrainSummary, OrchestratorError>> {
        tokio::spawn(async move { self.run_until_drained().await })
    }

    async fn drain(
        &self,
        cancel: Option<CancellationToken>,
    ) -> Result<DrainSummary, OrchestratorError> {
        let mut summary = DrainSummary::default();
        loop {
            if cancel.as_ref().is_some_and(CancellationToken::is_cancelled) {
                info!(batches = summary.batches, "Drain cancelled");
                break;
            }
            let outcomes = self.process_batch().await?;
            if outcomes.is_empty() {
                break;
            }
            summary.batches += 1;
            for outcome in &outcomes {
                summary.absorb(outcome);
            }
        }
        self.progress.on_drained();
        info!(
            batches = summary.batches,
            items = summary.items,
            escalated = summary.escalated,
            "Queue drained"
        );
        Ok(summary)
    }

    /// Claim up to `batch_size` items and process them concurrently.
    ///
    /// Returns one outcome per claimed item; an empty vector means the queue
    /// had nothing pending.
    pub async fn process_batch(
        &self,
    ) -> Result<Vec<Result<ItemOutcome, OrchestratorError>>, OrchestratorError> {
        let items = self.store.dequeue_batch(self.params.batch_size).await?;
        if items.is_empty() {
            return Ok(Vec::new());
        }
        debug!(items = items.len(), "Batch claimed");
        self.progress.on_batch_start(items.len());

        let jobs: BTreeSet<JobId> = items.iter().map(|i| i.job_id).collect();
        let outcomes = join_all(items.into_iter().map(|item| self.process_item(item))).await;

        for outcome in &outcomes {
            if let Err(e) = outcome {
                error!(error = %e, "Queue item could not be settled");
            }
        }
        for job_id in &jobs {
            self.store.check_job_completion(job_id).await?;
            let progress = self.job_progress(job_id).await?;
            self.progress.on_job_progress(&progress);
        }
        Ok(outcomes)
    }

    /// Run one claimed item to a settled state.
    ///
    /// Anything that goes wrong before the result is recorded, store errors
    /// included, counts as an item failure so the item never stays claimed.
    pub async fn process_item(&self, item: QueueItem) -> Result<ItemOutcome, OrchestratorError> {
        match self.complete_item(&item).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                let outcome = self.settle_failure(&item, &e.to_string()).await;
                self.progress.on_item_complete(&item, false);
                outcome
            }
        }
    }

    async fn complete_item(&self, item: &QueueItem) -> Result<ItemOutcome, OrchestratorError> {
        let job = self.store.get_job(&item.job_id).await?;
        let check = self.store.get_check(&job.check_id).await?;
        let citation = check
            .citation(&item.citation_id)
            .cloned()
            .ok_or_else(|| OrchestratorError::CitationMissing {
                job: job.id,
                citation: item.citation_id.clone(),
            })?;

        let result = match item.tier {
            Tier::Panel => self.run_panel(&citation).await?,
            Tier::Investigation => self.run_investigation(&citation).await?,
        };
        let needs_escalation = result.needs_escalation();
        let follow_up = self
            .store
            .mark_completed(&item.id, result, needs_escalation)
            .await?;

        if follow_up.is_some() {
            info!(job = %item.job_id, citation = %item.citation_id, "Citation escalated to stage 3");
            self.progress.on_escalation(item);
        }
        self.progress.on_item_complete(item, true);
        // The batch re-checks every touched job, so a miss here is not final
        match self.store.check_job_completion(&item.job_id).await {
            Ok(true) => info!(job = %item.job_id, "Validation job completed"),
            Ok(false) => {}
            Err(e) => warn!(job = %item.job_id, error = %e, "Job completion check failed"),
        }
        Ok(ItemOutcome::Completed {
            escalated: follow_up.is_some(),
        })
    }

    async fn settle_failure(
        &self,
        item: &QueueItem,
        reason: &str,
    ) -> Result<ItemOutcome, OrchestratorError> {
        let failed = self.store.mark_failed(&item.id, reason).await?;
        warn!(
            job = %item.job_id,
            item = %item.id,
            citation = %item.citation_id,
            tier = %item.tier,
            retry_count = failed.retry_count,
            error = reason,
            "Queue item failed"
        );
        self.audit.log(AuditEvent::new(
            "item_failed",
            json!({
                "job": item.job_id.to_string(),
                "item": item.id.to_string(),
                "citation": item.citation_id.to_string(),
                "tier": item.tier.as_str(),
                "retry_count": failed.retry_count,
                "error": reason,
            }),
        ));

        if failed.retry_count < self.params.max_item_retries {
            let requeued = self.store.requeue(&item.id).await?;
            return Ok(ItemOutcome::Requeued {
                retry_count: requeued.retry_count,
            });
        }

        let diagnostic = format!(
            "citation {} failed at {} after {} attempts: {}",
            item.citation_id,
            item.tier,
            failed.retry_count + 1,
            reason
        );
        let report = self.store.fail_job(&item.job_id, &diagnostic).await?;
        error!(
            job = %item.job_id,
            unresolved = report.unresolved_citations.len(),
            "Validation job failed: {}",
            diagnostic
        );
        self.audit.log(AuditEvent::new(
            "job_failed",
            json!({
                "job": item.job_id.to_string(),
                "reason": diagnostic,
                "unresolved": report
                    .unresolved_citations
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>(),
            }),
        ));
        Ok(ItemOutcome::JobFailed(report))
    }

    async fn run_panel(&self, citation: &Citation) -> Result<StageResult, PanelError> {
        let verdicts = self
            .panel
            .evaluate(citation, &self.params.panel)
            .await?
            .into_complete()?;
        let consensus = ConsensusCalculator::new(self.params.panel.len()).calculate(verdicts)?;
        debug!(
            citation = %citation.id,
            agreement = %consensus.agreement_level,
            votes = %consensus.vote_summary(),
            escalate = consensus.escalation_trigger,
            "Stage 2 consensus"
        );
        Ok(StageResult::Consensus(consensus))
    }

    async fn run_investigation(&self, citation: &Citation) -> Result<StageResult, PanelError> {
        let consensus = citation.tier2.as_ref().ok_or(PanelError::NotEscalated)?;
        let reports = self
            .investigator
            .investigate(citation, consensus, &self.params.investigators)
            .await?
            .into_complete()?;
        let resolved =
            FinalStatusResolver::new(self.params.investigators.len()).resolve(reports)?;
        debug!(
            citation = %citation.id,
            risk = %resolved.final_risk_level(),
            "Stage 3 resolved"
        );
        Ok(StageResult::Investigation(resolved))
    }
}
