//! Test doubles shared by the use case tests.

use crate::ports::agent_gateway::{AgentGateway, AgentReply, GatewayError, TokenUsage};
use crate::ports::audit_log::{AuditEvent, AuditLogger};
use crate::ports::progress::PipelineProgress;
use crate::ports::validation_store::{JobCreation, StoreError, ValidationStore};
use async_trait::async_trait;
use citeguard_domain::{
    AgentSpec, CheckId, DocumentCheck, InvestigatorPersona, JobFailureReport, JobId, QueueItem,
    QueueItemId, QueueLedger, StageResult, ValidationJob,
};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

/// A scripted answer for the mock gateway
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    Text(String),
    /// Answer after sleeping (drives timeout tests under paused time)
    Delayed(Duration, String),
    Error(GatewayError),
}

impl ScriptedReply {
    pub fn text(text: impl Into<String>) -> Self {
        ScriptedReply::Text(text.into())
    }
}

/// Mock gateway that answers from per-model queues
#[derive(Default)]
pub struct ScriptedGateway {
    scripts: Mutex<HashMap<String, VecDeque<ScriptedReply>>>,
    /// Used when a model's queue is empty or absent
    default_reply: Option<ScriptedReply>,
    prompts: Mutex<HashMap<String, Vec<String>>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(self, model: &str, replies: Vec<ScriptedReply>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .entry(model.to_string())
            .or_default()
            .extend(replies);
        self
    }

    pub fn with_default(mut self, reply: ScriptedReply) -> Self {
        self.default_reply = Some(reply);
        self
    }

    pub fn calls(&self, model: &str) -> usize {
        self.prompts
            .lock()
            .unwrap()
            .get(model)
            .map_or(0, Vec::len)
    }

    pub fn prompts(&self, model: &str) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap()
            .get(model)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl AgentGateway for ScriptedGateway {
    async fn complete(
        &self,
        model: &str,
        _system_prompt: &str,
        prompt: &str,
    ) -> Result<AgentReply, GatewayError> {
        self.prompts
            .lock()
            .unwrap()
            .entry(model.to_string())
            .or_default()
            .push(prompt.to_string());

        let next = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(model)
            .and_then(VecDeque::pop_front)
            .or_else(|| self.default_reply.clone())
            .unwrap_or_else(|| {
                ScriptedReply::Error(GatewayError::InvalidRequest(format!(
                    "no script for {}",
                    model
                )))
            });

        let usage = TokenUsage::new(prompt.len() as u64 / 4, 20);
        match next {
            ScriptedReply::Text(text) => Ok(AgentReply::new(text, usage)),
            ScriptedReply::Delayed(delay, text) => {
                tokio::time::sleep(delay).await;
                Ok(AgentReply::new(text, usage))
            }
            ScriptedReply::Error(e) => Err(e),
        }
    }
}

/// Audit logger that remembers event types
#[derive(Default)]
pub struct RecordingAudit {
    events: Mutex<Vec<AuditEvent>>,
}

impl RecordingAudit {
    pub fn event_types(&self) -> Vec<&'static str> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.event_type)
            .collect()
    }
}

impl AuditLogger for RecordingAudit {
    fn log(&self, event: AuditEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Progress notifier that counts callbacks
#[derive(Default)]
pub struct CountingProgress {
    pub batches: Mutex<Vec<usize>>,
    pub escalations: Mutex<usize>,
    pub failures: Mutex<usize>,
}

impl PipelineProgress for CountingProgress {
    fn on_batch_start(&self, items: usize) {
        self.batches.lock().unwrap().push(items);
    }

    fn on_item_complete(&self, _item: &QueueItem, success: bool) {
        if !success {
            *self.failures.lock().unwrap() += 1;
        }
    }

    fn on_escalation(&self, _item: &QueueItem) {
        *self.escalations.lock().unwrap() += 1;
    }
}

/// Store backed by a [`QueueLedger`] behind a std mutex
#[derive(Default)]
pub struct MemoryStore {
    ledger: Mutex<QueueLedger>,
    /// Upcoming `mark_completed` calls that fail with a backend error
    completion_failures: Mutex<u32>,
}

impl MemoryStore {
    pub fn fail_next_completions(&self, n: u32) {
        *self.completion_failures.lock().unwrap() = n;
    }

    fn with<T>(
        &self,
        f: impl FnOnce(&mut QueueLedger) -> Result<T, citeguard_domain::LedgerError>,
    ) -> Result<T, StoreError> {
        Ok(f(&mut self.ledger.lock().unwrap())?)
    }
}

#[async_trait]
impl ValidationStore for MemoryStore {
    async fn create_job(&self, check: DocumentCheck) -> Result<JobCreation, StoreError> {
        self.with(|l| l.create_job(check))
            .map(|(job, created)| JobCreation { job, created })
    }

    async fn get_job(&self, job_id: &JobId) -> Result<ValidationJob, StoreError> {
        self.with(|l| l.job(job_id).cloned())
    }

    async fn find_job_by_check(
        &self,
        check_id: &CheckId,
    ) -> Result<Option<ValidationJob>, StoreError> {
        self.with(|l| Ok(l.job_for_check(check_id).cloned()))
    }

    async fn get_check(&self, check_id: &CheckId) -> Result<DocumentCheck, StoreError> {
        self.with(|l| l.check(check_id).cloned())
    }

    async fn list_items(&self, job_id: &JobId) -> Result<Vec<QueueItem>, StoreError> {
        self.with(|l| Ok(l.items_for_job(job_id)))
    }

    async fn next_pending_item(&self) -> Result<Option<QueueItem>, StoreError> {
        self.with(|l| Ok(l.next_pending().cloned()))
    }

    async fn mark_processing(&self, item_id: &QueueItemId) -> Result<QueueItem, StoreError> {
        self.with(|l| l.mark_processing(item_id))
    }

    async fn dequeue_batch(&self, limit: usize) -> Result<Vec<QueueItem>, StoreError> {
        self.with(|l| l.claim_batch(limit))
    }

    async fn mark_completed(
        &self,
        item_id: &QueueItemId,
        result: StageResult,
        needs_escalation: bool,
    ) -> Result<Option<QueueItem>, StoreError> {
        {
            let mut remaining = self.completion_failures.lock().unwrap();
            if *remaining > 0 {
                *remaining -= 1;
                return Err(StoreError::Backend("write rejected".to_string()));
            }
        }
        self.with(|l| l.mark_completed(item_id, result, needs_escalation))
    }

    async fn mark_failed(&self, item_id: &QueueItemId, error: &str) -> Result<QueueItem, StoreError> {
        self.with(|l| l.mark_failed(item_id, error))
    }

    async fn requeue(&self, item_id: &QueueItemId) -> Result<QueueItem, StoreError> {
        self.with(|l| l.requeue(item_id))
    }

    async fn fail_job(&self, job_id: &JobId, reason: &str) -> Result<JobFailureReport, StoreError> {
        self.with(|l| l.fail_job(job_id, reason))
    }

    async fn check_job_completion(&self, job_id: &JobId) -> Result<bool, StoreError> {
        self.with(|l| l.check_job_completion(job_id))
    }

    async fn failure_report(
        &self,
        job_id: &JobId,
    ) -> Result<Option<JobFailureReport>, StoreError> {
        self.with(|l| l.failure_report(job_id))
    }
}

/// `panel-1..n` on `model-1..n`
pub fn panel_agents(n: usize) -> Vec<AgentSpec> {
    (1..=n)
        .map(|i| AgentSpec::new(format!("panel-{}", i), format!("model-{}", i)))
        .collect()
}

/// One investigator per persona on `inv-model-1..3`
pub fn investigators() -> Vec<AgentSpec> {
    InvestigatorPersona::ALL
        .iter()
        .enumerate()
        .map(|(i, p)| {
            AgentSpec::new(format!("inv-{}", i + 1), format!("inv-model-{}", i + 1)).with_persona(*p)
        })
        .collect()
}

/// `SCORE: n` answer
pub fn score(n: u8) -> ScriptedReply {
    ScriptedReply::text(format!("SCORE: {}\nREASONING: scripted", n))
}

/// `RISK_LEVEL:` answer
pub fn risk(level: &str) -> ScriptedReply {
    ScriptedReply::text(format!(
        "RISK_LEVEL: {}\nCONFIDENCE: 0.8\nREASONING: scripted",
        level
    ))
}
