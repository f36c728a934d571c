//! Queue items and their state machine

use crate::consensus::ConsensusResult;
use crate::core::ids::{CitationId, JobId, QueueItemId};
use crate::core::tier::Tier;
use crate::core::time::now_millis;
use crate::escalation::Tier3Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueItemStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl QueueItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueueItemStatus::Pending => "pending",
            QueueItemStatus::Processing => "processing",
            QueueItemStatus::Completed => "completed",
            QueueItemStatus::Failed => "failed",
        }
    }

    /// Whether the item still needs work
    pub fn is_outstanding(&self) -> bool {
        matches!(self, QueueItemStatus::Pending | QueueItemStatus::Processing)
    }

    pub fn can_transition_to(&self, next: QueueItemStatus) -> bool {
        use QueueItemStatus::*;
        matches!(
            (self, next),
            (Pending, Processing)
                | (Processing, Completed)
                | (Processing, Failed)
                | (Failed, Pending)
        )
    }
}

impl fmt::Display for QueueItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    #[error("Invalid queue transition {from} -> {to} for item {item}")]
    InvalidTransition {
        item: QueueItemId,
        from: QueueItemStatus,
        to: QueueItemStatus,
    },

    #[error("Result for item {item} does not match its tier ({tier})")]
    TierMismatch { item: QueueItemId, tier: Tier },
}

/// Stored output of a completed item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tier", content = "result")]
pub enum StageResult {
    #[serde(rename = "tier2")]
    Consensus(ConsensusResult),
    #[serde(rename = "tier3")]
    Investigation(Tier3Result),
}

impl StageResult {
    pub fn tier(&self) -> Tier {
        match self {
            StageResult::Consensus(_) => Tier::Panel,
            StageResult::Investigation(_) => Tier::Investigation,
        }
    }

    /// Only a Stage-2 consensus can ask for escalation
    pub fn needs_escalation(&self) -> bool {
        match self {
            StageResult::Consensus(c) => c.escalation_trigger,
            StageResult::Investigation(_) => false,
        }
    }
}

/// One unit of work: one citation at one tier of one job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueItem {
    pub id: QueueItemId,
    pub job_id: JobId,
    pub citation_id: CitationId,
    pub tier: Tier,
    pub status: QueueItemStatus,
    /// Failures so far; each requeue consumes one retry
    pub retry_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<StageResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    pub created_at: u64,
    pub updated_at: u64,
}

impl QueueItem {
    pub fn new(job_id: JobId, citation_id: CitationId, tier: Tier) -> Self {
        let now = now_millis();
        Self {
            id: QueueItemId::new(),
            job_id,
            citation_id,
            tier,
            status: QueueItemStatus::Pending,
            retry_count: 0,
            result: None,
            last_error: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn transition(&mut self, to: QueueItemStatus) -> Result<(), QueueError> {
        if !self.status.can_transition_to(to) {
            return Err(QueueError::InvalidTransition {
                item: self.id,
                from: self.status,
                to,
            });
        }
        self.status = to;
        self.updated_at = now_millis();
        Ok(())
    }

    pub fn mark_processing(&mut self) -> Result<(), QueueError> {
        self.transition(QueueItemStatus::Processing)
    }

    pub fn mark_completed(&mut self, result: StageResult) -> Result<(), QueueError> {
        if result.tier() != self.tier {
            return Err(QueueError::TierMismatch {
                item: self.id,
                tier: self.tier,
            });
        }
        self.transition(QueueItemStatus::Completed)?;
        self.result = Some(result);
        self.last_error = None;
        Ok(())
    }

    pub fn mark_failed(&mut self, error: impl Into<String>) -> Result<(), QueueError> {
        self.transition(QueueItemStatus::Failed)?;
        self.last_error = Some(error.into());
        Ok(())
    }

    /// Put a failed item back in the queue, consuming one retry.
    pub fn requeue(&mut self) -> Result<(), QueueError> {
        self.transition(QueueItemStatus::Pending)?;
        self.retry_count += 1;
        Ok(())
    }
}
