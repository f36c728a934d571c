//! Validation job progress

use crate::core::ids::{CheckId, CitationId, JobId};
use crate::core::tier::Tier;
use crate::core::time::now_millis;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        })
    }
}

/// One validation run over one document check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationJob {
    pub id: JobId,
    pub check_id: CheckId,
    pub status: JobStatus,
    pub tier2_total: u32,
    pub tier2_completed: u32,
    pub tier3_total: u32,
    pub tier3_completed: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<u64>,
}

impl ValidationJob {
    pub fn new(check_id: CheckId, tier2_total: u32) -> Self {
        Self {
            id: JobId::new(),
            check_id,
            status: JobStatus::Pending,
            tier2_total,
            tier2_completed: 0,
            tier3_total: 0,
            tier3_completed: 0,
            error: None,
            created_at: now_millis(),
            finished_at: None,
        }
    }

    pub fn record_completion(&mut self, tier: Tier) {
        match tier {
            Tier::Panel => self.tier2_completed += 1,
            Tier::Investigation => self.tier3_completed += 1,
        }
        if self.status == JobStatus::Pending {
            self.status = JobStatus::Processing;
        }
    }

    pub fn record_escalation(&mut self) {
        self.tier3_total += 1;
    }

    pub fn complete(&mut self) {
        self.status = JobStatus::Completed;
        self.finished_at = Some(now_millis());
    }

    pub fn fail(&mut self, reason: impl Into<String>) {
        self.status = JobStatus::Failed;
        self.error = Some(reason.into());
        self.finished_at = Some(now_millis());
    }

    pub fn progress(&self) -> JobProgress {
        JobProgress {
            status: self.status,
            tier2_total: self.tier2_total,
            tier2_completed: self.tier2_completed,
            tier3_total: self.tier3_total,
            tier3_completed: self.tier3_completed,
        }
    }
}

/// Snapshot of a job's counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobProgress {
    pub status: JobStatus,
    pub tier2_total: u32,
    pub tier2_completed: u32,
    pub tier3_total: u32,
    pub tier3_completed: u32,
}

impl JobProgress {
    pub fn completed_units(&self) -> u32 {
        self.tier2_completed + self.tier3_completed
    }

    pub fn total_units(&self) -> u32 {
        self.tier2_total + self.tier3_total
    }

    /// Percent of known work done. Tier-3 work appears as escalations happen,
    /// so this can move backwards.
    pub fn percent(&self) -> f64 {
        let total = self.total_units();
        if total == 0 {
            return 0.0;
        }
        self.completed_units() as f64 * 100.0 / total as f64
    }
}

/// What a failed job reports to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobFailureReport {
    pub job_id: JobId,
    pub reason: String,
    pub unresolved_citations: Vec<CitationId>,
}
