//! Consistency analysis over completed runs
//!
//! A run is one finished document check. Runs that did not complete are
//! skipped: a failed run would report unresolved citations as disagreement.

use crate::ports::validation_store::{StoreError, ValidationStore};
use citeguard_domain::{CheckId, CheckStatus, ConsistencyAnalyzer, ConsistencyReport, DocumentCheck};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum AnalyzeError {
    #[error("No completed runs to analyze ({skipped} skipped)")]
    NoRuns { skipped: usize },

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct AnalyzeConsistencyUseCase<S: ValidationStore + 'static> {
    store: Arc<S>,
    analyzer: ConsistencyAnalyzer,
}

impl<S: ValidationStore + 'static> AnalyzeConsistencyUseCase<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            analyzer: ConsistencyAnalyzer::new(),
        }
    }

    /// Analyze checks held by the store
    pub async fn execute(&self, check_ids: &[CheckId]) -> Result<ConsistencyReport, AnalyzeError> {
        let mut runs = Vec::with_capacity(check_ids.len());
        for id in check_ids {
            runs.push(self.store.get_check(id).await?);
        }
        analyze_runs(&self.analyzer, runs)
    }
}

/// Analyze runs loaded from elsewhere (snapshots)
pub fn analyze_runs(
    analyzer: &ConsistencyAnalyzer,
    runs: Vec<DocumentCheck>,
) -> Result<ConsistencyReport, AnalyzeError> {
    let total = runs.len();
    let completed: Vec<DocumentCheck> = runs
        .into_iter()
        .filter(|run| {
            let done = run.status == CheckStatus::Completed;
            if !done {
                warn!(check = %run.id, status = ?run.status, "Skipping incomplete run");
            }
            done
        })
        .collect();

    if completed.is_empty() {
        return Err(AnalyzeError::NoRuns { skipped: total });
    }
    info!(runs = completed.len(), skipped = total - completed.len(), "Analyzing consistency");
    Ok(analyzer.analyze(&completed))
}
