//! Progress notification port
//!
//! Defines the interface for reporting progress while a job drains.

use citeguard_domain::{JobProgress, QueueItem};

/// Callback for progress updates during queue processing
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (progress bars, logs, etc.)
pub trait PipelineProgress: Send + Sync {
    /// Called when a batch has been claimed
    fn on_batch_start(&self, items: usize);

    /// Called after each item settles (completed, requeued or failed)
    fn on_item_complete(&self, item: &QueueItem, success: bool);

    /// Called when an item escalates to Stage 3
    fn on_escalation(&self, _item: &QueueItem) {}

    /// Called with fresh job counters after each batch
    fn on_job_progress(&self, _progress: &JobProgress) {}

    /// Called once the queue is drained
    fn on_drained(&self) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl PipelineProgress for NoProgress {
    fn on_batch_start(&self, _items: usize) {}
    fn on_item_complete(&self, _item: &QueueItem, _success: bool) {}
}
