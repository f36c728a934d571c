//! Progress reporting for validation jobs

use citeguard_application::PipelineProgress;
use citeguard_domain::{JobProgress, QueueItem, Tier};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Reports queue progress with a progress bar on stderr
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    pub fn new() -> Self {
        let bar = ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::stderr());
        bar.set_style(Self::style());
        bar.set_prefix("Verifying");
        bar.set_message("Starting...");
        Self { bar }
    }

    fn style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

fn stage(tier: Tier) -> &'static str {
    match tier {
        Tier::Panel => "Stage 2",
        Tier::Investigation => "Stage 3",
    }
}

impl PipelineProgress for ProgressReporter {
    fn on_batch_start(&self, items: usize) {
        self.bar.set_message(format!("batch of {}", items));
    }

    fn on_item_complete(&self, item: &QueueItem, success: bool) {
        let status = if success {
            format!("{} {} {}", "v".green(), item.citation_id, stage(item.tier))
        } else {
            format!("{} {} {}", "x".red(), item.citation_id, stage(item.tier))
        };
        self.bar.set_message(status);
    }

    fn on_escalation(&self, item: &QueueItem) {
        self.bar.println(format!(
            "  {} {} escalated to Stage 3",
            "!".yellow(),
            item.citation_id
        ));
    }

    // Escalations grow the total mid-run, so length is reset on every update
    fn on_job_progress(&self, progress: &JobProgress) {
        self.bar.set_length(progress.total_units() as u64);
        self.bar.set_position(progress.completed_units() as u64);
    }

    fn on_drained(&self) {
        self.bar.finish_with_message(format!("{}", "done".green()));
    }
}

/// Simple line-based progress for non-interactive output
pub struct SimpleProgress;

impl PipelineProgress for SimpleProgress {
    fn on_batch_start(&self, items: usize) {
        eprintln!("{} batch of {} items", "->".cyan(), items);
    }

    fn on_item_complete(&self, item: &QueueItem, success: bool) {
        if success {
            eprintln!("  {} {} ({})", "v".green(), item.citation_id, stage(item.tier));
        } else {
            eprintln!(
                "  {} {} ({}, retry {})",
                "x".red(),
                item.citation_id,
                stage(item.tier),
                item.retry_count
            );
        }
    }

    fn on_escalation(&self, item: &QueueItem) {
        eprintln!("  {} {} escalated", "!".yellow(), item.citation_id);
    }

    fn on_job_progress(&self, progress: &JobProgress) {
        eprintln!(
            "  {} {}/{} ({:.0}%)",
            "=".dimmed(),
            progress.completed_units(),
            progress.total_units(),
            progress.percent()
        );
    }
}
