//! Progress reporting for pipeline runs.

use crate::pipeline::Stage;
use fuselab_core::normalize::DropLog;

/// Progress callback for pipeline stage boundaries.
pub trait StageProgress: Send {
    /// Called when a stage begins.
    fn on_stage_start(&self, stage: Stage);

    /// Called when a stage finishes, with a one-line detail string.
    fn on_stage_complete(&self, stage: Stage, detail: &str);

    /// Called once per source after normalization with its drop log.
    fn on_drops(&self, log: &DropLog);
}

/// Simple progress reporter that prints to stdout.
pub struct StdoutProgress;

impl StageProgress for StdoutProgress {
    fn on_stage_start(&self, stage: Stage) {
        println!("[{stage}] starting...");
    }

    fn on_stage_complete(&self, stage: Stage, detail: &str) {
        println!("[{stage}] done: {detail}");
    }

    fn on_drops(&self, log: &DropLog) {
        if log.total_dropped() == 0 && log.skipped_columns.is_empty() {
            println!("  {}: {} rows kept, nothing dropped", log.source, log.kept);
            return;
        }
        println!(
            "  {}: {} rows kept, {} dropped",
            log.source,
            log.kept,
            log.total_dropped()
        );
        for (reason, count) in log.counts() {
            println!("    {reason:?}: {count}");
        }
        if !log.skipped_columns.is_empty() {
            println!("    skipped columns: {}", log.skipped_columns.join(", "));
        }
    }
}

/// Progress reporter that discards everything; used by tests.
pub struct SilentProgress;

impl StageProgress for SilentProgress {
    fn on_stage_start(&self, _stage: Stage) {}
    fn on_stage_complete(&self, _stage: Stage, _detail: &str) {}
    fn on_drops(&self, _log: &DropLog) {}
}
