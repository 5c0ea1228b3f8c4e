//! FuseLab Runner — pipeline orchestration around the fusion core.
//!
//! Responsibilities:
//! - Configuration loading and deterministic run IDs
//! - Source CSV loading and schema validation
//! - Stage sequencing with per-stage error attribution
//! - Data-parallel derived metrics across tickers
//! - Sink adapters (CSV, atomic commit)
//! - Run summaries and synthetic source generation

pub mod config;
pub mod loader;
pub mod pipeline;
pub mod progress;
pub mod sink;
pub mod summary;
pub mod synthetic;

pub use config::{PipelineConfig, RunId};
pub use pipeline::{execute, run_pipeline, PipelineError, PipelineOutput, Stage};
pub use progress::{SilentProgress, StageProgress, StdoutProgress};
pub use sink::{CsvSink, Sink, SinkError};
pub use summary::RunSummary;
