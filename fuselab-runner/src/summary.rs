//! Run summary and text report.

use crate::pipeline::PipelineOutput;
use chrono::NaiveDate;
use fuselab_core::aggregate::rank_top_performing;
use fuselab_core::correlate::CorrelationPair;
use fuselab_core::normalize::DropLog;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Everything worth keeping about a completed run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: String,
    pub axis_start: NaiveDate,
    pub axis_end: NaiveDate,
    pub axis_days: usize,
    pub ticker_count: usize,
    /// Output table name → row count.
    pub row_counts: BTreeMap<String, usize>,
    pub drops: Vec<DropLog>,
    /// BLAKE3 over the merged table, for dataset provenance.
    pub dataset_hash: String,
    /// Best-performing sectors on the final axis date.
    pub top_sectors: Vec<String>,
    pub top_pairs: Vec<CorrelationPair>,
}

impl RunSummary {
    pub fn from_output(output: &PipelineOutput) -> Self {
        let mut row_counts = BTreeMap::new();
        row_counts.insert("ticker_daily".to_string(), output.ticker_daily.len());
        row_counts.insert("index_daily".to_string(), output.index_daily.len());
        row_counts.insert("sector_daily".to_string(), output.sector_daily.len());
        row_counts.insert("industry_daily".to_string(), output.industry_daily.len());
        row_counts.insert("sector_summary".to_string(), output.sector_summary.len());
        row_counts.insert(
            "industry_summary".to_string(),
            output.industry_summary.len(),
        );
        row_counts.insert("merged_time_series".to_string(), output.merged.height());

        let last_date = output.axis.end();
        let final_day: Vec<_> = output
            .sector_daily
            .iter()
            .filter(|r| r.date == last_date)
            .cloned()
            .collect();
        let top_sectors = rank_top_performing(&final_day)
            .into_iter()
            .map(|r| r.group)
            .collect();

        Self {
            run_id: output.run_id.clone(),
            axis_start: output.axis.start(),
            axis_end: output.axis.end(),
            axis_days: output.axis.len(),
            ticker_count: output.ticker_count,
            row_counts,
            drops: output.drops.clone(),
            dataset_hash: merged_hash(output),
            top_sectors,
            top_pairs: output.top_pairs.clone(),
        }
    }

    /// Render the summary as a small text report.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "run {}", self.run_id);
        let _ = writeln!(
            out,
            "axis: {}..={} ({} days), {} tickers",
            self.axis_start, self.axis_end, self.axis_days, self.ticker_count
        );
        let _ = writeln!(out, "dataset hash: {}", self.dataset_hash);

        let _ = writeln!(out, "\ntables:");
        for (table, rows) in &self.row_counts {
            let _ = writeln!(out, "  {table}: {rows} rows");
        }

        let _ = writeln!(out, "\ndrops:");
        for log in &self.drops {
            let _ = writeln!(
                out,
                "  {}: kept {}, dropped {}",
                log.source,
                log.kept,
                log.total_dropped()
            );
        }

        if !self.top_sectors.is_empty() {
            let _ = writeln!(
                out,
                "\ntop sectors on {}: {}",
                self.axis_end,
                self.top_sectors.join(", ")
            );
        }

        if !self.top_pairs.is_empty() {
            let _ = writeln!(out, "\nstrongest correlations:");
            for pair in &self.top_pairs {
                let _ = writeln!(out, "  {} ~ {}: {:.4}", pair.a, pair.b, pair.r);
            }
        }
        out
    }
}

/// Deterministic BLAKE3 over the merged table's dates, columns, cells.
fn merged_hash(output: &PipelineOutput) -> String {
    let mut hasher = blake3::Hasher::new();
    for date in output.merged.dates() {
        hasher.update(date.to_string().as_bytes());
    }
    for (c, name) in output.merged.column_names().iter().enumerate() {
        hasher.update(name.as_bytes());
        for cell in output.merged.column(c) {
            match cell {
                Some(v) => hasher.update(&v.to_le_bytes()),
                None => hasher.update(&[0xFF]),
            };
        }
    }
    hasher.finalize().to_hex().to_string()
}
