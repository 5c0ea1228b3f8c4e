//! Pipeline orchestration.
//!
//! Stage order is fixed: Load → Normalize → Align → Derive →
//! Aggregate → Correlate → Sink. Every stage failure is wrapped with
//! the stage it happened in, so a failed run always names where it
//! died and why.

use crate::config::PipelineConfig;
use crate::loader::{load_sources, LoadError, LoadedSources, SourcePaths};
use crate::progress::StageProgress;
use crate::sink::{Sink, SinkError};
use crate::summary::RunSummary;
use fuselab_core::aggregate::{aggregate_daily, summarize_groups, AggregateRow, GroupBy, GroupSummary};
use fuselab_core::align::{align_ticker_records, merge_sources, DateAxis, MergeInput};
use fuselab_core::correlate::{relationship_graph, top_pairs, CorrelationMatrix, CorrelationPair, Edge};
use fuselab_core::domain::{
    CanonicalDailyRecord, Classification, MarketIndexRecord, NumericTable,
};
use fuselab_core::error::{AlignmentError, InsufficientDataError};
use fuselab_core::metrics::{enrich_index, enrich_ticker};
use fuselab_core::normalize::{
    normalize_market_index, normalize_sentiment_daily, normalize_sentiment_weekly,
    normalize_stock, normalize_weather, DropLog,
};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// The pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Stage {
    Load,
    Normalize,
    Align,
    Derive,
    Aggregate,
    Correlate,
    Sink,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Load => "load",
            Stage::Normalize => "normalize",
            Stage::Align => "align",
            Stage::Derive => "derive",
            Stage::Aggregate => "aggregate",
            Stage::Correlate => "correlate",
            Stage::Sink => "sink",
        };
        f.write_str(name)
    }
}

/// What went wrong inside a stage.
#[derive(Debug, Error)]
pub enum StageFailure {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Alignment(#[from] AlignmentError),

    #[error(transparent)]
    InsufficientData(#[from] InsufficientDataError),

    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// A stage failure with the stage it happened in.
#[derive(Debug, Error)]
#[error("stage '{stage}' failed: {source}")]
pub struct PipelineError {
    pub stage: Stage,
    #[source]
    pub source: StageFailure,
}

fn at_stage<E: Into<StageFailure>>(stage: Stage) -> impl FnOnce(E) -> PipelineError {
    move |e| PipelineError {
        stage,
        source: e.into(),
    }
}

/// Everything a completed run produced, before sinking.
#[derive(Debug)]
pub struct PipelineOutput {
    pub run_id: String,
    pub axis: DateAxis,
    /// Per-ticker records over the full axis, sorted by ticker then date.
    pub ticker_daily: Vec<CanonicalDailyRecord>,
    /// Index records over the full axis, sorted by date.
    pub index_daily: Vec<MarketIndexRecord>,
    pub classification: Classification,
    pub sector_daily: Vec<AggregateRow>,
    pub industry_daily: Vec<AggregateRow>,
    pub sector_summary: Vec<GroupSummary>,
    pub industry_summary: Vec<GroupSummary>,
    pub merged: NumericTable,
    pub matrix: CorrelationMatrix,
    pub top_pairs: Vec<CorrelationPair>,
    pub edges: Vec<Edge>,
    pub drops: Vec<DropLog>,
    pub ticker_count: usize,
}

/// Run the full pipeline over already-loaded sources.
pub fn run_pipeline(
    sources: &LoadedSources,
    config: &PipelineConfig,
    progress: Option<&dyn StageProgress>,
) -> Result<PipelineOutput, PipelineError> {
    let report = |f: &dyn Fn(&dyn StageProgress)| {
        if let Some(p) = progress {
            f(p);
        }
    };

    // ── Normalize ────────────────────────────────────────────────────
    report(&|p| p.on_stage_start(Stage::Normalize));
    let stock = normalize_stock(&sources.stock).map_err(at_stage(Stage::Normalize))?;
    let (mut index_records, index_drops) =
        normalize_market_index(&sources.index).map_err(at_stage(Stage::Normalize))?;
    let (weather_records, regions, weather_drops) =
        normalize_weather(&sources.weather).map_err(at_stage(Stage::Normalize))?;
    let (sentiment_daily, sentiment_daily_drops) =
        normalize_sentiment_daily(&sources.sentiment_daily).map_err(at_stage(Stage::Normalize))?;
    let (sentiment_weekly, sentiment_weekly_drops) =
        normalize_sentiment_weekly(&sources.sentiment_weekly)
            .map_err(at_stage(Stage::Normalize))?;

    let drops = vec![
        stock.drops.clone(),
        index_drops,
        weather_drops,
        sentiment_daily_drops,
        sentiment_weekly_drops,
    ];
    report(&|p| {
        for log in &drops {
            p.on_drops(log);
        }
        p.on_stage_complete(Stage::Normalize, "5 sources normalized");
    });

    // ── Align ────────────────────────────────────────────────────────
    report(&|p| p.on_stage_start(Stage::Align));
    let mut observed: Vec<chrono::NaiveDate> =
        stock.records.iter().map(|r| r.trade_date).collect();
    observed.extend(index_records.iter().map(|r| r.trade_date));
    observed.extend(weather_records.iter().map(|r| r.obs_date));
    observed.extend(sentiment_daily.iter().map(|r| r.news_date));
    observed.extend(sentiment_weekly.iter().map(|r| r.week_end_date));

    let axis = DateAxis::from_observed(observed)
        .and_then(|a| a.restrict(config.start, config.end))
        .map_err(at_stage(Stage::Align))?;
    report(&|p| {
        p.on_stage_complete(
            Stage::Align,
            &format!("axis {}..={} ({} days)", axis.start(), axis.end(), axis.len()),
        )
    });

    // ── Derive ───────────────────────────────────────────────────────
    report(&|p| p.on_stage_start(Stage::Derive));
    let mut by_ticker: BTreeMap<String, Vec<CanonicalDailyRecord>> = BTreeMap::new();
    for rec in stock.records {
        by_ticker.entry(rec.ticker.clone()).or_default().push(rec);
    }
    // Metrics run over each entity's observed trading rows; gap rows
    // are inserted afterwards, so a calendar gap never enters a
    // trailing window.
    let mut per_ticker: Vec<(String, Vec<CanonicalDailyRecord>)> =
        by_ticker.into_iter().collect();
    per_ticker
        .par_iter_mut()
        .for_each(|(_, records)| enrich_ticker(records, config.rolling_window));
    let ticker_count = per_ticker.len();
    let ticker_daily: Vec<CanonicalDailyRecord> = per_ticker
        .iter()
        .flat_map(|(ticker, records)| align_ticker_records(&axis, ticker, records))
        .collect();

    // The index series: enrich the observed rows, then align with gaps
    // as null rows.
    enrich_index(&mut index_records, config.rolling_window);
    let mut index_daily: Vec<MarketIndexRecord> = axis
        .iter()
        .map(|trade_date| MarketIndexRecord {
            trade_date,
            open: None,
            high: None,
            low: None,
            close: None,
            volume: None,
            daily_return: None,
            volatility: None,
        })
        .collect();
    for rec in index_records.drain(..) {
        if let Some(i) = axis.index_of(rec.trade_date) {
            index_daily[i] = rec;
        }
    }
    report(&|p| {
        p.on_stage_complete(
            Stage::Derive,
            &format!("{ticker_count} tickers enriched over {} days", axis.len()),
        )
    });

    // ── Aggregate ────────────────────────────────────────────────────
    report(&|p| p.on_stage_start(Stage::Aggregate));
    let sector_daily = aggregate_daily(&ticker_daily, &stock.classification, GroupBy::Sector);
    let industry_daily =
        aggregate_daily(&ticker_daily, &stock.classification, GroupBy::Industry);
    let sector_summary =
        summarize_groups(&ticker_daily, &stock.classification, GroupBy::Sector);
    let industry_summary =
        summarize_groups(&ticker_daily, &stock.classification, GroupBy::Industry);
    report(&|p| {
        p.on_stage_complete(
            Stage::Aggregate,
            &format!(
                "{} sector rows, {} industry rows",
                sector_daily.len(),
                industry_daily.len()
            ),
        )
    });

    // ── Correlate ────────────────────────────────────────────────────
    report(&|p| p.on_stage_start(Stage::Correlate));
    let merged = merge_sources(
        &axis,
        MergeInput {
            index: &index_daily,
            weather: &weather_records,
            regions: &regions,
            sentiment_daily: &sentiment_daily,
            sentiment_weekly: &sentiment_weekly,
        },
    );
    let matrix = CorrelationMatrix::compute(&merged).map_err(at_stage(Stage::Correlate))?;
    let top = top_pairs(&matrix, config.top_k);
    let edges = relationship_graph(&matrix, config.edge_threshold);
    report(&|p| {
        p.on_stage_complete(
            Stage::Correlate,
            &format!("{} columns, {} graph edges", matrix.width(), edges.len()),
        )
    });

    Ok(PipelineOutput {
        run_id: config.run_id(),
        axis,
        ticker_daily,
        index_daily,
        classification: stock.classification,
        sector_daily,
        industry_daily,
        sector_summary,
        industry_summary,
        merged,
        matrix,
        top_pairs: top,
        edges,
        drops,
        ticker_count,
    })
}

/// Load, run, and sink in one call, returning the run summary.
pub fn execute(
    paths: &SourcePaths,
    config: &PipelineConfig,
    sink: &mut dyn Sink,
    progress: Option<&dyn StageProgress>,
) -> Result<RunSummary, PipelineError> {
    if let Some(p) = progress {
        p.on_stage_start(Stage::Load);
    }
    let sources = load_sources(paths).map_err(at_stage(Stage::Load))?;
    if let Some(p) = progress {
        p.on_stage_complete(Stage::Load, "5 source files read");
    }

    let output = run_pipeline(&sources, config, progress)?;

    if let Some(p) = progress {
        p.on_stage_start(Stage::Sink);
    }
    sink.write(&output).map_err(at_stage(Stage::Sink))?;
    if let Some(p) = progress {
        p.on_stage_complete(Stage::Sink, "all tables committed");
    }

    Ok(RunSummary::from_output(&output))
}
