//! Error taxonomy for the fusion core.
//!
//! Row-level parse failures are not errors in the `Result` sense — they are
//! dropped and counted in a [`crate::normalize::DropLog`]. The types here
//! cover the failures that abort a stage (`AlignmentError`), starve a
//! computation (`InsufficientDataError`), or reject a malformed input table
//! (`SchemaError`).

use thiserror::Error;

/// Irreconcilable date semantics across sources. Fatal: aborts the run.
#[derive(Debug, Error)]
pub enum AlignmentError {
    #[error("source '{source_name}' is missing its date column '{column}'")]
    MissingDateColumn {
        source_name: String,
        column: String,
    },

    #[error("source '{source_name}': date column '{column}' has unsupported type {dtype}")]
    DateTypeMismatch {
        source_name: String,
        column: String,
        dtype: String,
    },

    #[error(
        "source '{source_name}': integer date column '{column}' is ambiguous \
         (value {value} fits neither epoch-days nor epoch-seconds)"
    )]
    AmbiguousDateEncoding {
        source_name: String,
        column: String,
        value: i64,
    },

    #[error("source '{source_name}': no row of date column '{column}' could be parsed")]
    UnparseableDateColumn {
        source_name: String,
        column: String,
    },

    #[error("no source contributed any dates — cannot build a date axis")]
    EmptyAxis,

    #[error(
        "analysis window {start}..={end} does not intersect the source date range"
    )]
    EmptyWindow {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },
}

/// A computation lacks the minimum data to produce a meaningful result.
///
/// Surfaces as a null/omitted result where possible; only whole-computation
/// starvation (e.g. a correlation matrix over fewer than two numeric
/// columns) propagates as this error.
#[derive(Debug, Error)]
pub enum InsufficientDataError {
    #[error("correlation requires at least 2 numeric columns, found {found}")]
    TooFewColumns { found: usize },

    #[error("table has no rows")]
    EmptyTable,
}

/// A source table fails the minimal structural contract for its kind.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("source '{source_name}' is missing required column '{column}'")]
    MissingColumn {
        source_name: String,
        column: String,
    },

    #[error("source '{source_name}' has no rows")]
    EmptySource { source_name: String },
}
