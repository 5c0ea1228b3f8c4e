//! Source normalizers — one per raw source type.
//!
//! Each normalizer consumes a materialized `DataFrame` (the input
//! boundary hands the core already-fetched tables) and produces typed,
//! date-sorted, deduplicated records. Row-level parse failures never
//! abort a run: the offending row is dropped and counted in a
//! [`DropLog`], so nothing is lost silently.
//!
//! Column-level date problems are different — a missing or untyped date
//! column means the source cannot be reconciled onto the date axis at
//! all, and surfaces as an [`AlignmentError`].

pub mod index;
pub mod sentiment;
pub mod stock;
pub mod weather;

pub use index::normalize_market_index;
pub use sentiment::{normalize_sentiment_daily, normalize_sentiment_weekly};
pub use stock::{normalize_stock, NormalizedStock};
pub use weather::normalize_weather;

use crate::error::AlignmentError;
use crate::schema::SourceSchema;
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Why a source row was dropped during normalization.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum DropReason {
    /// Date cell present but unparseable.
    UnparseableDate,
    /// Numeric cell present but unparseable.
    UnparseableNumber,
    /// Null date or null key field (e.g. ticker).
    MissingKey,
    /// Second and later occurrences of a duplicate key; first wins.
    DuplicateKey,
}

/// How many offending row indices to retain as examples per source.
const SAMPLE_CAP: usize = 8;

/// Skipped-and-counted accounting for one source's normalization pass.
///
/// Every dropped row is counted, and the first few row indices per
/// reason are retained so a failed-quality run can point at real rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DropLog {
    pub source: String,
    pub kept: usize,
    counts: BTreeMap<DropReason, usize>,
    samples: Vec<(usize, DropReason)>,
    /// Value columns excluded wholesale (entirely non-numeric).
    pub skipped_columns: Vec<String>,
}

impl DropLog {
    pub fn new(source: &str) -> Self {
        Self {
            source: source.to_string(),
            kept: 0,
            counts: BTreeMap::new(),
            samples: Vec::new(),
            skipped_columns: Vec::new(),
        }
    }

    pub fn record(&mut self, row: usize, reason: DropReason) {
        *self.counts.entry(reason).or_insert(0) += 1;
        if self.samples.len() < SAMPLE_CAP {
            self.samples.push((row, reason));
        }
    }

    pub fn count(&self, reason: DropReason) -> usize {
        self.counts.get(&reason).copied().unwrap_or(0)
    }

    pub fn total_dropped(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn counts(&self) -> &BTreeMap<DropReason, usize> {
        &self.counts
    }

    pub fn samples(&self) -> &[(usize, DropReason)] {
        &self.samples
    }
}

/// A single cell after type coercion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Cell<T> {
    /// Absent in the source (a legitimate null).
    Null,
    /// Present but unparseable (drops the row).
    Bad,
    Val(T),
}

/// A value column after coercion, or a column that is not numeric at all.
pub(crate) enum NumericColumn {
    Numeric(Vec<Cell<f64>>),
    NonNumeric,
}

/// Date-string formats accepted across sources.
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Integer values below this are taken as epoch days.
const EPOCH_DAYS_MAX: i64 = 100_000;
/// Integer values at or above this are taken as epoch seconds.
const EPOCH_SECONDS_MIN: i64 = 1_000_000_000;

fn parse_date_str(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()
}

/// Read and coerce a source's date column.
///
/// Accepts native `Date` columns, strings in the formats above, and
/// integer epoch encodings. Integer encodings must be unambiguous:
/// values that are neither plausible epoch-days nor epoch-seconds abort
/// with [`AlignmentError::AmbiguousDateEncoding`], because guessing a
/// date semantics would corrupt the axis silently.
pub(crate) fn read_dates(
    df: &DataFrame,
    schema: &SourceSchema,
) -> Result<Vec<Cell<NaiveDate>>, AlignmentError> {
    let col = df
        .column(schema.date_column)
        .map_err(|_| AlignmentError::MissingDateColumn {
            source_name: schema.source.to_string(),
            column: schema.date_column.to_string(),
        })?;

    let n = df.height();
    let mut out = Vec::with_capacity(n);

    match col.dtype() {
        DataType::Date => {
            let ca = col.date().expect("dtype checked");
            for i in 0..n {
                match ca.get(i) {
                    Some(days) => {
                        out.push(Cell::Val(epoch() + chrono::Duration::days(days as i64)))
                    }
                    None => out.push(Cell::Null),
                }
            }
        }
        DataType::String => {
            let ca = col.str().expect("dtype checked");
            let mut any_parsed = false;
            let mut any_present = false;
            for i in 0..n {
                match ca.get(i) {
                    None => out.push(Cell::Null),
                    Some(s) if s.trim().is_empty() => out.push(Cell::Null),
                    Some(s) => {
                        any_present = true;
                        match parse_date_str(s) {
                            Some(d) => {
                                any_parsed = true;
                                out.push(Cell::Val(d));
                            }
                            None => out.push(Cell::Bad),
                        }
                    }
                }
            }
            if any_present && !any_parsed {
                return Err(AlignmentError::UnparseableDateColumn {
                    source_name: schema.source.to_string(),
                    column: schema.date_column.to_string(),
                });
            }
        }
        DataType::Int32 | DataType::Int64 => {
            let casted = col.cast(&DataType::Int64).map_err(|_| {
                AlignmentError::DateTypeMismatch {
                    source_name: schema.source.to_string(),
                    column: schema.date_column.to_string(),
                    dtype: format!("{:?}", col.dtype()),
                }
            })?;
            let ca = casted.i64().expect("cast to Int64");
            for i in 0..n {
                match ca.get(i) {
                    None => out.push(Cell::Null),
                    Some(v) if v.abs() < EPOCH_DAYS_MAX => {
                        out.push(Cell::Val(epoch() + chrono::Duration::days(v)))
                    }
                    Some(v) if v >= EPOCH_SECONDS_MIN => {
                        match chrono::DateTime::from_timestamp(v, 0) {
                            Some(dt) => out.push(Cell::Val(dt.date_naive())),
                            None => out.push(Cell::Bad),
                        }
                    }
                    Some(v) => {
                        return Err(AlignmentError::AmbiguousDateEncoding {
                            source_name: schema.source.to_string(),
                            column: schema.date_column.to_string(),
                            value: v,
                        })
                    }
                }
            }
        }
        other => {
            return Err(AlignmentError::DateTypeMismatch {
                source_name: schema.source.to_string(),
                column: schema.date_column.to_string(),
                dtype: format!("{other:?}"),
            })
        }
    }

    Ok(out)
}

/// Read and coerce a value column to nullable f64.
///
/// Numeric dtypes cast directly; string columns are parsed cell-by-cell
/// so a malformed value can drop just its row. Anything else (dates,
/// booleans, nested types) is reported as non-numeric and left to the
/// caller to skip.
pub(crate) fn read_numeric(df: &DataFrame, name: &str) -> NumericColumn {
    let Ok(col) = df.column(name) else {
        return NumericColumn::NonNumeric;
    };
    let n = df.height();

    match col.dtype() {
        DataType::Float64
        | DataType::Float32
        | DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64 => {
            let Ok(casted) = col.cast(&DataType::Float64) else {
                return NumericColumn::NonNumeric;
            };
            let ca = casted.f64().expect("cast to Float64");
            let mut out = Vec::with_capacity(n);
            for i in 0..n {
                match ca.get(i) {
                    Some(v) if v.is_finite() => out.push(Cell::Val(v)),
                    Some(_) => out.push(Cell::Null),
                    None => out.push(Cell::Null),
                }
            }
            NumericColumn::Numeric(out)
        }
        DataType::String => {
            let ca = col.str().expect("dtype checked");
            let mut out = Vec::with_capacity(n);
            let mut any_parsed = false;
            for i in 0..n {
                match ca.get(i) {
                    None => out.push(Cell::Null),
                    Some(s) if s.trim().is_empty() => out.push(Cell::Null),
                    Some(s) => match s.trim().parse::<f64>() {
                        Ok(v) if v.is_finite() => {
                            any_parsed = true;
                            out.push(Cell::Val(v));
                        }
                        _ => out.push(Cell::Bad),
                    },
                }
            }
            if any_parsed {
                NumericColumn::Numeric(out)
            } else {
                // A column where nothing parses is text, not numbers.
                NumericColumn::NonNumeric
            }
        }
        _ => NumericColumn::NonNumeric,
    }
}

/// Coerce a column the caller's schema requires to be numeric.
///
/// A required column that turns out to be entirely non-numeric yields
/// all-`Bad` cells, so every row it touches is dropped and counted
/// rather than the column being quietly ignored.
pub(crate) fn required_numeric(df: &DataFrame, name: &str) -> Vec<Cell<f64>> {
    match read_numeric(df, name) {
        NumericColumn::Numeric(cells) => cells,
        NumericColumn::NonNumeric => vec![Cell::Bad; df.height()],
    }
}

/// Read a string column, casting non-string dtypes through String.
pub(crate) fn read_str(df: &DataFrame, name: &str) -> Option<Vec<Option<String>>> {
    let col = df.column(name).ok()?;
    let casted = col.cast(&DataType::String).ok()?;
    let ca = casted.str().ok()?;
    let n = df.height();
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        out.push(ca.get(i).map(|s| s.trim()).filter(|s| !s.is_empty()).map(String::from));
    }
    Some(out)
}
