//! Normalizer for the multi-region environmental source.
//!
//! The region set is not fixed: every non-date column that coerces to
//! numbers becomes a region, in column order. Columns that are not
//! numeric at all (names, notes) are skipped wholesale and listed in the
//! drop log rather than dropping rows.

use super::{read_dates, read_numeric, Cell, DropLog, DropReason, NumericColumn};
use crate::domain::EnvironmentalRecord;
use crate::error::AlignmentError;
use crate::schema;
use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::BTreeMap;

/// Normalize the raw weather table into date-sorted records.
///
/// Returns the records, the region column names kept (in source column
/// order), and the drop log.
pub fn normalize_weather(
    df: &DataFrame,
) -> Result<(Vec<EnvironmentalRecord>, Vec<String>, DropLog), AlignmentError> {
    let n = df.height();
    let dates = read_dates(df, &schema::WEATHER)?;

    let mut drops = DropLog::new(schema::WEATHER.source);
    let mut regions: Vec<String> = Vec::new();
    let mut region_cells: Vec<Vec<Cell<f64>>> = Vec::new();

    for name in df.get_column_names_str() {
        if name == schema::WEATHER.date_column {
            continue;
        }
        match read_numeric(df, name) {
            NumericColumn::Numeric(cells) => {
                regions.push(name.to_string());
                region_cells.push(cells);
            }
            NumericColumn::NonNumeric => drops.skipped_columns.push(name.to_string()),
        }
    }

    let mut by_date: BTreeMap<NaiveDate, EnvironmentalRecord> = BTreeMap::new();

    for row in 0..n {
        let date = match dates[row] {
            Cell::Val(d) => d,
            Cell::Null => {
                drops.record(row, DropReason::MissingKey);
                continue;
            }
            Cell::Bad => {
                drops.record(row, DropReason::UnparseableDate);
                continue;
            }
        };
        if region_cells.iter().any(|c| matches!(c[row], Cell::Bad)) {
            drops.record(row, DropReason::UnparseableNumber);
            continue;
        }
        if by_date.contains_key(&date) {
            drops.record(row, DropReason::DuplicateKey);
            continue;
        }

        let mut readings = BTreeMap::new();
        for (region, cells) in regions.iter().zip(&region_cells) {
            if let Cell::Val(v) = cells[row] {
                readings.insert(region.clone(), v);
            }
        }
        by_date.insert(
            date,
            EnvironmentalRecord {
                obs_date: date,
                readings,
            },
        );
    }

    drops.kept = by_date.len();
    Ok((by_date.into_values().collect(), regions, drops))
}
