//! Normalizer for the single market-index OHLCV source.

use super::{read_dates, required_numeric, Cell, DropLog, DropReason};
use crate::domain::MarketIndexRecord;
use crate::error::AlignmentError;
use crate::schema;
use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::BTreeMap;

/// Normalize the raw index table into date-sorted records.
///
/// Same row policy as the stock normalizer, keyed by `trade_date` alone.
pub fn normalize_market_index(
    df: &DataFrame,
) -> Result<(Vec<MarketIndexRecord>, DropLog), AlignmentError> {
    let n = df.height();
    let dates = read_dates(df, &schema::MARKET_INDEX)?;

    let open = required_numeric(df, "open");
    let high = required_numeric(df, "high");
    let low = required_numeric(df, "low");
    let close = required_numeric(df, "close");
    let volume = required_numeric(df, "volume");

    let mut drops = DropLog::new(schema::MARKET_INDEX.source);
    let mut by_date: BTreeMap<NaiveDate, MarketIndexRecord> = BTreeMap::new();

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

        let fields = [&open[row], &high[row], &low[row], &close[row], &volume[row]];
        if fields.iter().any(|c| matches!(c, Cell::Bad)) {
            drops.record(row, DropReason::UnparseableNumber);
            continue;
        }
        let value = |c: &Cell<f64>| match c {
            Cell::Val(v) => Some(*v),
            _ => None,
        };

        if by_date.contains_key(&date) {
            drops.record(row, DropReason::DuplicateKey);
            continue;
        }
        by_date.insert(
            date,
            MarketIndexRecord {
                trade_date: date,
                open: value(&open[row]),
                high: value(&high[row]),
                low: value(&low[row]),
                close: value(&close[row]),
                volume: value(&volume[row]),
                daily_return: None,
                volatility: None,
            },
        );
    }

    drops.kept = by_date.len();
    Ok((by_date.into_values().collect(), drops))
}
