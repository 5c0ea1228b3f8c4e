//! Normalizer for the per-ticker OHLCV source.
//!
//! Produces `(ticker, trade_date)`-keyed records sorted by ticker then
//! date, plus the ticker classification harvested from the metadata
//! columns. Callers validate the table's structure (see
//! [`crate::schema::STOCK`]) before handing it here.

use super::{read_dates, read_str, required_numeric, Cell, DropLog, DropReason};
use crate::domain::{CanonicalDailyRecord, Classification, TickerMeta};
use crate::error::AlignmentError;
use crate::schema;
use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::BTreeMap;

/// Output of the stock normalizer.
#[derive(Debug, Clone)]
pub struct NormalizedStock {
    /// Records sorted by `(ticker, trade_date)`, one per kept row.
    pub records: Vec<CanonicalDailyRecord>,
    /// Sector/industry metadata for tickers whose rows carried it.
    pub classification: Classification,
    pub drops: DropLog,
}

/// Normalize the raw stock table into canonical daily records.
///
/// Rows with a null or unparseable date, a null ticker, an unparseable
/// numeric cell, or a duplicate `(ticker, date)` key are dropped and
/// counted. Duplicates keep the first occurrence in source order.
pub fn normalize_stock(df: &DataFrame) -> Result<NormalizedStock, AlignmentError> {
    let n = df.height();
    let dates = read_dates(df, &schema::STOCK)?;
    let tickers = read_str(df, "ticker").unwrap_or_else(|| vec![None; n]);

    let open = required_numeric(df, "open");
    let high = required_numeric(df, "high");
    let low = required_numeric(df, "low");
    let close = required_numeric(df, "close");
    let volume = required_numeric(df, "volume");

    let company = read_str(df, "company_name");
    let sector = read_str(df, "sector");
    let industry = read_str(df, "industry");

    let mut drops = DropLog::new(schema::STOCK.source);
    let mut by_key: BTreeMap<(String, NaiveDate), CanonicalDailyRecord> = BTreeMap::new();
    let mut classification = Classification::new();

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
        let Some(ticker) = tickers[row].clone() else {
            drops.record(row, DropReason::MissingKey);
            continue;
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

        // Metadata rides along on kept rows only; first write wins.
        if let (Some(Some(name)), Some(Some(sec)), Some(Some(ind))) = (
            company.as_ref().map(|c| c[row].clone()),
            sector.as_ref().map(|c| c[row].clone()),
            industry.as_ref().map(|c| c[row].clone()),
        ) {
            classification.insert(TickerMeta {
                ticker: ticker.clone(),
                company_name: name,
                sector: sec,
                industry: ind,
            });
        }

        let key = (ticker.clone(), date);
        if by_key.contains_key(&key) {
            drops.record(row, DropReason::DuplicateKey);
            continue;
        }
        by_key.insert(
            key,
            CanonicalDailyRecord {
                trade_date: date,
                ticker,
                open: value(&open[row]),
                high: value(&high[row]),
                low: value(&low[row]),
                close: value(&close[row]),
                volume: value(&volume[row]),
                daily_return: None,
                volatility: None,
                price_range: None,
                price_change_pct: None,
            },
        );
    }

    drops.kept = by_key.len();
    Ok(NormalizedStock {
        records: by_key.into_values().collect(),
        classification,
        drops,
    })
}
