//! Group roll-ups over the classification table.

pub mod summary;

pub use summary::{summarize_groups, GroupSummary};

use crate::domain::{CanonicalDailyRecord, Classification};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which classification level to roll tickers up to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupBy {
    Sector,
    Industry,
}

impl GroupBy {
    fn key<'a>(&self, classification: &'a Classification, ticker: &str) -> Option<&'a str> {
        match self {
            GroupBy::Sector => classification.sector_of(ticker),
            GroupBy::Industry => classification.industry_of(ticker),
        }
    }
}

/// One `(date, group)` roll-up row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRow {
    pub date: NaiveDate,
    pub group: String,
    /// Mean daily return over contributing tickers.
    pub mean_return: f64,
    /// Mean volatility over tickers with a non-null value that day, which
    /// may be fewer than the return contributors.
    pub mean_volatility: Option<f64>,
    /// Tickers contributing a non-null daily return.
    pub ticker_count: usize,
}

/// Roll canonical records up to per-`(date, group)` means.
///
/// A ticker contributes to a group-date when it is classified and its
/// daily return is non-null. Group-dates with no contributors are
/// omitted, never emitted as zero. Output is sorted by date then group.
pub fn aggregate_daily(
    records: &[CanonicalDailyRecord],
    classification: &Classification,
    group_by: GroupBy,
) -> Vec<AggregateRow> {
    struct Acc {
        return_sum: f64,
        return_count: usize,
        vol_sum: f64,
        vol_count: usize,
    }

    let mut groups: BTreeMap<(NaiveDate, String), Acc> = BTreeMap::new();

    for rec in records {
        let Some(group) = group_by.key(classification, &rec.ticker) else {
            continue;
        };
        let Some(ret) = rec.daily_return else {
            continue;
        };
        let acc = groups
            .entry((rec.trade_date, group.to_string()))
            .or_insert(Acc {
                return_sum: 0.0,
                return_count: 0,
                vol_sum: 0.0,
                vol_count: 0,
            });
        acc.return_sum += ret;
        acc.return_count += 1;
        if let Some(vol) = rec.volatility {
            acc.vol_sum += vol;
            acc.vol_count += 1;
        }
    }

    groups
        .into_iter()
        .map(|((date, group), acc)| AggregateRow {
            date,
            group,
            mean_return: acc.return_sum / acc.return_count as f64,
            mean_volatility: (acc.vol_count > 0).then(|| acc.vol_sum / acc.vol_count as f64),
            ticker_count: acc.return_count,
        })
        .collect()
}

/// Order roll-up rows from best to worst performing.
///
/// Mean return descending, ties by higher contributor count, remaining
/// ties by group name ascending.
pub fn rank_top_performing(rows: &[AggregateRow]) -> Vec<AggregateRow> {
    let mut ranked = rows.to_vec();
    ranked.sort_by(|a, b| {
        b.mean_return
            .partial_cmp(&a.mean_return)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.ticker_count.cmp(&a.ticker_count))
            .then_with(|| a.group.cmp(&b.group))
    });
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TickerMeta;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn rec(date: &str, ticker: &str, ret: Option<f64>, vol: Option<f64>) -> CanonicalDailyRecord {
        let mut r = CanonicalDailyRecord::gap(d(date), ticker);
        r.daily_return = ret;
        r.volatility = vol;
        r
    }

    fn classification() -> Classification {
        let mut c = Classification::new();
        for (ticker, sector, industry) in [
            ("AAPL", "Tech", "Hardware"),
            ("MSFT", "Tech", "Software"),
            ("XOM", "Energy", "Oil"),
        ] {
            c.insert(TickerMeta {
                ticker: ticker.to_string(),
                company_name: ticker.to_string(),
                sector: sector.to_string(),
                industry: industry.to_string(),
            });
        }
        c
    }

    #[test]
    fn sector_mean_over_non_null_contributors() {
        let records = vec![
            rec("2018-01-03", "AAPL", Some(0.02), None),
            rec("2018-01-03", "MSFT", Some(0.04), Some(0.01)),
            rec("2018-01-03", "XOM", None, Some(0.02)),
        ];
        let rows = aggregate_daily(&records, &classification(), GroupBy::Sector);
        // XOM contributed no return, so Energy is omitted entirely.
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].group, "Tech");
        assert!((rows[0].mean_return - 0.03).abs() < 1e-12);
        assert_eq!(rows[0].ticker_count, 2);
        // Volatility mean is over its own contributors (MSFT only).
        assert_eq!(rows[0].mean_volatility, Some(0.01));
    }

    #[test]
    fn unclassified_tickers_never_contribute() {
        let records = vec![rec("2018-01-03", "ZZZZ", Some(0.5), None)];
        let rows = aggregate_daily(&records, &classification(), GroupBy::Sector);
        assert!(rows.is_empty());
    }

    #[test]
    fn industry_rollup_splits_a_sector() {
        let records = vec![
            rec("2018-01-03", "AAPL", Some(0.02), None),
            rec("2018-01-03", "MSFT", Some(0.04), None),
        ];
        let rows = aggregate_daily(&records, &classification(), GroupBy::Industry);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].group, "Hardware");
        assert_eq!(rows[1].group, "Software");
    }

    #[test]
    fn ranking_tie_breaks_on_count_then_name() {
        let rows = vec![
            AggregateRow {
                date: d("2018-01-03"),
                group: "Beta".to_string(),
                mean_return: 0.02,
                mean_volatility: None,
                ticker_count: 3,
            },
            AggregateRow {
                date: d("2018-01-03"),
                group: "Alpha".to_string(),
                mean_return: 0.02,
                mean_volatility: None,
                ticker_count: 2,
            },
            AggregateRow {
                date: d("2018-01-03"),
                group: "Gamma".to_string(),
                mean_return: 0.05,
                mean_volatility: None,
                ticker_count: 1,
            },
            AggregateRow {
                date: d("2018-01-03"),
                group: "Aardvark".to_string(),
                mean_return: 0.02,
                mean_volatility: None,
                ticker_count: 3,
            },
        ];
        let ranked = rank_top_performing(&rows);
        let order: Vec<&str> = ranked.iter().map(|r| r.group.as_str()).collect();
        assert_eq!(order, vec!["Gamma", "Aardvark", "Beta", "Alpha"]);
    }
}
