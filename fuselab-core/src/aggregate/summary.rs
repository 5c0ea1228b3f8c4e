//! Whole-window per-group summary statistics.

use super::GroupBy;
use crate::domain::{CanonicalDailyRecord, Classification};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Descriptive statistics for one group over the full analysis window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub group: String,
    /// Mean of all non-null daily returns in the group.
    pub mean_return: f64,
    /// Sample standard deviation of those returns; null below 2 obs.
    pub std_return: Option<f64>,
    pub min_return: f64,
    pub max_return: f64,
    /// Mean close over non-null closes, null when the group never closed.
    pub mean_close: Option<f64>,
    /// Distinct tickers that contributed at least one return.
    pub ticker_count: usize,
}

/// Summarize returns and closes per group over the whole window.
///
/// Groups with no non-null return anywhere in the window are omitted.
/// Output is sorted by group name.
pub fn summarize_groups(
    records: &[CanonicalDailyRecord],
    classification: &Classification,
    group_by: GroupBy,
) -> Vec<GroupSummary> {
    struct Acc {
        returns: Vec<f64>,
        close_sum: f64,
        close_count: usize,
        tickers: BTreeSet<String>,
    }

    let mut groups: BTreeMap<String, Acc> = BTreeMap::new();

    for rec in records {
        let group = match group_by {
            GroupBy::Sector => classification.sector_of(&rec.ticker),
            GroupBy::Industry => classification.industry_of(&rec.ticker),
        };
        let Some(group) = group else { continue };
        let Some(ret) = rec.daily_return else {
            continue;
        };
        let acc = groups.entry(group.to_string()).or_insert(Acc {
            returns: Vec::new(),
            close_sum: 0.0,
            close_count: 0,
            tickers: BTreeSet::new(),
        });
        acc.returns.push(ret);
        acc.tickers.insert(rec.ticker.clone());
        if let Some(close) = rec.close {
            acc.close_sum += close;
            acc.close_count += 1;
        }
    }

    groups
        .into_iter()
        .map(|(group, acc)| {
            let n = acc.returns.len() as f64;
            let mean = acc.returns.iter().sum::<f64>() / n;
            let std = if acc.returns.len() >= 2 {
                let ss: f64 = acc.returns.iter().map(|r| (r - mean) * (r - mean)).sum();
                Some((ss / (n - 1.0)).sqrt())
            } else {
                None
            };
            let min = acc.returns.iter().copied().fold(f64::INFINITY, f64::min);
            let max = acc
                .returns
                .iter()
                .copied()
                .fold(f64::NEG_INFINITY, f64::max);
            GroupSummary {
                group,
                mean_return: mean,
                std_return: std,
                min_return: min,
                max_return: max,
                mean_close: (acc.close_count > 0)
                    .then(|| acc.close_sum / acc.close_count as f64),
                ticker_count: acc.tickers.len(),
            }
        })
        .collect()
}
