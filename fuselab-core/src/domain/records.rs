//! Typed per-source records produced by the normalizers.
//!
//! All records are immutable once produced: downstream stages only read.
//! A missing value is `None`, never a sentinel — the derived-metric and
//! aggregation rules all key off explicit nulls.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One ticker-day of price data, keyed by `(trade_date, ticker)`.
///
/// OHLCV fields are `None` on axis dates where the ticker did not trade
/// (gaps are never interpolated). `daily_return` and `volatility` start
/// out `None` and are filled by the derived-metrics stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalDailyRecord {
    pub trade_date: NaiveDate,
    pub ticker: String,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
    /// `close[t]/close[t-1] - 1`; null on the first observed date and
    /// wherever the previous close is null or zero.
    pub daily_return: Option<f64>,
    /// Trailing sample stddev of `daily_return` over the configured
    /// window (default 7); null until the window is fully populated.
    pub volatility: Option<f64>,
    /// `high - low` for the day.
    pub price_range: Option<f64>,
    /// `(close - open) / open * 100`; null when open is null or zero.
    pub price_change_pct: Option<f64>,
}

impl CanonicalDailyRecord {
    /// A placeholder record for an axis date where the ticker has no data.
    pub fn gap(trade_date: NaiveDate, ticker: &str) -> Self {
        Self {
            trade_date,
            ticker: ticker.to_string(),
            open: None,
            high: None,
            low: None,
            close: None,
            volume: None,
            daily_return: None,
            volatility: None,
            price_range: None,
            price_change_pct: None,
        }
    }

    /// True when no price field is populated (a gap row).
    pub fn is_gap(&self) -> bool {
        self.open.is_none()
            && self.high.is_none()
            && self.low.is_none()
            && self.close.is_none()
            && self.volume.is_none()
    }
}

/// One day of the single market-index series, keyed by `trade_date`.
///
/// Derived-metric fields follow the same rules as [`CanonicalDailyRecord`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketIndexRecord {
    pub trade_date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
    pub daily_return: Option<f64>,
    pub volatility: Option<f64>,
}

/// One day of environmental observations, keyed by `obs_date`.
///
/// Readings are a region-name → value map rather than fixed columns, so
/// the alignment engine stays source-agnostic no matter how many regions
/// a deployment reports. Absent keys are nulls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentalRecord {
    pub obs_date: NaiveDate,
    pub readings: BTreeMap<String, f64>,
}

impl EnvironmentalRecord {
    /// Mean over the regions reporting on this date, or `None` when none do.
    pub fn national_average(&self) -> Option<f64> {
        if self.readings.is_empty() {
            return None;
        }
        let sum: f64 = self.readings.values().sum();
        Some(sum / self.readings.len() as f64)
    }
}

/// One day of news-sentiment counts, keyed by `news_date`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentDailyRecord {
    pub news_date: NaiveDate,
    pub depression_word_count: Option<f64>,
    pub total_articles: Option<f64>,
    /// `depression_word_count / total_articles`; null when the article
    /// count is zero or either operand is null.
    pub avg_depression_per_article: Option<f64>,
}

impl SentimentDailyRecord {
    pub fn new(
        news_date: NaiveDate,
        depression_word_count: Option<f64>,
        total_articles: Option<f64>,
    ) -> Self {
        let avg = match (depression_word_count, total_articles) {
            (Some(words), Some(articles)) if articles != 0.0 => Some(words / articles),
            _ => None,
        };
        Self {
            news_date,
            depression_word_count,
            total_articles,
            avg_depression_per_article: avg,
        }
    }
}

/// One reading of the weekly sentiment index, keyed by `week_end_date`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentWeeklyRecord {
    pub week_end_date: NaiveDate,
    pub depression_index: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn avg_per_article_guards_division_by_zero() {
        let d = NaiveDate::from_ymd_opt(2018, 1, 3).unwrap();
        let rec = SentimentDailyRecord::new(d, Some(12.0), Some(0.0));
        assert_eq!(rec.avg_depression_per_article, None);

        let rec = SentimentDailyRecord::new(d, Some(12.0), Some(4.0));
        assert_eq!(rec.avg_depression_per_article, Some(3.0));

        let rec = SentimentDailyRecord::new(d, None, Some(4.0));
        assert_eq!(rec.avg_depression_per_article, None);
    }

    #[test]
    fn national_average_over_reporting_regions_only() {
        let d = NaiveDate::from_ymd_opt(2018, 1, 3).unwrap();
        let mut readings = BTreeMap::new();
        readings.insert("alabama".to_string(), 2.0);
        readings.insert("alaska".to_string(), 4.0);
        let rec = EnvironmentalRecord {
            obs_date: d,
            readings,
        };
        assert_eq!(rec.national_average(), Some(3.0));

        let empty = EnvironmentalRecord {
            obs_date: d,
            readings: BTreeMap::new(),
        };
        assert_eq!(empty.national_average(), None);
    }

    #[test]
    fn gap_record_is_gap() {
        let gap = CanonicalDailyRecord::gap(NaiveDate::from_ymd_opt(2018, 1, 3).unwrap(), "AAPL");
        assert!(gap.is_gap());
        assert_eq!(gap.ticker, "AAPL");
    }
}
