//! Outer temporal join of all sources onto the daily axis.

use super::{forward_fill_weekly, DateAxis};
use crate::domain::{
    CanonicalDailyRecord, EnvironmentalRecord, MarketIndexRecord, NumericTable,
    SentimentDailyRecord, SentimentWeeklyRecord,
};

/// Everything the merged time-series table is built from.
///
/// Index records are expected to arrive already enriched with derived
/// metrics; the merge only scatters values onto the axis.
#[derive(Debug, Clone, Copy)]
pub struct MergeInput<'a> {
    pub index: &'a [MarketIndexRecord],
    pub weather: &'a [EnvironmentalRecord],
    /// Region column order, as read from the weather source.
    pub regions: &'a [String],
    pub sentiment_daily: &'a [SentimentDailyRecord],
    pub sentiment_weekly: &'a [SentimentWeeklyRecord],
}

/// Build the merged cross-source table over the axis.
///
/// Column order is part of the downstream ranking contract:
/// index columns, then the weather regions in source order with their
/// national average, then daily sentiment, then the resampled weekly
/// index. Every axis date gets a row; absent observations are nulls.
pub fn merge_sources(axis: &DateAxis, input: MergeInput<'_>) -> NumericTable {
    let n = axis.len();
    let mut table = NumericTable::new(axis.to_vec());

    let mut index_close = vec![None; n];
    let mut index_return = vec![None; n];
    let mut index_volatility = vec![None; n];
    for rec in input.index {
        if let Some(i) = axis.index_of(rec.trade_date) {
            index_close[i] = rec.close;
            index_return[i] = rec.daily_return;
            index_volatility[i] = rec.volatility;
        }
    }
    table.push_column("index_close", index_close);
    table.push_column("index_return", index_return);
    table.push_column("index_volatility", index_volatility);

    let mut region_cols: Vec<Vec<Option<f64>>> = vec![vec![None; n]; input.regions.len()];
    let mut avg_rainfall = vec![None; n];
    for rec in input.weather {
        if let Some(i) = axis.index_of(rec.obs_date) {
            for (r, region) in input.regions.iter().enumerate() {
                region_cols[r][i] = rec.readings.get(region).copied();
            }
            avg_rainfall[i] = rec.national_average();
        }
    }
    for (region, cells) in input.regions.iter().zip(region_cols) {
        table.push_column(region.clone(), cells);
    }
    table.push_column("avg_rainfall_us", avg_rainfall);

    let mut word_count = vec![None; n];
    let mut total_articles = vec![None; n];
    let mut avg_per_article = vec![None; n];
    for rec in input.sentiment_daily {
        if let Some(i) = axis.index_of(rec.news_date) {
            word_count[i] = rec.depression_word_count;
            total_articles[i] = rec.total_articles;
            avg_per_article[i] = rec.avg_depression_per_article;
        }
    }
    table.push_column("depression_word_count", word_count);
    table.push_column("total_articles", total_articles);
    table.push_column("avg_depression_per_article", avg_per_article);

    table.push_column(
        "depression_index",
        forward_fill_weekly(axis, input.sentiment_weekly),
    );

    table
}

/// Align one ticker's records onto the axis, inserting gap rows.
///
/// Gaps are explicit null records, never interpolated. Records dated
/// outside the axis (a restricted analysis window) are dropped here.
pub fn align_ticker_records(
    axis: &DateAxis,
    ticker: &str,
    records: &[CanonicalDailyRecord],
) -> Vec<CanonicalDailyRecord> {
    let mut out: Vec<CanonicalDailyRecord> = axis
        .iter()
        .map(|date| CanonicalDailyRecord::gap(date, ticker))
        .collect();
    for rec in records {
        if let Some(i) = axis.index_of(rec.trade_date) {
            out[i] = rec.clone();
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn index_rec(date: &str, close: f64) -> MarketIndexRecord {
        MarketIndexRecord {
            trade_date: d(date),
            open: Some(close),
            high: Some(close),
            low: Some(close),
            close: Some(close),
            volume: Some(1.0),
            daily_return: None,
            volatility: None,
        }
    }

    #[test]
    fn missing_source_dates_become_nulls_not_dropped_rows() {
        let axis = DateAxis::from_observed(vec![d("2018-01-02"), d("2018-01-04")]).unwrap();
        let index = vec![index_rec("2018-01-02", 100.0), index_rec("2018-01-04", 101.0)];
        let table = merge_sources(
            &axis,
            MergeInput {
                index: &index,
                weather: &[],
                regions: &[],
                sentiment_daily: &[],
                sentiment_weekly: &[],
            },
        );
        assert_eq!(table.height(), 3);
        let close = table.column_by_name("index_close").unwrap();
        assert_eq!(close, &[Some(100.0), None, Some(101.0)]);
    }

    #[test]
    fn region_columns_precede_national_average() {
        let axis = DateAxis::from_observed(vec![d("2018-01-02"), d("2018-01-02")]).unwrap();
        let mut readings = BTreeMap::new();
        readings.insert("alabama".to_string(), 2.0);
        readings.insert("alaska".to_string(), 4.0);
        let weather = vec![EnvironmentalRecord {
            obs_date: d("2018-01-02"),
            readings,
        }];
        let regions = vec!["alabama".to_string(), "alaska".to_string()];
        let table = merge_sources(
            &axis,
            MergeInput {
                index: &[],
                weather: &weather,
                regions: &regions,
                sentiment_daily: &[],
                sentiment_weekly: &[],
            },
        );
        let names = table.column_names();
        let a = names.iter().position(|c| c == "alabama").unwrap();
        let avg = names.iter().position(|c| c == "avg_rainfall_us").unwrap();
        assert!(a < avg);
        assert_eq!(table.column_by_name("avg_rainfall_us").unwrap()[0], Some(3.0));
    }

    #[test]
    fn weekly_column_respects_effective_window() {
        let axis = DateAxis::from_observed(vec![d("2018-01-06"), d("2018-01-09")]).unwrap();
        let weekly = vec![SentimentWeeklyRecord {
            week_end_date: d("2018-01-07"),
            depression_index: 5.0,
        }];
        let table = merge_sources(
            &axis,
            MergeInput {
                index: &[],
                weather: &[],
                regions: &[],
                sentiment_daily: &[],
                sentiment_weekly: &weekly,
            },
        );
        let col = table.column_by_name("depression_index").unwrap();
        assert_eq!(col, &[None, None, Some(5.0), Some(5.0)]);
    }

    #[test]
    fn ticker_alignment_inserts_gap_rows() {
        let axis = DateAxis::from_observed(vec![d("2018-01-02"), d("2018-01-04")]).unwrap();
        let mut rec = CanonicalDailyRecord::gap(d("2018-01-03"), "AAPL");
        rec.close = Some(101.0);
        let aligned = align_ticker_records(&axis, "AAPL", &[rec]);
        assert_eq!(aligned.len(), 3);
        assert!(aligned[0].is_gap());
        assert_eq!(aligned[1].close, Some(101.0));
        assert!(aligned[2].is_gap());
    }
}
