//! Normalizers for the daily and weekly sentiment sources.

use super::{read_dates, required_numeric, Cell, DropLog, DropReason};
use crate::domain::{SentimentDailyRecord, SentimentWeeklyRecord};
use crate::error::AlignmentError;
use crate::schema;
use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::BTreeMap;

/// Normalize the daily news-sentiment table.
///
/// The per-article average is computed here, once, so downstream stages
/// never re-derive it.
pub fn normalize_sentiment_daily(
    df: &DataFrame,
) -> Result<(Vec<SentimentDailyRecord>, DropLog), AlignmentError> {
    let n = df.height();
    let dates = read_dates(df, &schema::SENTIMENT_DAILY)?;
    let words = required_numeric(df, "depression_word_count");
    let articles = required_numeric(df, "total_articles");

    let mut drops = DropLog::new(schema::SENTIMENT_DAILY.source);
    let mut by_date: BTreeMap<NaiveDate, SentimentDailyRecord> = BTreeMap::new();

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
        if matches!(words[row], Cell::Bad) || matches!(articles[row], Cell::Bad) {
            drops.record(row, DropReason::UnparseableNumber);
            continue;
        }
        if by_date.contains_key(&date) {
            drops.record(row, DropReason::DuplicateKey);
            continue;
        }
        let value = |c: &Cell<f64>| match c {
            Cell::Val(v) => Some(*v),
            _ => None,
        };
        by_date.insert(
            date,
            SentimentDailyRecord::new(date, value(&words[row]), value(&articles[row])),
        );
    }

    drops.kept = by_date.len();
    Ok((by_date.into_values().collect(), drops))
}

/// Normalize the weekly sentiment-index table.
///
/// The index value is mandatory: a week with a null index carries no
/// information, so the row is dropped as missing its key field.
pub fn normalize_sentiment_weekly(
    df: &DataFrame,
) -> Result<(Vec<SentimentWeeklyRecord>, DropLog), AlignmentError> {
    let n = df.height();
    let dates = read_dates(df, &schema::SENTIMENT_WEEKLY)?;
    let index = required_numeric(df, "depression_index");

    let mut drops = DropLog::new(schema::SENTIMENT_WEEKLY.source);
    let mut by_date: BTreeMap<NaiveDate, SentimentWeeklyRecord> = BTreeMap::new();

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
        let depression_index = match index[row] {
            Cell::Val(v) => v,
            Cell::Null => {
                drops.record(row, DropReason::MissingKey);
                continue;
            }
            Cell::Bad => {
                drops.record(row, DropReason::UnparseableNumber);
                continue;
            }
        };
        if by_date.contains_key(&date) {
            drops.record(row, DropReason::DuplicateKey);
            continue;
        }
        by_date.insert(
            date,
            SentimentWeeklyRecord {
                week_end_date: date,
                depression_index,
            },
        );
    }

    drops.kept = by_date.len();
    Ok((by_date.into_values().collect(), drops))
}
