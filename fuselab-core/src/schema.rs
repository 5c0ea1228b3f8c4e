//! Minimal structural contracts for the five source tables.
//!
//! Validation here is presence-only: each source must be non-empty and
//! carry its date column plus the value columns its normalizer reads.
//! Type coercion is the normalizers' job — a stringly-typed numeric
//! column is handled (and counted) there, not rejected here.

use crate::error::SchemaError;
use polars::prelude::*;

/// Structural contract for one source table.
#[derive(Debug, Clone, Copy)]
pub struct SourceSchema {
    pub source: &'static str,
    pub date_column: &'static str,
    pub required: &'static [&'static str],
}

/// Per-ticker OHLCV with company metadata columns.
pub const STOCK: SourceSchema = SourceSchema {
    source: "stock",
    date_column: "date",
    required: &["ticker", "open", "high", "low", "close", "volume"],
};

/// Single market-index OHLCV.
pub const MARKET_INDEX: SourceSchema = SourceSchema {
    source: "market_index",
    date_column: "trade_date",
    required: &["open", "high", "low", "close", "volume"],
};

/// Daily weather observations; every non-date column is a region.
pub const WEATHER: SourceSchema = SourceSchema {
    source: "weather",
    date_column: "obs_date",
    required: &[],
};

/// Daily news-sentiment counts.
pub const SENTIMENT_DAILY: SourceSchema = SourceSchema {
    source: "sentiment_daily",
    date_column: "news_date",
    required: &["depression_word_count", "total_articles"],
};

/// Weekly sentiment index.
pub const SENTIMENT_WEEKLY: SourceSchema = SourceSchema {
    source: "sentiment_weekly",
    date_column: "week_end_date",
    required: &["depression_index"],
};

impl SourceSchema {
    /// Check that the table is non-empty and has every required column.
    pub fn validate(&self, df: &DataFrame) -> Result<(), SchemaError> {
        if df.height() == 0 {
            return Err(SchemaError::EmptySource {
                source_name: self.source.to_string(),
            });
        }
        let schema = df.schema();
        if !schema.contains(self.date_column) {
            return Err(SchemaError::MissingColumn {
                source_name: self.source.to_string(),
                column: self.date_column.to_string(),
            });
        }
        for col in self.required {
            if !schema.contains(col) {
                return Err(SchemaError::MissingColumn {
                    source_name: self.source.to_string(),
                    column: col.to_string(),
                });
            }
        }
        Ok(())
    }
}
