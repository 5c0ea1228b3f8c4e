//! Domain types for the fusion pipeline.

pub mod classification;
pub mod records;
pub mod table;

pub use classification::{Classification, TickerMeta};
pub use records::{
    CanonicalDailyRecord, EnvironmentalRecord, MarketIndexRecord, SentimentDailyRecord,
    SentimentWeeklyRecord,
};
pub use table::NumericTable;

/// Ticker symbol type alias.
pub type Ticker = String;
