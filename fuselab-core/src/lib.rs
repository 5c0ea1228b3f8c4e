//! FuseLab Core — source normalization, temporal fusion, and derived analytics.
//!
//! This crate contains the heart of the fusion pipeline:
//! - Domain types (canonical records, classification, numeric tables)
//! - Source normalizers with skip-and-count drop accounting
//! - The shared daily date axis and outer temporal join
//! - Derived per-entity metrics (returns, rolling volatility)
//! - Sector/industry aggregation and performance ranking
//! - Pairwise correlation, top-K ranking, and graph projection
//!
//! Everything here is pure: inputs arrive as already-materialized
//! DataFrames or typed records, and no file or network I/O happens in
//! this crate.

pub mod aggregate;
pub mod align;
pub mod correlate;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod normalize;
pub mod schema;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: pipeline outputs are Send + Sync.
    ///
    /// The runner fans derived-metric work out across tickers with rayon,
    /// so everything crossing that boundary must stay thread-safe.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::CanonicalDailyRecord>();
        require_sync::<domain::CanonicalDailyRecord>();
        require_send::<domain::MarketIndexRecord>();
        require_sync::<domain::MarketIndexRecord>();
        require_send::<domain::EnvironmentalRecord>();
        require_sync::<domain::EnvironmentalRecord>();
        require_send::<domain::Classification>();
        require_sync::<domain::Classification>();
        require_send::<domain::NumericTable>();
        require_sync::<domain::NumericTable>();

        require_send::<align::DateAxis>();
        require_sync::<align::DateAxis>();
        require_send::<normalize::DropLog>();
        require_sync::<normalize::DropLog>();

        require_send::<aggregate::AggregateRow>();
        require_sync::<aggregate::AggregateRow>();
        require_send::<aggregate::GroupSummary>();
        require_sync::<aggregate::GroupSummary>();
        require_send::<correlate::CorrelationMatrix>();
        require_sync::<correlate::CorrelationMatrix>();
        require_send::<correlate::Edge>();
        require_sync::<correlate::Edge>();

        require_send::<error::AlignmentError>();
        require_sync::<error::AlignmentError>();
        require_send::<error::InsufficientDataError>();
        require_sync::<error::InsufficientDataError>();
    }
}
