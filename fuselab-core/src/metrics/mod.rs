//! Derived per-entity metrics.
//!
//! Pure functions over slices. Per-entity and strictly trailing, so the
//! runner can fan them out across tickers without coordination.

pub mod returns;
pub mod volatility;

pub use returns::daily_returns;
pub use volatility::rolling_volatility;

use crate::domain::{CanonicalDailyRecord, MarketIndexRecord};

/// Fill derived fields on one ticker's observed records.
///
/// `records` must be the entity's date-sorted trading rows, before any
/// calendar gap rows are inserted; the window is the volatility
/// lookback in trading rows.
pub fn enrich_ticker(records: &mut [CanonicalDailyRecord], window: usize) {
    let closes: Vec<Option<f64>> = records.iter().map(|r| r.close).collect();
    let returns = daily_returns(&closes);
    let vol = rolling_volatility(&returns, window);

    for (i, rec) in records.iter_mut().enumerate() {
        rec.daily_return = returns[i];
        rec.volatility = vol[i];
        rec.price_range = match (rec.high, rec.low) {
            (Some(h), Some(l)) => Some(h - l),
            _ => None,
        };
        rec.price_change_pct = match (rec.open, rec.close) {
            (Some(o), Some(c)) if o != 0.0 => Some((c - o) / o * 100.0),
            _ => None,
        };
    }
}

/// Fill derived fields on the date-sorted market-index records.
pub fn enrich_index(records: &mut [MarketIndexRecord], window: usize) {
    let closes: Vec<Option<f64>> = records.iter().map(|r| r.close).collect();
    let returns = daily_returns(&closes);
    let vol = rolling_volatility(&returns, window);
    for (i, rec) in records.iter_mut().enumerate() {
        rec.daily_return = returns[i];
        rec.volatility = vol[i];
    }
}
