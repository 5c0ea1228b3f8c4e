//! Static ticker → sector → industry classification.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Company metadata for a single ticker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerMeta {
    pub ticker: String,
    pub company_name: String,
    pub sector: String,
    pub industry: String,
}

/// Lookup table mapping tickers to their sector/industry classification.
///
/// Tickers without complete metadata in the source are simply absent:
/// their price rows still flow through the pipeline, but the aggregation
/// engine cannot assign them to a group.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Classification {
    by_ticker: BTreeMap<String, TickerMeta>,
}

impl Classification {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert metadata for a ticker. First write wins, matching the
    /// dedup-keep-first policy of the normalizers.
    pub fn insert(&mut self, meta: TickerMeta) {
        self.by_ticker.entry(meta.ticker.clone()).or_insert(meta);
    }

    pub fn get(&self, ticker: &str) -> Option<&TickerMeta> {
        self.by_ticker.get(ticker)
    }

    pub fn sector_of(&self, ticker: &str) -> Option<&str> {
        self.get(ticker).map(|m| m.sector.as_str())
    }

    pub fn industry_of(&self, ticker: &str) -> Option<&str> {
        self.get(ticker).map(|m| m.industry.as_str())
    }

    pub fn len(&self) -> usize {
        self.by_ticker.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_ticker.is_empty()
    }

    /// All classified tickers in deterministic (sorted) order.
    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.by_ticker.keys().map(|s| s.as_str())
    }
}
