//! Strongest-relationship ranking.

use super::CorrelationMatrix;
use serde::{Deserialize, Serialize};

/// One ranked off-diagonal pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationPair {
    pub a: String,
    pub b: String,
    pub r: f64,
}

/// Top `k` off-diagonal pairs by absolute correlation, descending.
///
/// Ties keep the earlier-declared column pair first; the sort is stable
/// and pairs are generated in declaration order, so ranking is
/// deterministic for identical inputs.
pub fn top_pairs(matrix: &CorrelationMatrix, k: usize) -> Vec<CorrelationPair> {
    let mut pairs: Vec<CorrelationPair> = matrix
        .off_diagonal_pairs()
        .map(|(i, j, r)| CorrelationPair {
            a: matrix.columns()[i].clone(),
            b: matrix.columns()[j].clone(),
            r,
        })
        .collect();
    pairs.sort_by(|x, y| {
        y.r.abs()
            .partial_cmp(&x.r.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    pairs.truncate(k);
    pairs
}
