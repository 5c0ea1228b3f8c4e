//! Relationship-graph projection of the correlation matrix.

use super::CorrelationMatrix;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Qualitative bucket for an edge's correlation magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strength {
    VeryStrong,
    Strong,
    Moderate,
    Weak,
}

impl Strength {
    /// Bucket an absolute correlation; below 0.2 there is no bucket.
    pub fn classify(abs_r: f64) -> Option<Self> {
        if abs_r > 0.8 {
            Some(Strength::VeryStrong)
        } else if abs_r > 0.6 {
            Some(Strength::Strong)
        } else if abs_r > 0.4 {
            Some(Strength::Moderate)
        } else if abs_r > 0.2 {
            Some(Strength::Weak)
        } else {
            None
        }
    }
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Strength::VeryStrong => "very strong",
            Strength::Strong => "strong",
            Strength::Moderate => "moderate",
            Strength::Weak => "weak",
        };
        f.write_str(label)
    }
}

/// One undirected edge of the relationship graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub a: String,
    pub b: String,
    /// Signed correlation; the threshold applies to its magnitude.
    pub r: f64,
    pub strength: Strength,
}

/// Project the matrix onto edges with `|r| > threshold`.
///
/// Edges appear in column declaration order. A threshold below 0.2 still
/// omits unbucketed pairs, so every emitted edge carries a strength.
pub fn relationship_graph(matrix: &CorrelationMatrix, threshold: f64) -> Vec<Edge> {
    matrix
        .off_diagonal_pairs()
        .filter(|(_, _, r)| r.abs() > threshold)
        .filter_map(|(i, j, r)| {
            Strength::classify(r.abs()).map(|strength| Edge {
                a: matrix.columns()[i].clone(),
                b: matrix.columns()[j].clone(),
                r,
                strength,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NumericTable;
    use chrono::NaiveDate;

    #[test]
    fn classify_buckets_at_documented_cuts() {
        assert_eq!(Strength::classify(0.95), Some(Strength::VeryStrong));
        assert_eq!(Strength::classify(0.8), Some(Strength::Strong));
        assert_eq!(Strength::classify(0.61), Some(Strength::Strong));
        assert_eq!(Strength::classify(0.5), Some(Strength::Moderate));
        assert_eq!(Strength::classify(0.3), Some(Strength::Weak));
        assert_eq!(Strength::classify(0.2), None);
        assert_eq!(Strength::classify(0.0), None);
    }

    #[test]
    fn threshold_filters_edges_by_magnitude() {
        let start = NaiveDate::from_ymd_opt(2018, 1, 1).unwrap();
        let dates: Vec<NaiveDate> = (0..4)
            .map(|i| start + chrono::Duration::days(i))
            .collect();
        let mut t = NumericTable::new(dates);
        t.push_column("a", vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)]);
        t.push_column("b", vec![Some(2.0), Some(4.0), Some(6.0), Some(8.0)]);
        t.push_column("c", vec![Some(1.0), Some(-2.0), Some(3.5), Some(-1.0)]);
        let m = CorrelationMatrix::compute(&t).unwrap();

        let edges = relationship_graph(&m, 0.9);
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].a, "a");
        assert_eq!(edges[0].b, "b");
        assert_eq!(edges[0].strength, Strength::VeryStrong);
    }
}
