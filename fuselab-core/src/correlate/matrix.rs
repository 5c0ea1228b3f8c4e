//! Pairwise Pearson correlation over a numeric table.

use crate::domain::NumericTable;
use crate::error::InsufficientDataError;
use serde::{Deserialize, Serialize};

/// A symmetric correlation matrix with a unit diagonal.
///
/// Cells are null where a pair has fewer than two overlapping non-null
/// observations or a constant series; a null cell never collapses to 0,
/// which would claim "uncorrelated" on no evidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    columns: Vec<String>,
    /// Row-major `n * n` cells.
    values: Vec<Option<f64>>,
}

impl CorrelationMatrix {
    /// Compute the full pairwise matrix over the table's columns.
    ///
    /// Fails only on structural starvation (fewer than two columns, or
    /// no rows); per-pair starvation yields null cells instead.
    pub fn compute(table: &NumericTable) -> Result<Self, InsufficientDataError> {
        let n = table.width();
        if n < 2 {
            return Err(InsufficientDataError::TooFewColumns { found: n });
        }
        if table.height() == 0 {
            return Err(InsufficientDataError::EmptyTable);
        }

        let mut values = vec![None; n * n];
        for i in 0..n {
            values[i * n + i] = Some(1.0);
            for j in (i + 1)..n {
                let r = pearson(table.column(i), table.column(j));
                values[i * n + j] = r;
                values[j * n + i] = r;
            }
        }

        Ok(Self {
            columns: table.column_names().to_vec(),
            values,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.values[i * self.width() + j]
    }

    /// Upper-triangle pairs `(i, j, r)` with `i < j`, in declaration
    /// order, skipping null cells.
    pub fn off_diagonal_pairs(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        let n = self.width();
        (0..n).flat_map(move |i| {
            ((i + 1)..n).filter_map(move |j| self.get(i, j).map(|r| (i, j, r)))
        })
    }
}

/// Pearson correlation over the positions where both series are non-null.
///
/// Returns `None` below two overlapping observations or when either
/// overlapping series is constant.
fn pearson(a: &[Option<f64>], b: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some(cov / (var_x * var_y).sqrt())
}
