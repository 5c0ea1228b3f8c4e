//! Column-oriented numeric table over a shared date axis.
//!
//! The fusion surface handed to the correlation engine. Column order is
//! part of the contract: ranking tie-breaks depend on declaration order,
//! so columns are kept in insertion order, never sorted.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A date-indexed table of nullable numeric columns.
///
/// Every column has exactly one cell per date. Missing observations are
/// `None` — an outer-join surface never drops a date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumericTable {
    dates: Vec<NaiveDate>,
    columns: Vec<String>,
    /// Column-major cell storage: `values[c][r]`.
    values: Vec<Vec<Option<f64>>>,
}

impl NumericTable {
    /// Create an empty table over a fixed date axis.
    pub fn new(dates: Vec<NaiveDate>) -> Self {
        Self {
            dates,
            columns: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Append a column. Panics if the column length does not match the
    /// date axis — that is a construction bug, not a data condition.
    pub fn push_column(&mut self, name: impl Into<String>, cells: Vec<Option<f64>>) {
        assert_eq!(
            cells.len(),
            self.dates.len(),
            "column length must match the date axis"
        );
        self.columns.push(name.into());
        self.values.push(cells);
    }

    pub fn height(&self) -> usize {
        self.dates.len()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Column names in declaration order.
    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    /// Cells of a column by position.
    pub fn column(&self, index: usize) -> &[Option<f64>] {
        &self.values[index]
    }

    /// Cells of a column by name.
    pub fn column_by_name(&self, name: &str) -> Option<&[Option<f64>]> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(&self.values[idx])
    }

    /// Single cell by (row, column) position.
    pub fn cell(&self, row: usize, col: usize) -> Option<f64> {
        self.values[col][row]
    }

    /// One full row in column declaration order.
    pub fn row(&self, row: usize) -> Vec<Option<f64>> {
        self.values.iter().map(|col| col[row]).collect()
    }
}
