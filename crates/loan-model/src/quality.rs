//! Data-quality summaries shared by profiling and cleaning.

use serde::{Deserialize, Serialize};

/// Null count for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnNulls {
    pub column: String,
    pub null_count: usize,
    /// Share of rows that are null, in percent (0-100).
    pub null_percentage: f64,
}

impl ColumnNulls {
    pub fn new(column: impl Into<String>, null_count: usize, row_count: usize) -> Self {
        let null_percentage = if row_count == 0 {
            0.0
        } else {
            null_count as f64 / row_count as f64 * 100.0
        };
        Self {
            column: column.into(),
            null_count,
            null_percentage,
        }
    }

    /// Null share as a fraction (0-1).
    pub fn null_fraction(&self) -> f64 {
        self.null_percentage / 100.0
    }

    pub fn has_nulls(&self) -> bool {
        self.null_count > 0
    }
}
