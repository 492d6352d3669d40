//! Skewness measurement.
//!
//! Skewness is the adjusted Fisher-Pearson standardized moment coefficient
//!
//! ```text
//! g1 = m3 / m2^(3/2)
//! G1 = g1 * sqrt(n (n - 1)) / (n - 2)
//! ```
//!
//! where `m2` and `m3` are the biased central moments of the non-null
//! values and `n` is the non-null count. Positive values mean a longer
//! right tail.

use polars::prelude::DataFrame;
use serde::Serialize;

use loan_ingest::{is_numeric_dtype, numeric_values};

use crate::error::Result;

/// Fewest non-null values for which skewness is defined.
pub const MIN_SKEW_SAMPLES: usize = 3;

/// Standard deviations below this share of the largest magnitude count as
/// zero variance.
const RELATIVE_VARIANCE_FLOOR: f64 = 1e-12;

/// Skewness of the non-null values.
///
/// Returns `None` when fewer than [`MIN_SKEW_SAMPLES`] values are present,
/// when the values are constant, or when the statistic is not finite.
pub fn skewness(values: &[Option<f64>]) -> Option<f64> {
    let (count, sum, max_abs) = values
        .iter()
        .flatten()
        .fold((0usize, 0.0f64, 0.0f64), |(n, s, m), &x| {
            (n + 1, s + x, m.max(x.abs()))
        });
    if count < MIN_SKEW_SAMPLES {
        return None;
    }
    let n = count as f64;
    let mean = sum / n;
    let (s2, s3) = values.iter().flatten().fold((0.0f64, 0.0f64), |(s2, s3), &x| {
        let d = x - mean;
        (s2 + d * d, s3 + d * d * d)
    });
    let m2 = s2 / n;
    let m3 = s3 / n;
    if !(m2.sqrt() > max_abs * RELATIVE_VARIANCE_FLOOR) {
        return None;
    }
    let g1 = m3 / m2.powf(1.5);
    let adjusted = g1 * (n * (n - 1.0)).sqrt() / (n - 2.0);
    adjusted.is_finite().then_some(adjusted)
}

/// Skewness of one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSkew {
    pub column: String,
    pub skewness: f64,
}

/// Skewness of every numeric column with a defined statistic, ordered by
/// descending magnitude.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SkewnessReport {
    entries: Vec<ColumnSkew>,
}

impl SkewnessReport {
    /// Measure every numeric column of `df`.
    pub fn from_frame(df: &DataFrame) -> Result<Self> {
        let mut entries = Vec::new();
        for column in df.get_columns() {
            if !is_numeric_dtype(column.dtype()) {
                continue;
            }
            let values = numeric_values(column)?;
            if let Some(skewness) = skewness(&values) {
                entries.push(ColumnSkew {
                    column: column.name().to_string(),
                    skewness,
                });
            }
        }
        Ok(Self::from_entries(entries))
    }

    /// Build a report from arbitrary entries; ties keep their given order.
    pub fn from_entries(mut entries: Vec<ColumnSkew>) -> Self {
        entries.sort_by(|a, b| b.skewness.abs().total_cmp(&a.skewness.abs()));
        Self { entries }
    }

    pub fn entries(&self) -> &[ColumnSkew] {
        &self.entries
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|entry| entry.column == column)
            .map(|entry| entry.skewness)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Columns whose absolute skewness exceeds `threshold`, most skewed first.
    pub fn skewed_columns(&self, threshold: f64) -> Vec<String> {
        self.entries
            .iter()
            .filter(|entry| entry.skewness.abs() > threshold)
            .map(|entry| entry.column.clone())
            .collect()
    }
}
