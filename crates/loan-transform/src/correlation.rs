//! Pearson correlation and redundant column pruning.

use std::collections::BTreeSet;

use polars::prelude::DataFrame;
use serde::Serialize;
use tracing::{debug, info, info_span};

use loan_ingest::{is_numeric_dtype, numeric_values};

use crate::error::{CleaningError, Result};

/// Pairwise Pearson correlation of the numeric columns of a table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    columns: Vec<String>,
    values: Vec<Vec<f64>>,
}

/// Two columns whose absolute correlation exceeds a threshold.
///
/// `column_j` precedes `column_i` in the table and is the one pruning drops.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelatedPair {
    pub column_i: String,
    pub column_j: String,
    pub correlation: f64,
}

impl CorrelationMatrix {
    /// Correlate every numeric column of `df` using pairwise-complete rows.
    pub fn from_frame(df: &DataFrame) -> Result<Self> {
        let mut columns = Vec::new();
        let mut data = Vec::new();
        for column in df.get_columns() {
            if is_numeric_dtype(column.dtype()) {
                columns.push(column.name().to_string());
                data.push(numeric_values(column)?);
            }
        }

        let n = columns.len();
        let mut values = vec![vec![f64::NAN; n]; n];
        for i in 0..n {
            for j in 0..=i {
                let r = pearson(&data[i], &data[j]);
                values[i][j] = r;
                values[j][i] = r;
            }
        }
        Ok(Self { columns, values })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        Some(self.values[i][j])
    }

    /// Pairs `(i, j)` with `j < i` and `|r| > threshold`, in row-major order.
    pub fn highly_correlated_pairs(&self, threshold: f64) -> Vec<CorrelatedPair> {
        let mut pairs = Vec::new();
        for i in 0..self.columns.len() {
            for j in 0..i {
                let r = self.values[i][j];
                if r.abs() > threshold {
                    pairs.push(CorrelatedPair {
                        column_i: self.columns[i].clone(),
                        column_j: self.columns[j].clone(),
                        correlation: r,
                    });
                }
            }
        }
        pairs
    }
}

/// Pearson correlation over rows where both values are present.
///
/// NaN when fewer than two such rows exist or either side is constant.
pub fn pearson(a: &[Option<f64>], b: &[Option<f64>]) -> f64 {
    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();
    if pairs.len() < 2 {
        return f64::NAN;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return f64::NAN;
    }
    (sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0)
}

/// Drop the earlier column of every pair correlated above `threshold`.
pub fn prune_correlated(df: &DataFrame, threshold: f64) -> Result<(DataFrame, Vec<CorrelatedPair>)> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(CleaningError::InvalidThreshold {
            name: "correlation threshold",
            value: threshold,
        });
    }
    let span = info_span!("correlation", threshold);
    let _guard = span.enter();

    let matrix = CorrelationMatrix::from_frame(df)?;
    let pairs = matrix.highly_correlated_pairs(threshold);
    let drop: BTreeSet<&str> = pairs.iter().map(|p| p.column_j.as_str()).collect();
    for pair in &pairs {
        debug!(
            column_i = %pair.column_i,
            column_j = %pair.column_j,
            correlation = pair.correlation,
            "highly correlated pair"
        );
    }

    let keep: Vec<String> = df
        .get_column_names()
        .into_iter()
        .filter(|name| !drop.contains(name.as_str()))
        .map(|name| name.to_string())
        .collect();
    let out = df.select(keep)?;
    info!(
        pairs = pairs.len(),
        dropped = drop.len(),
        "correlation pruning complete"
    );
    Ok((out, pairs))
}
