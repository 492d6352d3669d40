//! Table profiling: dtypes, summary statistics, distinct counts, nulls,
//! shape and skewness.

use std::collections::BTreeSet;

use polars::prelude::DataFrame;
use serde::Serialize;

use loan_ingest::{is_numeric_dtype, is_string_dtype, numeric_values, string_values};
use loan_model::ColumnNulls;
use loan_transform::stats::{mean, present, quantile_sorted, std_dev};
use loan_transform::{SkewnessReport, null_summary};

use crate::error::Result;

/// Column name and dtype.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnType {
    pub column: String,
    pub dtype: String,
}

/// Summary statistics of one numeric column.
///
/// `std` is the sample standard deviation. Every statistic is `None` for a
/// column without values (`std` also needs two values).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnStatistics {
    pub column: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

/// Number of distinct non-null values in a text column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistinctCount {
    pub column: String,
    pub distinct: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Shape {
    pub rows: usize,
    pub columns: usize,
}

pub fn describe_columns(df: &DataFrame) -> Vec<ColumnType> {
    df.get_columns()
        .iter()
        .map(|col| ColumnType {
            column: col.name().to_string(),
            dtype: col.dtype().to_string(),
        })
        .collect()
}

/// Count, mean, std, min, quartiles and max of every numeric column.
pub fn summary_statistics(df: &DataFrame) -> Result<Vec<ColumnStatistics>> {
    let mut out = Vec::new();
    for column in df.get_columns() {
        if !is_numeric_dtype(column.dtype()) {
            continue;
        }
        let mut values = present(&numeric_values(column)?);
        values.sort_by(f64::total_cmp);
        let quartile = |q: f64| (!values.is_empty()).then(|| quantile_sorted(&values, q));
        out.push(ColumnStatistics {
            column: column.name().to_string(),
            count: values.len(),
            mean: mean(&values),
            std: std_dev(&values),
            min: values.first().copied(),
            q25: quartile(0.25),
            median: quartile(0.5),
            q75: quartile(0.75),
            max: values.last().copied(),
        });
    }
    Ok(out)
}

/// Distinct value counts of the text columns.
pub fn distinct_counts(df: &DataFrame) -> Result<Vec<DistinctCount>> {
    let mut out = Vec::new();
    for column in df.get_columns() {
        if !is_string_dtype(column.dtype()) {
            continue;
        }
        let values = string_values(column)?;
        let distinct: BTreeSet<&str> = values.iter().flatten().map(String::as_str).collect();
        out.push(DistinctCount {
            column: column.name().to_string(),
            distinct: distinct.len(),
        });
    }
    Ok(out)
}

pub fn shape(df: &DataFrame) -> Shape {
    Shape {
        rows: df.height(),
        columns: df.width(),
    }
}

/// Everything the profile command reports about a table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableProfile {
    pub shape: Shape,
    pub columns: Vec<ColumnType>,
    pub nulls: Vec<ColumnNulls>,
    pub statistics: Vec<ColumnStatistics>,
    pub distinct: Vec<DistinctCount>,
    pub skewness: SkewnessReport,
}

impl TableProfile {
    pub fn from_frame(df: &DataFrame) -> Result<Self> {
        Ok(Self {
            shape: shape(df),
            columns: describe_columns(df),
            nulls: null_summary(df),
            statistics: summary_statistics(df)?,
            distinct: distinct_counts(df)?,
            skewness: SkewnessReport::from_frame(df)?,
        })
    }
}
