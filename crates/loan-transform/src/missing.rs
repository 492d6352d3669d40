//! Missing value handling: null summaries, sparse column dropping and
//! imputation.

use std::collections::BTreeMap;

use polars::prelude::{DataFrame, IntoColumn, NamedFrom, Series};
use serde::Serialize;
use tracing::{debug, info, info_span};

use loan_ingest::{is_numeric_dtype, is_string_dtype, numeric_values, string_values};
use loan_model::{ColumnNulls, ImputeStrategy};

use crate::error::{CleaningError, Result};
use crate::stats::{mean, median, present};

/// Null count and percentage of every column, in table order.
pub fn null_summary(df: &DataFrame) -> Vec<ColumnNulls> {
    let rows = df.height();
    df.get_columns()
        .iter()
        .map(|col| ColumnNulls::new(col.name().as_str(), col.null_count(), rows))
        .collect()
}

/// Drop columns whose share of nulls is greater than `max_null_fraction`.
///
/// Returns the narrowed table and the dropped column names.
pub fn drop_sparse_columns(
    df: &DataFrame,
    max_null_fraction: f64,
) -> Result<(DataFrame, Vec<String>)> {
    if !(0.0..=1.0).contains(&max_null_fraction) {
        return Err(CleaningError::InvalidThreshold {
            name: "max null fraction",
            value: max_null_fraction,
        });
    }

    let rows = df.height();
    let mut keep = Vec::new();
    let mut dropped = Vec::new();
    for column in df.get_columns() {
        let name = column.name().to_string();
        let fraction = if rows == 0 {
            0.0
        } else {
            column.null_count() as f64 / rows as f64
        };
        if fraction > max_null_fraction {
            debug!(column = %name, null_fraction = fraction, "dropping sparse column");
            dropped.push(name);
        } else {
            keep.push(name);
        }
    }

    if !dropped.is_empty() {
        info!(dropped = dropped.len(), "sparse columns dropped");
    }
    Ok((df.select(keep)?, dropped))
}

/// Value written into the nulls of a column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FillValue {
    Number(f64),
    Text(String),
}

/// One imputed column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImputeRecord {
    pub column: String,
    pub strategy: ImputeStrategy,
    pub fill: FillValue,
    pub filled: usize,
}

/// Fill nulls using `strategy`.
///
/// Mean and median fill numeric columns, which become Float64. Mode fills
/// string columns; ties go to the lexicographically smallest value.
/// Columns without nulls, or without any value to derive a fill from, are
/// left as they are.
pub fn impute(df: &DataFrame, strategy: ImputeStrategy) -> Result<(DataFrame, Vec<ImputeRecord>)> {
    let span = info_span!("impute", strategy = %strategy);
    let _guard = span.enter();

    let mut out = df.clone();
    let mut records = Vec::new();
    for column in df.get_columns() {
        let filled = column.null_count();
        if filled == 0 {
            continue;
        }
        let name = column.name().as_str();

        let fill = match strategy {
            ImputeStrategy::Mean | ImputeStrategy::Median if is_numeric_dtype(column.dtype()) => {
                let values = numeric_values(column)?;
                let observed = present(&values);
                let statistic = match strategy {
                    ImputeStrategy::Median => median(&observed),
                    _ => mean(&observed),
                };
                let Some(statistic) = statistic else {
                    continue;
                };
                let filled_values: Vec<f64> =
                    values.iter().map(|v| v.unwrap_or(statistic)).collect();
                out.with_column(Series::new(name.into(), filled_values).into_column())?;
                FillValue::Number(statistic)
            }
            ImputeStrategy::Mode if is_string_dtype(column.dtype()) => {
                let values = string_values(column)?;
                let Some(mode) = mode(&values) else {
                    continue;
                };
                let filled_values: Vec<String> = values
                    .into_iter()
                    .map(|v| v.unwrap_or_else(|| mode.clone()))
                    .collect();
                out.with_column(Series::new(name.into(), filled_values).into_column())?;
                FillValue::Text(mode)
            }
            _ => continue,
        };

        debug!(column = %name, filled, "nulls imputed");
        records.push(ImputeRecord {
            column: name.to_string(),
            strategy,
            fill,
            filled,
        });
    }

    info!(columns = records.len(), "imputation complete");
    Ok((out, records))
}

/// Most frequent non-null value; ties go to the smallest.
fn mode(values: &[Option<String>]) -> Option<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for value in values.iter().flatten() {
        *counts.entry(value.as_str()).or_default() += 1;
    }
    let mut best: Option<(&str, usize)> = None;
    for (value, count) in counts {
        if best.is_none_or(|(_, c)| count > c) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_prefers_smallest_on_tie() {
        let values = vec![
            Some("B".to_string()),
            Some("A".to_string()),
            None,
            Some("B".to_string()),
            Some("A".to_string()),
        ];
        assert_eq!(mode(&values).as_deref(), Some("A"));
    }

    #[test]
    fn mode_of_all_nulls_is_none() {
        assert_eq!(mode(&[None, None]), None);
    }
}
