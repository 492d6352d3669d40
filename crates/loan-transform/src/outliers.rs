//! IQR fence outlier removal.

use polars::prelude::{BooleanChunked, DataFrame, NewChunkedArray};
use serde::Serialize;
use tracing::{debug, info, info_span};

use loan_ingest::{is_numeric_dtype, numeric_values};

use crate::error::{CleaningError, Result};
use crate::stats::{present, quantile_sorted};

/// Columns with fewer non-null values are not filtered.
pub const MIN_OUTLIER_SAMPLES: usize = 4;

/// Fence applied to one column and the rows it removed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlierRecord {
    pub column: String,
    pub lower: f64,
    pub upper: f64,
    pub removed: usize,
}

/// Tukey fence `[Q1 - k * IQR, Q3 + k * IQR]` of the non-null values.
pub fn iqr_fence(values: &[Option<f64>], multiplier: f64) -> Option<(f64, f64)> {
    let mut sorted = present(values);
    if sorted.len() < MIN_OUTLIER_SAMPLES {
        return None;
    }
    sorted.sort_by(f64::total_cmp);
    let q1 = quantile_sorted(&sorted, 0.25);
    let q3 = quantile_sorted(&sorted, 0.75);
    let iqr = q3 - q1;
    Some((q1 - multiplier * iqr, q3 + multiplier * iqr))
}

/// Remove rows holding a value outside its column's IQR fence.
///
/// Numeric columns are processed in table order, each on the rows left by
/// the previous one. Null values never remove a row.
pub fn remove_outliers(df: &DataFrame, multiplier: f64) -> Result<(DataFrame, Vec<OutlierRecord>)> {
    if !(multiplier.is_finite() && multiplier >= 0.0) {
        return Err(CleaningError::InvalidThreshold {
            name: "IQR multiplier",
            value: multiplier,
        });
    }
    let span = info_span!("outliers", multiplier);
    let _guard = span.enter();

    let rows_before = df.height();
    let names: Vec<String> = df
        .get_columns()
        .iter()
        .filter(|col| is_numeric_dtype(col.dtype()))
        .map(|col| col.name().to_string())
        .collect();

    let mut out = df.clone();
    let mut records = Vec::new();
    for name in names {
        let values = numeric_values(out.column(&name)?)?;
        let Some((lower, upper)) = iqr_fence(&values, multiplier) else {
            debug!(column = %name, "too few values for an IQR fence");
            continue;
        };
        let mask: Vec<bool> = values
            .iter()
            .map(|v| v.is_none_or(|x| x >= lower && x <= upper))
            .collect();
        let removed = mask.iter().filter(|keep| !**keep).count();
        if removed > 0 {
            let mask = BooleanChunked::from_slice("keep".into(), &mask);
            out = out.filter(&mask)?;
        }
        debug!(column = %name, lower, upper, removed, "IQR fence applied");
        records.push(OutlierRecord {
            column: name,
            lower,
            upper,
            removed,
        });
    }

    info!(
        rows_before,
        rows_after = out.height(),
        "outlier removal complete"
    );
    Ok((out, records))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fence_uses_interpolated_quartiles() {
        let values: Vec<Option<f64>> = [1.0, 2.0, 3.0, 4.0, 5.0].map(Some).to_vec();
        // Q1 = 2, Q3 = 4, IQR = 2
        assert_eq!(iqr_fence(&values, 1.5), Some((-1.0, 7.0)));
    }

    #[test]
    fn fence_needs_four_values() {
        assert_eq!(iqr_fence(&[Some(1.0), None, Some(2.0), Some(3.0)], 1.5), None);
    }
}
