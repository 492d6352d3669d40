//! Skew correction across a whole table.
//!
//! Every numeric column (or an explicit list of skewed columns) goes
//! through the [`TransformSelector`]. Selected columns are replaced by their
//! transformed Float64 values; all other columns are carried over as-is.

use polars::prelude::{AnyValue, Column, DataFrame, IntoColumn, NamedFrom, Series};
use serde::Serialize;
use tracing::{debug, info, info_span, warn};

use loan_ingest::{any_to_string, is_numeric_dtype, is_string_dtype, numeric_values, parse_f64};
use loan_model::{CleaningOptions, DEFAULT_SKEW_THRESHOLD};

use crate::catalog::{StandardCatalog, TransformCatalog, Transformation};
use crate::error::{CleaningError, Result};
use crate::selector::{NotApplicable, SelectionResult, TransformSelector};

const MAX_MIXED_SAMPLES: usize = 5;

/// One transformed column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransformRecord {
    pub column: String,
    pub transformation: Transformation,
    pub skew_before: f64,
    pub skew_after: f64,
}

/// Transformed columns in table order. Unchanged columns are omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransformReport {
    records: Vec<TransformRecord>,
}

impl TransformReport {
    pub fn records(&self) -> &[TransformRecord] {
        &self.records
    }

    pub fn get(&self, column: &str) -> Option<&TransformRecord> {
        self.records.iter().find(|record| record.column == column)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Applies skew-reducing transformations to the columns of a table.
#[derive(Debug, Clone)]
pub struct SkewCorrection<C = StandardCatalog> {
    threshold: f64,
    selector: TransformSelector<C>,
}

impl Default for SkewCorrection {
    fn default() -> Self {
        Self::new(DEFAULT_SKEW_THRESHOLD)
    }
}

impl SkewCorrection {
    pub fn new(threshold: f64) -> Self {
        Self::with_catalog(threshold, StandardCatalog::new())
    }

    /// Threshold and candidate set taken from `options`.
    pub fn from_options(options: &CleaningOptions) -> Self {
        Self::with_catalog(
            options.skew_threshold,
            StandardCatalog::with_candidates(options.candidates.iter().copied()),
        )
    }
}

impl<C: TransformCatalog> SkewCorrection<C> {
    pub fn with_catalog(threshold: f64, catalog: C) -> Self {
        Self {
            threshold,
            selector: TransformSelector::new(catalog),
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn selector(&self) -> &TransformSelector<C> {
        &self.selector
    }

    /// Correct every numeric column of `df`.
    ///
    /// String columns are passed through, but a string column that mixes
    /// numbers with other text is rejected.
    pub fn run(&self, df: &DataFrame) -> Result<(DataFrame, TransformReport)> {
        self.check_threshold()?;
        let mut targets = Vec::new();
        for column in df.get_columns() {
            if is_numeric_dtype(column.dtype()) {
                targets.push(column.name().to_string());
            } else if is_string_dtype(column.dtype()) {
                check_not_mixed(column)?;
            }
        }
        self.correct(df, &targets)
    }

    /// Correct only `columns`, typically the skewed columns of a
    /// [`SkewnessReport`](crate::SkewnessReport).
    ///
    /// Every requested column must exist and be numeric.
    pub fn run_columns(
        &self,
        df: &DataFrame,
        columns: &[String],
    ) -> Result<(DataFrame, TransformReport)> {
        self.check_threshold()?;
        for name in columns {
            let column = df
                .column(name)
                .map_err(|_| CleaningError::ColumnNotFound {
                    column: name.clone(),
                })?;
            if is_numeric_dtype(column.dtype()) {
                continue;
            }
            if is_string_dtype(column.dtype()) {
                check_not_mixed(column)?;
            }
            return Err(CleaningError::NonNumericColumn {
                column: name.clone(),
                dtype: column.dtype().to_string(),
            });
        }
        // Table order, not request order.
        let targets: Vec<String> = df
            .get_column_names()
            .into_iter()
            .filter(|name| columns.iter().any(|c| c == name.as_str()))
            .map(|name| name.to_string())
            .collect();
        self.correct(df, &targets)
    }

    fn check_threshold(&self) -> Result<()> {
        if self.threshold.is_finite() && self.threshold >= 0.0 {
            Ok(())
        } else {
            Err(CleaningError::InvalidThreshold {
                name: "skew threshold",
                value: self.threshold,
            })
        }
    }

    fn correct(&self, df: &DataFrame, targets: &[String]) -> Result<(DataFrame, TransformReport)> {
        let span = info_span!(
            "skew_correction",
            columns = targets.len(),
            threshold = self.threshold
        );
        let _guard = span.enter();

        let mut out = df.clone();
        let mut records = Vec::new();
        for name in targets {
            let values = numeric_values(df.column(name)?)?;
            check_finite(name, &values)?;

            match self.selector.select(&values, self.threshold) {
                SelectionResult::Selected(selection) => {
                    debug!(
                        column = %name,
                        transformation = %selection.transformation,
                        skew_before = selection.skew_before,
                        skew_after = selection.skew_after,
                        "column transformed"
                    );
                    let series = Series::new(name.as_str().into(), selection.values);
                    out.with_column(series.into_column())?;
                    records.push(TransformRecord {
                        column: name.clone(),
                        transformation: selection.transformation,
                        skew_before: selection.skew_before,
                        skew_after: selection.skew_after,
                    });
                }
                SelectionResult::NoneApplicable(NotApplicable::NoCandidate { rejected }) => {
                    warn!(
                        column = %name,
                        rejected = rejected.len(),
                        "no candidate transformation applies"
                    );
                }
                SelectionResult::NoneApplicable(reason) => {
                    debug!(column = %name, ?reason, "column left unchanged");
                }
            }
        }

        info!(
            examined = targets.len(),
            transformed = records.len(),
            "skew correction complete"
        );
        Ok((out, TransformReport { records }))
    }
}

/// Reject NaN and infinite values; nulls are fine.
pub(crate) fn check_finite(column: &str, values: &[Option<f64>]) -> Result<()> {
    let bad = values
        .iter()
        .enumerate()
        .find_map(|(row, v)| v.filter(|x| !x.is_finite()).map(|x| (row, x)));
    match bad {
        Some((row, value)) => Err(CleaningError::NonFiniteValue {
            column: column.to_string(),
            row,
            value,
        }),
        None => Ok(()),
    }
}

/// Reject string columns holding both numeric and non-numeric text.
pub(crate) fn check_not_mixed(column: &Column) -> Result<()> {
    let mut numeric_count = 0usize;
    let mut non_numeric_count = 0usize;
    let mut samples = Vec::new();

    for idx in 0..column.len() {
        let value = column.get(idx).unwrap_or(AnyValue::Null);
        let text = any_to_string(value);
        let trimmed = text.trim();
        if trimmed.is_empty() {
            continue;
        }
        match parse_f64(trimmed) {
            // "NaN" and "inf" are missing-value placeholders, like blanks.
            Some(number) if !number.is_finite() => {}
            Some(_) => numeric_count += 1,
            None => {
                non_numeric_count += 1;
                if samples.len() < MAX_MIXED_SAMPLES {
                    samples.push(trimmed.to_string());
                }
            }
        }
    }

    if numeric_count > 0 && non_numeric_count > 0 {
        return Err(CleaningError::MixedColumn {
            column: column.name().to_string(),
            non_numeric_count,
            samples,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixed_column_lists_samples() {
        let column =
            Series::new("amount".into(), vec![Some("100"), Some("n/a"), None, Some("250")])
                .into_column();
        let err = check_not_mixed(&column).unwrap_err();
        match err {
            CleaningError::MixedColumn {
                column,
                non_numeric_count,
                samples,
            } => {
                assert_eq!(column, "amount");
                assert_eq!(non_numeric_count, 1);
                assert_eq!(samples, vec!["n/a".to_string()]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn text_only_column_is_not_mixed() {
        let column = Series::new("grade".into(), vec!["A", "B", "C"]).into_column();
        assert!(check_not_mixed(&column).is_ok());
    }

    #[test]
    fn nan_placeholders_do_not_make_a_column_mixed() {
        let labels =
            Series::new("purpose".into(), vec!["car", "NaN", "house", "nan"]).into_column();
        assert!(check_not_mixed(&labels).is_ok());
        let numbers =
            Series::new("annual_inc".into(), vec!["52000", "NaN", "inf", "48000"]).into_column();
        assert!(check_not_mixed(&numbers).is_ok());
    }

    #[test]
    fn placeholders_are_not_counted_as_labels() {
        let column =
            Series::new("amount".into(), vec!["100", "-inf", "n/a", "250"]).into_column();
        let err = check_not_mixed(&column).unwrap_err();
        assert!(matches!(
            err,
            CleaningError::MixedColumn { non_numeric_count: 1, .. }
        ));
    }

    #[test]
    fn infinite_value_is_reported_with_row() {
        let err = check_finite("x", &[Some(1.0), None, Some(f64::INFINITY)]).unwrap_err();
        assert!(matches!(err, CleaningError::NonFiniteValue { row: 2, .. }));
    }
}
