//! Configuration options for the cleaning pipeline.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::transform::TransformKind;

/// Skewness magnitude above which a column is offered for transformation.
pub const DEFAULT_SKEW_THRESHOLD: f64 = 0.5;
/// Columns with a larger share of nulls are dropped.
pub const DEFAULT_MAX_NULL_FRACTION: f64 = 0.5;
/// Tukey fence multiplier for outlier removal.
pub const DEFAULT_IQR_MULTIPLIER: f64 = 1.5;
/// Absolute Pearson correlation above which one column of a pair is dropped.
pub const DEFAULT_CORRELATION_THRESHOLD: f64 = 0.8;

/// How nulls are filled after sparse columns have been dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImputeStrategy {
    /// Column mean, numeric columns only.
    #[default]
    Mean,
    /// Column median, numeric columns only.
    Median,
    /// Most frequent value, string columns only.
    Mode,
}

impl ImputeStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Median => "median",
            Self::Mode => "mode",
        }
    }
}

impl fmt::Display for ImputeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImputeStrategy {
    type Err = ModelError;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mean" => Ok(Self::Mean),
            "median" => Ok(Self::Median),
            "mode" => Ok(Self::Mode),
            _ => Err(ModelError::UnknownImputeStrategy {
                value: value.to_string(),
            }),
        }
    }
}

/// Options controlling the cleaning pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleaningOptions {
    /// Columns converted to dates before cleaning. Absent columns are skipped.
    #[serde(default)]
    pub date_columns: Vec<String>,

    /// Columns converted to categorical labels before cleaning.
    #[serde(default)]
    pub categorical_columns: Vec<String>,

    /// Columns whose null fraction exceeds this value are dropped.
    pub max_null_fraction: f64,

    /// Strategy used to fill the remaining nulls.
    pub impute_strategy: ImputeStrategy,

    /// Minimum absolute skewness before a column is transformed.
    pub skew_threshold: f64,

    /// Candidate transformations, tried in [`TransformKind`] order.
    pub candidates: Vec<TransformKind>,

    /// Tukey fence multiplier; `None` disables outlier removal.
    pub iqr_multiplier: Option<f64>,

    /// Correlation threshold; `None` disables correlation pruning.
    pub correlation_threshold: Option<f64>,
}

impl Default for CleaningOptions {
    fn default() -> Self {
        Self {
            date_columns: Vec::new(),
            categorical_columns: Vec::new(),
            max_null_fraction: DEFAULT_MAX_NULL_FRACTION,
            impute_strategy: ImputeStrategy::default(),
            skew_threshold: DEFAULT_SKEW_THRESHOLD,
            candidates: TransformKind::ALL.to_vec(),
            iqr_multiplier: Some(DEFAULT_IQR_MULTIPLIER),
            correlation_threshold: Some(DEFAULT_CORRELATION_THRESHOLD),
        }
    }
}

impl CleaningOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_date_columns(mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.date_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_categorical_columns(
        mut self,
        columns: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.categorical_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_skew_threshold(mut self, threshold: f64) -> Self {
        self.skew_threshold = threshold;
        self
    }

    pub fn with_impute_strategy(mut self, strategy: ImputeStrategy) -> Self {
        self.impute_strategy = strategy;
        self
    }

    /// Restrict the candidate set. Duplicates are removed and the fixed
    /// selection order is restored.
    pub fn with_candidates(mut self, candidates: impl IntoIterator<Item = TransformKind>) -> Self {
        let mut kinds: Vec<TransformKind> = candidates.into_iter().collect();
        kinds.sort();
        kinds.dedup();
        self.candidates = kinds;
        self
    }

    pub fn without_outlier_removal(mut self) -> Self {
        self.iqr_multiplier = None;
        self
    }

    pub fn without_correlation_pruning(mut self) -> Self {
        self.correlation_threshold = None;
        self
    }

    /// Check every numeric option is usable.
    pub fn validate(&self) -> Result<()> {
        check_range("max null fraction", self.max_null_fraction, 0.0, 1.0)?;
        check_non_negative("skew threshold", self.skew_threshold)?;
        if let Some(multiplier) = self.iqr_multiplier {
            check_non_negative("IQR multiplier", multiplier)?;
        }
        if let Some(threshold) = self.correlation_threshold {
            check_range("correlation threshold", threshold, 0.0, 1.0)?;
        }
        Ok(())
    }
}

fn check_non_negative(name: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(ModelError::InvalidOption {
            name,
            value,
            reason: "must be finite",
        });
    }
    if value < 0.0 {
        return Err(ModelError::InvalidOption {
            name,
            value,
            reason: "must not be negative",
        });
    }
    Ok(())
}

fn check_range(name: &'static str, value: f64, min: f64, max: f64) -> Result<()> {
    check_non_negative(name, value)?;
    if value < min || value > max {
        return Err(ModelError::InvalidOption {
            name,
            value,
            reason: "must lie between 0 and 1",
        });
    }
    Ok(())
}
