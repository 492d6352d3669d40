//! Error types for profiling and loan-book analytics.

use polars::prelude::PolarsError;
use thiserror::Error;

use loan_transform::CleaningError;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// A column the analysis reads is absent.
    #[error("required column '{column}' not found")]
    MissingColumn { column: String },

    /// A column the analysis sums is not numeric.
    #[error("column '{column}' is not numeric ({dtype})")]
    NonNumericColumn { column: String, dtype: String },

    /// An issue date matches none of the accepted formats.
    #[error("unparseable date '{value}' in column '{column}' at row {row}")]
    InvalidDate {
        column: String,
        row: usize,
        value: String,
    },

    #[error(transparent)]
    Cleaning(#[from] CleaningError),

    #[error("polars error: {0}")]
    Polars(#[from] PolarsError),
}

/// Result type for analytics operations.
pub type Result<T> = std::result::Result<T, AnalyticsError>;
