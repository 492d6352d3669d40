//! Error types for loan table cleaning.

use polars::prelude::PolarsError;
use thiserror::Error;

use loan_model::TransformKind;

/// Why a Box-Cox lambda could not be fitted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    #[error("need at least 2 values, got {count}")]
    TooFewValues { count: usize },
    #[error("log-likelihood is undefined for every lambda")]
    UndefinedLikelihood,
    #[error("likelihood maximum lies on the search bound (lambda = {lambda})")]
    AtBound { lambda: f64 },
    #[error("refinement did not converge after {iterations} iterations")]
    NotConverged { iterations: usize },
}

/// A candidate transformation could not be applied to a column.
///
/// Both variants are recoverable: the selector skips the candidate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    /// A value lies outside the transformation's domain.
    #[error("{kind} is undefined for value {value} at row {row}")]
    Domain {
        kind: TransformKind,
        row: usize,
        value: f64,
    },

    /// The transformation's parameter fit failed.
    #[error("{kind} fit failed: {source}")]
    Numeric {
        kind: TransformKind,
        #[source]
        source: FitError,
    },
}

impl TransformError {
    pub fn kind(&self) -> TransformKind {
        match self {
            Self::Domain { kind, .. } | Self::Numeric { kind, .. } => *kind,
        }
    }
}

/// Table-level failures. These indicate a caller precondition violation
/// and stop the stage.
#[derive(Debug, Error)]
pub enum CleaningError {
    #[error("invalid {name}: {value}")]
    InvalidThreshold { name: &'static str, value: f64 },

    #[error("column '{column}' not found")]
    ColumnNotFound { column: String },

    #[error("column '{column}' is not numeric ({dtype})")]
    NonNumericColumn { column: String, dtype: String },

    #[error(
        "column '{column}' mixes numbers with {non_numeric_count} non-numeric values (e.g. {})",
        .samples.join(", ")
    )]
    MixedColumn {
        column: String,
        non_numeric_count: usize,
        samples: Vec<String>,
    },

    #[error("column '{column}' has non-finite value {value} at row {row}")]
    NonFiniteValue {
        column: String,
        row: usize,
        value: f64,
    },

    #[error("polars error: {0}")]
    Polars(#[from] PolarsError),
}

/// Result type for table-level cleaning operations.
pub type Result<T> = std::result::Result<T, CleaningError>;
