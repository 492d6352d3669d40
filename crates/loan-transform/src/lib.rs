//! Loan table cleaning.
//!
//! This crate provides the cleaning stages applied to a loaded loan table:
//!
//! - **convert**: date and categorical column conversion
//! - **skew**: skewness measurement and the per-table skewness report
//! - **boxcox**: Box-Cox power transform and maximum-likelihood lambda fit
//! - **catalog**: candidate transformations and their domains
//! - **selector**: picks the candidate that best removes a column's skew
//! - **correction**: applies the selector to every numeric column of a table
//! - **missing**: null summaries, sparse column dropping and imputation
//! - **outliers**: IQR fence outlier removal
//! - **correlation**: Pearson correlation matrix and redundant column pruning

pub mod boxcox;
pub mod catalog;
pub mod convert;
pub mod correction;
pub mod correlation;
pub mod error;
pub mod missing;
pub mod outliers;
pub mod selector;
pub mod skew;
pub mod stats;

pub use catalog::{StandardCatalog, TransformCatalog, Transformation, Transformed};
pub use convert::{
    ConversionRecord, ConvertedType, convert_to_categorical, convert_to_date, parse_date,
};
pub use correction::{SkewCorrection, TransformRecord, TransformReport};
pub use correlation::{CorrelatedPair, CorrelationMatrix, prune_correlated};
pub use error::{CleaningError, FitError, Result, TransformError};
pub use missing::{FillValue, ImputeRecord, drop_sparse_columns, impute, null_summary};
pub use outliers::{OutlierRecord, iqr_fence, remove_outliers};
pub use selector::{
    NotApplicable, Rejection, RejectedCandidate, Selection, SelectionResult, TransformSelector,
};
pub use skew::{ColumnSkew, SkewnessReport, skewness};
