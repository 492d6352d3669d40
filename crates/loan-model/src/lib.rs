pub mod error;
pub mod options;
pub mod quality;
pub mod transform;

pub use error::{ModelError, Result};
pub use options::{
    CleaningOptions, DEFAULT_CORRELATION_THRESHOLD, DEFAULT_IQR_MULTIPLIER,
    DEFAULT_MAX_NULL_FRACTION, DEFAULT_SKEW_THRESHOLD, ImputeStrategy,
};
pub use quality::ColumnNulls;
pub use transform::TransformKind;
