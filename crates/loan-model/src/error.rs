use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    #[error("unknown impute strategy '{value}' (expected mean, median or mode)")]
    UnknownImputeStrategy { value: String },
    #[error("unknown transformation '{value}' (expected log1p, sqrt or boxcox)")]
    UnknownTransform { value: String },
    #[error("invalid {name}: {value} ({reason})")]
    InvalidOption {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, ModelError>;
