//! Candidate transformation kinds for skew correction.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// A skew-correcting transformation, without fitted parameters.
///
/// The variant order is the selection order: when two candidates reduce
/// skewness equally, the earlier one wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TransformKind {
    /// `ln(1 + x)`.
    #[serde(rename = "log1p")]
    Logarithmic,
    /// `sqrt(x)`.
    #[serde(rename = "sqrt")]
    SquareRoot,
    /// Box-Cox power transform with a fitted lambda.
    #[serde(rename = "boxcox")]
    BoxCox,
}

impl TransformKind {
    /// Every kind, in selection order.
    pub const ALL: [TransformKind; 3] = [Self::Logarithmic, Self::SquareRoot, Self::BoxCox];

    /// Short name used in reports and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Logarithmic => "log1p",
            Self::SquareRoot => "sqrt",
            Self::BoxCox => "boxcox",
        }
    }

    /// Human-readable name.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Logarithmic => "Logarithmic",
            Self::SquareRoot => "Square root",
            Self::BoxCox => "Box-Cox",
        }
    }
}

impl fmt::Display for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransformKind {
    type Err = ModelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "log1p" | "log" => Ok(Self::Logarithmic),
            "sqrt" => Ok(Self::SquareRoot),
            "boxcox" | "box-cox" => Ok(Self::BoxCox),
            _ => Err(ModelError::UnknownTransform {
                value: value.to_string(),
            }),
        }
    }
}
