//! Candidate transformations and their domains.
//!
//! A [`Transformation`] is a [`TransformKind`] plus whatever parameters were
//! fitted for a particular column. The [`TransformCatalog`] trait is the seam
//! the selector goes through, so callers can restrict or instrument the set
//! of candidates.

use std::fmt;

use serde::{Deserialize, Serialize};

use loan_model::TransformKind;

use crate::boxcox::{boxcox, fit_lambda, inv_boxcox};
use crate::error::TransformError;

/// Shift applied to every value before Box-Cox.
pub const BOXCOX_OFFSET: f64 = 1.0;

/// A fitted transformation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Transformation {
    #[serde(rename = "log1p")]
    Logarithmic,
    #[serde(rename = "sqrt")]
    SquareRoot,
    #[serde(rename = "boxcox")]
    BoxCox { lambda: f64 },
}

impl Transformation {
    pub fn kind(&self) -> TransformKind {
        match self {
            Self::Logarithmic => TransformKind::Logarithmic,
            Self::SquareRoot => TransformKind::SquareRoot,
            Self::BoxCox { .. } => TransformKind::BoxCox,
        }
    }

    /// Transform one value. Out-of-domain input yields NaN.
    pub fn forward(&self, x: f64) -> f64 {
        match *self {
            Self::Logarithmic => x.ln_1p(),
            Self::SquareRoot => x.sqrt(),
            Self::BoxCox { lambda } => boxcox(x + BOXCOX_OFFSET, lambda),
        }
    }

    /// Undo [`forward`](Self::forward) for one value.
    pub fn inverse(&self, y: f64) -> f64 {
        match *self {
            Self::Logarithmic => y.exp_m1(),
            Self::SquareRoot => y * y,
            Self::BoxCox { lambda } => inv_boxcox(y, lambda) - BOXCOX_OFFSET,
        }
    }

    /// Transform a column, keeping nulls.
    pub fn apply_values(&self, values: &[Option<f64>]) -> Vec<Option<f64>> {
        values.iter().map(|v| v.map(|x| self.forward(x))).collect()
    }

    /// Invert a transformed column, keeping nulls.
    pub fn inverse_values(&self, values: &[Option<f64>]) -> Vec<Option<f64>> {
        values.iter().map(|v| v.map(|y| self.inverse(y))).collect()
    }
}

impl fmt::Display for Transformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BoxCox { lambda } => write!(f, "boxcox(lambda={lambda:.4})"),
            other => f.write_str(other.kind().as_str()),
        }
    }
}

/// A column after one candidate has been applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Transformed {
    pub transformation: Transformation,
    pub values: Vec<Option<f64>>,
}

/// Source of candidate transformations.
pub trait TransformCatalog {
    /// Kinds to try, in selection order.
    fn candidates(&self) -> &[TransformKind];

    /// Fit and apply `kind` to `values`.
    fn apply(
        &self,
        kind: TransformKind,
        values: &[Option<f64>],
    ) -> Result<Transformed, TransformError>;
}

impl<C: TransformCatalog + ?Sized> TransformCatalog for &C {
    fn candidates(&self) -> &[TransformKind] {
        (**self).candidates()
    }

    fn apply(
        &self,
        kind: TransformKind,
        values: &[Option<f64>],
    ) -> Result<Transformed, TransformError> {
        (**self).apply(kind, values)
    }
}

/// The built-in catalog: log1p, square root and Box-Cox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandardCatalog {
    candidates: Vec<TransformKind>,
}

impl Default for StandardCatalog {
    fn default() -> Self {
        Self {
            candidates: TransformKind::ALL.to_vec(),
        }
    }
}

impl StandardCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the catalog to `kinds`. Order and duplicates are normalised.
    pub fn with_candidates(kinds: impl IntoIterator<Item = TransformKind>) -> Self {
        let mut candidates: Vec<TransformKind> = kinds.into_iter().collect();
        candidates.sort();
        candidates.dedup();
        Self { candidates }
    }
}

impl TransformCatalog for StandardCatalog {
    fn candidates(&self) -> &[TransformKind] {
        &self.candidates
    }

    fn apply(
        &self,
        kind: TransformKind,
        values: &[Option<f64>],
    ) -> Result<Transformed, TransformError> {
        apply_kind(kind, values)
    }
}

/// Check the domain of `kind`, fit its parameters and transform `values`.
pub fn apply_kind(
    kind: TransformKind,
    values: &[Option<f64>],
) -> Result<Transformed, TransformError> {
    check_domain(kind, values)?;
    let transformation = match kind {
        TransformKind::Logarithmic => Transformation::Logarithmic,
        TransformKind::SquareRoot => Transformation::SquareRoot,
        TransformKind::BoxCox => {
            let shifted: Vec<f64> = values.iter().flatten().map(|x| x + BOXCOX_OFFSET).collect();
            let lambda =
                fit_lambda(&shifted).map_err(|source| TransformError::Numeric { kind, source })?;
            Transformation::BoxCox { lambda }
        }
    };
    Ok(Transformed {
        transformation,
        values: transformation.apply_values(values),
    })
}

fn in_domain(kind: TransformKind, x: f64) -> bool {
    match kind {
        TransformKind::Logarithmic => x > -1.0,
        TransformKind::SquareRoot => x >= 0.0,
        TransformKind::BoxCox => x + BOXCOX_OFFSET > 0.0,
    }
}

/// First non-null value outside the domain of `kind`, as an error.
fn check_domain(kind: TransformKind, values: &[Option<f64>]) -> Result<(), TransformError> {
    let offending = values
        .iter()
        .enumerate()
        .find_map(|(row, v)| v.filter(|&x| !in_domain(kind, x)).map(|x| (row, x)));
    match offending {
        Some((row, value)) => Err(TransformError::Domain { kind, row, value }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FitError;

    fn col(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    #[test]
    fn log1p_values() {
        let out = apply_kind(TransformKind::Logarithmic, &col(&[0.0, 1.0, 3.0])).unwrap();
        assert_eq!(out.transformation, Transformation::Logarithmic);
        let expected = [0.0, 2.0f64.ln(), 4.0f64.ln()];
        for (got, want) in out.values.iter().zip(expected) {
            assert!((got.unwrap() - want).abs() < 1e-12);
        }
    }

    #[test]
    fn log1p_rejects_minus_one() {
        let err = apply_kind(TransformKind::Logarithmic, &col(&[2.0, -1.0])).unwrap_err();
        assert_eq!(
            err,
            TransformError::Domain {
                kind: TransformKind::Logarithmic,
                row: 1,
                value: -1.0
            }
        );
    }

    #[test]
    fn sqrt_accepts_zero_rejects_negative() {
        assert!(apply_kind(TransformKind::SquareRoot, &col(&[0.0, 4.0])).is_ok());
        let err = apply_kind(TransformKind::SquareRoot, &col(&[4.0, -0.5])).unwrap_err();
        assert!(matches!(err, TransformError::Domain { row: 1, .. }));
    }

    #[test]
    fn boxcox_rejects_values_at_or_below_minus_one() {
        let err = apply_kind(TransformKind::BoxCox, &col(&[-5.0, 0.0, 5.0])).unwrap_err();
        assert!(matches!(
            err,
            TransformError::Domain {
                kind: TransformKind::BoxCox,
                row: 0,
                ..
            }
        ));
    }

    #[test]
    fn boxcox_fit_failure_is_numeric_error() {
        let err = apply_kind(TransformKind::BoxCox, &col(&[3.0, 3.0, 3.0])).unwrap_err();
        assert_eq!(
            err,
            TransformError::Numeric {
                kind: TransformKind::BoxCox,
                source: FitError::UndefinedLikelihood
            }
        );
    }

    #[test]
    fn nan_is_outside_every_domain() {
        for kind in TransformKind::ALL {
            assert!(apply_kind(kind, &col(&[1.0, f64::NAN, 2.0])).is_err());
        }
    }

    #[test]
    fn nulls_pass_through() {
        let values = vec![Some(1.0), None, Some(3.0), Some(8.0), None, Some(40.0)];
        for kind in TransformKind::ALL {
            let out = apply_kind(kind, &values).unwrap();
            assert!(out.values[1].is_none());
            assert!(out.values[4].is_none());
            assert_eq!(out.values.iter().flatten().count(), 4);
        }
    }

    #[test]
    fn inverse_recovers_input() {
        let values = col(&[0.0, 1.5, 7.0, 120.0]);
        for kind in TransformKind::ALL {
            let out = apply_kind(kind, &values).unwrap();
            let back = out.transformation.inverse_values(&out.values);
            for (got, want) in back.iter().zip(&values) {
                assert!((got.unwrap() - want.unwrap()).abs() < 1e-9, "{kind}");
            }
        }
    }

    #[test]
    fn restricted_catalog_is_ordered() {
        let catalog = StandardCatalog::with_candidates([
            TransformKind::SquareRoot,
            TransformKind::Logarithmic,
            TransformKind::SquareRoot,
        ]);
        assert_eq!(
            catalog.candidates(),
            &[TransformKind::Logarithmic, TransformKind::SquareRoot]
        );
    }

    #[test]
    fn transformation_serializes_with_kind_tag() {
        let json = serde_json::to_string(&Transformation::BoxCox { lambda: 0.5 }).unwrap();
        assert_eq!(json, r#"{"kind":"boxcox","lambda":0.5}"#);
        let json = serde_json::to_string(&Transformation::Logarithmic).unwrap();
        assert_eq!(json, r#"{"kind":"log1p"}"#);
    }
}
