//! Transformation selection for a single column.

use tracing::debug;

use loan_model::TransformKind;

use crate::catalog::{StandardCatalog, TransformCatalog, Transformation};
use crate::error::TransformError;
use crate::skew::skewness;

/// Outcome of selecting a transformation for one column.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionResult {
    Selected(Selection),
    NoneApplicable(NotApplicable),
}

impl SelectionResult {
    pub fn selection(&self) -> Option<&Selection> {
        match self {
            Self::Selected(selection) => Some(selection),
            Self::NoneApplicable(_) => None,
        }
    }

    pub fn is_selected(&self) -> bool {
        matches!(self, Self::Selected(_))
    }
}

/// The chosen transformation and the column it produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub transformation: Transformation,
    pub values: Vec<Option<f64>>,
    pub skew_before: f64,
    pub skew_after: f64,
}

/// Why a column was left unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum NotApplicable {
    /// Skewness of the input is undefined.
    UndefinedSkew,
    /// Absolute skewness does not exceed the threshold.
    BelowThreshold { skewness: f64 },
    /// Every candidate failed.
    NoCandidate { rejected: Vec<RejectedCandidate> },
    /// The best candidate does not reduce absolute skewness.
    NoImprovement {
        skew_before: f64,
        best: TransformKind,
        best_skew: f64,
    },
}

/// A candidate that was tried and discarded.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedCandidate {
    pub kind: TransformKind,
    pub rejection: Rejection,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    /// The catalog could not apply the candidate.
    Failed(TransformError),
    /// The candidate's output has undefined skewness.
    UndefinedSkew,
}

/// Picks the candidate that minimises absolute skewness.
#[derive(Debug, Clone, Default)]
pub struct TransformSelector<C = StandardCatalog> {
    catalog: C,
}

impl<C: TransformCatalog> TransformSelector<C> {
    pub fn new(catalog: C) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Select a transformation for `values`.
    ///
    /// The catalog is not consulted when the input skewness is undefined or
    /// within `threshold`. Ties between candidates go to the earlier one, and
    /// a selection always strictly reduces absolute skewness.
    pub fn select(&self, values: &[Option<f64>], threshold: f64) -> SelectionResult {
        let Some(skew_before) = skewness(values) else {
            return SelectionResult::NoneApplicable(NotApplicable::UndefinedSkew);
        };
        if skew_before.abs() <= threshold {
            return SelectionResult::NoneApplicable(NotApplicable::BelowThreshold {
                skewness: skew_before,
            });
        }

        let mut best: Option<(Transformation, Vec<Option<f64>>, f64)> = None;
        let mut rejected = Vec::new();
        for &kind in self.catalog.candidates() {
            let transformed = match self.catalog.apply(kind, values) {
                Ok(transformed) => transformed,
                Err(error) => {
                    debug!(candidate = %kind, %error, "candidate rejected");
                    rejected.push(RejectedCandidate {
                        kind,
                        rejection: Rejection::Failed(error),
                    });
                    continue;
                }
            };
            let Some(skew_after) = skewness(&transformed.values) else {
                debug!(candidate = %kind, "candidate output has undefined skewness");
                rejected.push(RejectedCandidate {
                    kind,
                    rejection: Rejection::UndefinedSkew,
                });
                continue;
            };
            debug!(
                candidate = %transformed.transformation,
                skew_before,
                skew_after,
                "candidate evaluated"
            );
            let better = best
                .as_ref()
                .is_none_or(|(_, _, current)| skew_after.abs() < current.abs());
            if better {
                best = Some((transformed.transformation, transformed.values, skew_after));
            }
        }

        let Some((transformation, values, skew_after)) = best else {
            return SelectionResult::NoneApplicable(NotApplicable::NoCandidate { rejected });
        };
        if skew_after.abs() >= skew_before.abs() {
            return SelectionResult::NoneApplicable(NotApplicable::NoImprovement {
                skew_before,
                best: transformation.kind(),
                best_skew: skew_after,
            });
        }
        SelectionResult::Selected(Selection {
            transformation,
            values,
            skew_before,
            skew_after,
        })
    }
}
