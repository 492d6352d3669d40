//! Selection scenarios and properties of the transformation selector.

use std::cell::Cell;

use proptest::prelude::*;

use loan_model::TransformKind;
use loan_transform::{
    NotApplicable, SelectionResult, StandardCatalog, TransformCatalog, TransformError,
    TransformSelector, Transformation, Transformed, skewness,
};

fn col(values: &[f64]) -> Vec<Option<f64>> {
    values.iter().copied().map(Some).collect()
}

/// Standard catalog that counts how often it is asked to apply a candidate.
struct CountingCatalog {
    inner: StandardCatalog,
    calls: Cell<usize>,
}

impl CountingCatalog {
    fn new(inner: StandardCatalog) -> Self {
        Self {
            inner,
            calls: Cell::new(0),
        }
    }
}

impl TransformCatalog for CountingCatalog {
    fn candidates(&self) -> &[TransformKind] {
        self.inner.candidates()
    }

    fn apply(
        &self,
        kind: TransformKind,
        values: &[Option<f64>],
    ) -> Result<Transformed, TransformError> {
        self.calls.set(self.calls.get() + 1);
        self.inner.apply(kind, values)
    }
}

/// Catalog whose every candidate produces the same fixed output.
struct FixedCatalog {
    output: Vec<Option<f64>>,
}

impl TransformCatalog for FixedCatalog {
    fn candidates(&self) -> &[TransformKind] {
        &TransformKind::ALL
    }

    fn apply(
        &self,
        kind: TransformKind,
        _values: &[Option<f64>],
    ) -> Result<Transformed, TransformError> {
        let transformation = match kind {
            TransformKind::Logarithmic => Transformation::Logarithmic,
            TransformKind::SquareRoot => Transformation::SquareRoot,
            TransformKind::BoxCox => Transformation::BoxCox { lambda: 0.5 },
        };
        Ok(Transformed {
            transformation,
            values: self.output.clone(),
        })
    }
}

#[test]
fn logarithmic_wins_among_log_and_sqrt() {
    let catalog =
        StandardCatalog::with_candidates([TransformKind::Logarithmic, TransformKind::SquareRoot]);
    let selector = TransformSelector::new(catalog);
    let values = col(&[1.0, 2.0, 3.0, 4.0, 100.0]);

    let SelectionResult::Selected(selection) = selector.select(&values, 0.5) else {
        panic!("expected a selection");
    };
    assert_eq!(selection.transformation, Transformation::Logarithmic);
    let expected = [0.693, 1.099, 1.386, 1.609, 4.615];
    for (got, want) in selection.values.iter().zip(expected) {
        assert!((got.unwrap() - want).abs() < 1e-3, "got {got:?}, want {want}");
    }
    assert!((selection.skew_before - 2.2324).abs() < 1e-3);
    assert!((selection.skew_after - 1.9676).abs() < 1e-3);
}

#[test]
fn boxcox_wins_with_full_catalog() {
    let selector = TransformSelector::new(StandardCatalog::new());
    let values = col(&[1.0, 2.0, 3.0, 4.0, 100.0]);

    let SelectionResult::Selected(selection) = selector.select(&values, 0.5) else {
        panic!("expected a selection");
    };
    let Transformation::BoxCox { lambda } = selection.transformation else {
        panic!("expected Box-Cox, got {}", selection.transformation);
    };
    assert!(lambda < 0.0, "lambda {lambda}");
    assert!(selection.skew_after.abs() < 1.0);
    assert!(selection.skew_after.abs() < selection.skew_before.abs());
}

#[test]
fn all_domains_violated_means_no_candidate() {
    let catalog = CountingCatalog::new(StandardCatalog::new());
    let selector = TransformSelector::new(&catalog);
    let result = selector.select(&col(&[-5.0, 0.0, 5.0, 10.0, 20.0]), 0.5);

    match result {
        SelectionResult::NoneApplicable(NotApplicable::NoCandidate { rejected }) => {
            assert_eq!(rejected.len(), 3);
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(catalog.calls.get(), 3);
}

#[test]
fn constant_column_never_reaches_catalog() {
    let catalog = CountingCatalog::new(StandardCatalog::new());
    let selector = TransformSelector::new(&catalog);

    let result = selector.select(&col(&[5.0, 5.0, 5.0, 5.0]), 0.5);
    assert_eq!(
        result,
        SelectionResult::NoneApplicable(NotApplicable::UndefinedSkew)
    );
    assert_eq!(catalog.calls.get(), 0);
}

#[test]
fn symmetric_column_never_reaches_catalog() {
    let catalog = CountingCatalog::new(StandardCatalog::new());
    let selector = TransformSelector::new(&catalog);

    let result = selector.select(&col(&[1.0, 2.0, 3.0, 4.0, 5.0]), 0.5);
    assert!(matches!(
        result,
        SelectionResult::NoneApplicable(NotApplicable::BelowThreshold { .. })
    ));
    assert_eq!(catalog.calls.get(), 0);
}

#[test]
fn too_few_values_never_reach_catalog() {
    let catalog = CountingCatalog::new(StandardCatalog::new());
    let selector = TransformSelector::new(&catalog);

    let result = selector.select(&[Some(1.0), None, Some(100.0)], 0.0);
    assert_eq!(
        result,
        SelectionResult::NoneApplicable(NotApplicable::UndefinedSkew)
    );
    assert_eq!(catalog.calls.get(), 0);
}

#[test]
fn threshold_equal_to_skewness_is_not_exceeded() {
    let values = col(&[1.0, 2.0, 3.0, 4.0, 100.0]);
    let skew = skewness(&values).unwrap();
    let catalog = CountingCatalog::new(StandardCatalog::new());
    let selector = TransformSelector::new(&catalog);

    assert!(!selector.select(&values, skew).is_selected());
    assert_eq!(catalog.calls.get(), 0);
}

#[test]
fn unchanged_skewness_is_no_improvement() {
    let values = col(&[1.0, 2.0, 3.0, 4.0, 100.0]);
    let selector = TransformSelector::new(FixedCatalog {
        output: values.clone(),
    });

    match selector.select(&values, 0.5) {
        SelectionResult::NoneApplicable(NotApplicable::NoImprovement {
            skew_before,
            best,
            best_skew,
        }) => {
            assert_eq!(best, TransformKind::Logarithmic);
            assert_eq!(skew_before, best_skew);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn ties_go_to_earliest_candidate() {
    let values = col(&[1.0, 2.0, 3.0, 4.0, 100.0]);
    let output = col(&[1.0, 2.0, 3.0, 4.0, 10.0]);
    let selector = TransformSelector::new(FixedCatalog { output });

    let selection = selector.select(&values, 0.5);
    let selection = selection.selection().expect("selected");
    assert_eq!(selection.transformation, Transformation::Logarithmic);
}

#[test]
fn undefined_output_skewness_rejects_candidate() {
    let values = col(&[1.0, 2.0, 3.0, 4.0, 100.0]);
    let selector = TransformSelector::new(FixedCatalog {
        output: col(&[7.0, 7.0, 7.0, 7.0, 7.0]),
    });
    assert!(matches!(
        selector.select(&values, 0.5),
        SelectionResult::NoneApplicable(NotApplicable::NoCandidate { .. })
    ));
}

/// Positive, right-skewed columns.
fn skewed_values_strategy() -> impl Strategy<Value = Vec<Option<f64>>> {
    prop::collection::vec(0.0..8.0_f64, 5..40)
        .prop_map(|v| v.into_iter().map(|x| Some(x.exp())).collect())
}

/// Columns with some nulls and values inside every candidate's domain.
fn nullable_values_strategy() -> impl Strategy<Value = Vec<Option<f64>>> {
    prop::collection::vec(prop::option::weighted(0.8, 0.0..1000.0_f64), 3..40)
}

/// Columns with some nulls and values anywhere in the log1p domain.
fn log1p_domain_strategy() -> impl Strategy<Value = Vec<Option<f64>>> {
    prop::collection::vec(prop::option::weighted(0.8, -0.999..1000.0_f64), 3..40)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn selection_strictly_reduces_skewness(values in skewed_values_strategy()) {
        let selector = TransformSelector::new(StandardCatalog::new());
        if let SelectionResult::Selected(selection) = selector.select(&values, 0.5) {
            prop_assert!(selection.skew_after.abs() < selection.skew_before.abs());
            prop_assert!(selection.skew_before.abs() > 0.5);
        }
    }

    #[test]
    fn apply_is_deterministic(values in nullable_values_strategy()) {
        let catalog = StandardCatalog::new();
        for kind in TransformKind::ALL {
            let first = catalog.apply(kind, &values);
            let second = catalog.apply(kind, &values);
            match (first, second) {
                (Ok(a), Ok(b)) => {
                    prop_assert_eq!(a.transformation, b.transformation);
                    let bits_a: Vec<Option<u64>> = a.values.iter().map(|v| v.map(f64::to_bits)).collect();
                    let bits_b: Vec<Option<u64>> = b.values.iter().map(|v| v.map(f64::to_bits)).collect();
                    prop_assert_eq!(bits_a, bits_b);
                }
                (Err(a), Err(b)) => prop_assert_eq!(a, b),
                _ => prop_assert!(false, "{} gave different outcomes", kind),
            }
        }
    }

    #[test]
    fn logarithmic_inverse_recovers_values(values in log1p_domain_strategy()) {
        let out = StandardCatalog::new().apply(TransformKind::Logarithmic, &values).unwrap();
        let back = out.transformation.inverse_values(&out.values);
        for (got, want) in back.iter().zip(&values) {
            match (got, want) {
                (Some(g), Some(w)) => prop_assert!((g - w).abs() < 1e-9),
                (None, None) => {}
                _ => prop_assert!(false, "null position changed"),
            }
        }
    }
}
