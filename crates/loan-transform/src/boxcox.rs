//! Box-Cox power transformation.
//!
//! For `lambda != 0`: `y = (x^lambda - 1) / lambda`; for `lambda == 0`:
//! `y = ln(x)`. Input must be strictly positive.
//!
//! Lambda is the maximum-likelihood estimate under a normal model:
//!
//! ```text
//! llf(lambda) = -(n / 2) ln(var(y)) + (lambda - 1) * sum(ln x)
//! ```
//!
//! A coarse grid over `[-LAMBDA_BOUND, LAMBDA_BOUND]` brackets the maximum,
//! then golden-section search refines it.

use crate::error::FitError;

/// Largest lambda magnitude considered by the fit.
pub const LAMBDA_BOUND: f64 = 5.0;

const GRID_STEP: f64 = 0.05;
const TOLERANCE: f64 = 1e-10;
const MAX_ITERATIONS: usize = 200;
const ZERO_LAMBDA: f64 = 1e-10;
/// Standard deviations below this share of the largest transformed
/// magnitude count as zero variance.
const RELATIVE_VARIANCE_FLOOR: f64 = 1e-12;

/// Box-Cox transform of one positive value. Non-positive input yields NaN.
pub fn boxcox(x: f64, lambda: f64) -> f64 {
    if x <= 0.0 {
        f64::NAN
    } else if lambda.abs() < ZERO_LAMBDA {
        x.ln()
    } else {
        (x.powf(lambda) - 1.0) / lambda
    }
}

/// Inverse Box-Cox transform of one value.
///
/// For lambda != 0: x = (lambda * y + 1)^(1/lambda)
/// For lambda == 0: x = exp(y)
pub fn inv_boxcox(y: f64, lambda: f64) -> f64 {
    if lambda.abs() < ZERO_LAMBDA {
        y.exp()
    } else {
        let base = lambda * y + 1.0;
        if base <= 0.0 {
            f64::NAN
        } else {
            base.powf(1.0 / lambda)
        }
    }
}

/// Profile log-likelihood of `lambda` for positive `values`.
///
/// Returns negative infinity where the likelihood is undefined (zero or
/// overflowing variance).
pub fn log_likelihood(values: &[f64], lambda: f64) -> f64 {
    let n = values.len();
    if n < 2 {
        return f64::NEG_INFINITY;
    }
    let transformed: Vec<f64> = values.iter().map(|&x| boxcox(x, lambda)).collect();
    let mean = transformed.iter().sum::<f64>() / n as f64;
    let variance = transformed.iter().map(|y| (y - mean).powi(2)).sum::<f64>() / n as f64;
    let scale = transformed.iter().fold(0.0f64, |m, y| m.max(y.abs()));
    // Rounding noise of a constant column is not variance.
    if !(variance.sqrt() > scale * RELATIVE_VARIANCE_FLOOR) || !variance.is_finite() {
        return f64::NEG_INFINITY;
    }
    let log_sum: f64 = values.iter().map(|x| x.ln()).sum();
    let llf = -0.5 * n as f64 * variance.ln() + (lambda - 1.0) * log_sum;
    if llf.is_nan() { f64::NEG_INFINITY } else { llf }
}

/// Fit lambda by maximum likelihood.
///
/// `values` must be strictly positive; callers check the domain first.
pub fn fit_lambda(values: &[f64]) -> Result<f64, FitError> {
    if values.len() < 2 {
        return Err(FitError::TooFewValues {
            count: values.len(),
        });
    }

    let steps = (2.0 * LAMBDA_BOUND / GRID_STEP).round() as i64;
    let mut best_lambda = -LAMBDA_BOUND;
    let mut best_llf = f64::NEG_INFINITY;
    let mut best_step = 0i64;
    for step in 0..=steps {
        let lambda = -LAMBDA_BOUND + step as f64 * GRID_STEP;
        let llf = log_likelihood(values, lambda);
        if llf > best_llf {
            best_llf = llf;
            best_lambda = lambda;
            best_step = step;
        }
    }
    if !best_llf.is_finite() {
        return Err(FitError::UndefinedLikelihood);
    }
    if best_step == 0 || best_step == steps {
        return Err(FitError::AtBound {
            lambda: best_lambda,
        });
    }

    let refined = golden_section_max(
        |lambda| log_likelihood(values, lambda),
        best_lambda - GRID_STEP,
        best_lambda + GRID_STEP,
    )?;
    if log_likelihood(values, refined) >= best_llf {
        Ok(refined)
    } else {
        Ok(best_lambda)
    }
}

/// Maximise a unimodal function on `[lo, hi]`.
fn golden_section_max<F>(f: F, lo: f64, hi: f64) -> Result<f64, FitError>
where
    F: Fn(f64) -> f64,
{
    let inv_phi = (5.0f64.sqrt() - 1.0) / 2.0;
    let (mut a, mut b) = (lo, hi);
    let mut c = b - inv_phi * (b - a);
    let mut d = a + inv_phi * (b - a);
    let mut fc = f(c);
    let mut fd = f(d);
    for _ in 0..MAX_ITERATIONS {
        if (b - a).abs() <= TOLERANCE * (1.0 + c.abs()) {
            return Ok((a + b) / 2.0);
        }
        if fc > fd {
            b = d;
            d = c;
            fd = fc;
            c = b - inv_phi * (b - a);
            fc = f(c);
        } else {
            a = c;
            c = d;
            fc = fd;
            d = a + inv_phi * (b - a);
            fd = f(d);
        }
    }
    Err(FitError::NotConverged {
        iterations: MAX_ITERATIONS,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boxcox_lambda_1_shifts_by_one() {
        for x in [1.0, 2.0, 3.0, 4.0, 5.0] {
            assert!((boxcox(x, 1.0) - (x - 1.0)).abs() < 1e-12);
        }
    }

    #[test]
    fn boxcox_lambda_0_is_log() {
        for x in [1.0, 2.0, 3.0, 4.0, 5.0] {
            assert!((boxcox(x, 0.0) - f64::ln(x)).abs() < 1e-12);
        }
    }

    #[test]
    fn boxcox_non_positive_is_nan() {
        assert!(boxcox(0.0, 0.5).is_nan());
        assert!(boxcox(-1.0, 0.5).is_nan());
    }

    #[test]
    fn inverse_round_trips() {
        for lambda in [-1.5, -0.5, 0.0, 0.5, 2.0] {
            for x in [0.5, 1.0, 3.0, 40.0] {
                let back = inv_boxcox(boxcox(x, lambda), lambda);
                assert!((back - x).abs() < 1e-9, "lambda {lambda}, x {x}, got {back}");
            }
        }
    }

    #[test]
    fn fit_finds_negative_lambda_for_long_right_tail() {
        let lambda = fit_lambda(&[2.0, 3.0, 4.0, 5.0, 101.0]).unwrap();
        assert!((-1.0..-0.4).contains(&lambda), "got {lambda}");
    }

    #[test]
    fn fit_is_near_zero_for_exponential_growth() {
        let values: Vec<f64> = (1..=10).map(|i| f64::from(i).exp()).collect();
        let lambda = fit_lambda(&values).unwrap();
        assert!(lambda.abs() < 0.5, "got {lambda}");
    }

    #[test]
    fn fit_refines_beyond_grid() {
        let values = [2.0, 3.0, 4.0, 5.0, 101.0];
        let lambda = fit_lambda(&values).unwrap();
        let here = log_likelihood(&values, lambda);
        assert!(here >= log_likelihood(&values, lambda - 0.01));
        assert!(here >= log_likelihood(&values, lambda + 0.01));
    }

    #[test]
    fn fit_rejects_constant_values() {
        assert_eq!(
            fit_lambda(&[3.0, 3.0, 3.0]),
            Err(FitError::UndefinedLikelihood)
        );
    }

    #[test]
    fn constant_values_have_no_likelihood() {
        for value in [3.0, 0.1, 1234.5] {
            let values = [value; 4];
            for lambda in [-5.0, -0.7, 0.0, 0.35, 4.5] {
                assert_eq!(
                    log_likelihood(&values, lambda),
                    f64::NEG_INFINITY,
                    "value {value}, lambda {lambda}"
                );
            }
            assert_eq!(fit_lambda(&values), Err(FitError::UndefinedLikelihood));
        }
    }

    #[test]
    fn fit_rejects_single_value() {
        assert_eq!(fit_lambda(&[3.0]), Err(FitError::TooFewValues { count: 1 }));
    }
}
