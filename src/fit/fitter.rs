//! Nonlinear least-squares fitting of the extrapolation model.
//!
//! Given a validated series we minimize
//!
//! ```text
//! Σ (y_i - E - α·x_i⁻¹ - β·x_i⁻²)²
//! ```
//!
//! with damped Gauss-Newton (Levenberg-Marquardt): each step solves the
//! augmented linear problem `min ‖J δ - r‖² + λ‖δ‖²` through the shared SVD
//! routine. The model is linear in `(E, α, β)`, so the Jacobian is the fixed
//! design matrix and convergence from any finite starting guess is fast; the
//! damping loop still owns the failure modes (singular systems, exhausted
//! iterations) and turns them into descriptive errors instead of NaN
//! coefficients.

use nalgebra::{DMatrix, DVector};

use crate::domain::{FitQuality, FitResult, Series, TdlModel};
use crate::error::AppError;
use crate::math::solve_least_squares;
use crate::models::{fill_design_row, predict};

/// Solver knobs, caller-suppliable via CLI flags.
#[derive(Debug, Clone, Copy)]
pub struct FitOptions {
    /// Starting `(E, α, β)`. All-ones in absence of a better heuristic.
    pub initial_guess: [f64; 3],
    pub max_iters: usize,
    /// Relative step-norm threshold declaring convergence.
    pub tol: f64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            initial_guess: [1.0; 3],
            max_iters: 50,
            tol: 1e-10,
        }
    }
}

const LAMBDA_INIT: f64 = 1e-3;
const LAMBDA_MIN: f64 = 1e-12;
const LAMBDA_MAX: f64 = 1e12;

/// Fit one series. `label` names the series in every error message.
pub fn fit_series(label: &str, series: &Series, opts: &FitOptions) -> Result<FitResult, AppError> {
    validate_series(label, series)?;

    let n = series.xs.len();
    let jacobian = build_jacobian(&series.xs);

    // Identifiability: three coefficients need three independent design
    // directions, i.e. at least three distinct x values.
    let svd = jacobian.clone().svd(false, false);
    let sigma_max = svd.singular_values.max();
    let sigma_min = svd.singular_values.min();
    if !(sigma_max > 0.0) || sigma_min < 1e-12 * sigma_max {
        return Err(AppError::fit(format!(
            "Fit failed for series '{label}': singular Jacobian (are the x values distinct?)."
        )));
    }

    let mut params = DVector::from_column_slice(&opts.initial_guess);
    let mut sse = sse_at(series, &params);
    let mut lambda = LAMBDA_INIT;
    let mut iterations = 0usize;
    let mut converged = false;

    for _ in 0..opts.max_iters {
        iterations += 1;
        let residuals = residual_vector(series, &params);

        let Some(step) = solve_damped_step(&jacobian, &residuals, lambda) else {
            return Err(AppError::fit(format!(
                "Fit failed for series '{label}': singular normal equations (are the x values distinct?)."
            )));
        };

        // A vanishing step means the gradient is (numerically) zero.
        if step.norm() <= opts.tol * (1.0 + params.norm()) {
            converged = true;
            break;
        }

        let trial = &params + &step;
        let trial_sse = sse_at(series, &trial);

        if trial_sse.is_finite() && trial_sse <= sse {
            params = trial;
            sse = trial_sse;
            lambda = (lambda * 0.1).max(LAMBDA_MIN);
        } else {
            lambda *= 10.0;
            if lambda > LAMBDA_MAX {
                return Err(AppError::fit(format!(
                    "Fit did not converge for series '{label}': damping exhausted after {iterations} iterations."
                )));
            }
        }
    }

    if !converged {
        return Err(AppError::fit(format!(
            "Fit did not converge for series '{label}' within {} iterations (try a different initial guess).",
            opts.max_iters
        )));
    }

    let model = TdlModel {
        e_inf: params[0],
        alpha: params[1],
        beta: params[2],
    };
    let rmse = (sse / n as f64).sqrt();
    let std_errors = parameter_std_errors(&jacobian, sse, n);

    Ok(FitResult {
        model,
        quality: FitQuality {
            sse,
            rmse,
            n,
            iterations,
        },
        std_errors,
    })
}

/// Reject series the model is not well-posed for.
///
/// Three free coefficients need at least three points; the inverse-power
/// terms need `x ≥ 1` to stay on the branch the extrapolation is defined on.
pub fn validate_series(label: &str, series: &Series) -> Result<(), AppError> {
    let (nx, ny) = (series.xs.len(), series.ys.len());
    if nx != ny {
        return Err(AppError::validation(format!(
            "Series '{label}': x/y length mismatch ({nx} x values vs {ny} y values); \
             check the anchor rules against the log layout."
        )));
    }
    if nx < 3 {
        return Err(AppError::validation(format!(
            "Series '{label}': {nx} points are not enough to fit 3 coefficients (need at least 3)."
        )));
    }
    if let Some(bad) = series
        .xs
        .iter()
        .chain(series.ys.iter())
        .find(|v| !v.is_finite())
    {
        return Err(AppError::validation(format!(
            "Series '{label}': non-finite value {bad} in the extracted data."
        )));
    }
    if let Some(bad) = series.xs.iter().find(|&&x| x < 1.0) {
        return Err(AppError::validation(format!(
            "Series '{label}': sample count {bad} is below 1; the model is defined for x ≥ 1."
        )));
    }
    Ok(())
}

fn build_jacobian(xs: &[f64]) -> DMatrix<f64> {
    let mut jac = DMatrix::<f64>::zeros(xs.len(), 3);
    let mut row = [0.0; 3];
    for (i, &x) in xs.iter().enumerate() {
        fill_design_row(x, &mut row);
        for j in 0..3 {
            jac[(i, j)] = row[j];
        }
    }
    jac
}

fn residual_vector(series: &Series, params: &DVector<f64>) -> DVector<f64> {
    let model = params_model(params);
    DVector::from_iterator(
        series.xs.len(),
        series
            .xs
            .iter()
            .zip(series.ys.iter())
            .map(|(&x, &y)| y - predict(x, &model)),
    )
}

fn sse_at(series: &Series, params: &DVector<f64>) -> f64 {
    residual_vector(series, params).norm_squared()
}

fn params_model(params: &DVector<f64>) -> TdlModel {
    TdlModel {
        e_inf: params[0],
        alpha: params[1],
        beta: params[2],
    }
}

/// Solve `min ‖J δ - r‖² + λ‖δ‖²` by stacking `√λ·I` under the Jacobian.
fn solve_damped_step(
    jacobian: &DMatrix<f64>,
    residuals: &DVector<f64>,
    lambda: f64,
) -> Option<DVector<f64>> {
    let n = jacobian.nrows();
    let mut a = DMatrix::<f64>::zeros(n + 3, 3);
    a.view_mut((0, 0), (n, 3)).copy_from(jacobian);
    let sqrt_lambda = lambda.sqrt();
    for j in 0..3 {
        a[(n + j, j)] = sqrt_lambda;
    }

    let mut b = DVector::<f64>::zeros(n + 3);
    b.rows_mut(0, n).copy_from(residuals);

    solve_least_squares(&a, &b)
}

/// Standard errors from the parameter covariance `s²·(JᵀJ)⁻¹`.
///
/// `None` when there are no residual degrees of freedom (`n == 3`) or the
/// normal matrix is singular.
fn parameter_std_errors(jacobian: &DMatrix<f64>, sse: f64, n: usize) -> Option<[f64; 3]> {
    if n <= 3 {
        return None;
    }
    let normal = jacobian.transpose() * jacobian;
    let inv = normal.try_inverse()?;
    let s2 = sse / (n - 3) as f64;

    let mut out = [0.0; 3];
    for j in 0..3 {
        let var = s2 * inv[(j, j)];
        if !var.is_finite() || var < 0.0 {
            return None;
        }
        out[j] = var.sqrt();
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model_series(model: &TdlModel, xs: &[f64]) -> Series {
        let ys = xs.iter().map(|&x| predict(x, model)).collect();
        Series::new(xs.to_vec(), ys)
    }

    #[test]
    fn recovers_exact_parameters_from_noiseless_data() {
        let truth = TdlModel {
            e_inf: -1.234,
            alpha: 0.456,
            beta: -0.078,
        };
        let series = model_series(&truth, &[2.0, 4.0, 8.0, 16.0, 32.0]);

        let fit = fit_series("toy", &series, &FitOptions::default()).unwrap();
        assert!((fit.model.e_inf - truth.e_inf).abs() < 1e-6);
        assert!((fit.model.alpha - truth.alpha).abs() < 1e-6);
        assert!((fit.model.beta - truth.beta).abs() < 1e-6);
        assert!(fit.quality.sse < 1e-12);
    }

    #[test]
    fn recovery_is_insensitive_to_starting_guess() {
        let truth = TdlModel {
            e_inf: -2.5,
            alpha: 1.75,
            beta: 0.3,
        };
        let series = model_series(&truth, &[1.0, 2.0, 3.0, 5.0, 9.0, 17.0]);

        for guess in [[1.0; 3], [-100.0, 50.0, 7.0], [1e6, -1e6, 0.0]] {
            let opts = FitOptions {
                initial_guess: guess,
                ..FitOptions::default()
            };
            let fit = fit_series("toy", &series, &opts).unwrap();
            assert!((fit.model.e_inf - truth.e_inf).abs() < 1e-6, "guess {guess:?}");
            assert!((fit.model.alpha - truth.alpha).abs() < 1e-6, "guess {guess:?}");
            assert!((fit.model.beta - truth.beta).abs() < 1e-6, "guess {guess:?}");
        }
    }

    #[test]
    fn undersized_series_is_a_validation_error() {
        let series = Series::new(vec![2.0, 4.0], vec![-1.0, -1.1]);
        let err = fit_series("short", &series, &FitOptions::default()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("short"));
    }

    #[test]
    fn mismatched_lengths_are_a_validation_error() {
        let series = Series::new(vec![2.0, 4.0, 8.0], vec![-1.0, -1.1]);
        let err = fit_series("lop", &series, &FitOptions::default()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("length mismatch"));
    }

    #[test]
    fn sub_unit_sample_counts_are_rejected() {
        let series = Series::new(vec![0.5, 2.0, 4.0], vec![-1.0, -1.1, -1.2]);
        let err = fit_series("bad-x", &series, &FitOptions::default()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn duplicate_x_values_fail_as_convergence_error() {
        // Three coefficients cannot be identified from one distinct x.
        let series = Series::new(vec![2.0, 2.0, 2.0], vec![-1.0, -1.1, -1.2]);
        let err = fit_series("degenerate", &series, &FitOptions::default()).unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn std_errors_are_tiny_on_noiseless_data_and_absent_at_n3() {
        let truth = TdlModel {
            e_inf: 0.5,
            alpha: -0.2,
            beta: 0.01,
        };

        let series = model_series(&truth, &[2.0, 4.0, 8.0, 16.0, 32.0]);
        let fit = fit_series("noiseless", &series, &FitOptions::default()).unwrap();
        let errs = fit.std_errors.expect("covariance should be available");
        assert!(errs.iter().all(|e| *e < 1e-6));

        let exact = model_series(&truth, &[2.0, 4.0, 8.0]);
        let fit = fit_series("exact", &exact, &FitOptions::default()).unwrap();
        assert!(fit.std_errors.is_none());
    }
}
