//! Reporting: residuals and formatted terminal output.

pub mod format;

pub use format::*;

use crate::domain::{FitResult, Series, TdlModel};
use crate::error::AppError;
use crate::models::predict;

/// One observed point with its fitted value.
#[derive(Debug, Clone)]
pub struct PointResidual {
    pub x: f64,
    pub y_obs: f64,
    pub y_fit: f64,
    pub residual: f64,
}

/// A fully processed series: extraction + fit + per-point residuals.
#[derive(Debug, Clone)]
pub struct SeriesRun {
    pub label: String,
    pub series: Series,
    pub fit: FitResult,
    pub residuals: Vec<PointResidual>,
}

/// A series that dropped out of the run, with the reason it did.
#[derive(Debug, Clone)]
pub struct SkippedSeries {
    pub label: String,
    pub reason: String,
}

/// Evaluate the fitted model at every observed point.
pub fn compute_residuals(series: &Series, model: &TdlModel) -> Result<Vec<PointResidual>, AppError> {
    series
        .xs
        .iter()
        .zip(series.ys.iter())
        .map(|(&x, &y_obs)| {
            let y_fit = predict(x, model);
            if !y_fit.is_finite() {
                return Err(AppError::fit(format!(
                    "Fitted model evaluates to a non-finite value at x = {x}."
                )));
            }
            Ok(PointResidual {
                x,
                y_obs,
                y_fit,
                residual: y_obs - y_fit,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compute_residuals_basic() {
        let model = TdlModel {
            e_inf: -1.0,
            alpha: 0.0,
            beta: 0.0,
        };
        let series = Series::new(vec![1.0, 2.0], vec![-1.0, -0.5]);

        let residuals = compute_residuals(&series, &model).unwrap();
        assert_eq!(residuals.len(), 2);
        assert!(residuals[0].residual.abs() < 1e-12);
        assert!((residuals[1].residual - 0.5).abs() < 1e-12);
    }
}
