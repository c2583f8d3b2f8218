//! Write fit JSON files.
//!
//! The JSON export carries everything downstream tooling needs to redraw or
//! tabulate a run without refitting: per-series coefficients, fit quality,
//! standard errors when available, and a precomputed fitted grid. The
//! schema is `domain::FitFile`.

use std::fs::File;
use std::path::Path;

use crate::domain::{FitFile, FitFileSeries, FitGrid, TdlModel};
use crate::error::AppError;
use crate::models::predict;
use crate::report::SeriesRun;

/// Write a fit JSON file covering every fitted series.
pub fn write_fit_json(path: &Path, runs: &[SeriesRun], grid_points: usize) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::input(format!(
            "Failed to create fit JSON '{}': {e}",
            path.display()
        ))
    })?;

    let series = runs
        .iter()
        .map(|run| {
            let (x, y) = build_grid(
                &run.fit.model,
                run.series.x_max().unwrap_or(1.0),
                grid_points,
            );
            FitFileSeries {
                label: run.label.clone(),
                model: run.fit.model,
                quality: run.fit.quality.clone(),
                std_errors: run.fit.std_errors,
                grid: FitGrid { x, y },
            }
        })
        .collect();

    let out = FitFile {
        tool: "tdl".to_string(),
        series,
    };

    serde_json::to_writer_pretty(file, &out)
        .map_err(|e| AppError::input(format!("Failed to write fit JSON: {e}")))?;

    Ok(())
}

fn build_grid(model: &TdlModel, x_max: f64, n: usize) -> (Vec<f64>, Vec<f64>) {
    let n = n.max(2);
    let x1 = if x_max.is_finite() && x_max > 1.0 {
        x_max
    } else {
        2.0
    };

    let mut xs = Vec::with_capacity(n);
    let mut ys = Vec::with_capacity(n);
    for i in 0..n {
        let u = i as f64 / (n as f64 - 1.0);
        let x = 1.0 + u * (x1 - 1.0);
        xs.push(x);
        ys.push(predict(x, model));
    }

    (xs, ys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FitQuality, FitResult, Series};

    #[test]
    fn fit_json_round_trips_through_serde() {
        let model = TdlModel {
            e_inf: -1.234,
            alpha: 0.456,
            beta: -0.078,
        };
        let run = SeriesRun {
            label: "sample.log".to_string(),
            series: Series::new(vec![2.0, 4.0, 8.0, 16.0], vec![-1.0, -1.1, -1.2, -1.21]),
            fit: FitResult {
                model,
                quality: FitQuality {
                    sse: 1e-12,
                    rmse: 5e-7,
                    n: 4,
                    iterations: 2,
                },
                std_errors: Some([1e-7, 2e-7, 3e-7]),
            },
            residuals: Vec::new(),
        };

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fit.json");
        write_fit_json(&path, &[run], 50).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let parsed: FitFile = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.tool, "tdl");
        assert_eq!(parsed.series.len(), 1);

        let s = &parsed.series[0];
        assert_eq!(s.label, "sample.log");
        assert_eq!(s.model, model);
        assert_eq!(s.grid.x.len(), 50);
        assert!((s.grid.x[0] - 1.0).abs() < 1e-12);
        assert!((s.grid.x[49] - 16.0).abs() < 1e-12);
        assert!((s.grid.y[49] - predict(16.0, &model)).abs() < 1e-12);
    }
}
