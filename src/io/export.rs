//! Export per-point results to CSV.
//!
//! One flat row per fitted point, so the file drops straight into a
//! spreadsheet or a plotting script without reshaping.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::AppError;
use crate::report::SeriesRun;

/// Write one row per fitted point across all series.
pub fn write_results_csv(path: &Path, runs: &[SeriesRun]) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::input(format!(
            "Failed to create results CSV '{}': {e}",
            path.display()
        ))
    })?;

    writeln!(file, "series,x,y_obs,y_fit,residual")
        .map_err(|e| AppError::input(format!("Failed to write results CSV header: {e}")))?;

    for run in runs {
        for r in &run.residuals {
            writeln!(
                file,
                "{},{},{:.10},{:.10},{:.10}",
                run.label, r.x, r.y_obs, r.y_fit, r.residual
            )
            .map_err(|e| AppError::input(format!("Failed to write results CSV row: {e}")))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FitQuality, FitResult, Series, TdlModel};
    use crate::report::PointResidual;

    fn sample_run() -> SeriesRun {
        SeriesRun {
            label: "run.log".to_string(),
            series: Series::new(vec![2.0, 4.0], vec![-1.0, -1.1]),
            fit: FitResult {
                model: TdlModel {
                    e_inf: -1.2,
                    alpha: 0.4,
                    beta: 0.0,
                },
                quality: FitQuality {
                    sse: 0.0,
                    rmse: 0.0,
                    n: 2,
                    iterations: 1,
                },
                std_errors: None,
            },
            residuals: vec![
                PointResidual {
                    x: 2.0,
                    y_obs: -1.0,
                    y_fit: -1.0,
                    residual: 0.0,
                },
                PointResidual {
                    x: 4.0,
                    y_obs: -1.1,
                    y_fit: -1.1,
                    residual: 0.0,
                },
            ],
        }
    }

    #[test]
    fn csv_has_header_and_one_row_per_point() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");

        write_results_csv(&path, &[sample_run()]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "series,x,y_obs,y_fit,residual");
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("run.log,2,"));
    }

    #[test]
    fn unwritable_path_is_an_input_error() {
        let err = write_results_csv(Path::new("/no/such/dir/results.csv"), &[]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
