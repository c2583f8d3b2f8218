//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the extraction/fitting code stays clean and testable
//! - output changes are localized

use crate::domain::Series;
use crate::report::{SeriesRun, SkippedSeries};

/// Format the full run summary (per-series stats + fitted coefficients).
pub fn format_run_summary(runs: &[SeriesRun], skipped: &[SkippedSeries]) -> String {
    let mut out = String::new();

    out.push_str("=== tdl - TDL Extrapolation Fit ===\n");

    for run in runs {
        let n = run.series.xs.len();
        out.push_str(&format!("\nSeries: {}\n", run.label));
        out.push_str(&format!(
            "  points: n={n} | x={} | y={}\n",
            fmt_range(&run.series.xs),
            fmt_range(&run.series.ys)
        ));

        let m = &run.fit.model;
        match run.fit.std_errors {
            Some(errs) => {
                out.push_str(&format!("  E = {:.6} ± {:.2e}\n", m.e_inf, errs[0]));
                out.push_str(&format!("  α = {:.6} ± {:.2e}\n", m.alpha, errs[1]));
                out.push_str(&format!("  β = {:.6} ± {:.2e}\n", m.beta, errs[2]));
            }
            None => {
                out.push_str(&format!("  E = {:.6}\n", m.e_inf));
                out.push_str(&format!("  α = {:.6}\n", m.alpha));
                out.push_str(&format!("  β = {:.6}\n", m.beta));
            }
        }
        out.push_str(&format!(
            "  SSE={:.3e} RMSE={:.3e} iters={}\n",
            run.fit.quality.sse, run.fit.quality.rmse, run.fit.quality.iterations
        ));
    }

    for s in skipped {
        out.push_str(&format!("\n(skipped {}) {}\n", s.label, s.reason));
    }

    out
}

/// Format extracted pairs for `tdl extract`.
///
/// Equal-length series print one pair per line; ragged series print the two
/// columns separately so nothing is silently dropped.
pub fn format_extract_listing(series: &Series) -> String {
    let mut out = String::new();

    if series.xs.len() == series.ys.len() {
        out.push_str("# x y\n");
        for (x, y) in series.xs.iter().zip(series.ys.iter()) {
            out.push_str(&format!("{x} {y}\n"));
        }
    } else {
        out.push_str(&format!("# x (n={})\n", series.xs.len()));
        for x in &series.xs {
            out.push_str(&format!("{x}\n"));
        }
        out.push_str(&format!("# y (n={})\n", series.ys.len()));
        for y in &series.ys {
            out.push_str(&format!("{y}\n"));
        }
    }

    out
}

fn fmt_range(values: &[f64]) -> String {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &v in values {
        min = min.min(v);
        max = max.max(v);
    }
    if min.is_finite() && max.is_finite() {
        format!("[{min:.4}, {max:.4}]")
    } else {
        "[-]".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FitQuality, FitResult, TdlModel};

    #[test]
    fn run_summary_names_series_and_skips() {
        let series = Series::new(vec![2.0, 4.0, 8.0], vec![-1.1, -1.2, -1.25]);
        let runs = vec![SeriesRun {
            label: "sample.log".to_string(),
            series,
            fit: FitResult {
                model: TdlModel {
                    e_inf: -1.3,
                    alpha: 0.4,
                    beta: -0.01,
                },
                quality: FitQuality {
                    sse: 1e-12,
                    rmse: 1e-6,
                    n: 3,
                    iterations: 2,
                },
                std_errors: None,
            },
            residuals: Vec::new(),
        }];
        let skipped = vec![SkippedSeries {
            label: "empty.log".to_string(),
            reason: "no anchor matches".to_string(),
        }];

        let text = format_run_summary(&runs, &skipped);
        assert!(text.contains("Series: sample.log"));
        assert!(text.contains("E = -1.300000"));
        assert!(text.contains("(skipped empty.log) no anchor matches"));
    }

    #[test]
    fn extract_listing_prints_pairs_when_aligned() {
        let series = Series::new(vec![2.0, 4.0], vec![-1.0, -1.5]);
        let text = format_extract_listing(&series);
        assert_eq!(text, "# x y\n2 -1\n4 -1.5\n");
    }

    #[test]
    fn extract_listing_splits_ragged_series() {
        let series = Series::new(vec![2.0], vec![]);
        let text = format_extract_listing(&series);
        assert!(text.contains("# x (n=1)"));
        assert!(text.contains("# y (n=0)"));
    }
}
