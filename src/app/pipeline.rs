//! Shared extract/fit pipeline used by the CLI subcommands.
//!
//! `fit` and `scatter` share everything up to presentation: reading logs,
//! gathering labeled series, and (for `fit`) validating and fitting each
//! one with residuals. Housing that here means the two cannot drift apart;
//! printing, plotting, and exports stay in `app`.

use crate::data::SeriesSet;
use crate::domain::{NamedSeries, RunConfig};
use crate::error::AppError;
use crate::fit::{FitOptions, fit_series};
use crate::report::{SeriesRun, SkippedSeries, compute_residuals};

/// Series gathered from all inputs, before any fitting.
#[derive(Debug, Clone)]
pub struct ExtractOutput {
    pub entries: Vec<NamedSeries>,
    /// stderr-ready messages: missing anchors plus line-level payload issues.
    pub warnings: Vec<String>,
}

/// All computed outputs of a single `tdl fit` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub runs: Vec<SeriesRun>,
    pub skipped: Vec<SkippedSeries>,
    pub warnings: Vec<String>,
}

/// Extract one series per configured input into a fresh registry.
pub fn run_extract(config: &RunConfig) -> Result<ExtractOutput, AppError> {
    let mut set = SeriesSet::new();
    let mut warnings = Vec::new();

    for (i, path) in config.inputs.iter().enumerate() {
        let label = config.labels.get(i).cloned();
        let report = set.read_into(path, &config.spec, label)?;
        warnings.extend(report.warnings);
    }

    Ok(ExtractOutput {
        entries: set.entries().to_vec(),
        warnings,
    })
}

/// Execute the full pipeline: extract, then fit every series.
///
/// Fitting is isolated per series: a series that fails validation or does not
/// converge is recorded under `skipped` and the rest still fit and render.
/// When no series survives, the run fails with the first error so its exit
/// code reflects the actual cause.
pub fn run_fit(config: &RunConfig) -> Result<RunOutput, AppError> {
    let gathered = run_extract(config)?;
    let opts = FitOptions {
        initial_guess: config.initial_guess,
        max_iters: config.max_iters,
        tol: config.tol,
    };

    let mut runs = Vec::new();
    let mut skipped = Vec::new();
    let mut first_error: Option<AppError> = None;

    for entry in &gathered.entries {
        match fit_one(entry, &opts) {
            Ok(run) => runs.push(run),
            Err(err) => {
                if first_error.is_none() {
                    first_error = Some(err.clone());
                }
                skipped.push(SkippedSeries {
                    label: entry.label.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }

    if runs.is_empty() {
        return Err(first_error
            .unwrap_or_else(|| AppError::validation("No input series to fit.")));
    }

    Ok(RunOutput {
        runs,
        skipped,
        warnings: gathered.warnings,
    })
}

fn fit_one(entry: &NamedSeries, opts: &FitOptions) -> Result<SeriesRun, AppError> {
    let fit = fit_series(&entry.label, &entry.series, opts)?;
    let residuals = compute_residuals(&entry.series, &fit.model)?;
    Ok(SeriesRun {
        label: entry.label.clone(),
        series: entry.series.clone(),
        fit,
        residuals,
    })
}
