//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during extraction and fitting
//! - exported to JSON/CSV
//! - reloaded later by downstream scripts

use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// One extraction rule: where to anchor and which value to read.
///
/// The anchor is matched against each line of the log. For every match at
/// line index `i`, the payload is read from line `i + offset` (the offset may
/// be negative, pointing backward from the anchor).
#[derive(Debug, Clone)]
pub struct ExtractRule {
    /// Regex matched against individual lines. Plain substrings are valid
    /// regexes, so fixed-text anchors work unchanged.
    pub anchor: String,
    /// Signed line offset from the anchor match to the payload line.
    pub offset: i64,
    /// Which numeric token on the payload line to take (0-based, counting
    /// only tokens that parse as floats).
    pub token_index: usize,
}

/// Paired rules producing the independent (x) and dependent (y) sequences.
#[derive(Debug, Clone)]
pub struct ExtractSpec {
    pub x: ExtractRule,
    pub y: ExtractRule,
}

/// Built-in rule sets for the log dialects this tool grew up around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum LogFormat {
    /// k-point convergence logs: `N kpts` lines carry the k-point count,
    /// the correlation energy sits six lines above each `BE took` marker.
    Kpts,
    /// Logs that print a `CONVERGED` banner: the k-point count and energy
    /// sit five and four lines above it, respectively.
    Converged,
    /// Gamma-point tables: `E corr` lines carry x, `Gamma` lines carry y.
    Gamma,
}

impl LogFormat {
    pub fn spec(self) -> ExtractSpec {
        match self {
            LogFormat::Kpts => ExtractSpec {
                x: ExtractRule {
                    anchor: "N kpts".to_string(),
                    offset: 0,
                    token_index: 0,
                },
                y: ExtractRule {
                    anchor: "BE took".to_string(),
                    offset: -6,
                    token_index: 0,
                },
            },
            LogFormat::Converged => ExtractSpec {
                x: ExtractRule {
                    anchor: "CONVERGED".to_string(),
                    offset: -5,
                    token_index: 0,
                },
                y: ExtractRule {
                    anchor: "CONVERGED".to_string(),
                    offset: -4,
                    token_index: 0,
                },
            },
            LogFormat::Gamma => ExtractSpec {
                x: ExtractRule {
                    anchor: "E corr".to_string(),
                    offset: 0,
                    token_index: 0,
                },
                y: ExtractRule {
                    anchor: "Gamma".to_string(),
                    offset: 0,
                    token_index: 0,
                },
            },
        }
    }
}

/// Paired sample sequences, index-aligned once extraction succeeds.
///
/// The two vectors are NOT guaranteed equal length straight out of the
/// extractor (anchor counts can differ); the fitter validates before use.
#[derive(Debug, Clone, Default)]
pub struct Series {
    /// Independent variable (sample count, e.g. number of k-points).
    pub xs: Vec<f64>,
    /// Dependent variable (measured energy quantity).
    pub ys: Vec<f64>,
}

impl Series {
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> Self {
        Self { xs, ys }
    }

    /// True when neither sequence holds any values.
    pub fn is_empty(&self) -> bool {
        self.xs.is_empty() && self.ys.is_empty()
    }

    /// Largest independent value, if any.
    pub fn x_max(&self) -> Option<f64> {
        self.xs
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| Some(acc.map_or(v, |m: f64| m.max(v))))
    }
}

/// A series tagged with a legend label (caller-supplied or filepath-derived).
#[derive(Debug, Clone)]
pub struct NamedSeries {
    pub label: String,
    pub series: Series,
}

/// Fitted coefficients of the extrapolation model
/// `f(x) = E + α·x⁻¹ + β·x⁻²`.
///
/// `e_inf` is the extrapolated value at infinite sample size; `alpha` and
/// `beta` are the finite-size correction coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TdlModel {
    pub e_inf: f64,
    pub alpha: f64,
    pub beta: f64,
}

impl TdlModel {
    /// Legend text summarizing the coefficients.
    pub fn legend_label(&self) -> String {
        format!(
            "E={:.3}, α={:.4}, β={:.5}",
            self.e_inf, self.alpha, self.beta
        )
    }
}

/// Fit quality diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitQuality {
    pub sse: f64,
    pub rmse: f64,
    pub n: usize,
    pub iterations: usize,
}

/// Fit output for a single series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitResult {
    pub model: TdlModel,
    pub quality: FitQuality,
    /// Standard errors of `(E, α, β)` from the parameter covariance
    /// `s²·(JᵀJ)⁻¹`. `None` when `n == 3` (zero residual degrees of
    /// freedom) or the normal matrix is singular.
    pub std_errors: Option<[f64; 3]>,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub inputs: Vec<PathBuf>,
    /// Optional labels, matched to `inputs` by position; missing entries
    /// fall back to the file path.
    pub labels: Vec<String>,
    pub spec: ExtractSpec,

    pub initial_guess: [f64; 3],
    pub max_iters: usize,
    pub tol: f64,

    /// Points on the dense curve grid spanning `[1, max(xs)]`.
    pub grid_points: usize,
    pub x_label: String,
    pub y_label: String,

    /// PNG output path; when absent, an ASCII chart goes to stdout.
    pub out: Option<PathBuf>,
    pub image_size: (u32, u32),
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_results: Option<PathBuf>,
    pub export_fit: Option<PathBuf>,
}

/// A saved fit file (JSON): one entry per fitted series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitFile {
    pub tool: String,
    pub series: Vec<FitFileSeries>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitFileSeries {
    pub label: String,
    pub model: TdlModel,
    pub quality: FitQuality,
    pub std_errors: Option<[f64; 3]>,
    pub grid: FitGrid,
}

/// Precomputed fitted grid for quick downstream plotting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitGrid {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kpts_preset_reads_backward_for_energy() {
        let spec = LogFormat::Kpts.spec();
        assert_eq!(spec.x.anchor, "N kpts");
        assert_eq!(spec.x.offset, 0);
        assert_eq!(spec.y.anchor, "BE took");
        assert_eq!(spec.y.offset, -6);
    }

    #[test]
    fn x_max_ignores_non_finite() {
        let s = Series::new(vec![2.0, f64::NAN, 16.0], vec![]);
        assert_eq!(s.x_max(), Some(16.0));
        assert_eq!(Series::default().x_max(), None);
    }
}
