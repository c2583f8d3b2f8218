//! Command-line parsing for the TDL extrapolation fitter.
//!
//! Argument definitions live here and nowhere else; dispatch sits in `app`,
//! and the extraction/fitting code never sees a clap type.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{ExtractSpec, LogFormat};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "tdl", version, about = "TDL Extrapolation Fitter (log extraction + inverse-power fit)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract series from logs, fit each one, report, and plot.
    Fit(FitArgs),
    /// Extract and scatter-plot stored series without fitting.
    Scatter(FitArgs),
    /// Print extracted pairs from a single log (useful for scripting).
    Extract(ExtractArgs),
}

/// Common options for fitting and scatter-plotting.
#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// Log files to extract series from (one series per file).
    #[arg(required = true, value_name = "LOG")]
    pub inputs: Vec<PathBuf>,

    /// Legend label for the matching input, by position (repeatable).
    /// Inputs without a label fall back to their file path.
    #[arg(short = 'l', long = "label", value_name = "NAME")]
    pub labels: Vec<String>,

    /// Built-in anchor/offset preset for the log dialect.
    #[arg(short = 'f', long, value_enum, default_value_t = LogFormat::Kpts)]
    pub format: LogFormat,

    #[command(flatten)]
    pub rules: RuleArgs,

    /// Starting guess as `E,alpha,beta`.
    #[arg(long, value_parser = parse_guess, default_value = "1,1,1")]
    pub guess: [f64; 3],

    /// Maximum optimizer iterations.
    #[arg(long, default_value_t = 50)]
    pub max_iters: usize,

    /// Relative step-norm tolerance declaring convergence.
    #[arg(long, default_value_t = 1e-10)]
    pub tol: f64,

    /// Points on the dense fitted-curve grid spanning [1, max(x)].
    #[arg(long, default_value_t = 500)]
    pub grid_points: usize,

    /// Write the chart to this PNG instead of printing an ASCII plot.
    #[arg(short = 'o', long, value_name = "PNG")]
    pub out: Option<PathBuf>,

    /// X axis label.
    #[arg(long, default_value = "N kpt")]
    pub x_label: String,

    /// Y axis label.
    #[arg(long, default_value = "Ecorr (Ha)")]
    pub y_label: String,

    /// ASCII plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// ASCII plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// PNG width in pixels.
    #[arg(long, default_value_t = 900)]
    pub image_width: u32,

    /// PNG height in pixels.
    #[arg(long, default_value_t = 600)]
    pub image_height: u32,

    /// Export per-point results (observed, fitted, residual) to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Export fitted models (coefficients, quality, grid) to JSON.
    #[arg(long = "export-fit", value_name = "JSON")]
    pub export_fit: Option<PathBuf>,
}

/// Options for printing extracted pairs.
#[derive(Debug, Parser)]
pub struct ExtractArgs {
    /// Log file to extract from.
    #[arg(value_name = "LOG")]
    pub input: PathBuf,

    /// Built-in anchor/offset preset for the log dialect.
    #[arg(short = 'f', long, value_enum, default_value_t = LogFormat::Kpts)]
    pub format: LogFormat,

    #[command(flatten)]
    pub rules: RuleArgs,
}

/// Field-by-field overrides of the preset extraction rules.
///
/// Every flag is optional; unset fields keep the preset's value.
#[derive(Debug, Args, Clone, Default)]
pub struct RuleArgs {
    /// Override the x anchor pattern (regex; plain substrings work).
    #[arg(long, value_name = "REGEX")]
    pub x_anchor: Option<String>,

    /// Override the x payload line offset (may be negative).
    #[arg(long, value_name = "LINES", allow_hyphen_values = true)]
    pub x_offset: Option<i64>,

    /// Override which numeric token to take from the x payload line (0-based).
    #[arg(long, value_name = "IDX")]
    pub x_token: Option<usize>,

    /// Override the y anchor pattern (regex; plain substrings work).
    #[arg(long, value_name = "REGEX")]
    pub y_anchor: Option<String>,

    /// Override the y payload line offset (may be negative).
    #[arg(long, value_name = "LINES", allow_hyphen_values = true)]
    pub y_offset: Option<i64>,

    /// Override which numeric token to take from the y payload line (0-based).
    #[arg(long, value_name = "IDX")]
    pub y_token: Option<usize>,
}

impl RuleArgs {
    /// Apply the overrides on top of a preset spec.
    pub fn apply_to(&self, mut spec: ExtractSpec) -> ExtractSpec {
        if let Some(anchor) = &self.x_anchor {
            spec.x.anchor = anchor.clone();
        }
        if let Some(offset) = self.x_offset {
            spec.x.offset = offset;
        }
        if let Some(token) = self.x_token {
            spec.x.token_index = token;
        }
        if let Some(anchor) = &self.y_anchor {
            spec.y.anchor = anchor.clone();
        }
        if let Some(offset) = self.y_offset {
            spec.y.offset = offset;
        }
        if let Some(token) = self.y_token {
            spec.y.token_index = token;
        }
        spec
    }
}

/// Parse `--guess E,alpha,beta`.
fn parse_guess(s: &str) -> Result<[f64; 3], String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(format!("expected three comma-separated values `E,alpha,beta`, got '{s}'"));
    }
    let mut out = [0.0; 3];
    for (slot, part) in out.iter_mut().zip(&parts) {
        *slot = part
            .parse()
            .map_err(|_| format!("'{part}' is not a number"))?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guess_parses_three_numbers() {
        assert_eq!(parse_guess("1,2.5,-3e-2").unwrap(), [1.0, 2.5, -3e-2]);
        assert_eq!(parse_guess(" -1 , 0 , 4 ").unwrap(), [-1.0, 0.0, 4.0]);
        assert!(parse_guess("1,2").is_err());
        assert!(parse_guess("a,b,c").is_err());
    }

    #[test]
    fn rule_overrides_replace_only_named_fields() {
        let cli = Cli::try_parse_from([
            "tdl", "fit", "run.log", "--y-anchor", "TOTAL", "--y-offset", "-2",
        ])
        .unwrap();
        let Command::Fit(args) = cli.command else {
            panic!("expected fit subcommand");
        };

        let spec = args.rules.apply_to(args.format.spec());
        assert_eq!(spec.x.anchor, "N kpts");
        assert_eq!(spec.y.anchor, "TOTAL");
        assert_eq!(spec.y.offset, -2);
        assert_eq!(spec.y.token_index, 0);
    }

    #[test]
    fn labels_repeat_and_match_by_position() {
        let cli = Cli::try_parse_from([
            "tdl", "scatter", "a.log", "b.log", "-l", "first", "-l", "second",
        ])
        .unwrap();
        let Command::Scatter(args) = cli.command else {
            panic!("expected scatter subcommand");
        };
        assert_eq!(args.inputs.len(), 2);
        assert_eq!(args.labels, vec!["first", "second"]);
    }
}
