//! Top-level application orchestration.
//!
//! The binary's `main` only converts errors into exit codes; everything a
//! run actually does starts here: parse arguments, drive the extract/fit
//! pipeline, print the report and warnings, render the chart (PNG or
//! ASCII), and write any requested exports.

use clap::Parser;

use crate::cli::{Command, ExtractArgs, FitArgs};
use crate::domain::{RunConfig, Series};
use crate::error::AppError;
use crate::plot::{self, ChartSeries};

pub mod pipeline;

/// Entry point for the `tdl` binary.
pub fn run() -> Result<(), AppError> {
    // A bare `tdl run.log` should mean `tdl fit run.log`. Clap insists on a
    // subcommand token, so patch one into argv before parsing rather than
    // bending the CLI definition around the shorthand.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Scatter(args) => handle_scatter(args),
        Command::Extract(args) => handle_extract(args),
    }
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args);
    let run = pipeline::run_fit(&config)?;

    for warning in &run.warnings {
        eprintln!("warning: {warning}");
    }
    println!(
        "{}",
        crate::report::format_run_summary(&run.runs, &run.skipped)
    );

    let charted: Vec<ChartSeries> = run
        .runs
        .iter()
        .map(|r| ChartSeries {
            legend: format!("{}: {}", r.label, r.fit.model.legend_label()),
            points: pair_points(&r.series),
            curve: Some(plot::sample_curve(
                &r.fit.model,
                r.series.x_max().unwrap_or(1.0),
                config.grid_points,
            )),
        })
        .collect();
    render_chart(&charted, &config)?;

    if let Some(path) = &config.export_results {
        crate::io::export::write_results_csv(path, &run.runs)?;
    }
    if let Some(path) = &config.export_fit {
        crate::io::fitfile::write_fit_json(path, &run.runs, config.grid_points)?;
    }

    Ok(())
}

fn handle_scatter(args: FitArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args);
    let gathered = pipeline::run_extract(&config)?;

    for warning in &gathered.warnings {
        eprintln!("warning: {warning}");
    }

    let mut charted = Vec::new();
    for entry in &gathered.entries {
        if entry.series.xs.len() != entry.series.ys.len() {
            eprintln!(
                "warning: series '{}' is ragged ({} x values vs {} y values); plotting matched pairs only",
                entry.label,
                entry.series.xs.len(),
                entry.series.ys.len()
            );
        }
        let points = pair_points(&entry.series);
        if points.is_empty() {
            eprintln!("warning: nothing to plot for '{}'", entry.label);
            continue;
        }
        charted.push(ChartSeries {
            legend: entry.label.clone(),
            points,
            curve: None,
        });
    }
    if charted.is_empty() {
        return Err(AppError::validation(
            "Nothing extracted from any input; no scatter plot to draw.",
        ));
    }

    render_chart(&charted, &config)
}

fn handle_extract(args: ExtractArgs) -> Result<(), AppError> {
    let spec = args.rules.apply_to(args.format.spec());
    let outcome = crate::io::extract::extract_series(&args.input, &spec)?;

    for warning in outcome.missing_anchor_warnings(&spec, &args.input) {
        eprintln!("warning: {warning}");
    }
    for issue in &outcome.issues {
        eprintln!(
            "warning: {}:{}: {}",
            args.input.display(),
            issue.line,
            issue.message
        );
    }

    print!(
        "{}",
        crate::report::format_extract_listing(&outcome.series)
    );
    Ok(())
}

fn render_chart(charted: &[ChartSeries], config: &RunConfig) -> Result<(), AppError> {
    match &config.out {
        Some(path) => plot::png::render_png(
            path,
            charted,
            &config.x_label,
            &config.y_label,
            config.image_size,
        ),
        None => {
            println!(
                "{}",
                plot::ascii::render_ascii_chart(
                    charted,
                    config.plot_width,
                    config.plot_height,
                    &config.x_label,
                    &config.y_label,
                )
            );
            Ok(())
        }
    }
}

/// Zip the two sequences into plottable pairs (truncating to the shorter).
fn pair_points(series: &Series) -> Vec<(f64, f64)> {
    series
        .xs
        .iter()
        .zip(series.ys.iter())
        .map(|(&x, &y)| (x, y))
        .collect()
}

pub fn run_config_from_args(args: &FitArgs) -> RunConfig {
    RunConfig {
        inputs: args.inputs.clone(),
        labels: args.labels.clone(),
        spec: args.rules.apply_to(args.format.spec()),

        initial_guess: args.guess,
        max_iters: args.max_iters,
        tol: args.tol,

        grid_points: args.grid_points,
        x_label: args.x_label.clone(),
        y_label: args.y_label.clone(),

        out: args.out.clone(),
        image_size: (args.image_width, args.image_height),
        plot_width: args.width,
        plot_height: args.height,

        export_results: args.export.clone(),
        export_fit: args.export_fit.clone(),
    }
}

/// Rewrite argv so `tdl <path>` defaults to `tdl fit <path>`.
///
/// Top-level help/version requests and explicit subcommands pass through
/// untouched; anything else (a path, or flags ahead of one) gets `fit`
/// inserted in front of it.
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "fit" | "scatter" | "extract");
    if is_subcommand {
        return argv;
    }

    argv.insert(1, "fit".to_string());
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_path_rewrites_to_fit() {
        assert_eq!(
            rewrite_args(argv(&["tdl", "run.log"])),
            argv(&["tdl", "fit", "run.log"])
        );
        assert_eq!(
            rewrite_args(argv(&["tdl", "--tol", "1e-8", "run.log"])),
            argv(&["tdl", "fit", "--tol", "1e-8", "run.log"])
        );
    }

    #[test]
    fn subcommands_and_help_pass_through() {
        assert_eq!(
            rewrite_args(argv(&["tdl", "scatter", "run.log"])),
            argv(&["tdl", "scatter", "run.log"])
        );
        assert_eq!(rewrite_args(argv(&["tdl", "--help"])), argv(&["tdl", "--help"]));
        assert_eq!(rewrite_args(argv(&["tdl"])), argv(&["tdl"]));
    }

    #[test]
    fn pair_points_truncates_to_matched_pairs() {
        let series = Series::new(vec![2.0, 4.0, 8.0], vec![-1.0, -1.1]);
        assert_eq!(pair_points(&series), vec![(2.0, -1.0), (4.0, -1.1)]);
    }
}
