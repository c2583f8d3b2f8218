//! Log-file extraction.
//!
//! Turns a loosely structured text log into paired numeric series, driven by
//! a small declarative rule set.
//!
//! Ground rules:
//! - a token counts as numeric only when the whole token parses as a float;
//!   identifiers that merely contain digits (`step3`, `k4x4x4`) are rejected
//! - payload problems skip that line but are always recorded, never swallowed
//! - nothing carries over between calls, and no fitting happens here
//!
//! A rule with zero anchor matches is a non-fatal condition: it yields an
//! empty sequence, and the caller decides how loudly to warn.

use std::fs;
use std::path::Path;

use regex::Regex;

use crate::domain::{ExtractRule, ExtractSpec, Series};
use crate::error::AppError;

/// A line-level problem encountered while resolving one anchor match.
#[derive(Debug, Clone)]
pub struct ExtractIssue {
    /// 1-based line number of the anchor match.
    pub line: usize,
    pub message: String,
}

/// Extraction output: the (possibly unequal-length) series plus diagnostics.
#[derive(Debug, Clone)]
pub struct ExtractOutcome {
    pub series: Series,
    /// How many lines matched the x / y anchors, before payload parsing.
    pub x_matches: usize,
    pub y_matches: usize,
    pub issues: Vec<ExtractIssue>,
}

impl ExtractOutcome {
    /// Human-readable warnings for anchors that never matched.
    ///
    /// Zero matches is deliberately non-fatal; callers tolerate the empty
    /// series and surface these messages on stderr.
    pub fn missing_anchor_warnings(&self, spec: &ExtractSpec, path: &Path) -> Vec<String> {
        let mut out = Vec::new();
        if self.x_matches == 0 {
            out.push(format!(
                "anchor '{}' matched nothing in '{}'",
                spec.x.anchor,
                path.display()
            ));
        }
        if self.y_matches == 0 && spec.y.anchor != spec.x.anchor {
            out.push(format!(
                "anchor '{}' matched nothing in '{}'",
                spec.y.anchor,
                path.display()
            ));
        }
        out
    }
}

/// Scan a log file and extract the paired series described by `spec`.
///
/// A missing or unreadable file is fatal. Logs are decoded lossily so that
/// stray non-UTF-8 bytes (common in locale-default tool output) cannot abort
/// a run.
pub fn extract_series(path: &Path, spec: &ExtractSpec) -> Result<ExtractOutcome, AppError> {
    let bytes = fs::read(path)
        .map_err(|e| AppError::input(format!("Failed to read log '{}': {e}", path.display())))?;
    let text = String::from_utf8_lossy(&bytes);
    let lines: Vec<&str> = text.lines().collect();

    let x_re = compile_anchor(&spec.x.anchor)?;
    let y_re = compile_anchor(&spec.y.anchor)?;

    let mut issues = Vec::new();
    let (xs, x_matches) = scan_rule(&lines, &x_re, &spec.x, &mut issues);
    let (ys, y_matches) = scan_rule(&lines, &y_re, &spec.y, &mut issues);

    Ok(ExtractOutcome {
        series: Series::new(xs, ys),
        x_matches,
        y_matches,
        issues,
    })
}

fn compile_anchor(pattern: &str) -> Result<Regex, AppError> {
    Regex::new(pattern)
        .map_err(|e| AppError::input(format!("Invalid anchor pattern '{pattern}': {e}")))
}

/// Apply one rule across all lines.
///
/// Returns the extracted values and the raw anchor-match count. Payload
/// problems (offset out of range, no qualifying token) are recorded as
/// issues and skipped, best effort.
fn scan_rule(
    lines: &[&str],
    anchor: &Regex,
    rule: &ExtractRule,
    issues: &mut Vec<ExtractIssue>,
) -> (Vec<f64>, usize) {
    let mut out = Vec::new();
    let mut matches = 0usize;

    for (i, line) in lines.iter().enumerate() {
        if !anchor.is_match(line) {
            continue;
        }
        matches += 1;

        let Some(target) = offset_index(i, rule.offset, lines.len()) else {
            issues.push(ExtractIssue {
                line: i + 1,
                message: format!(
                    "offset {} from anchor '{}' points outside the file",
                    rule.offset, rule.anchor
                ),
            });
            continue;
        };

        match nth_numeric_token(lines[target], rule.token_index) {
            Some(value) => out.push(value),
            None => issues.push(ExtractIssue {
                line: i + 1,
                message: format!(
                    "no numeric token #{} on line {} (payload of anchor '{}')",
                    rule.token_index,
                    target + 1,
                    rule.anchor
                ),
            }),
        }
    }

    (out, matches)
}

/// Resolve `i + offset`, rejecting targets outside `[0, len)`.
fn offset_index(i: usize, offset: i64, len: usize) -> Option<usize> {
    let target = i as i64 + offset;
    if target < 0 || target >= len as i64 {
        return None;
    }
    Some(target as usize)
}

/// Pick the `index`-th whitespace token that parses fully as a finite float.
fn nth_numeric_token(line: &str, index: usize) -> Option<f64> {
    line.split_whitespace()
        .filter_map(|tok| tok.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .nth(index)
}
