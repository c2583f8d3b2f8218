//! The run-scoped series registry.
//!
//! `SeriesSet` accumulates one labeled series per extraction call and hands
//! them to the fit/plot stages in insertion order. Labels and series live in
//! a single `Vec<NamedSeries>`, so they cannot drift out of alignment.
//!
//! The registry is owned by one pipeline run and never shared across
//! threads.

use std::path::Path;

use crate::domain::{ExtractSpec, NamedSeries};
use crate::error::AppError;
use crate::io::extract::{ExtractOutcome, extract_series};

#[derive(Debug, Clone, Default)]
pub struct SeriesSet {
    entries: Vec<NamedSeries>,
}

/// Diagnostics from one `read_into` call (the series itself lands in the set).
#[derive(Debug, Clone)]
pub struct ReadReport {
    pub label: String,
    pub x_matches: usize,
    pub y_matches: usize,
    /// stderr-ready messages: missing anchors plus line-level payload issues.
    pub warnings: Vec<String>,
}

impl SeriesSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extract one log file and append the outcome under `label`.
    ///
    /// The label defaults to the file path. Extraction problems short of a
    /// missing/unreadable file are reported, not fatal; the entry is
    /// appended even when empty so the pipeline can explain the skip.
    pub fn read_into(
        &mut self,
        path: &Path,
        spec: &ExtractSpec,
        label: Option<String>,
    ) -> Result<ReadReport, AppError> {
        let label = label.unwrap_or_else(|| path.display().to_string());
        let outcome = extract_series(path, spec)?;
        let report = build_report(&label, &outcome, spec, path);

        self.entries.push(NamedSeries {
            label: report.label.clone(),
            series: outcome.series,
        });
        Ok(report)
    }

    pub fn entries(&self) -> &[NamedSeries] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn build_report(
    label: &str,
    outcome: &ExtractOutcome,
    spec: &ExtractSpec,
    path: &Path,
) -> ReadReport {
    let mut warnings = outcome.missing_anchor_warnings(spec, path);
    for issue in &outcome.issues {
        warnings.push(format!(
            "{}:{}: {}",
            path.display(),
            issue.line,
            issue.message
        ));
    }
    ReadReport {
        label: label.to_string(),
        x_matches: outcome.x_matches,
        y_matches: outcome.y_matches,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LogFormat;
    use std::io::Write;

    #[test]
    fn entries_keep_insertion_order_and_labels() {
        let mut f1 = tempfile::NamedTempFile::new().unwrap();
        writeln!(f1, "N kpts 2\na\nb\nc\nd\ne\nBE took 1 s").unwrap();
        let mut f2 = tempfile::NamedTempFile::new().unwrap();
        writeln!(f2, "nothing").unwrap();

        let spec = LogFormat::Kpts.spec();
        let mut set = SeriesSet::new();
        set.read_into(f1.path(), &spec, Some("first".to_string()))
            .unwrap();
        let report = set.read_into(f2.path(), &spec, None).unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(set.entries()[0].label, "first");
        assert_eq!(set.entries()[1].label, f2.path().display().to_string());
        // The empty second entry is still registered; the warnings say why.
        assert!(set.entries()[1].series.is_empty());
        assert_eq!(report.x_matches, 0);
        assert!(!report.warnings.is_empty());
    }
}
