//! # Run Report
//!
//! The run's histograms, configuration and summary written as one JSON
//! document at the end of a successful run. Nothing is written for an
//! aborted run.
//!
//! Reports from several generator versions can be overlaid histogram by
//! histogram with [`combine_reports`].

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::Configuration;
use crate::error::HarnessError;
use crate::event_loop::{names, RunSummary};
use crate::histogram::{Histogram, HistogramSet};
use crate::HarnessResult;

/// Everything persisted for a finished run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Version info
    pub version: String,
    /// Timestamp
    pub timestamp: String,
    pub configuration: Configuration,
    pub summary: RunSummary,
    /// Histograms in declaration order
    pub histograms: Vec<Histogram>,
}

impl RunReport {
    pub fn new(configuration: &Configuration, summary: &RunSummary, histograms: &HistogramSet) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            configuration: configuration.clone(),
            summary: summary.clone(),
            histograms: histograms.iter().cloned().collect(),
        }
    }

    pub fn histogram(&self, name: &str) -> HarnessResult<&Histogram> {
        self.histograms
            .iter()
            .find(|h| h.name == name)
            .ok_or_else(|| HarnessError::UnknownHistogram(name.to_string()))
    }
}

/// Write the report into the configured output directory; returns the path
pub fn write_report(
    configuration: &Configuration,
    summary: &RunSummary,
    histograms: &HistogramSet,
) -> HarnessResult<PathBuf> {
    fs::create_dir_all(&configuration.output_dir)?;
    let path = configuration.output_dir.join(configuration.report_file_name());

    let report = RunReport::new(configuration, summary, histograms);
    let json = serde_json::to_string_pretty(&report)?;
    fs::write(&path, json)
        .map_err(|e| HarnessError::Io(format!("Failed to write {}: {}", path.display(), e)))?;

    log::info!("Report written to {}", path.display());
    Ok(path)
}

/// Load a report written by [`write_report`]
pub fn read_report(path: impl AsRef<Path>) -> HarnessResult<RunReport> {
    let path = path.as_ref();
    let json = fs::read_to_string(path)
        .map_err(|e| HarnessError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
    let report: RunReport = serde_json::from_str(&json)?;
    Ok(report)
}

// ═══════════════════════════════════════════════════════════════════════════════
// COMBINED REPORTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Histograms overlaid by default when comparing generator versions
pub const COMPARED_HISTOGRAMS: [&str; 4] = [
    names::E_LOSS,
    names::MOMENTUM_CONSERVATION,
    names::PI0_ENERGY,
    names::NEUTRON_KENERGY,
];

/// One report's copy of a histogram
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelledHistogram {
    pub label: String,
    pub histogram: Histogram,
}

/// Same-named histograms from every report, sharing one binning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Overlay {
    pub name: String,
    pub series: Vec<LabelledHistogram>,
}

/// Side-by-side histograms of several reports
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombinedHistograms {
    /// Version info
    pub version: String,
    /// Timestamp
    pub timestamp: String,
    /// Report labels in input order
    pub labels: Vec<String>,
    pub overlays: Vec<Overlay>,
}

impl CombinedHistograms {
    pub fn overlay(&self, name: &str) -> HarnessResult<&Overlay> {
        self.overlays
            .iter()
            .find(|o| o.name == name)
            .ok_or_else(|| HarnessError::UnknownHistogram(name.to_string()))
    }
}

/// Collect the histograms named in `histogram_names` from every labelled
/// report. Copies of a histogram must agree on binning.
pub fn combine_reports(
    reports: &[(String, RunReport)],
    histogram_names: &[&str],
) -> HarnessResult<CombinedHistograms> {
    let Some((first_label, _)) = reports.first() else {
        return Err(HarnessError::MissingArgument("reports".to_string()));
    };

    let mut overlays = Vec::with_capacity(histogram_names.len());
    for &name in histogram_names {
        let mut series: Vec<LabelledHistogram> = Vec::with_capacity(reports.len());
        for (label, report) in reports {
            let histogram = report.histogram(name)?;
            if let Some(reference) = series.first() {
                if reference.histogram.edges != histogram.edges {
                    return Err(HarnessError::InvalidHistogram {
                        name: name.to_string(),
                        reason: format!("binning of {} differs from {}", label, first_label),
                    });
                }
            }
            series.push(LabelledHistogram {
                label: label.clone(),
                histogram: histogram.clone(),
            });
        }
        overlays.push(Overlay {
            name: name.to_string(),
            series,
        });
    }

    Ok(CombinedHistograms {
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        labels: reports.iter().map(|(label, _)| label.clone()).collect(),
        overlays,
    })
}

pub fn write_combined(path: impl AsRef<Path>, combined: &CombinedHistograms) -> HarnessResult<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(combined)?;
    fs::write(path, json)
        .map_err(|e| HarnessError::Io(format!("Failed to write {}: {}", path.display(), e)))?;
    log::info!("Combined histograms written to {}", path.display());
    Ok(())
}

pub fn read_combined(path: impl AsRef<Path>) -> HarnessResult<CombinedHistograms> {
    let path = path.as_ref();
    let json = fs::read_to_string(path)
        .map_err(|e| HarnessError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
    Ok(serde_json::from_str(&json)?)
}
