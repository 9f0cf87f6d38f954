//! # Report Overlay Tool
//!
//! Puts the same histograms from several run reports side by side, e.g.
//! one report per generator version, into a single JSON file.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release --bin combine_histograms -- \
//!     BERTproton2.00G4_Cu_v10.json BERTproton2.00G4_Cu_v11.json \
//!     --labels v10,v11 -o OutputBERT.json
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Parser;
use hadronic_fs_validator::report::{
    combine_reports, read_report, write_combined, COMPARED_HISTOGRAMS,
};

/// Overlay histograms of several run reports
#[derive(Parser, Debug)]
#[command(name = "combine_histograms")]
#[command(about = "Combine histograms from several run reports")]
struct Args {
    /// Run reports written by hadronic_fs_validator
    #[arg(required = true)]
    reports: Vec<PathBuf>,

    /// One label per report (default: file stem)
    #[arg(long, value_delimiter = ',')]
    labels: Option<Vec<String>>,

    /// Histograms to combine
    #[arg(long, value_delimiter = ',', default_values_t = COMPARED_HISTOGRAMS.map(String::from))]
    histograms: Vec<String>,

    /// Output file
    #[arg(long, short = 'o', default_value = "combined.json")]
    output: PathBuf,
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let labels = match args.labels {
        Some(labels) if labels.len() != args.reports.len() => {
            bail!("{} labels given for {} reports", labels.len(), args.reports.len())
        }
        Some(labels) => labels,
        None => args.reports.iter().map(|p| stem(p)).collect(),
    };

    let mut reports = Vec::with_capacity(args.reports.len());
    for (label, path) in labels.into_iter().zip(&args.reports) {
        let report =
            read_report(path).with_context(|| format!("loading report {}", path.display()))?;
        reports.push((label, report));
    }

    let names: Vec<&str> = args.histograms.iter().map(String::as_str).collect();
    let combined = combine_reports(&reports, &names)?;

    for overlay in &combined.overlays {
        println!("═══ {} ═══", overlay.name);
        for series in &overlay.series {
            println!("  {:<24} {}", series.label, series.histogram.summary());
        }
    }

    write_combined(&args.output, &combined)
        .with_context(|| format!("writing {}", args.output.display()))?;
    println!("Combined {} reports into {}", combined.labels.len(), args.output.display());

    Ok(())
}
