//! # Histogram Ratio Tool
//!
//! Divides one histogram of a run report by another, bin by bin. The
//! default pair gives the mean transverse momentum of π⁻ per p_z bin.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release --bin divide_histograms -- FTFP_BERTproton100.G4_Fe.json
//!
//! # Any two histograms with the same binning, saved as JSON
//! cargo run --release --bin divide_histograms -- report.json \
//!     --numerator Pi-_Pz_wPt --denominator Pi-_Pz -o ratio.json
//! ```

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use hadronic_fs_validator::{
    event_loop::names,
    report::read_report,
};

/// Bin-by-bin ratio of two report histograms
#[derive(Parser, Debug)]
#[command(name = "divide_histograms")]
#[command(about = "Divide two histograms of a run report")]
struct Args {
    /// Run report written by hadronic_fs_validator
    report: PathBuf,

    /// Numerator histogram
    #[arg(long, short = 'n', default_value = names::PIMINUS_PZ_WPT)]
    numerator: String,

    /// Denominator histogram
    #[arg(long, short = 'd', default_value = names::PIMINUS_PZ)]
    denominator: String,

    /// Write the ratio histogram here as JSON
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let report = read_report(&args.report)
        .with_context(|| format!("loading report {}", args.report.display()))?;

    let numerator = report.histogram(&args.numerator)?;
    let denominator = report.histogram(&args.denominator)?;
    let ratio_name = format!("{}/{}", args.numerator, args.denominator);
    let ratio = numerator.divide(denominator, &ratio_name)?;

    println!("═══ {} ═══", ratio_name);
    println!("{:>14}  {:>14}  {:>14}", "bin center", "ratio", "error");
    for bin in 0..ratio.bin_count() {
        if let (Some(center), Some(value), Some(error)) =
            (ratio.bin_center(bin), ratio.bin_content(bin), ratio.bin_error(bin))
        {
            if value != 0.0 {
                println!("{:>14.5}  {:>14.6}  {:>14.6}", center, value, error);
            }
        }
    }

    if let Some(output) = args.output {
        let json = serde_json::to_string_pretty(&ratio)?;
        fs::write(&output, json).with_context(|| format!("writing {}", output.display()))?;
        log::info!("Ratio written to {}", output.display());
    }

    Ok(())
}
