//! # Hadronic Final-State Validator
//!
//! Runs the interaction generator event by event, checks the primary is
//! killed, and writes the conservation histograms.
//!
//! ## Usage
//!
//! ```bash
//! # Fresh run
//! cargo run --release -- --pl FTFP_BERT -p proton -e 100 -m G4_Fe
//!
//! # Save the random state before every event
//! cargo run --release -- --pl FTFP_BERT -p proton -e 100 -m G4_Fe --save-random 1
//!
//! # Replay event 42 of the run above (prompts for the index if omitted)
//! cargo run --release -- --pl FTFP_BERT -p proton -e 100 -m G4_Fe --redo 1 --redo-index 42
//! ```

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use hadronic_fs_validator::{
    config::{Configuration, PhysicsModel, RawArgs},
    checkpoint::FileCheckpointStore,
    error::HarnessError,
    event_loop::EventLoop,
    generator::ToyCascadeGenerator,
    report::write_report,
};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║          Hadronic Final-State Generator Validation           ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    match run() {
        Ok(()) => {
            println!("The end.");
            ExitCode::SUCCESS
        }
        Err(err) => {
            match err.downcast_ref::<HarnessError>() {
                Some(HarnessError::UnknownModel { name, .. }) => {
                    eprintln!("{} is not in:", name);
                    for model in PhysicsModel::registry() {
                        eprintln!("{}", model);
                    }
                }
                Some(e) if e.is_configuration_error() => eprintln!("Invalid configuration: {}", e),
                _ => eprintln!("Error: {:#}", err),
            }
            ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<()> {
    let mut raw = RawArgs::parse();
    if raw.wants_redo() && raw.redo_index.is_none() {
        raw.redo_index = Some(prompt_event_index()?);
    }

    let config = Configuration::validate(&raw)?;
    println!("{}", config.describe());

    let generator = ToyCascadeGenerator::new(config.model);
    let store = FileCheckpointStore::new(&config.checkpoint_dir)
        .with_context(|| format!("opening checkpoint directory {}", config.checkpoint_dir.display()))?;

    let mut event_loop = EventLoop::new(config.clone(), generator, store)?;
    let summary = event_loop.run()?;
    println!("{}", summary);

    let (histograms, _) = event_loop.into_parts();
    for histogram in histograms.iter() {
        log::info!("{}", histogram.summary());
    }
    let path = write_report(&config, &summary, &histograms)?;
    println!("Histograms written to {}", path.display());

    Ok(())
}

/// Ask for the event to replay on stdin
fn prompt_event_index() -> anyhow::Result<String> {
    print!("which event: ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("reading event index from stdin")?;
    Ok(line.trim().to_string())
}
