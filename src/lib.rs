//! # Hadronic Final-State Validator
//!
//! A harness that drives a stochastic hadronic interaction generator one
//! event at a time, checks that every interaction fully consumes the
//! primary, tallies longitudinal momentum and energy bookkeeping over the
//! secondaries, and fills a fixed set of histograms.
//!
//! ## Features
//! - Closed registry of physics models, validated up front
//! - Explicit random engine handle threaded through the generator
//! - **Per-event random-state checkpoints and single-event replay**
//! - Conservation accounting (momentum residual, energy loss, tagged sums)
//! - Weighted fixed-binning histograms written as a JSON report
//!
//! ## Architecture
//!
//! ```text
//! Configuration ──► Event Loop ──► Interaction Generator
//!                      │   ▲              │
//!        save/restore  ▼   │              ▼
//!               Checkpoint Store   Conservation Accounting
//!                                         │
//!                                         ▼
//!                                 Histograms ──► Report
//! ```

// Core modules
pub mod config;
pub mod engine;
pub mod error;
pub mod generator;
pub mod physics;

// Bookkeeping
pub mod checkpoint;
pub mod event_loop;
pub mod histogram;
pub mod report;


pub use checkpoint::{CheckpointStore, FileCheckpointStore, MemoryCheckpointStore, RandomCheckpoint};
pub use config::{Configuration, PhysicsModel, RawArgs};
pub use engine::{EngineState, RandomEngine};
pub use error::HarnessError;
pub use event_loop::{EventLoop, ProcessedEvent, RunHistograms, RunSummary};
pub use generator::{
    InteractionGenerator, InteractionOutcome, InteractionRequest, ToyCascadeGenerator, TrackStatus,
};
pub use histogram::{Histogram, HistogramSet};
pub use physics::{ConservationRecord, FourMomentum, Material, SecondaryParticle, Species};
pub use report::{combine_reports, read_report, write_report, CombinedHistograms, RunReport};

/// Result type for harness operations
pub type HarnessResult<T> = Result<T, HarnessError>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        // Configuration
        Configuration,
        PhysicsModel,
        // Run
        EventLoop,
        RunSummary,
        CheckpointStore,
        FileCheckpointStore,
        MemoryCheckpointStore,
        RandomEngine,
        // Generator boundary
        InteractionGenerator,
        InteractionOutcome,
        InteractionRequest,
        ToyCascadeGenerator,
        TrackStatus,
        // Results
        HarnessError,
        HarnessResult,
        Histogram,
        HistogramSet,
    };
}
