//! Error types for harness operations

use thiserror::Error;

use crate::generator::TrackStatus;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("{name} is not in: {}", registry.join(", "))]
    UnknownModel { name: String, registry: Vec<String> },

    #[error("Missing value for argument: {0}")]
    MissingArgument(String),

    #[error("Malformed number for {flag}: {value:?}")]
    MalformedNumber { flag: String, value: String },

    #[error("Unknown particle: {0}")]
    UnknownParticle(String),

    #[error("Unknown material: {0}")]
    UnknownMaterial(String),

    #[error("PRIMARY NOT KILLED in event {event}: terminal status {status:?}")]
    InvariantViolation { event: u64, status: TrackStatus },

    #[error("No random-engine checkpoint for event {event} at {path}")]
    CheckpointNotFound { event: u64, path: String },

    #[error("Checkpoint {path} holds event {found}, expected event {event}")]
    CheckpointMismatch { event: u64, found: u64, path: String },

    #[error("Interaction generator produced no outcome for event {event}")]
    GeneratorFailure { event: u64 },

    #[error("Invalid histogram {name}: {reason}")]
    InvalidHistogram { name: String, reason: String },

    #[error("Unknown histogram: {0}")]
    UnknownHistogram(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl HarnessError {
    /// Whether the error was raised while validating configuration,
    /// i.e. before any event ran.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            HarnessError::UnknownModel { .. }
                | HarnessError::MissingArgument(_)
                | HarnessError::MalformedNumber { .. }
                | HarnessError::UnknownParticle(_)
                | HarnessError::UnknownMaterial(_)
        )
    }
}
