//! # Random-State Checkpointing
//!
//! Save and restore the random-engine state keyed by event index, so a
//! single event of a long run can be replayed in isolation.
//!
//! ## File Format
//!
//! One JSON file per event in the checkpoint directory:
//!
//! ```text
//! checkpoint_dir/
//! ├── event_0rndm.stat
//! ├── event_1rndm.stat
//! └── ...
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hadronic_fs_validator::checkpoint::{CheckpointStore, FileCheckpointStore};
//!
//! let mut store = FileCheckpointStore::new("checkpoints")?;
//! store.save(42, &engine)?;
//! // later, in another process
//! store.restore(42, &mut engine)?;
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::engine::{EngineState, RandomEngine};
use crate::error::HarnessError;
use crate::HarnessResult;

/// Engine state saved immediately before an event was generated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomCheckpoint {
    /// Event index the state belongs to
    pub event_index: u64,
    /// Engine state
    pub state: EngineState,
    /// Timestamp
    pub timestamp: String,
    /// Version info
    pub version: String,
}

impl RandomCheckpoint {
    /// Snapshot the engine for `event_index` without advancing it
    pub fn capture(event_index: u64, engine: &RandomEngine) -> Self {
        Self {
            event_index,
            state: engine.state(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Persistence for random-engine checkpoints
pub trait CheckpointStore {
    /// Persist a record, replacing any earlier record for the same event
    fn write_record(&mut self, record: &RandomCheckpoint) -> HarnessResult<()>;

    /// Load the record for an event
    fn read_record(&self, event_index: u64) -> HarnessResult<RandomCheckpoint>;

    /// Whether a record exists for an event
    fn contains(&self, event_index: u64) -> bool;

    /// Save the engine's current state under `event_index`
    fn save(&mut self, event_index: u64, engine: &RandomEngine) -> HarnessResult<()> {
        self.write_record(&RandomCheckpoint::capture(event_index, engine))
    }

    /// Install the state saved under `event_index` into the engine
    fn restore(&self, event_index: u64, engine: &mut RandomEngine) -> HarnessResult<EngineState> {
        let record = self.read_record(event_index)?;
        engine.restore(&record.state);
        Ok(record.state)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// FILE STORE
// ═══════════════════════════════════════════════════════════════════════════════

/// One JSON file per event
#[derive(Debug, Clone)]
pub struct FileCheckpointStore {
    dir: PathBuf,
}

impl FileCheckpointStore {
    /// Open a store rooted at `dir`, creating the directory if needed
    pub fn new(dir: impl AsRef<Path>) -> HarnessResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name used for an event's record
    pub fn file_name(event_index: u64) -> String {
        format!("event_{}rndm.stat", event_index)
    }

    pub fn path_for(&self, event_index: u64) -> PathBuf {
        self.dir.join(Self::file_name(event_index))
    }

    /// Event indices with a record in the directory, ascending
    pub fn list_checkpoints(&self) -> HarnessResult<Vec<u64>> {
        let mut indices = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if let Some(index) = name
                .strip_prefix("event_")
                .and_then(|rest| rest.strip_suffix("rndm.stat"))
                .and_then(|n| n.parse::<u64>().ok())
            {
                indices.push(index);
            }
        }
        indices.sort_unstable();
        Ok(indices)
    }
}

impl CheckpointStore for FileCheckpointStore {
    fn write_record(&mut self, record: &RandomCheckpoint) -> HarnessResult<()> {
        let path = self.path_for(record.event_index);
        let json = serde_json::to_string_pretty(record)?;
        fs::write(&path, json)
            .map_err(|e| HarnessError::Io(format!("Failed to write {}: {}", path.display(), e)))?;
        log::debug!("Saved random state for event {} to {}", record.event_index, path.display());
        Ok(())
    }

    fn read_record(&self, event_index: u64) -> HarnessResult<RandomCheckpoint> {
        let path = self.path_for(event_index);
        if !path.exists() {
            return Err(HarnessError::CheckpointNotFound {
                event: event_index,
                path: path.display().to_string(),
            });
        }
        let json = fs::read_to_string(&path)?;
        let record: RandomCheckpoint = serde_json::from_str(&json)?;
        if record.event_index != event_index {
            return Err(HarnessError::CheckpointMismatch {
                event: event_index,
                found: record.event_index,
                path: path.display().to_string(),
            });
        }
        Ok(record)
    }

    fn contains(&self, event_index: u64) -> bool {
        self.path_for(event_index).exists()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// MEMORY STORE
// ═══════════════════════════════════════════════════════════════════════════════

/// In-process store, for tests and embedding
#[derive(Debug, Clone, Default)]
pub struct MemoryCheckpointStore {
    records: HashMap<u64, RandomCheckpoint>,
}

impl MemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl CheckpointStore for MemoryCheckpointStore {
    fn write_record(&mut self, record: &RandomCheckpoint) -> HarnessResult<()> {
        self.records.insert(record.event_index, record.clone());
        Ok(())
    }

    fn read_record(&self, event_index: u64) -> HarnessResult<RandomCheckpoint> {
        self.records
            .get(&event_index)
            .cloned()
            .ok_or_else(|| HarnessError::CheckpointNotFound {
                event: event_index,
                path: "<memory>".to_string(),
            })
    }

    fn contains(&self, event_index: u64) -> bool {
        self.records.contains_key(&event_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::RngCore;

    #[test]
    fn test_memory_store_restore() {
        let mut store = MemoryCheckpointStore::new();
        let mut engine = RandomEngine::new(5);
        engine.next_u64();
        store.save(3, &engine).unwrap();
        let expected = engine.next_u64();

        engine.next_u64();
        store.restore(3, &mut engine).unwrap();
        assert_eq!(engine.next_u64(), expected);
        assert!(store.contains(3));
        assert!(!store.contains(4));
    }

    #[test]
    fn test_missing_record() {
        let store = MemoryCheckpointStore::new();
        let mut engine = RandomEngine::default();
        assert!(matches!(
            store.restore(9, &mut engine),
            Err(HarnessError::CheckpointNotFound { event: 9, .. })
        ));
    }

    #[test]
    fn test_overwrite_keeps_latest() {
        let mut store = MemoryCheckpointStore::new();
        let mut engine = RandomEngine::new(1);
        store.save(0, &engine).unwrap();
        engine.next_u32();
        store.save(0, &engine).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.read_record(0).unwrap().state, engine.state());
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileCheckpointStore::new(dir.path()).unwrap();
        let engine = RandomEngine::new(123);

        store.save(12, &engine).unwrap();
        store.save(2, &engine).unwrap();
        assert!(dir.path().join("event_12rndm.stat").exists());
        assert_eq!(store.list_checkpoints().unwrap(), vec![2, 12]);

        let record = store.read_record(12).unwrap();
        assert_eq!(record.event_index, 12);
        assert_eq!(record.state, engine.state());
        assert_eq!(record.version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_file_store_rejects_misplaced_record() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileCheckpointStore::new(dir.path()).unwrap();
        let mut engine = RandomEngine::new(8);
        store.save(3, &engine).unwrap();
        fs::copy(store.path_for(3), store.path_for(4)).unwrap();

        assert!(store.contains(4));
        let before = engine.state();
        match store.restore(4, &mut engine) {
            Err(HarnessError::CheckpointMismatch { event, found, .. }) => {
                assert_eq!(event, 4);
                assert_eq!(found, 3);
            }
            other => panic!("expected CheckpointMismatch, got {other:?}"),
        }
        // Engine untouched
        assert_eq!(engine.state(), before);
        assert!(store.restore(3, &mut engine).is_ok());
    }

    #[test]
    fn test_file_store_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCheckpointStore::new(dir.path()).unwrap();
        match store.read_record(7) {
            Err(HarnessError::CheckpointNotFound { event, path }) => {
                assert_eq!(event, 7);
                assert!(path.ends_with("event_7rndm.stat"));
            }
            other => panic!("expected CheckpointNotFound, got {other:?}"),
        }
    }
}
