//! Best-Score Persistence
//!
//! Best score per level, stored as a flat string-keyed JSON map behind a
//! pluggable key-value store. Read and write only - no schema versioning,
//! no migration; an unreadable payload starts a fresh table.

use std::collections::HashMap;
use std::path::PathBuf;

/// Error from a score store backend.
#[derive(Debug)]
pub enum ScoreError {
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl std::fmt::Display for ScoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoreError::Io(e) => write!(f, "score store io error: {}", e),
            ScoreError::Parse(e) => write!(f, "score payload parse error: {}", e),
        }
    }
}

impl std::error::Error for ScoreError {}

impl From<std::io::Error> for ScoreError {
    fn from(e: std::io::Error) -> Self {
        ScoreError::Io(e)
    }
}

impl From<serde_json::Error> for ScoreError {
    fn from(e: serde_json::Error) -> Self {
        ScoreError::Parse(e)
    }
}

/// A place score payloads live: host local storage, a file, or memory.
pub trait ScoreStore {
    /// The stored payload, or `None` if nothing was ever saved.
    fn read(&self) -> Result<Option<String>, ScoreError>;
    fn write(&mut self, payload: &str) -> Result<(), ScoreError>;
}

/// In-memory store, used by tests and the preview binary.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    payload: Option<String>,
}

impl ScoreStore for MemoryStore {
    fn read(&self) -> Result<Option<String>, ScoreError> {
        Ok(self.payload.clone())
    }

    fn write(&mut self, payload: &str) -> Result<(), ScoreError> {
        self.payload = Some(payload.to_string());
        Ok(())
    }
}

/// File-backed store.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ScoreStore for JsonFileStore {
    fn read(&self) -> Result<Option<String>, ScoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(payload) => Ok(Some(payload)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, payload: &str) -> Result<(), ScoreError> {
        std::fs::write(&self.path, payload)?;
        Ok(())
    }
}

/// Best score per level index.
#[derive(Debug, Clone, Default)]
pub struct BestScores {
    entries: HashMap<String, f32>,
}

impl BestScores {
    /// Load from a store. A missing or malformed payload yields an empty
    /// table rather than an error - stale saves never block play.
    pub fn load(store: &dyn ScoreStore) -> Self {
        let entries = store
            .read()
            .ok()
            .flatten()
            .and_then(|payload| serde_json::from_str(&payload).ok())
            .unwrap_or_default();
        Self { entries }
    }

    pub fn best_for(&self, level_index: usize) -> Option<f32> {
        self.entries.get(&level_index.to_string()).copied()
    }

    /// Record a finished run. Returns true when it beat the stored best.
    pub fn record(&mut self, level_index: usize, score: f32) -> bool {
        let key = level_index.to_string();
        match self.entries.get(&key) {
            Some(&best) if best >= score => false,
            _ => {
                self.entries.insert(key, score);
                true
            }
        }
    }

    pub fn persist(&self, store: &mut dyn ScoreStore) -> Result<(), ScoreError> {
        store.write(&serde_json::to_string(&self.entries)?)
    }
}
