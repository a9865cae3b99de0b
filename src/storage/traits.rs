//! Storage traits and error types
//!
//! This module defines the trait interface for checkpoint backends and
//! associated error types.

use crate::state::CrawlState;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during checkpoint operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Malformed checkpoint at {path}: {source}")]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Checkpoint at {path} has format version {found}, newest supported is {supported}")]
    UnsupportedVersion {
        path: PathBuf,
        found: u32,
        supported: u32,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl StorageError {
    /// Returns true if persisted data exists but cannot be trusted
    pub fn is_corruption(&self) -> bool {
        matches!(self, Self::Malformed { .. } | Self::UnsupportedVersion { .. })
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for checkpoint backend implementations
///
/// The store is a passive target: it never mutates the state it is handed.
pub trait CheckpointStore: Send {
    /// Reads the persisted state
    ///
    /// Returns an empty state when nothing has been persisted yet, and an
    /// error when persisted data exists but cannot be decoded.
    fn load(&self) -> StorageResult<CrawlState>;

    /// Replaces the persisted state with `state`
    ///
    /// Must be atomic: a failure part-way leaves the previous checkpoint
    /// readable. Saving the same state twice yields the same artifact.
    fn save(&mut self, state: &CrawlState) -> StorageResult<()>;

    /// Human-readable location of the checkpoint, for logging
    fn describe(&self) -> String;
}
