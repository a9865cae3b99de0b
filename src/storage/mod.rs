//! Storage module for persisting crawl checkpoints
//!
//! This module handles checkpoint persistence for the crawler, including:
//! - The versioned JSON checkpoint document
//! - Crash-safe overwrite (write temp file, fsync, rename)
//! - Loading legacy record-array files
//! - An in-memory store for tests

mod format;
mod json;
mod memory;
mod traits;

pub use format::{decode_checkpoint, encode_checkpoint, encode_records, FORMAT_VERSION};
pub use json::{write_atomic, JsonCheckpointStore};
pub use memory::MemoryCheckpointStore;
pub use traits::{CheckpointStore, StorageError, StorageResult};

use std::path::Path;

/// Opens the file-backed checkpoint store at `path`
///
/// Nothing is read until [`CheckpointStore::load`] is called.
pub fn open_checkpoint(path: &Path) -> JsonCheckpointStore {
    JsonCheckpointStore::new(path)
}
