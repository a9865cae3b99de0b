//! In-memory checkpoint store
//!
//! Encodes exactly like the file store, so anything that round-trips here
//! round-trips on disk. Clones share the same buffer, which lets a caller
//! hand one clone to a coordinator and inspect the other afterwards.

use crate::state::CrawlState;
use crate::storage::format::{decode_checkpoint, encode_checkpoint};
use crate::storage::traits::{CheckpointStore, StorageError, StorageResult};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Inner {
    bytes: Option<Vec<u8>>,
    saves: usize,
    failing: bool,
}

/// Checkpoint store that keeps the encoded document in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryCheckpointStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryCheckpointStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding `state`
    pub fn with_state(state: &CrawlState) -> StorageResult<Self> {
        let store = Self::new();
        store.lock().bytes = Some(encode_checkpoint(state)?);
        Ok(store)
    }

    /// Creates a store holding arbitrary bytes, e.g. a corrupt document
    pub fn with_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        let store = Self::new();
        store.lock().bytes = Some(bytes.into());
        store
    }

    /// Number of successful saves so far
    pub fn save_count(&self) -> usize {
        self.lock().saves
    }

    /// Encoded document from the latest save, if any
    pub fn bytes(&self) -> Option<Vec<u8>> {
        self.lock().bytes.clone()
    }

    /// Makes subsequent saves fail until switched off again
    pub fn set_failing(&self, failing: bool) {
        self.lock().failing = failing;
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl CheckpointStore for MemoryCheckpointStore {
    fn load(&self) -> StorageResult<CrawlState> {
        match &self.lock().bytes {
            Some(bytes) => decode_checkpoint(bytes, Path::new("<memory>")),
            None => Ok(CrawlState::new()),
        }
    }

    fn save(&mut self, state: &CrawlState) -> StorageResult<()> {
        let bytes = encode_checkpoint(state)?;
        let mut inner = self.lock();
        if inner.failing {
            return Err(StorageError::Io {
                path: "<memory>".into(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "store set to fail"),
            });
        }
        inner.bytes = Some(bytes);
        inner.saves += 1;
        Ok(())
    }

    fn describe(&self) -> String {
        "<memory>".to_string()
    }
}
