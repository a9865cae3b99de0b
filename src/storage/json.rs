//! JSON file checkpoint store
//!
//! Saves use the write-fsync-rename pattern:
//!
//! 1. Write the full document to a sibling temporary file
//! 2. fsync the temporary file
//! 3. Rename it over the checkpoint
//! 4. fsync the parent directory (best effort)
//!
//! A crash at any point leaves either the old or the new checkpoint in place.

use crate::state::CrawlState;
use crate::storage::format::{decode_checkpoint, encode_checkpoint};
use crate::storage::traits::{CheckpointStore, StorageError, StorageResult};
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Checkpoint store backed by a single JSON file
#[derive(Debug, Clone)]
pub struct JsonCheckpointStore {
    path: PathBuf,
}

impl JsonCheckpointStore {
    /// Creates a store for the checkpoint at `path`
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Returns true if a checkpoint file is present
    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

impl CheckpointStore for JsonCheckpointStore {
    fn load(&self) -> StorageResult<CrawlState> {
        match fs::read(&self.path) {
            Ok(bytes) => decode_checkpoint(&bytes, &self.path),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("No checkpoint at {}, starting empty", self.path.display());
                Ok(CrawlState::new())
            }
            Err(source) => Err(StorageError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn save(&mut self, state: &CrawlState) -> StorageResult<()> {
        let bytes = encode_checkpoint(state)?;
        write_atomic(&self.path, &bytes)?;
        tracing::debug!(
            "Checkpoint written to {} ({} records, last page {})",
            self.path.display(),
            state.len(),
            state.last_completed_page
        );
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Replaces the file at `path` with `bytes` without ever exposing a partial write
///
/// Missing parent directories are created.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> StorageResult<()> {
    let io_err = |source: std::io::Error| StorageError::Io {
        path: path.to_path_buf(),
        source,
    };

    let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
    if let Some(dir) = parent {
        fs::create_dir_all(dir).map_err(io_err)?;
    }

    let tmp_path = temp_path_for(path);
    let written = (|| -> std::io::Result<()> {
        let mut file = File::create(&tmp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        fs::rename(&tmp_path, path)
    })();

    if let Err(source) = written {
        let _ = fs::remove_file(&tmp_path);
        return Err(io_err(source));
    }

    sync_dir(parent.unwrap_or_else(|| Path::new(".")));
    Ok(())
}

/// Sibling path used while a save is in flight: `dir/.name.tmp`
fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "checkpoint".to_string());
    path.with_file_name(format!(".{}.tmp", name))
}

#[cfg(unix)]
fn sync_dir(dir: &Path) {
    if let Err(e) = File::open(dir).and_then(|d| d.sync_all()) {
        tracing::trace!("Could not fsync {}: {}", dir.display(), e);
    }
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) {}
