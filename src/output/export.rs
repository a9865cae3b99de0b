//! Plain record export
//!
//! Downstream consumers read a bare JSON array of records, without the
//! checkpoint envelope.

use crate::state::CrawlState;
use crate::storage::{encode_records, write_atomic, StorageResult};
use std::path::Path;

/// Writes the records of `state` to `path` as a JSON array
///
/// The file is replaced atomically. Returns the number of records written.
pub fn export_records(state: &CrawlState, path: &Path) -> StorageResult<usize> {
    let bytes = encode_records(&state.records)?;
    write_atomic(path, &bytes)?;
    tracing::info!("Exported {} records to {}", state.len(), path.display());
    Ok(state.len())
}
