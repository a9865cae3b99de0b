//! Checkpoint document format
//!
//! A checkpoint is a pretty-printed JSON object:
//!
//! ```json
//! {
//!   "format_version": 1,
//!   "last_completed_page": 53,
//!   "config_hash": "…",
//!   "records": [{ "question": "…", "options": ["…", "…", "…", "…"], "correctAnswer": 0 }]
//! }
//! ```
//!
//! Unknown fields are ignored on load. A bare JSON array of records is read as
//! a legacy checkpoint with no recorded progress.

use crate::state::{CrawlState, Record};
use crate::storage::traits::{StorageError, StorageResult};
use serde::de::Error as _;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

/// Newest checkpoint layout this build reads and the one it writes
pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct DocumentRef<'a> {
    format_version: u32,
    last_completed_page: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    config_hash: Option<&'a str>,
    records: &'a [Record],
}

#[derive(Deserialize)]
struct Document {
    last_completed_page: u32,
    #[serde(default)]
    config_hash: Option<String>,
    records: Vec<Record>,
}

/// Serializes a state into checkpoint bytes
///
/// The output depends only on `state`, so equal states encode identically.
pub fn encode_checkpoint(state: &CrawlState) -> StorageResult<Vec<u8>> {
    let document = DocumentRef {
        format_version: FORMAT_VERSION,
        last_completed_page: state.last_completed_page,
        config_hash: state.config_hash.as_deref(),
        records: &state.records,
    };
    let mut bytes = serde_json::to_vec_pretty(&document)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Serializes records as a bare array, the layout downstream tools read
pub fn encode_records(records: &[Record]) -> StorageResult<Vec<u8>> {
    let mut bytes = serde_json::to_vec_pretty(records)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Parses checkpoint bytes read from `origin`
pub fn decode_checkpoint(bytes: &[u8], origin: &Path) -> StorageResult<CrawlState> {
    let malformed = |source: serde_json::Error| StorageError::Malformed {
        path: origin.to_path_buf(),
        source,
    };

    let value: Value = serde_json::from_slice(bytes).map_err(malformed)?;

    if value.is_array() {
        let records: Vec<Record> = serde_json::from_value(value).map_err(malformed)?;
        tracing::info!(
            "Read legacy record array from {} ({} records, no page progress)",
            origin.display(),
            records.len()
        );
        return Ok(CrawlState {
            records,
            last_completed_page: 0,
            config_hash: None,
        });
    }

    let version = match &value {
        Value::Object(fields) => fields.get("format_version").and_then(Value::as_u64),
        _ => {
            return Err(malformed(serde_json::Error::custom(
                "checkpoint must be a JSON object or array",
            )))
        }
    }
    .ok_or_else(|| malformed(serde_json::Error::custom("missing or non-numeric format_version")))?;

    if version > u64::from(FORMAT_VERSION) {
        return Err(StorageError::UnsupportedVersion {
            path: origin.to_path_buf(),
            found: u32::try_from(version).unwrap_or(u32::MAX),
            supported: FORMAT_VERSION,
        });
    }

    let document: Document = serde_json::from_value(value).map_err(malformed)?;
    Ok(CrawlState {
        records: document.records,
        last_completed_page: document.last_completed_page,
        config_hash: document.config_hash,
    })
}
