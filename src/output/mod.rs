//! Output module for reports over harvested data
//!
//! This module handles:
//! - Computing and printing statistics over a checkpoint
//! - Exporting records as a plain JSON array for downstream consumers

mod export;
pub mod stats;

pub use export::export_records;
pub use stats::{load_statistics, print_statistics, CheckpointStatistics};
