//! Statistics generation from a checkpoint
//!
//! This module provides functionality for extracting and displaying
//! statistics over the records held in a checkpoint store.

use crate::state::{Record, CHOICE_COUNT};
use crate::storage::{CheckpointStore, StorageResult};

/// Checkpoint statistics summary
#[derive(Debug, Clone, PartialEq)]
pub struct CheckpointStatistics {
    /// Where the checkpoint lives
    pub source: String,

    /// Total number of records held
    pub total_records: usize,

    /// Highest page fetched so far
    pub last_completed_page: u32,

    /// How many records have their answer at each position (A-D)
    pub answers_by_position: [usize; CHOICE_COUNT],

    /// Records sharing a prompt with an earlier record
    pub duplicate_prompts: usize,

    /// Configuration hash recorded with the checkpoint
    pub config_hash: Option<String>,

    /// First record, shown as an example
    pub sample: Option<Record>,
}

/// Loads statistics from a checkpoint store
///
/// # Arguments
///
/// * `store` - The checkpoint store to read
///
/// # Returns
///
/// * `Ok(CheckpointStatistics)` - Successfully computed statistics
/// * `Err(StorageError)` - The checkpoint could not be loaded
pub fn load_statistics(store: &dyn CheckpointStore) -> StorageResult<CheckpointStatistics> {
    let state = store.load()?;

    let mut answers_by_position = [0; CHOICE_COUNT];
    let mut seen = std::collections::HashSet::new();
    let mut duplicate_prompts = 0;

    for record in &state.records {
        answers_by_position[record.correct_index()] += 1;
        if !seen.insert(record.prompt()) {
            duplicate_prompts += 1;
        }
    }

    Ok(CheckpointStatistics {
        source: store.describe(),
        total_records: state.len(),
        last_completed_page: state.last_completed_page,
        answers_by_position,
        duplicate_prompts,
        config_hash: state.config_hash.clone(),
        sample: state.records.first().cloned(),
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CheckpointStatistics) {
    println!("=== Checkpoint Statistics ===\n");

    println!("Overview:");
    println!("  Checkpoint: {}", stats.source);
    println!("  Total records: {}", stats.total_records);
    println!("  Last completed page: {}", stats.last_completed_page);
    println!("  Duplicate prompts: {}", stats.duplicate_prompts);
    if let Some(hash) = &stats.config_hash {
        println!("  Config hash: {}", hash);
    }
    println!();

    println!("Answers by Position:");
    for (index, count) in stats.answers_by_position.iter().enumerate() {
        let percentage = if stats.total_records > 0 {
            (*count as f64 / stats.total_records as f64) * 100.0
        } else {
            0.0
        };
        println!(
            "  {}: {} ({:.1}%)",
            crate::state::choice_label(index),
            count,
            percentage
        );
    }
    println!();

    match &stats.sample {
        Some(record) => {
            println!("Sample Record:");
            println!("{}", record);
        }
        None => println!("No records yet."),
    }
}
