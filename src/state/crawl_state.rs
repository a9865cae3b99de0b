//! Accumulated crawl state
//!
//! This is the in-memory form of a checkpoint. The coordinator owns the only
//! live instance and is the only writer.

use crate::state::{PageResult, Record};

/// Records gathered so far plus crawl progress
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlState {
    /// Every record harvested, in insertion order (append-only)
    pub records: Vec<Record>,

    /// Highest page index whose content was fetched; 0 before any page
    pub last_completed_page: u32,

    /// Hash of the configuration that last wrote this state
    pub config_hash: Option<String>,
}

impl CrawlState {
    /// Creates an empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one page outcome into the state
    ///
    /// Failed pages leave the state untouched. Returns the number of records
    /// appended.
    pub fn apply(&mut self, page: PageResult) -> usize {
        if !page.status.is_fetched() {
            return 0;
        }

        let added = page.records.len();
        self.records.extend(page.records);
        self.last_completed_page = self.last_completed_page.max(page.page_index);
        added
    }

    /// Page a resumed crawl should start from
    pub fn next_page(&self) -> u32 {
        self.last_completed_page.saturating_add(1)
    }

    /// Returns true when records are held but no page progress is known,
    /// as with a legacy record-array checkpoint
    pub fn has_untracked_records(&self) -> bool {
        !self.records.is_empty() && self.last_completed_page == 0
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
