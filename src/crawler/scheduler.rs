//! Scheduler for walking the page range
//!
//! This module handles:
//! - Handing out page indices in ascending order, one at a time
//! - Counting pages attempted in this run
//! - Deciding when a checkpoint is due
//! - The fixed pause between pages

use crate::HarvestError;
use std::time::Duration;

/// Sequential page scheduler
///
/// Pages are handed out strictly one after another; the caller finishes a
/// page before asking for the next, so there is never more than one request
/// in flight.
#[derive(Debug, Clone)]
pub struct Scheduler {
    /// Next page to hand out
    next: u32,

    /// Last page of the range (inclusive)
    end: u32,

    /// Pages handed out so far
    attempted: u32,

    /// Pages between checkpoints
    checkpoint_interval: u32,

    /// Pause after every page
    page_delay: Duration,
}

impl Scheduler {
    /// Creates a scheduler over `start..=end`
    ///
    /// A start past the end yields an empty schedule rather than an error, so
    /// resuming a finished crawl is a no-op.
    pub fn new(
        start: u32,
        end: u32,
        checkpoint_interval: u32,
        page_delay: Duration,
    ) -> Result<Self, HarvestError> {
        if start == 0 || checkpoint_interval == 0 {
            return Err(HarvestError::InvalidRange { start, end });
        }

        Ok(Self {
            next: start,
            end,
            attempted: 0,
            checkpoint_interval,
            page_delay,
        })
    }

    /// Hands out the next page index, or None once the range is exhausted
    pub fn next_page(&mut self) -> Option<u32> {
        if self.next > self.end {
            return None;
        }

        let page = self.next;
        // At u32::MAX there is no next index; collapse the range instead
        self.next = match self.next.checked_add(1) {
            Some(next) => next,
            None => {
                self.end = 0;
                self.next
            }
        };
        self.attempted += 1;
        Some(page)
    }

    /// Returns true right after every `checkpoint_interval`-th page
    pub fn checkpoint_due(&self) -> bool {
        self.attempted > 0 && self.attempted % self.checkpoint_interval == 0
    }

    /// Sleeps for the inter-page delay
    pub async fn pause(&self) {
        if !self.page_delay.is_zero() {
            tokio::time::sleep(self.page_delay).await;
        }
    }

    /// Pages handed out so far
    pub fn attempted(&self) -> u32 {
        self.attempted
    }

    /// Pages still to hand out
    pub fn remaining(&self) -> u32 {
        if self.next > self.end {
            0
        } else {
            self.end - self.next + 1
        }
    }
}
