//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop that coordinates all aspects of
//! the crawling process, including:
//! - Loading the checkpoint (or starting fresh)
//! - Walking the page range one page at a time
//! - Fetching, extracting and accumulating records
//! - Periodic and final checkpoint writes
//! - Handling interrupts and resumption

use crate::config::Config;
use crate::crawler::extractor::Extractor;
use crate::crawler::fetcher::PageFetcher;
use crate::crawler::scheduler::Scheduler;
use crate::crawler::shutdown::StopFlag;
use crate::state::{CrawlState, PageResult, PageStatus, RunPhase};
use crate::storage::CheckpointStore;
use crate::HarvestError;
use std::fmt;
use std::time::{Duration, Instant};

/// Where a run starts in the page range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartPage {
    /// Start at this page regardless of checkpoint progress
    Explicit(u32),

    /// Continue after the checkpoint's last completed page
    FromCheckpoint,
}

/// Everything the coordinator needs to know about a run
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    pub start: StartPage,
    pub end_page: u32,
    pub checkpoint_interval: u32,
    pub page_delay: Duration,

    /// Ignore any existing checkpoint and start with no records
    pub fresh: bool,

    /// Hash of the configuration driving this run, stored in the checkpoint
    pub config_hash: Option<String>,
}

impl CrawlSettings {
    /// Settings for the configured range with an explicit start
    pub fn from_config(config: &Config) -> Self {
        Self {
            start: StartPage::Explicit(config.source.start_page),
            end_page: config.source.end_page,
            checkpoint_interval: config.crawler.checkpoint_interval,
            page_delay: Duration::from_millis(config.crawler.page_delay_ms),
            fresh: false,
            config_hash: None,
        }
    }
}

/// Summary of a finished run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlReport {
    pub phase: RunPhase,
    pub start_page: u32,
    pub end_page: u32,
    pub pages_attempted: u32,
    pub failed_pages: Vec<u32>,
    pub empty_pages: u32,
    pub rejected_blocks: usize,
    pub records_added: usize,
    pub total_records: usize,
    pub last_completed_page: u32,
    pub checkpoints_written: usize,
}

impl CrawlReport {
    fn new(start_page: u32, end_page: u32) -> Self {
        Self {
            phase: RunPhase::Running,
            start_page,
            end_page,
            pages_attempted: 0,
            failed_pages: Vec::new(),
            empty_pages: 0,
            rejected_blocks: 0,
            records_added: 0,
            total_records: 0,
            last_completed_page: 0,
            checkpoints_written: 0,
        }
    }
}

impl fmt::Display for CrawlReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Run {}: pages {}..={}", self.phase, self.start_page, self.end_page)?;
        writeln!(f, "  Pages attempted: {}", self.pages_attempted)?;
        writeln!(f, "  Pages failed: {}", self.failed_pages.len())?;
        writeln!(f, "  Pages without records: {}", self.empty_pages)?;
        writeln!(f, "  Blocks rejected: {}", self.rejected_blocks)?;
        writeln!(f, "  Records added: {}", self.records_added)?;
        writeln!(f, "  Records total: {}", self.total_records)?;
        writeln!(f, "  Last completed page: {}", self.last_completed_page)?;
        write!(f, "  Checkpoints written: {}", self.checkpoints_written)
    }
}

/// Main crawler coordinator structure
///
/// Owns the live `CrawlState`; the store only ever sees snapshots of it.
pub struct Coordinator {
    settings: CrawlSettings,
    extractor: Extractor,
    fetcher: Box<dyn PageFetcher>,
    store: Box<dyn CheckpointStore>,
    stop: StopFlag,
    state: CrawlState,
    phase: RunPhase,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// Loads the existing checkpoint unless `settings.fresh` is set. A
    /// checkpoint that exists but cannot be decoded is a hard error: the run
    /// never starts on top of state it cannot trust.
    pub fn new(
        settings: CrawlSettings,
        extractor: Extractor,
        fetcher: Box<dyn PageFetcher>,
        store: Box<dyn CheckpointStore>,
        stop: StopFlag,
    ) -> Result<Self, HarvestError> {
        let mut state = if settings.fresh {
            tracing::info!(
                "Starting fresh; existing checkpoint at {} will be overwritten",
                store.describe()
            );
            CrawlState::new()
        } else {
            let state = store.load().map_err(|e| {
                tracing::error!("Cannot load checkpoint {}: {}", store.describe(), e);
                e
            })?;
            tracing::info!(
                "Loaded {} existing records (last completed page {}) from {}",
                state.len(),
                state.last_completed_page,
                store.describe()
            );
            state
        };

        if let Some(hash) = &settings.config_hash {
            if let Some(previous) = &state.config_hash {
                if previous != hash {
                    tracing::warn!(
                        "Checkpoint was written with a different configuration ({} vs {})",
                        previous,
                        hash
                    );
                }
            }
            state.config_hash = Some(hash.clone());
        }

        Ok(Self {
            settings,
            extractor,
            fetcher,
            store,
            stop,
            state,
            phase: RunPhase::Idle,
        })
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn state(&self) -> &CrawlState {
        &self.state
    }

    pub fn into_state(self) -> CrawlState {
        self.state
    }

    /// Page the run will start from
    pub fn resolve_start(&self) -> u32 {
        match self.settings.start {
            StartPage::Explicit(page) => page,
            StartPage::FromCheckpoint => self.state.next_page(),
        }
    }

    /// Runs the main crawl loop
    ///
    /// Pages are processed strictly in order. A failed fetch is logged and
    /// skipped; it never ends the run. The stop flag is honored between
    /// pages, after which one final checkpoint is written.
    pub async fn run(&mut self) -> Result<CrawlReport, HarvestError> {
        let start = self.resolve_start();
        let end = self.settings.end_page;

        let mut scheduler = match Scheduler::new(
            start,
            end,
            self.settings.checkpoint_interval,
            self.settings.page_delay,
        ) {
            Ok(scheduler) => scheduler,
            Err(e) => {
                self.transition(RunPhase::FatalError)?;
                return Err(e);
            }
        };

        self.transition(RunPhase::Running)?;

        if matches!(self.settings.start, StartPage::Explicit(_))
            && start <= self.state.last_completed_page
            && !self.state.is_empty()
        {
            tracing::warn!(
                "Starting at page {} but the checkpoint already covers up to page {}; \
                 records from overlapping pages will be duplicated",
                start,
                self.state.last_completed_page
            );
        }

        if self.settings.start == StartPage::FromCheckpoint && self.state.has_untracked_records() {
            tracing::warn!(
                "Checkpoint holds {} records but no page progress; resuming from page 1 \
                 will duplicate them. Pass an explicit start page to continue elsewhere",
                self.state.len()
            );
        }

        tracing::info!(
            "Harvesting pages {}..={} ({} pages, {} records held)",
            start,
            end,
            scheduler.remaining(),
            self.state.len()
        );

        let mut report = CrawlReport::new(start, end);
        let started = Instant::now();
        let mut interrupted = false;

        loop {
            // A stop that lands on the last page still finishes the range
            if self.stop.is_requested() && scheduler.remaining() > 0 {
                interrupted = true;
                break;
            }

            let Some(page) = scheduler.next_page() else {
                break;
            };

            let (result, rejected) = self.fetch_and_extract(page).await;
            report.rejected_blocks += rejected;
            match result.status {
                PageStatus::FetchFailed => report.failed_pages.push(page),
                PageStatus::ParseEmpty => report.empty_pages += 1,
                PageStatus::Ok => {}
            }
            report.records_added += self.state.apply(result);

            if scheduler.checkpoint_due() {
                match self.store.save(&self.state) {
                    Ok(()) => {
                        report.checkpoints_written += 1;
                        tracing::info!(
                            ">>> Progress saved: {} total records (page {}) <<<",
                            self.state.len(),
                            page
                        );
                    }
                    Err(e) => tracing::error!(
                        "Checkpoint after page {} failed, continuing: {}",
                        page,
                        e
                    ),
                }
            }

            scheduler.pause().await;
        }

        report.pages_attempted = scheduler.attempted();

        let outcome = if interrupted {
            tracing::warn!(
                "Stopped by user after {} pages; writing final checkpoint",
                report.pages_attempted
            );
            RunPhase::Interrupted
        } else {
            RunPhase::Completed
        };

        if let Err(e) = self.store.save(&self.state) {
            tracing::error!("Final checkpoint to {} failed: {}", self.store.describe(), e);
            self.transition(RunPhase::FatalError)?;
            return Err(e.into());
        }
        report.checkpoints_written += 1;

        self.transition(outcome)?;
        report.phase = outcome;
        report.total_records = self.state.len();
        report.last_completed_page = self.state.last_completed_page;

        tracing::info!(
            "Run {}: {} pages in {:?}, {} new records, {} total, saved to {}",
            outcome,
            report.pages_attempted,
            started.elapsed(),
            report.records_added,
            report.total_records,
            self.store.describe()
        );

        Ok(report)
    }

    /// Fetches and parses a single page without touching crawl state
    pub async fn process_page(&self, page: u32) -> PageResult {
        self.fetch_and_extract(page).await.0
    }

    /// Returns the page outcome plus the number of rejected blocks
    async fn fetch_and_extract(&self, page: u32) -> (PageResult, usize) {
        let markup = match self.fetcher.fetch(page).await {
            Ok(markup) => markup,
            Err(failure) => {
                tracing::warn!(
                    "Page {:>3} ✗ {} ({})",
                    page,
                    failure,
                    self.fetcher.describe_page(page)
                );
                return (PageResult::fetch_failed(page), 0);
            }
        };

        let extraction = self.extractor.extract_page(&markup);
        if !extraction.rejections.is_empty() {
            tracing::debug!(
                "Page {}: {} of {} blocks rejected: {:?}",
                page,
                extraction.rejections.len(),
                extraction.blocks(),
                extraction.rejections
            );
        }
        tracing::info!("Page {:>3} ✓ {:>2} records", page, extraction.records.len());

        let rejected = extraction.rejections.len();
        (PageResult::fetched(page, extraction.records), rejected)
    }

    fn transition(&mut self, next: RunPhase) -> Result<(), HarvestError> {
        if !self.phase.can_transition_to(next) {
            return Err(HarvestError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }
        tracing::debug!("Run phase {} -> {}", self.phase, next);
        self.phase = next;
        Ok(())
    }
}
