//! Crawler module for page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching of listing pages
//! - Record extraction from page markup
//! - Sequential page scheduling and checkpoint cadence
//! - Overall crawl coordination and interrupt handling

mod coordinator;
mod extractor;
mod fetcher;
mod scheduler;
mod shutdown;

pub use coordinator::{Coordinator, CrawlReport, CrawlSettings, StartPage};
pub use extractor::{Extractor, PageExtraction};
pub use fetcher::{build_http_client, FetchFailure, HttpFetcher, PageAddress, PageFetcher};
pub use scheduler::Scheduler;
pub use shutdown::StopFlag;

use crate::config::Config;
use crate::storage::JsonCheckpointStore;
use crate::HarvestError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP fetcher and record extractor
/// 2. Open the JSON checkpoint named in the configuration
/// 3. Install the Ctrl-C listener
/// 4. Walk the page range and write the final checkpoint
///
/// # Arguments
///
/// * `config` - The harvester configuration
/// * `settings` - Page range, resume mode and checkpoint cadence for this run
///
/// # Returns
///
/// * `Ok(CrawlReport)` - The run finished or was interrupted cleanly
/// * `Err(HarvestError)` - The run could not start or its final save failed
pub async fn crawl(config: &Config, settings: CrawlSettings) -> Result<CrawlReport, HarvestError> {
    let fetcher = HttpFetcher::from_config(config)?;
    let extractor = Extractor::new(&config.extract)?;
    let store = JsonCheckpointStore::new(&config.output.checkpoint_path);

    let stop = StopFlag::new();
    let listener = stop.listen_for_ctrl_c();

    let mut coordinator =
        Coordinator::new(settings, extractor, Box::new(fetcher), Box::new(store), stop)?;
    let result = coordinator.run().await;

    listener.abort();
    result
}
