//! Cooperative stop signal
//!
//! The coordinator checks the flag between pages only; a page that has
//! started is always finished (fetched, parsed, accumulated) before the run
//! stops.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared flag asking the crawl to stop at the next page boundary
#[derive(Debug, Clone, Default)]
pub struct StopFlag {
    requested: Arc<AtomicBool>,
}

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Asks the crawl to stop
    pub fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    /// Returns true once a stop has been requested
    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// Sets the flag when the process receives Ctrl-C
    ///
    /// Must be called from within a tokio runtime.
    pub fn listen_for_ctrl_c(&self) -> tokio::task::JoinHandle<()> {
        let flag = self.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::warn!("Interrupt received, stopping after the current page");
                    flag.request();
                }
                Err(e) => tracing::error!("Could not listen for Ctrl-C: {}", e),
            }
        })
    }
}
