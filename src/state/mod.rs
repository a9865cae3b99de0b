//! State module for harvested data and crawl progress
//!
//! # Components
//!
//! - `Record`: a validated question with exactly four choices and one answer
//! - `PageResult`: outcome of fetching and parsing one page
//! - `CrawlState`: the accumulated records plus progress, as checkpointed
//! - `RunPhase`: lifecycle of a single crawl run

mod crawl_state;
mod page_result;
mod record;
mod run_phase;

// Re-export main types
pub use crawl_state::CrawlState;
pub use page_result::{PageResult, PageStatus};
pub use record::{Record, Rejection, CHOICE_COUNT};
pub(crate) use record::choice_label;
pub use run_phase::RunPhase;
