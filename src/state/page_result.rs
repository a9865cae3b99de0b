/// Page outcome definitions
use crate::state::Record;
use std::fmt;

/// How a single page ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageStatus {
    /// Fetched and at least one record extracted
    Ok,

    /// Fetch failed (bad status, timeout, transport error)
    FetchFailed,

    /// Fetched, but no block survived extraction
    ParseEmpty,
}

impl PageStatus {
    /// Returns true if the page content was retrieved
    ///
    /// Only fetched pages count as completed for checkpoint progress.
    pub fn is_fetched(&self) -> bool {
        matches!(self, Self::Ok | Self::ParseEmpty)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::FetchFailed => "fetch_failed",
            Self::ParseEmpty => "parse_empty",
        }
    }
}

impl fmt::Display for PageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of fetching and parsing one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResult {
    pub page_index: u32,
    pub records: Vec<Record>,
    pub status: PageStatus,
}

impl PageResult {
    /// A fetched page; status follows from whether anything was extracted
    pub fn fetched(page_index: u32, records: Vec<Record>) -> Self {
        let status = if records.is_empty() {
            PageStatus::ParseEmpty
        } else {
            PageStatus::Ok
        };
        Self {
            page_index,
            records,
            status,
        }
    }

    /// A page whose content could not be retrieved
    pub fn fetch_failed(page_index: u32) -> Self {
        Self {
            page_index,
            records: Vec::new(),
            status: PageStatus::FetchFailed,
        }
    }
}
