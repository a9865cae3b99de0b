/// Run lifecycle definitions for the crawl coordinator
use std::fmt;

/// Phase of a single crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunPhase {
    /// State loaded, nothing fetched yet
    Idle,

    /// Walking the page range
    Running,

    // ===== Terminal States =====
    /// Whole range walked, final checkpoint written
    Completed,

    /// Stop requested between pages, final checkpoint written
    Interrupted,

    /// Final checkpoint could not be written or startup failed
    FatalError,
}

impl RunPhase {
    /// Returns true if no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Interrupted | Self::FatalError)
    }

    /// Returns true if moving from `self` to `next` is a legal transition
    pub fn can_transition_to(&self, next: RunPhase) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Running)
                | (Self::Idle, Self::FatalError)
                | (Self::Running, Self::Completed)
                | (Self::Running, Self::Interrupted)
                | (Self::Running, Self::FatalError)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Interrupted => "interrupted",
            Self::FatalError => "fatal_error",
        }
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
