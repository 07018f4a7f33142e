/// Search progress reporting: lightweight messages sent from the search
/// thread to the UI thread via a crossbeam channel, and the progress
/// counter the UI folds them into.
use crate::model::NodeIndex;
use std::time::Duration;

/// Updates posted by a search task, in strict FIFO order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchProgress {
    /// The walk is about to begin over `total` leaves.
    Started { total: u64 },
    /// A leaf whose file contains the pattern.
    Match(NodeIndex),
    /// Running count of leaves visited so far.
    Progress { visited: u64 },
    /// A non-fatal error on one file. The walk continues.
    Error { path: String, message: String },
    /// Every leaf in scope was visited.
    Complete {
        duration: Duration,
        matches: u64,
        errors: u64,
    },
    /// The task observed cancellation and stopped early.
    Cancelled,
}

/// How the progress bar should be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProgressCounter {
    /// Nothing known about the amount of work.
    #[default]
    Indeterminate,
    /// `value` of `max` leaves visited.
    Determinate { value: u64, max: u64 },
    /// Terminal state: the run finished normally. Full bar, disabled.
    Done,
}

impl ProgressCounter {
    /// A fresh counter over `[0, max]`. An empty range has no linear progress.
    pub fn start(max: u64) -> Self {
        if max == 0 {
            Self::Indeterminate
        } else {
            Self::Determinate { value: 0, max }
        }
    }

    /// Move forward to `value`, clamped to the range.
    ///
    /// The counter never moves backwards and never leaves `Done`.
    pub fn advance_to(&mut self, value: u64) {
        if let Self::Determinate { value: current, max } = self {
            *current = value.clamp(*current, *max);
        }
    }

    /// Enter the terminal state.
    pub fn finish(&mut self) {
        *self = Self::Done;
    }

    /// Freeze the bar after a run that stopped early.
    ///
    /// A determinate bar keeps its value; an indeterminate one becomes an
    /// empty determinate bar so nothing keeps animating.
    pub fn stop(&mut self) {
        if let Self::Indeterminate = self {
            *self = Self::Determinate { value: 0, max: 0 };
        }
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Fraction complete in `[0, 1]`, or `None` when indeterminate.
    pub fn fraction(&self) -> Option<f32> {
        match *self {
            Self::Indeterminate => None,
            Self::Determinate { max: 0, .. } => Some(0.0),
            Self::Determinate { value, max } => Some(value as f32 / max as f32),
            Self::Done => Some(1.0),
        }
    }
}
