//! Consecutive half-open polling windows for live production tracking.

use time::{Duration, OffsetDateTime};

use crate::aggregate::ScalarSummary;

/// Hands out `[from, to)` windows that tile the timeline without gaps.
///
/// A window only advances once it has been committed, so a failed fetch is
/// retried as part of the next, wider window.
#[derive(Debug, Clone)]
pub struct WindowTracker {
    from: OffsetDateTime,
}

impl WindowTracker {
    pub fn starting_before(now: OffsetDateTime, lookback: Duration) -> Self {
        Self { from: now - lookback }
    }

    pub fn next_window(&self, now: OffsetDateTime) -> (OffsetDateTime, OffsetDateTime) {
        (self.from, now.max(self.from))
    }

    pub fn commit(&mut self, to: OffsetDateTime) {
        self.from = self.from.max(to);
    }
}

/// Running totals across every committed window.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunningTotals {
    pub windows: u64,
    pub readings: usize,
    pub summary: ScalarSummary,
}

impl RunningTotals {
    pub fn add(&mut self, window: &ScalarSummary, readings: usize) {
        self.windows += 1;
        self.readings += readings;
        self.summary.net += window.net;
        self.summary.produced += window.produced;
        self.summary.consumed += window.consumed;
        self.summary.skipped_net += window.skipped_net;
        self.summary.skipped_produced += window.skipped_produced;
        self.summary.skipped_consumed += window.skipped_consumed;
    }
}
