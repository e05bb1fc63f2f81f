use std::time::{Duration, Instant};

/// Drift-corrected countdown for the active phase.
///
/// Remaining time is recomputed from the phase's start timestamp and its
/// initial remaining duration on every query, so irregular tick cadence (a
/// stalled event loop, a backgrounded terminal) cannot accumulate error.
/// The clock never reads the OS clock itself; `now` is always injected.
#[derive(Debug, Clone, Default)]
pub struct CountdownClock {
    started_at: Option<Instant>,
    initial_remaining: Duration,
}

impl CountdownClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the remaining time without starting the countdown.
    pub fn load(&mut self, remaining: Duration) {
        self.initial_remaining = remaining;
        self.started_at = None;
    }

    /// Begin (or re-base) the countdown at `now` with `initial_remaining`
    /// left on the clock.
    pub fn start(&mut self, now: Instant, initial_remaining: Duration) {
        self.started_at = Some(now);
        self.initial_remaining = initial_remaining;
    }

    /// Remaining time at `now`, saturating at zero.
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.started_at {
            Some(started) => self
                .initial_remaining
                .saturating_sub(now.saturating_duration_since(started)),
            None => self.initial_remaining,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        self.remaining(now).is_zero()
    }

    /// Capture the remaining time as of `now` and drop the basis. A later
    /// `start` with the captured value re-bases the countdown without loss,
    /// however long the clock sat frozen.
    pub fn freeze(&mut self, now: Instant) {
        self.initial_remaining = self.remaining(now);
        self.started_at = None;
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }
}
