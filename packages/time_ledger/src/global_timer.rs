use std::time::{Duration, Instant};

/// Total running time of a profiling session, across any number of start/stop cycles.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct GlobalTimer {
    // Some while running.
    started_at: Option<Instant>,

    // Only advances on `stop`.
    accumulated: Duration,
}

impl GlobalTimer {
    /// Returns whether the timer was stopped before, i.e. whether anything changed.
    pub(crate) fn start(&mut self, now: Instant) -> bool {
        if self.started_at.is_some() {
            return false;
        }

        self.started_at = Some(now);
        true
    }

    /// Returns whether the timer was running before, i.e. whether anything changed.
    pub(crate) fn stop(&mut self, now: Instant) -> bool {
        let Some(started_at) = self.started_at.take() else {
            return false;
        };

        self.accumulated = self
            .accumulated
            .saturating_add(now.saturating_duration_since(started_at));
        true
    }

    /// Discards accumulated time. A running timer keeps running from `now`.
    pub(crate) fn reset(&mut self, now: Instant) {
        let was_running = self.is_running();

        *self = Self::default();

        if was_running {
            self.start(now);
        }
    }

    pub(crate) fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    /// Time accumulated by completed start/stop cycles.
    pub(crate) fn total(&self) -> Duration {
        self.accumulated
    }
}
