use std::time::{Duration, Instant};

/// Summary of every closed interval recorded for one named block of code.
///
/// A block is timed by pairing [`Profiler::begin()`][1] with [`Profiler::end()`][2]
/// (or by holding a [`BlockSpan`][3]). Each closed interval is folded into the
/// total, the count and the shortest/longest interval seen so far.
///
/// # Examples
///
/// ```
/// use time_ledger::Profiler;
///
/// let profiler = Profiler::new();
///
/// profiler.begin("parse");
/// // ... parse something ...
/// profiler.end("parse");
///
/// let report = profiler.snapshot(true);
/// let ledger = report.merged().unwrap();
/// let parse = ledger.block("parse").unwrap();
///
/// assert_eq!(parse.count(), 1);
/// assert!(parse.shortest().unwrap() <= parse.longest().unwrap());
/// ```
///
/// [1]: crate::Profiler::begin
/// [2]: crate::Profiler::end
/// [3]: crate::BlockSpan
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TimeBlock {
    total: Duration,
    count: u64,

    // Duration::MAX until the first interval is recorded.
    shortest: Duration,

    // Duration::ZERO until the first interval is recorded.
    longest: Duration,

    // Kept after `end` so an unmatched `end` can reuse the stale start.
    started_at: Option<Instant>,
    open: bool,
}

/// Outcome of closing a block interval.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct ClosedInterval {
    pub(crate) elapsed: Duration,

    /// Whether the block was open, i.e. whether `end` matched a `begin`.
    pub(crate) matched: bool,
}

impl TimeBlock {
    /// Sum of the durations of all closed intervals.
    #[must_use]
    pub fn total(&self) -> Duration {
        self.total
    }

    /// Number of closed intervals.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.count
    }

    /// The shortest closed interval, if any interval has been closed.
    #[must_use]
    pub fn shortest(&self) -> Option<Duration> {
        (self.count > 0).then_some(self.shortest)
    }

    /// The longest closed interval, if any interval has been closed.
    #[must_use]
    pub fn longest(&self) -> Option<Duration> {
        (self.count > 0).then_some(self.longest)
    }

    /// Mean duration of the closed intervals, if any interval has been closed.
    #[must_use]
    pub fn mean(&self) -> Option<Duration> {
        let nanos = self.total.as_nanos().checked_div(u128::from(self.count))?;

        // Mean of u64-counted durations never exceeds the total, which is itself a Duration.
        Some(Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX)))
    }

    /// Whether an interval is currently in progress.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Starts a new interval, discarding the start of any interval already in progress.
    pub(crate) fn begin(&mut self, now: Instant) {
        self.started_at = Some(now);
        self.open = true;
    }

    /// Closes the interval in progress and folds it into the summary.
    ///
    /// Without a preceding `begin`, the last known start is reused. If the block was
    /// never begun at all, a zero-length interval is recorded.
    pub(crate) fn end(&mut self, now: Instant) -> ClosedInterval {
        let matched = self.open;
        self.open = false;

        let elapsed = self
            .started_at
            .map_or(Duration::ZERO, |started_at| {
                now.saturating_duration_since(started_at)
            });

        self.record(elapsed);

        ClosedInterval { elapsed, matched }
    }

    pub(crate) fn record(&mut self, elapsed: Duration) {
        self.total = self.total.saturating_add(elapsed);
        self.count = self.count.saturating_add(1);
        self.shortest = self.shortest.min(elapsed);
        self.longest = self.longest.max(elapsed);
    }

    /// Folds the summary of `other` into this one. Interval state of `other` is ignored.
    pub(crate) fn merge_from(&mut self, other: &Self) {
        self.total = self.total.saturating_add(other.total);
        self.count = self.count.saturating_add(other.count);
        self.shortest = self.shortest.min(other.shortest);
        self.longest = self.longest.max(other.longest);
    }

    /// A copy of the summary without any interval in progress.
    pub(crate) fn summary(&self) -> Self {
        Self {
            started_at: None,
            open: false,
            ..self.clone()
        }
    }
}

impl Default for TimeBlock {
    fn default() -> Self {
        Self {
            total: Duration::ZERO,
            count: 0,
            shortest: Duration::MAX,
            longest: Duration::ZERO,
            started_at: None,
            open: false,
        }
    }
}
