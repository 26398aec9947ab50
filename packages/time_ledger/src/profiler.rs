use std::borrow::Cow;
use std::sync::{Arc, LazyLock};
use std::time::{Duration, Instant};

use foldhash::{HashMap, HashMapExt};
use num_traits::AsPrimitive;
use parking_lot::Mutex;
use tracing::{debug, info, trace, warn};

use crate::pal::{Platform, PlatformFacade};
use crate::{
    ActorHandle, ActorId, BlockSpan, ClosedInterval, Error, GlobalTimer, Ledger, ProfilerBuilder,
    Report, Result,
};

static GLOBAL: LazyLock<Profiler> = LazyLock::new(Profiler::new);

/// Collects event counts, running averages and block timings from any number of threads
/// and aggregates them into a [`Report`].
///
/// Every actor (by default, every thread) records into its own [`Ledger`]. A report
/// either merges all ledgers into one or lists them per actor, together with the total
/// time the session timer has been running.
///
/// `Profiler` is a handle: clones are cheap and share the same data, so the usual pattern
/// is to create one profiler and hand clones to the code being instrumented. For code
/// that cannot easily be given a handle, [`Profiler::global()`] offers one shared
/// instance per process.
///
/// # Examples
///
/// ```
/// use std::thread;
///
/// use time_ledger::Profiler;
///
/// let profiler = Profiler::new();
/// profiler.start();
///
/// thread::scope(|s| {
///     for _ in 0..3 {
///         s.spawn(|| {
///             for _ in 0..10 {
///                 profiler.event("task");
///             }
///
///             profiler.average("queue_depth", 4);
///             profiler.time("work", || std::hint::black_box(42));
///         });
///     }
/// });
///
/// let report = profiler.snapshot(true);
/// let ledger = report.merged().unwrap();
///
/// assert_eq!(ledger.event("task"), Some(30));
/// assert_eq!(ledger.block("work").unwrap().count(), 3);
///
/// println!("{report}");
/// ```
///
/// # Thread safety
///
/// All operations take one profiler-wide lock for a short, non-blocking critical section.
/// Ledgers of different actors are never mixed until a report is requested.
#[derive(Clone, Debug)]
pub struct Profiler {
    inner: Arc<ProfilerInner>,
}

#[derive(Debug)]
struct ProfilerInner {
    state: Mutex<ProfilerState>,
    platform: PlatformFacade,
    prefix: String,
    enabled: bool,
}

#[derive(Debug)]
struct ProfilerState {
    // In order of first activity, so per-actor reports are stable.
    ledgers: Vec<(ActorId, Ledger)>,
    positions: HashMap<ActorId, usize>,

    timer: GlobalTimer,
    final_report_pending: bool,
}

impl ProfilerState {
    /// The ledger of the actor, created on first use. Also says whether it was just created.
    fn ledger_mut(&mut self, actor: ActorId) -> (&mut Ledger, bool) {
        let (position, created) = match self.positions.get(&actor) {
            Some(&position) => (position, false),
            None => {
                let position = self.ledgers.len();
                self.ledgers.push((actor, Ledger::default()));
                self.positions.insert(actor, position);
                (position, true)
            }
        };

        let (_, ledger) = self
            .ledgers
            .get_mut(position)
            .expect("positions only ever point into ledgers");

        (ledger, created)
    }

    /// The ledger of the actor, if it has recorded anything since the last clear.
    fn existing_ledger_mut(&mut self, actor: ActorId) -> Option<&mut Ledger> {
        let position = *self.positions.get(&actor)?;

        self.ledgers
            .get_mut(position)
            .map(|(_, ledger)| ledger)
    }

    fn snapshot(&mut self, now: Instant, merge: bool) -> Report {
        self.timer.stop(now);
        self.final_report_pending = false;

        if merge {
            Report::from_merged(
                self.timer.total(),
                Ledger::merge_all(self.ledgers.iter().map(|(_, ledger)| ledger)),
            )
        } else {
            Report::from_actors(
                self.timer.total(),
                self.ledgers
                    .iter()
                    .map(|(actor, ledger)| (*actor, ledger.summary()))
                    .collect(),
            )
        }
    }
}

impl Profiler {
    /// Creates a profiler with the default configuration.
    ///
    /// The session timer is not started; call [`start()`](Self::start) for the report to
    /// include total elapsed time. Use [`Profiler::builder()`] for other settings.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates a builder to configure a new profiler.
    #[must_use]
    #[cfg_attr(test, mutants::skip)] // Gets replaced with itself by different name, bad mutation.
    pub fn builder() -> ProfilerBuilder {
        ProfilerBuilder::new()
    }

    /// The profiler shared by the whole process.
    ///
    /// It is created with the default configuration on first access and lives until the
    /// process exits. Call [`finalize()`](Self::finalize) before exiting to get the final
    /// report, if one is still due.
    ///
    /// # Examples
    ///
    /// ```
    /// use time_ledger::Profiler;
    ///
    /// fn handle_request() {
    ///     Profiler::global().event("requests_handled");
    /// }
    ///
    /// handle_request();
    /// ```
    #[must_use]
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    pub(crate) fn from_builder(
        auto_start: bool,
        prefix: String,
        enabled: bool,
        final_report: bool,
        platform: PlatformFacade,
    ) -> Self {
        let mut timer = GlobalTimer::default();

        if enabled && auto_start {
            timer.start(platform.now());
        }

        Self {
            inner: Arc::new(ProfilerInner {
                state: Mutex::new(ProfilerState {
                    ledgers: Vec::new(),
                    positions: HashMap::new(),
                    timer,
                    final_report_pending: enabled && final_report,
                }),
                platform,
                prefix,
                enabled,
            }),
        }
    }

    /// Starts the session timer. Does nothing if it is already running.
    pub fn start(&self) {
        if !self.inner.enabled {
            return;
        }

        let started = {
            let mut state = self.inner.state.lock();
            let now = self.inner.platform.now();
            state.timer.start(now)
        };

        if started {
            debug!("profiling session timer started");
        }
    }

    /// Stops the session timer, adding the time since the last start to the total.
    /// Does nothing if it is not running.
    pub fn stop(&self) {
        if !self.inner.enabled {
            return;
        }

        let stopped_total = {
            let mut state = self.inner.state.lock();
            let now = self.inner.platform.now();
            state.timer.stop(now).then(|| state.timer.total())
        };

        if let Some(total) = stopped_total {
            debug!(total_elapsed = ?total, "profiling session timer stopped");
        }
    }

    /// Discards all recorded data of all actors and resets the total elapsed time to zero.
    ///
    /// A running session timer keeps running, counting from this point on.
    pub fn clear(&self) {
        if !self.inner.enabled {
            return;
        }

        let running = {
            let mut state = self.inner.state.lock();
            let now = self.inner.platform.now();

            state.ledgers.clear();
            state.positions.clear();
            state.timer.reset(now);

            state.timer.is_running()
        };

        debug!(running, "profiling data cleared");
    }

    /// Whether the session timer is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.inner.enabled && self.inner.state.lock().timer.is_running()
    }

    /// Whether this profiler records anything at all.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.inner.enabled
    }

    /// Counts one occurrence of the named event for the current thread.
    #[inline]
    pub fn event(&self, name: &str) {
        self.record_event(ActorId::current_thread(), name, 1);
    }

    /// Counts `times` occurrences of the named event for the current thread.
    #[inline]
    pub fn event_times(&self, name: &str, times: u64) {
        self.record_event(ActorId::current_thread(), name, times);
    }

    /// Adds a value to the named running average for the current thread.
    ///
    /// Any primitive numeric type is accepted and converted to `f64`.
    #[inline]
    pub fn average(&self, name: &str, value: impl AsPrimitive<f64>) {
        self.record_average(ActorId::current_thread(), name, value.as_());
    }

    /// Starts timing the named block for the current thread.
    ///
    /// If the block is already open, its start is moved to now and the earlier
    /// start is forgotten.
    #[inline]
    pub fn begin(&self, name: &str) {
        self.begin_block(ActorId::current_thread(), name);
    }

    /// Stops timing the named block for the current thread and records the interval.
    ///
    /// Every `end()` must follow a matching [`begin()`](Self::begin). If it does not, a
    /// warning is logged and the interval is measured from the last time the block was
    /// begun, or recorded as zero if it never was. Use [`try_end()`](Self::try_end) to
    /// have such misuse reported as an error instead.
    #[inline]
    pub fn end(&self, name: &str) {
        self.end_block(ActorId::current_thread(), name);
    }

    /// Stops timing the named block for the current thread, returning the recorded interval.
    ///
    /// A disabled profiler always returns a zero interval.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BlockNotOpen`] without recording anything if the block is not open.
    pub fn try_end(&self, name: &str) -> Result<Duration> {
        self.try_end_block(ActorId::current_thread(), name)
    }

    /// Times the named block for the current thread until the returned span is dropped.
    pub fn measure<'a>(&'a self, name: &'a str) -> BlockSpan<'a> {
        BlockSpan::new(self, ActorId::current_thread(), name)
    }

    /// Runs `f`, timing it as the named block for the current thread.
    pub fn time<F, R>(&self, name: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let _span = self.measure(name);
        f()
    }

    /// Records on behalf of an explicit actor instead of the current thread.
    #[must_use]
    pub fn actor(&self, actor: ActorId) -> ActorHandle {
        ActorHandle::new(self.clone(), actor)
    }

    /// Stops the session timer and returns the data recorded so far.
    ///
    /// With `merge`, the report holds one ledger merged from all actors. Otherwise it holds
    /// one ledger per actor, in the order in which the actors first recorded something.
    ///
    /// Taking a snapshot means [`finalize()`](Self::finalize) will not produce a report.
    #[must_use]
    pub fn snapshot(&self, merge: bool) -> Report {
        if !self.inner.enabled {
            return Report::empty(merge);
        }

        let report = {
            let mut state = self.inner.state.lock();
            let now = self.inner.platform.now();
            state.snapshot(now, merge)
        };

        debug!(
            merge,
            total_elapsed = ?report.total_elapsed(),
            "profiling snapshot taken"
        );

        report
    }

    /// Returns the final merged report, if one is still due.
    ///
    /// A report is due unless a [`snapshot()`](Self::snapshot) has already been taken,
    /// `finalize()` has already produced one, or the profiler was built with
    /// [`final_report(false)`](ProfilerBuilder::final_report). Call this when instrumented
    /// work is complete, e.g. just before the process exits.
    #[must_use]
    pub fn finalize(&self) -> Option<Report> {
        if !self.inner.enabled {
            return None;
        }

        let report = {
            let mut state = self.inner.state.lock();

            if !state.final_report_pending {
                return None;
            }

            let now = self.inner.platform.now();
            state.snapshot(now, true)
        };

        debug!(total_elapsed = ?report.total_elapsed(), "profiling session finalized");

        Some(report)
    }

    /// Takes a snapshot and writes it to the log at the `INFO` level.
    #[cfg_attr(test, mutants::skip)] // Output goes to whatever subscriber is installed.
    pub fn log_report(&self, merge: bool) {
        let report = self.snapshot(merge);
        info!("{report}");
    }

    pub(crate) fn record_event(&self, actor: ActorId, name: &str, times: u64) {
        if !self.inner.enabled {
            return;
        }

        let key = self.key(name);
        self.with_ledger(actor, |ledger, _| ledger.add_event(&key, times));
    }

    pub(crate) fn record_average(&self, actor: ActorId, name: &str, value: f64) {
        if !self.inner.enabled {
            return;
        }

        let key = self.key(name);
        self.with_ledger(actor, |ledger, _| ledger.record_average(&key, value));
    }

    pub(crate) fn begin_block(&self, actor: ActorId, name: &str) {
        if !self.inner.enabled {
            return;
        }

        self.with_ledger(actor, |ledger, now| ledger.begin_block(name, now));
    }

    pub(crate) fn end_block(&self, actor: ActorId, name: &str) {
        if !self.inner.enabled {
            return;
        }

        let closed = self.with_ledger(actor, |ledger, now| ledger.end_block(name, now));

        if !closed.matched {
            warn!(
                block = name,
                %actor,
                elapsed = ?closed.elapsed,
                "time block ended without a matching begin"
            );
        }
    }

    pub(crate) fn try_end_block(&self, actor: ActorId, name: &str) -> Result<Duration> {
        if !self.inner.enabled {
            return Ok(Duration::ZERO);
        }

        // An actor without a ledger has no open blocks. Creating one here would record it.
        let closed = {
            let mut state = self.inner.state.lock();
            let now = self.inner.platform.now();

            state
                .existing_ledger_mut(actor)
                .filter(|ledger| ledger.is_block_open(name))
                .map(|ledger| ledger.end_block(name, now))
        };

        closed
            .map(|ClosedInterval { elapsed, .. }| elapsed)
            .ok_or_else(|| Error::BlockNotOpen {
                block: name.to_owned(),
                actor,
            })
    }

    /// Runs `f` on the actor's ledger while holding the lock, passing in the current time.
    fn with_ledger<R>(&self, actor: ActorId, f: impl FnOnce(&mut Ledger, Instant) -> R) -> R {
        let mut state = self.inner.state.lock();
        let now = self.inner.platform.now();

        let (ledger, created) = state.ledger_mut(actor);
        let result = f(ledger, now);
        drop(state);

        if created {
            trace!(%actor, "ledger created");
        }

        result
    }

    /// Event and average names carry the configured prefix. Block names never do.
    fn key<'n>(&self, name: &'n str) -> Cow<'n, str> {
        if self.inner.prefix.is_empty() {
            Cow::Borrowed(name)
        } else {
            Cow::Owned(format!("{}{name}", self.inner.prefix))
        }
    }

    #[cfg(test)]
    pub(crate) fn with_platform(platform: PlatformFacade) -> Self {
        Self::builder().platform(platform).build()
    }
}

impl Default for Profiler {
    fn default() -> Self {
        Self::new()
    }
}
