use std::time::Duration;

use num_traits::AsPrimitive;

use crate::{ActorId, BlockSpan, Profiler, Result};

/// Records into a [`Profiler`] on behalf of an explicit actor.
///
/// The recording methods on `Profiler` itself always record for the calling thread. When a
/// unit of work moves between threads (e.g. an async task on a multithreaded executor), its
/// data can be kept together by recording through a handle for a fixed [`ActorId`].
///
/// The handle owns a clone of the profiler, so it can be moved into the task it serves.
///
/// # Examples
///
/// ```
/// use std::thread;
///
/// use time_ledger::{ActorId, Profiler};
///
/// let profiler = Profiler::new();
/// let job = profiler.actor(ActorId::explicit(7));
///
/// job.begin("download");
///
/// // The same actor continues on another thread.
/// let job_elsewhere = job.clone();
/// thread::spawn(move || job_elsewhere.end("download"))
///     .join()
///     .unwrap();
///
/// let report = profiler.snapshot(false);
/// let (actor, ledger) = report.actors().next().unwrap();
///
/// assert_eq!(actor, ActorId::explicit(7));
/// assert_eq!(ledger.block("download").unwrap().count(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct ActorHandle {
    profiler: Profiler,
    actor: ActorId,
}

impl ActorHandle {
    pub(crate) fn new(profiler: Profiler, actor: ActorId) -> Self {
        Self { profiler, actor }
    }

    /// The actor this handle records for.
    #[must_use]
    pub fn id(&self) -> ActorId {
        self.actor
    }

    /// Counts one occurrence of the named event.
    pub fn event(&self, name: &str) {
        self.profiler.record_event(self.actor, name, 1);
    }

    /// Counts `times` occurrences of the named event.
    pub fn event_times(&self, name: &str, times: u64) {
        self.profiler.record_event(self.actor, name, times);
    }

    /// Adds a value to the named running average.
    pub fn average(&self, name: &str, value: impl AsPrimitive<f64>) {
        self.profiler.record_average(self.actor, name, value.as_());
    }

    /// Starts timing the named block. See [`Profiler::begin()`].
    pub fn begin(&self, name: &str) {
        self.profiler.begin_block(self.actor, name);
    }

    /// Stops timing the named block. See [`Profiler::end()`].
    pub fn end(&self, name: &str) {
        self.profiler.end_block(self.actor, name);
    }

    /// Stops timing the named block, returning the recorded interval.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BlockNotOpen`][crate::Error::BlockNotOpen] without recording
    /// anything if the block is not open for this actor.
    pub fn try_end(&self, name: &str) -> Result<Duration> {
        self.profiler.try_end_block(self.actor, name)
    }

    /// Times the named block until the returned span is dropped.
    pub fn measure<'a>(&'a self, name: &'a str) -> BlockSpan<'a> {
        BlockSpan::new(&self.profiler, self.actor, name)
    }
}
