use crate::{ActorId, Profiler};

/// Times a named block from creation until drop.
///
/// Created by [`Profiler::measure()`] or [`ActorHandle::measure()`][crate::ActorHandle::measure].
/// The span begins the block when created and ends it when dropped, recording the interval
/// for the actor that created it even if the span is dropped on another thread.
///
/// # Examples
///
/// ```
/// use time_ledger::Profiler;
///
/// let profiler = Profiler::new();
///
/// for _ in 0..3 {
///     let _span = profiler.measure("iteration");
///     // Work done here is timed.
/// }
///
/// let report = profiler.snapshot(true);
/// assert_eq!(report.merged().unwrap().block("iteration").unwrap().count(), 3);
/// ```
#[derive(Debug)]
#[must_use = "the block is timed between creation and drop"]
pub struct BlockSpan<'a> {
    profiler: &'a Profiler,
    actor: ActorId,
    name: &'a str,
}

impl<'a> BlockSpan<'a> {
    pub(crate) fn new(profiler: &'a Profiler, actor: ActorId, name: &'a str) -> Self {
        profiler.begin_block(actor, name);

        Self {
            profiler,
            actor,
            name,
        }
    }
}

impl Drop for BlockSpan<'_> {
    fn drop(&mut self) {
        self.profiler.end_block(self.actor, self.name);
    }
}
