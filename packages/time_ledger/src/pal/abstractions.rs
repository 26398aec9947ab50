use std::fmt::Debug;
use std::time::Instant;

/// Source of monotonic timestamps used to measure time blocks and the session timer.
pub(crate) trait Platform: Debug + Send + Sync + 'static {
    /// The current point in time.
    fn now(&self) -> Instant;
}
