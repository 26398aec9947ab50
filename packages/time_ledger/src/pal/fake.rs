use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::pal::Platform;

/// Clock whose time only moves when a test advances it.
///
/// Clones share the same time, so a test can keep one clone and hand another
/// to the profiler, then simulate time passing between operations.
#[derive(Clone, Debug)]
pub(crate) struct FakePlatform {
    origin: Instant,
    elapsed: Arc<Mutex<Duration>>,
}

impl FakePlatform {
    pub(crate) fn new() -> Self {
        Self {
            origin: Instant::now(),
            elapsed: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    /// Moves the clock forward by `duration`.
    pub(crate) fn advance(&self, duration: Duration) {
        let mut elapsed = self.elapsed.lock();
        *elapsed = elapsed
            .checked_add(duration)
            .expect("fake clock overflow means the test is broken");
    }
}

impl Platform for FakePlatform {
    fn now(&self) -> Instant {
        self.origin
            .checked_add(*self.elapsed.lock())
            .expect("fake clock overflow means the test is broken")
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn starts_without_movement() {
        let platform = FakePlatform::new();

        assert_eq!(platform.now(), platform.now());
    }

    #[test]
    fn advance_accumulates() {
        let platform = FakePlatform::new();
        let start = platform.now();

        platform.advance(Duration::from_millis(100));
        platform.advance(Duration::from_millis(50));

        assert_eq!(platform.now().duration_since(start), Duration::from_millis(150));
    }

    #[test]
    fn clones_share_time() {
        let platform1 = FakePlatform::new();
        let platform2 = platform1.clone();
        let start = platform2.now();

        platform1.advance(Duration::from_secs(2));

        assert_eq!(platform2.now().duration_since(start), Duration::from_secs(2));
    }
}
