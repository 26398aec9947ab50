use crate::Profiler;
use crate::pal::PlatformFacade;

/// Creates instances of [`Profiler`].
///
/// All settings are optional. Use [`Profiler::builder()`] to create a new instance of this
/// builder, or [`Profiler::new()`] to skip it and use the defaults.
///
/// # Example
///
/// ```
/// use time_ledger::Profiler;
///
/// let profiler = Profiler::builder()
///     .auto_start(true)
///     .prefix("net.")
///     .build();
///
/// profiler.event("connect");
///
/// let report = profiler.snapshot(true);
/// assert_eq!(report.merged().unwrap().event("net.connect"), Some(1));
/// ```
#[derive(Debug)]
pub struct ProfilerBuilder {
    auto_start: bool,
    prefix: String,
    enabled: bool,
    final_report: bool,
    platform: PlatformFacade,
}

impl ProfilerBuilder {
    pub(crate) fn new() -> Self {
        Self {
            auto_start: false,
            prefix: String::new(),
            enabled: true,
            final_report: true,
            platform: PlatformFacade::real(),
        }
    }

    /// Whether the session timer starts as soon as the profiler is built.
    ///
    /// Defaults to `false`, in which case the timer only runs after [`Profiler::start()`].
    /// Events, averages and blocks are recorded either way.
    #[must_use]
    pub fn auto_start(self, auto_start: bool) -> Self {
        Self { auto_start, ..self }
    }

    /// Namespace prepended to the name of every event and running average.
    ///
    /// Time blocks keep the name they are given. Defaults to no prefix.
    #[must_use]
    pub fn prefix(self, prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..self
        }
    }

    /// Whether the profiler records anything at all.
    ///
    /// A disabled profiler returns from every operation without taking a lock or reading
    /// the clock, and its reports are always empty. Defaults to `true`.
    #[must_use]
    pub fn enabled(self, enabled: bool) -> Self {
        Self { enabled, ..self }
    }

    /// Whether [`Profiler::finalize()`] produces a report when no snapshot has been
    /// taken during the lifetime of the profiler.
    ///
    /// Defaults to `true`.
    #[must_use]
    pub fn final_report(self, final_report: bool) -> Self {
        Self {
            final_report,
            ..self
        }
    }

    #[cfg(test)]
    #[must_use]
    pub(crate) fn platform(self, platform: PlatformFacade) -> Self {
        Self { platform, ..self }
    }

    /// Builds the profiler with the configured settings.
    #[must_use]
    pub fn build(self) -> Profiler {
        Profiler::from_builder(
            self.auto_start,
            self.prefix,
            self.enabled,
            self.final_report,
            self.platform,
        )
    }
}
