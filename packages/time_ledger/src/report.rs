use std::fmt::{self, Display};
use std::time::Duration;

use crate::{ActorId, Ledger};

/// Data recorded by a [`Profiler`][crate::Profiler], captured at one point in time.
///
/// A report holds the total time the session timer has been running and either one
/// ledger merged from all actors or one ledger per actor, depending on how the snapshot
/// was requested.
///
/// For human-readable output, use the `Display` implementation. Entries in each section
/// are sorted by descending value. For machine-readable output, inspect the ledgers.
///
/// # Examples
///
/// ```
/// use time_ledger::Profiler;
///
/// let profiler = Profiler::new();
/// profiler.start();
///
/// profiler.event("cache_miss");
/// profiler.average("batch_size", 32);
/// profiler.time("flush", || {});
///
/// let report = profiler.snapshot(true);
///
/// for (name, count) in report.merged().unwrap().events() {
///     println!("{name} happened {count} times");
/// }
///
/// println!("{report}");
/// ```
#[derive(Clone, Debug)]
pub struct Report {
    total_elapsed: Duration,
    ledgers: ReportLedgers,
}

#[derive(Clone, Debug)]
enum ReportLedgers {
    Merged(Ledger),

    // In order of first activity.
    PerActor(Box<[(ActorId, Ledger)]>),
}

impl Report {
    pub(crate) fn from_merged(total_elapsed: Duration, ledger: Ledger) -> Self {
        Self {
            total_elapsed,
            ledgers: ReportLedgers::Merged(ledger),
        }
    }

    pub(crate) fn from_actors(total_elapsed: Duration, actors: Box<[(ActorId, Ledger)]>) -> Self {
        Self {
            total_elapsed,
            ledgers: ReportLedgers::PerActor(actors),
        }
    }

    pub(crate) fn empty(merge: bool) -> Self {
        if merge {
            Self::from_merged(Duration::ZERO, Ledger::default())
        } else {
            Self::from_actors(Duration::ZERO, Box::default())
        }
    }

    /// Total time the session timer has been running.
    #[must_use]
    pub fn total_elapsed(&self) -> Duration {
        self.total_elapsed
    }

    /// Total time the session timer has been running, in seconds.
    #[must_use]
    pub fn total_elapsed_secs(&self) -> f64 {
        self.total_elapsed.as_secs_f64()
    }

    /// Whether the report holds one ledger merged from all actors.
    #[must_use]
    pub fn is_merged(&self) -> bool {
        matches!(self.ledgers, ReportLedgers::Merged(_))
    }

    /// The ledger merged from all actors, if the report was requested as merged.
    #[must_use]
    pub fn merged(&self) -> Option<&Ledger> {
        match &self.ledgers {
            ReportLedgers::Merged(ledger) => Some(ledger),
            ReportLedgers::PerActor(_) => None,
        }
    }

    /// Iterates over the ledger of each actor, in the order in which the actors first
    /// recorded something.
    ///
    /// Yields nothing if the report was requested as merged.
    pub fn actors(&self) -> impl Iterator<Item = (ActorId, &Ledger)> {
        let actors: &[(ActorId, Ledger)] = match &self.ledgers {
            ReportLedgers::Merged(_) => &[],
            ReportLedgers::PerActor(actors) => actors,
        };

        actors.iter().map(|(actor, ledger)| (*actor, ledger))
    }

    /// One ledger with the data of all actors, merging per-actor ledgers if needed.
    #[must_use]
    pub fn to_merged(&self) -> Ledger {
        match &self.ledgers {
            ReportLedgers::Merged(ledger) => ledger.clone(),
            ReportLedgers::PerActor(actors) => {
                Ledger::merge_all(actors.iter().map(|(_, ledger)| ledger))
            }
        }
    }

    /// Whether nothing at all was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match &self.ledgers {
            ReportLedgers::Merged(ledger) => ledger.is_empty(),
            ReportLedgers::PerActor(actors) => actors.iter().all(|(_, ledger)| ledger.is_empty()),
        }
    }

    /// Prints the report to stdout.
    ///
    /// Prints nothing if nothing was recorded.
    #[cfg_attr(test, mutants::skip)] // Too difficult to test stdout output reliably - manually tested.
    pub fn print_to_stdout(&self) {
        if self.is_empty() {
            return;
        }

        println!("{self}");
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total_secs = self.total_elapsed_secs();

        writeln!(
            f,
            "*** Profiling statistics. Total counted time: {total_secs} seconds"
        )?;

        match &self.ledgers {
            ReportLedgers::Merged(ledger) => write_ledger(f, ledger, total_secs),
            ReportLedgers::PerActor(actors) => {
                for (actor, ledger) in actors {
                    writeln!(f, "{actor}:")?;
                    write_ledger(f, ledger, total_secs)?;
                }

                Ok(())
            }
        }
    }
}

/// Sorts by descending value, then by ascending name so that ties render deterministically.
fn sort_descending<T>(entries: &mut [(&str, T)], value: impl Fn(&T) -> f64) {
    entries.sort_by(|a, b| {
        value(&b.1)
            .total_cmp(&value(&a.1))
            .then_with(|| a.0.cmp(b.0))
    });
}

fn write_ledger(f: &mut fmt::Formatter<'_>, ledger: &Ledger, total_secs: f64) -> fmt::Result {
    let mut events: Vec<_> = ledger.events().collect();
    events.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    if !events.is_empty() {
        writeln!(f, "Events:")?;
    }

    for (name, count) in events {
        writeln!(f, "{name}: {count}")?;
    }

    let mut averages: Vec<_> = ledger.averages().collect();
    sort_descending(&mut averages, |average| average.mean().unwrap_or(0.0));

    if !averages.is_empty() {
        writeln!(f, "Averages:")?;
    }

    for (name, average) in averages {
        write!(f, "{name}: ")?;
        write_optional(f, average.mean())?;
        write!(f, " (stddev = ")?;
        write_optional(f, average.std_dev())?;
        writeln!(f, ")")?;
    }

    let mut blocks: Vec<_> = ledger.blocks().collect();
    sort_descending(&mut blocks, |block| block.total().as_secs_f64());

    if blocks.is_empty() {
        return writeln!(f);
    }

    writeln!(f, "Blocks of time:")?;

    let mut unaccounted_secs = total_secs;

    for (name, block) in blocks {
        let block_secs = block.total().as_secs_f64();

        write!(f, "{name}: {block_secs}s (")?;
        write_percentage(f, block_secs, total_secs)?;
        write!(f, "), [")?;
        write_seconds(f, block.shortest())?;
        write!(f, " --> ")?;
        write_seconds(f, block.longest())?;
        write!(f, "], {} parts", block.count())?;

        if let Some(mean) = block.mean() {
            write!(f, ", {}s on average", mean.as_secs_f64())?;
        }

        writeln!(f)?;

        unaccounted_secs -= block_secs;
    }

    // Overlapping or nested blocks can add up to more than the total. Then this line is meaningless.
    if unaccounted_secs >= 0.0 {
        write!(f, "Unaccounted time: {unaccounted_secs}s (")?;
        write_percentage(f, unaccounted_secs, total_secs)?;
        writeln!(f, ")")?;
    }

    writeln!(f)
}

fn write_optional(f: &mut fmt::Formatter<'_>, value: Option<f64>) -> fmt::Result {
    match value {
        Some(value) => write!(f, "{value}"),
        None => write!(f, "n/a"),
    }
}

fn write_seconds(f: &mut fmt::Formatter<'_>, value: Option<Duration>) -> fmt::Result {
    match value {
        Some(value) => write!(f, "{}s", value.as_secs_f64()),
        None => write!(f, "n/a"),
    }
}

fn write_percentage(f: &mut fmt::Formatter<'_>, part: f64, whole: f64) -> fmt::Result {
    if whole > 0.0 {
        write!(f, "{:.2}%", 100.0 * part / whole)
    } else {
        write!(f, "n/a%")
    }
}
