use std::time::Instant;

use foldhash::HashMap;

use crate::{ClosedInterval, RunningAverage, TimeBlock};

/// Event counters, running averages and time blocks recorded by one actor,
/// or the merged result of several actors.
///
/// A ledger is read through a [`Report`][crate::Report]. Names appear exactly as
/// recorded, including the prefix the profiler adds to event and average names.
#[derive(Clone, Debug, Default)]
pub struct Ledger {
    events: HashMap<String, u64>,
    averages: HashMap<String, RunningAverage>,
    blocks: HashMap<String, TimeBlock>,
}

impl Ledger {
    /// The count of the named event, if it was ever recorded.
    #[must_use]
    pub fn event(&self, name: &str) -> Option<u64> {
        self.events.get(name).copied()
    }

    /// The running average of the named metric, if it was ever recorded.
    #[must_use]
    pub fn average(&self, name: &str) -> Option<&RunningAverage> {
        self.averages.get(name)
    }

    /// The summary of the named time block, if it was ever begun or ended.
    #[must_use]
    pub fn block(&self, name: &str) -> Option<&TimeBlock> {
        self.blocks.get(name)
    }

    /// Iterates over all event counters, in no particular order.
    pub fn events(&self) -> impl Iterator<Item = (&str, u64)> {
        self.events.iter().map(|(name, count)| (name.as_str(), *count))
    }

    /// Iterates over all running averages, in no particular order.
    pub fn averages(&self) -> impl Iterator<Item = (&str, &RunningAverage)> {
        self.averages
            .iter()
            .map(|(name, average)| (name.as_str(), average))
    }

    /// Iterates over all time blocks, in no particular order.
    pub fn blocks(&self) -> impl Iterator<Item = (&str, &TimeBlock)> {
        self.blocks.iter().map(|(name, block)| (name.as_str(), block))
    }

    /// Whether nothing at all has been recorded in this ledger.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.averages.is_empty() && self.blocks.is_empty()
    }

    pub(crate) fn add_event(&mut self, name: &str, times: u64) {
        let count = entry(&mut self.events, name);
        *count = count.saturating_add(times);
    }

    pub(crate) fn record_average(&mut self, name: &str, value: f64) {
        entry(&mut self.averages, name).record(value);
    }

    pub(crate) fn begin_block(&mut self, name: &str, now: Instant) {
        entry(&mut self.blocks, name).begin(now);
    }

    pub(crate) fn end_block(&mut self, name: &str, now: Instant) -> ClosedInterval {
        entry(&mut self.blocks, name).end(now)
    }

    pub(crate) fn is_block_open(&self, name: &str) -> bool {
        self.blocks.get(name).is_some_and(TimeBlock::is_open)
    }

    /// Folds every entry of `other` into this ledger.
    ///
    /// Counters and sums add up, block extremes take the min/max. The result does not
    /// depend on the order in which ledgers are folded together.
    pub(crate) fn merge_from(&mut self, other: &Self) {
        for (name, count) in &other.events {
            self.add_event(name, *count);
        }

        for (name, average) in &other.averages {
            entry(&mut self.averages, name).merge_from(average);
        }

        for (name, block) in &other.blocks {
            entry(&mut self.blocks, name).merge_from(block);
        }
    }

    /// Merges any number of ledgers into a new one that carries no interval state.
    pub(crate) fn merge_all<'a>(ledgers: impl IntoIterator<Item = &'a Self>) -> Self {
        let mut merged = Self::default();

        for ledger in ledgers {
            merged.merge_from(ledger);
        }

        merged
    }

    /// A copy of this ledger without any interval in progress.
    pub(crate) fn summary(&self) -> Self {
        Self {
            events: self.events.clone(),
            averages: self.averages.clone(),
            blocks: self
                .blocks
                .iter()
                .map(|(name, block)| (name.clone(), block.summary()))
                .collect(),
        }
    }
}

/// Looks up a named entry, inserting a zero-valued one first if it does not exist.
///
/// The name is only copied into an owned key on first use, so existing entries are
/// found without allocating.
fn entry<'a, V: Default>(map: &'a mut HashMap<String, V>, name: &str) -> &'a mut V {
    if map.contains_key(name) {
        // The borrow checker does not accept returning a `get_mut()` hit and inserting on a miss.
        map.get_mut(name).expect("guarded by contains_key above")
    } else {
        map.entry(name.to_owned()).or_default()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::time::Duration;

    use super::*;

    fn sample_ledger(events: u64, average: f64, block_ms: u64) -> Ledger {
        let mut ledger = Ledger::default();

        ledger.add_event("task", events);
        ledger.record_average("x", average);

        let start = Instant::now();
        ledger.begin_block("work", start);
        ledger.end_block("work", start + Duration::from_millis(block_ms));

        ledger
    }

    fn assert_same_contents(a: &Ledger, b: &Ledger) {
        assert_eq!(a.event("task"), b.event("task"));
        assert_eq!(a.average("x"), b.average("x"));
        assert_eq!(a.block("work"), b.block("work"));
    }

    #[test]
    fn new_ledger_is_empty() {
        let ledger = Ledger::default();

        assert!(ledger.is_empty());
        assert_eq!(ledger.event("anything"), None);
        assert_eq!(ledger.events().count(), 0);
    }

    #[test]
    fn events_accumulate_by_amount() {
        let mut ledger = Ledger::default();

        ledger.add_event("packets", 1);
        ledger.add_event("packets", 5);
        ledger.add_event("other", 0);

        assert_eq!(ledger.event("packets"), Some(6));
        assert_eq!(ledger.event("other"), Some(0));
        assert!(!ledger.is_empty());
    }

    #[test]
    fn repeated_names_share_one_entry() {
        let mut ledger = Ledger::default();
        let start = Instant::now();

        for _ in 0..3 {
            ledger.add_event("hit", 1);
            ledger.record_average("hit", 1.0);
            ledger.begin_block("hit", start);
            ledger.end_block("hit", start);
        }

        assert_eq!(ledger.events().count(), 1);
        assert_eq!(ledger.averages().count(), 1);
        assert_eq!(ledger.blocks().count(), 1);
        assert_eq!(ledger.event("hit"), Some(3));
        assert_eq!(ledger.average("hit").map(RunningAverage::count), Some(3));
        assert_eq!(ledger.block("hit").map(TimeBlock::count), Some(3));
    }

    #[test]
    fn event_counter_saturates() {
        let mut ledger = Ledger::default();

        ledger.add_event("huge", u64::MAX);
        ledger.add_event("huge", 10);

        assert_eq!(ledger.event("huge"), Some(u64::MAX));
    }

    #[test]
    fn begin_creates_open_block() {
        let mut ledger = Ledger::default();

        ledger.begin_block("io", Instant::now());

        assert!(ledger.is_block_open("io"));
        assert!(!ledger.is_block_open("never"));
        assert_eq!(ledger.block("io").map(TimeBlock::count), Some(0));
    }

    #[test]
    fn merge_sums_every_field() {
        let a = sample_ledger(10, 2.0, 30);
        let b = sample_ledger(5, 4.0, 10);

        let merged = Ledger::merge_all([&a, &b]);

        assert_eq!(merged.event("task"), Some(15));

        let average = merged.average("x").unwrap();
        assert_eq!(average.count(), 2);
        assert_eq!(average.mean(), Some(3.0));

        let block = merged.block("work").unwrap();
        assert_eq!(block.count(), 2);
        assert_eq!(block.total(), Duration::from_millis(40));
        assert_eq!(block.shortest(), Some(Duration::from_millis(10)));
        assert_eq!(block.longest(), Some(Duration::from_millis(30)));
    }

    #[test]
    fn merge_keeps_names_unique_to_one_side() {
        let mut a = Ledger::default();
        a.add_event("only_a", 1);

        let mut b = Ledger::default();
        b.record_average("only_b", 1.0);

        let merged = Ledger::merge_all([&a, &b]);

        assert_eq!(merged.event("only_a"), Some(1));
        assert_eq!(merged.average("only_b").map(RunningAverage::count), Some(1));
    }

    #[test]
    fn merge_is_order_independent() {
        let a = sample_ledger(1, 1.0, 5);
        let b = sample_ledger(2, 8.0, 50);
        let c = sample_ledger(3, 0.5, 20);

        let abc = Ledger::merge_all([&a, &b, &c]);
        let cab = Ledger::merge_all([&c, &a, &b]);
        let bca = Ledger::merge_all([&b, &c, &a]);

        assert_same_contents(&abc, &cab);
        assert_same_contents(&abc, &bca);
    }

    #[test]
    fn merged_ledger_has_no_open_blocks() {
        let mut a = Ledger::default();
        a.begin_block("pending", Instant::now());

        let merged = Ledger::merge_all([&a]);

        assert!(!merged.is_block_open("pending"));
        assert!(!a.summary().is_block_open("pending"));
    }
}
