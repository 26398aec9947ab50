//! Integration tests for `time_ledger` against the real clock.
//!
//! These tests drive the public API from several threads and verify that the
//! aggregated report matches what was recorded, regardless of interleaving.

use std::hint::black_box;
use std::thread;
use std::time::{Duration, Instant};

use time_ledger::{ActorId, Profiler};

const THREADS: u64 = 8;
const EVENTS_PER_THREAD: u64 = 1000;

/// Keeps the processor busy for roughly the given duration so the clock has something to measure.
fn busy_wait(duration: Duration) {
    let start = Instant::now();
    let mut accumulator = 0_u64;

    while start.elapsed() < duration {
        accumulator = accumulator.wrapping_mul(31).wrapping_add(7);
        black_box(accumulator);
    }
}

#[test]
fn events_from_many_threads_add_up() {
    let profiler = Profiler::new();

    thread::scope(|s| {
        for _ in 0..THREADS {
            s.spawn(|| {
                for _ in 0..EVENTS_PER_THREAD {
                    profiler.event("task");
                }

                profiler.event_times("batch", 10);
            });
        }
    });

    let report = profiler.snapshot(true);
    let ledger = report.merged().unwrap();

    assert_eq!(ledger.event("task"), Some(THREADS * EVENTS_PER_THREAD));
    assert_eq!(ledger.event("batch"), Some(THREADS * 10));
}

#[test]
fn per_actor_report_lists_every_thread() {
    let profiler = Profiler::new();

    thread::scope(|s| {
        for _ in 0..THREADS {
            s.spawn(|| profiler.event("hello"));
        }
    });

    let report = profiler.snapshot(false);

    assert_eq!(report.actors().count(), usize::try_from(THREADS).unwrap());

    for (actor, ledger) in report.actors() {
        assert_eq!(actor.token(), None);
        assert_eq!(ledger.event("hello"), Some(1));
    }
}

#[test]
fn averages_from_many_threads_merge() {
    let profiler = Profiler::new();

    thread::scope(|s| {
        for thread_index in 0..THREADS {
            let profiler = &profiler;

            s.spawn(move || {
                // Every thread contributes 2.0 and 4.0, in an order that depends on the thread.
                if thread_index % 2 == 0 {
                    profiler.average("value", 2.0);
                    profiler.average("value", 4_u8);
                } else {
                    profiler.average("value", 4_i32);
                    profiler.average("value", 2.0_f32);
                }
            });
        }
    });

    let report = profiler.snapshot(true);
    let average = report.merged().unwrap().average("value").unwrap();

    assert_eq!(average.count(), THREADS * 2);
    assert_eq!(average.mean(), Some(3.0));

    let variance = average.variance().unwrap();
    let expected = 16.0 / 15.0;
    assert!((variance - expected).abs() < 1e-9, "variance was {variance}");
}

#[test]
#[cfg_attr(miri, ignore)] // Real time measurement is too slow under Miri.
fn blocks_measure_real_time() {
    let profiler = Profiler::builder().auto_start(true).build();

    thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                profiler.begin("sleep");
                busy_wait(Duration::from_millis(20));
                profiler.end("sleep");
            });
        }
    });

    let report = profiler.snapshot(true);
    let block = report.merged().unwrap().block("sleep").unwrap();

    assert_eq!(block.count(), 4);
    assert!(block.shortest().unwrap() >= Duration::from_millis(20));
    assert!(block.total() >= Duration::from_millis(80));
    assert!(report.total_elapsed() >= Duration::from_millis(20));
    assert!(!profiler.is_running());
}

#[test]
fn same_block_name_on_different_threads_does_not_interfere() {
    let profiler = Profiler::new();

    // Both threads keep the block open at the same time. Neither end may close the other's begin.
    thread::scope(|s| {
        for _ in 0..2 {
            s.spawn(|| {
                profiler.begin("shared_name");
                assert!(profiler.try_end("shared_name").is_ok());
            });
        }
    });

    let report = profiler.snapshot(true);
    assert_eq!(
        report.merged().unwrap().block("shared_name").unwrap().count(),
        2
    );
}

#[test]
fn explicit_actors_survive_thread_hops() {
    let profiler = Profiler::new();
    let handle = profiler.actor(ActorId::explicit(1));

    // The same actor records from three different threads.
    thread::scope(|s| {
        for _ in 0..3 {
            let handle = handle.clone();
            s.spawn(move || handle.event("hop"));
        }
    });

    let report = profiler.snapshot(false);
    let actors: Vec<_> = report.actors().collect();

    assert_eq!(actors.len(), 1);
    assert_eq!(actors.first().unwrap().0, ActorId::explicit(1));
    assert_eq!(actors.first().unwrap().1.event("hop"), Some(3));
}

#[test]
fn merged_report_matches_merging_per_actor_report() {
    let profiler = Profiler::new();

    thread::scope(|s| {
        for thread_index in 0..THREADS {
            let profiler = &profiler;

            s.spawn(move || {
                profiler.event_times("weighted", thread_index);
                profiler.average("index", thread_index);
                profiler.time("scope", || black_box(thread_index));
            });
        }
    });

    let per_actor = profiler.snapshot(false).to_merged();
    let merged = profiler.snapshot(true);
    let merged = merged.merged().unwrap();

    assert_eq!(per_actor.event("weighted"), merged.event("weighted"));
    assert_eq!(per_actor.average("index"), merged.average("index"));
    assert_eq!(
        per_actor.block("scope").map(|block| block.count()),
        merged.block("scope").map(|block| block.count())
    );
    assert_eq!(
        per_actor.block("scope").map(|block| block.total()),
        merged.block("scope").map(|block| block.total())
    );
}

#[test]
fn disabled_profiler_ignores_everything() {
    let profiler = Profiler::builder().enabled(false).build();

    profiler.start();
    profiler.event("ignored");
    profiler.average("ignored", 1);
    profiler.time("ignored", || {});

    assert!(!profiler.is_running());
    assert!(profiler.snapshot(true).is_empty());
    assert!(profiler.snapshot(false).is_empty());
    assert!(profiler.finalize().is_none());
}
