//! Example demonstrating the key `time_ledger` types working together.
//!
//! Several worker threads record events, averages and time blocks into one profiler,
//! after which the merged and per-thread reports are printed.
//!
//! Run with: `cargo run --example time_ledger_basic`.

use std::hint::black_box;
use std::thread;
use std::time::Duration;

use time_ledger::{ActorId, Profiler};

fn main() {
    let profiler = Profiler::builder().auto_start(true).build();

    thread::scope(|s| {
        for worker in 0..4_u64 {
            let profiler = profiler.clone();

            s.spawn(move || {
                for item in 0..worker.wrapping_add(1).wrapping_mul(100) {
                    profiler.event("items_processed");
                    profiler.average("item_value", item);

                    let _span = profiler.measure("process_item");
                    black_box(item.wrapping_mul(item));
                }

                profiler.begin("pause");
                thread::sleep(Duration::from_millis(10));
                profiler.end("pause");
            });
        }
    });

    // Work that is not tied to a thread can be recorded under an explicit actor.
    let job = profiler.actor(ActorId::explicit(1));
    job.event("jobs_completed");
    job.average("job_size", 12.5);

    println!("=== Per-thread report ===");
    println!("{}", profiler.snapshot(false));

    println!("=== Merged report ===");
    profiler.snapshot(true).print_to_stdout();
}
