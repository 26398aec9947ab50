#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! In-process profiling that counts events, accumulates running averages and times
//! blocks of code across any number of threads, then reports the aggregate.
//!
//! The core functionality includes:
//! - [`Profiler`] - Shared handle that records data and produces reports
//! - [`ProfilerBuilder`] - Configures a profiler (prefix, auto-start, enabled)
//! - [`BlockSpan`] - Times a block of code from creation until it is dropped
//! - [`ActorHandle`] - Records under an explicit actor instead of the current thread
//! - [`Report`] - Snapshot of everything recorded, merged or per actor
//!
//! Each actor (by default, each thread) records into a private [`Ledger`]. Reports merge
//! the ledgers of all actors on demand, so the result never depends on which thread
//! recorded what, or in which order.
//!
//! # Simple usage
//!
//! ```
//! use time_ledger::Profiler;
//!
//! let profiler = Profiler::new();
//! profiler.start();
//!
//! for request_size in [512, 1024, 256] {
//!     profiler.event("requests");
//!     profiler.average("request_size", request_size);
//!
//!     let _span = profiler.measure("handle_request");
//!     // Handle the request here.
//! }
//!
//! let report = profiler.snapshot(true);
//! let ledger = report.merged().unwrap();
//!
//! assert_eq!(ledger.event("requests"), Some(3));
//! assert_eq!(ledger.block("handle_request").unwrap().count(), 3);
//!
//! println!("{report}");
//! ```
//!
//! # Multithreaded usage
//!
//! Clones of a [`Profiler`] share the same data. Every thread records into its own ledger
//! and the ledgers only come together in a report.
//!
//! ```
//! use std::thread;
//!
//! use time_ledger::Profiler;
//!
//! let profiler = Profiler::builder().prefix("worker.").auto_start(true).build();
//!
//! thread::scope(|s| {
//!     for _ in 0..4 {
//!         let profiler = profiler.clone();
//!
//!         s.spawn(move || {
//!             profiler.time("batch", || {
//!                 for _ in 0..10 {
//!                     profiler.event("item");
//!                 }
//!             });
//!         });
//!     }
//! });
//!
//! let report = profiler.snapshot(false);
//! assert_eq!(report.actors().count(), 4);
//!
//! let merged = report.to_merged();
//! assert_eq!(merged.event("worker.item"), Some(40));
//! ```
//!
//! # Process-wide profiler
//!
//! [`Profiler::global()`] returns a profiler shared by the whole process. It prints a
//! merged report to stdout the first time it is finalized, unless a report was already
//! taken.
//!
//! ```
//! use time_ledger::Profiler;
//!
//! Profiler::global().event("startup");
//!
//! if let Some(report) = Profiler::global().finalize() {
//!     report.print_to_stdout();
//! }
//! ```

mod actor_handle;
mod actor_id;
mod block_span;
mod error;
mod global_timer;
mod ledger;
mod pal;
mod profiler;
mod profiler_builder;
mod report;
mod running_average;
mod time_block;

pub use actor_handle::ActorHandle;
pub use actor_id::ActorId;
pub use block_span::BlockSpan;
pub use error::{Error, Result};
pub(crate) use global_timer::GlobalTimer;
pub use ledger::Ledger;
pub use profiler::Profiler;
pub use profiler_builder::ProfilerBuilder;
pub use report::Report;
pub use running_average::RunningAverage;
pub(crate) use time_block::ClosedInterval;
pub use time_block::TimeBlock;
