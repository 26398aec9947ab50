use std::fmt;
use std::thread::{self, ThreadId};

/// Identifies the actor whose ledger an operation records into.
///
/// Each actor gets a private ledger inside the profiler. Ledgers are kept apart until
/// a report merges them (or lists them one by one).
///
/// An actor is usually the current thread. This is what the recording methods on
/// [`Profiler`][crate::Profiler] use. Units of work that are not pinned to one thread,
/// such as async tasks, can pick an explicit token instead and record through
/// [`Profiler::actor()`][crate::Profiler::actor].
///
/// # Examples
///
/// ```
/// use time_ledger::{ActorId, Profiler};
///
/// let profiler = Profiler::new();
///
/// // Recorded under the current thread.
/// profiler.event("requests");
///
/// // Recorded under an explicit actor, regardless of which thread runs this.
/// profiler.actor(ActorId::explicit(42)).event("requests");
///
/// let report = profiler.snapshot(false);
/// assert_eq!(report.actors().count(), 2);
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ActorId(ActorKind);

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
enum ActorKind {
    Thread(ThreadId),
    Explicit(u64),
}

impl ActorId {
    /// The actor representing the calling thread.
    #[must_use]
    pub fn current_thread() -> Self {
        Self(ActorKind::Thread(thread::current().id()))
    }

    /// An actor identified by a caller-chosen token.
    ///
    /// Two `ActorId`s made from the same token are the same actor.
    #[must_use]
    pub const fn explicit(token: u64) -> Self {
        Self(ActorKind::Explicit(token))
    }

    /// The explicit token of this actor, or `None` if the actor is a thread.
    #[must_use]
    pub fn token(&self) -> Option<u64> {
        match self.0 {
            ActorKind::Thread(_) => None,
            ActorKind::Explicit(token) => Some(token),
        }
    }
}

impl From<ThreadId> for ActorId {
    fn from(value: ThreadId) -> Self {
        Self(ActorKind::Thread(value))
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            ActorKind::Thread(id) => {
                // `ThreadId` only exposes its number through `Debug`, as "ThreadId(N)".
                let debug = format!("{id:?}");
                let number = debug
                    .strip_prefix("ThreadId(")
                    .and_then(|rest| rest.strip_suffix(')'))
                    .unwrap_or(&debug);

                write!(f, "Thread {number}")
            }
            ActorKind::Explicit(token) => write!(f, "Actor {token}"),
        }
    }
}
