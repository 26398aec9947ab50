use thiserror::Error;

use crate::ActorId;

/// Errors reported by the strict variants of the recording operations.
///
/// The regular recording operations never fail. Only methods such as
/// [`Profiler::try_end()`][crate::Profiler::try_end] report misuse as an error.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A time block was ended while no interval of it was in progress for the actor.
    #[error("time block '{block}' is not open for {actor}")]
    BlockNotOpen {
        /// Name of the block.
        block: String,

        /// The actor that tried to end the block.
        actor: ActorId,
    },
}

/// A specialized `Result` type for `time_ledger` operations, returning the crate's
/// [`Error`] type as the error value.
pub type Result<T> = std::result::Result<T, Error>;
