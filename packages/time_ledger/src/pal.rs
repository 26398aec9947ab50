//! Platform abstraction layer for the wall clock.
//!
//! Real code reads the monotonic system clock. Tests swap in a fake clock whose
//! time only moves when the test says so.

mod abstractions;
mod facade;
#[cfg(test)]
mod fake;
mod real;

pub(crate) use abstractions::Platform;
pub(crate) use facade::PlatformFacade;
#[cfg(test)]
pub(crate) use fake::FakePlatform;
