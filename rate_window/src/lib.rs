//! Lifetime and trailing-window rates for named counters
//!
//! This library keeps a set of named numeric counters for a long-running
//! process and reports, per counter, the average rate since construction and
//! the rate over a trailing window. The core type is [`WindowedCounter`]. It is
//! intended to be shared between many producers -- workers reporting how many
//! items, bytes or tokens they have processed -- and an occasional consumer
//! that logs the summary.
//!
//! Nothing here runs in the background. The window is brought up to date only
//! when new increments are recorded, so a counter that sees no writes for a
//! long while keeps reporting the window as it was at the last write.

#![deny(clippy::all)]
#![deny(clippy::cargo)]
#![deny(clippy::pedantic)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
#![deny(clippy::dbg_macro)]
#![deny(clippy::unwrap_used)]
#![deny(unused_extern_crates)]
#![deny(unused_allocation)]
#![deny(unused_assignments)]
#![deny(unused_comparisons)]
#![deny(unreachable_pub)]
#![deny(missing_docs)]
#![deny(missing_copy_implementations)]
#![deny(missing_debug_implementations)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::multiple_crate_versions)]

use std::time::{Duration, Instant};

pub mod config;
pub mod counter;
pub mod summary;
#[cfg(test)]
pub(crate) mod test;
mod window;

pub use config::Config;
pub use counter::WindowedCounter;
pub use summary::{Rate, Summary};

/// Errors produced by [`WindowedCounter`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The requested window has zero length.
    #[error("Window duration must be greater than zero")]
    ZeroWindow,
}

/// The `Clock` used by every [`WindowedCounter`]
pub trait Clock {
    /// Time elapsed since the clock was created. Must never decrease.
    fn elapsed(&self) -> Duration;
}

#[derive(Debug, Clone, Copy)]
/// A clock that operates with respect to real-clock time.
pub struct RealClock {
    start: Instant,
}

impl Default for RealClock {
    fn default() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Clock for RealClock {
    fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}
