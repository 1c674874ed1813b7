//! The shared, thread-safe windowed counter
//!
//! [`WindowedCounter`] wraps the accumulation state in a single mutex. Every
//! `record` performs its whole update -- totals, history append, window sums
//! and eviction -- while holding that lock, and every read takes the same lock
//! to copy out a consistent view before any formatting happens. Hold times are
//! bounded by the size of one batch for writes and by the number of distinct
//! metrics for reads.
//!
//! A lock poisoned by a panicking thread is recovered rather than propagated:
//! the state is only ever mutated through `Window::record`, which leaves the
//! maps consistent at every point a panic could originate from.

#[cfg(loom)]
use loom::sync::{Mutex, MutexGuard};
#[cfg(not(loom))]
use std::sync::{Mutex, MutexGuard};
use std::{fmt, num::NonZeroU32, sync::PoisonError, time::Duration};

use crate::{
    Clock, Error, RealClock,
    config::{Config, DEFAULT_WINDOW_SECONDS},
    summary::Summary,
    window::Window,
};

/// Named counters reported as lifetime and trailing-window rates.
///
/// Share between threads with an `Arc`. Metric names are not declared up
/// front, the first increment to a name creates it.
#[derive(Debug)]
pub struct WindowedCounter<C = RealClock> {
    inner: Mutex<Window>,
    /// The clock that `WindowedCounter` will use.
    clock: C,
}

impl WindowedCounter<RealClock> {
    /// Create a new counter with a trailing window of `window_seconds`.
    #[must_use]
    pub fn new(window_seconds: NonZeroU32) -> Self {
        Self::with_clock(
            Duration::from_secs(u64::from(window_seconds.get())),
            RealClock::default(),
        )
    }

    /// Create a new counter with an arbitrary, possibly sub-second, window.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ZeroWindow`] if `window` is zero.
    pub fn try_new(window: Duration) -> Result<Self, Error> {
        if window.is_zero() {
            return Err(Error::ZeroWindow);
        }
        Ok(Self::with_clock(window, RealClock::default()))
    }

    /// Create a new counter from [`Config`].
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::with_clock(config.window(), RealClock::default())
    }
}

impl Default for WindowedCounter<RealClock> {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_SECONDS)
    }
}

impl<C> WindowedCounter<C>
where
    C: Clock,
{
    pub(crate) fn with_clock(window: Duration, clock: C) -> Self {
        Self {
            inner: Mutex::new(Window::new(window)),
            clock,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Window> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a batch of increments.
    ///
    /// Each value is added to the lifetime total and to the trailing window of
    /// its metric. Batches that have since aged out of the window are evicted
    /// as part of the same call. An empty batch still evicts.
    pub fn record<I, K>(&self, increments: I)
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        let increments: Vec<(String, f64)> = increments
            .into_iter()
            .map(|(key, value)| (key.into(), value))
            .collect();

        let mut window = self.lock();
        let now = self.clock.elapsed();
        window.record(now, increments);
    }

    /// Rates for every metric seen so far, sorted by name.
    #[must_use]
    pub fn snapshot(&self) -> Summary {
        let window = self.lock();
        let now = self.clock.elapsed();
        window.snapshot(now)
    }

    /// The one-line rate summary, empty if nothing has been recorded.
    ///
    /// Each metric renders as `name: X.XX/sec (last Ns: Y.YY/sec)`, the
    /// metrics sorted by name and joined by `", "`.
    #[must_use]
    pub fn summarize(&self) -> String {
        self.snapshot().to_string()
    }

    /// The configured trailing window.
    #[must_use]
    pub fn window(&self) -> Duration {
        self.lock().window()
    }

    /// Lifetime total of `name`, `None` if never recorded.
    #[must_use]
    pub fn total(&self, name: &str) -> Option<f64> {
        self.lock().total(name)
    }

    /// Sum of `name` inside the trailing window as of the last record, `None`
    /// if the metric is not currently active.
    #[must_use]
    pub fn window_value(&self, name: &str) -> Option<f64> {
        self.lock().window_value(name)
    }

    /// Number of distinct metric names recorded.
    #[must_use]
    pub fn metrics_len(&self) -> usize {
        self.lock().metrics_len()
    }
}

impl<C> fmt::Display for WindowedCounter<C>
where
    C: Clock,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.snapshot(), f)
    }
}
