//! Manually advanced clock for testing
//!
//! Every clone shares the same reading, so a test can keep one handle and
//! hand another to the counter under test.

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use crate::Clock;

#[derive(Debug, Clone, Default)]
pub(crate) struct ManualClock {
    nanos: Arc<AtomicU64>,
}

impl ManualClock {
    /// Move the clock to `at`, measured from its creation.
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn set(&self, at: Duration) {
        self.nanos.store(at.as_nanos() as u64, Ordering::SeqCst);
    }

    pub(crate) fn advance(&self, by: Duration) {
        self.set(self.elapsed() + by);
    }
}

impl Clock for ManualClock {
    fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::SeqCst))
    }
}
