//! Cumulative and trailing-window sums for named metrics
//!
//! [`Window`] is the lock-free interior of
//! [`WindowedCounter`](crate::WindowedCounter). It keeps two views of the same
//! stream of increments:
//!
//! * `totals`, every increment ever recorded, summed per key, and
//! * `window_sum`, the increments recorded no earlier than `now - window`.
//!
//! To know what to subtract from `window_sum` as time advances every recorded
//! batch is kept in `history`, oldest first. Each call to `record` appends its
//! batch and then pops batches off the front while they are strictly older
//! than `now - window`, subtracting their values. A key whose windowed sum
//! drops to zero or below is removed from `window_sum` rather than kept at
//! zero, so short-lived keys do not linger.
//!
//! Note the removal rule applies to the running sum, not to individual
//! increments. Mixing positive and negative increments for one key can drop
//! that key from the window while some of its increments are still young
//! enough to count. Negative increments are accepted but not otherwise
//! supported.
//!
//! Time is given to every call as an offset from the creation of the owning
//! counter. Nothing is evicted on read: `snapshot` reports the window as of
//! the most recent `record`.

use std::{
    collections::{VecDeque, hash_map::Entry},
    time::Duration,
};

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::summary::{Rate, Summary};

/// Smallest divisor used for the window rate, in seconds.
const MIN_WINDOW_SPAN_SECS: f64 = 1.0;

/// A single call to `record`, as it was made.
#[derive(Debug)]
struct Batch {
    at: Duration,
    increments: Vec<(String, f64)>,
}

#[derive(Debug)]
pub(crate) struct Window {
    window: Duration,
    totals: FxHashMap<String, f64>,
    window_sum: FxHashMap<String, f64>,
    history: VecDeque<Batch>,
}

impl Window {
    pub(crate) fn new(window: Duration) -> Self {
        Self {
            window,
            totals: FxHashMap::default(),
            window_sum: FxHashMap::default(),
            history: VecDeque::new(),
        }
    }

    pub(crate) fn window(&self) -> Duration {
        self.window
    }

    /// Record a batch of increments at `now`, then evict every batch that has
    /// aged out of the window.
    pub(crate) fn record(&mut self, now: Duration, increments: Vec<(String, f64)>) {
        // `history` must stay ordered. A clock that steps backward is pinned
        // to the most recent timestamp we have seen.
        let now = match self.history.back() {
            Some(newest) if newest.at > now => newest.at,
            _ => now,
        };

        for (key, value) in &increments {
            *self.totals.entry(key.clone()).or_insert(0.0) += *value;
            *self.window_sum.entry(key.clone()).or_insert(0.0) += *value;
        }
        trace!(at = ?now, keys = increments.len(), "recorded batch");
        self.history.push_back(Batch {
            at: now,
            increments,
        });

        self.evict(now);
    }

    fn evict(&mut self, now: Duration) {
        // While the counter is younger than its window nothing can be old
        // enough to leave it.
        let Some(cutoff) = now.checked_sub(self.window) else {
            return;
        };

        let mut evicted: usize = 0;
        while self.history.front().is_some_and(|batch| batch.at < cutoff) {
            let Some(batch) = self.history.pop_front() else {
                break;
            };
            evicted += 1;
            for (key, value) in batch.increments {
                match self.window_sum.entry(key) {
                    Entry::Occupied(mut entry) => {
                        *entry.get_mut() -= value;
                        if *entry.get() <= 0.0 {
                            entry.remove();
                        }
                    }
                    Entry::Vacant(entry) => {
                        // The key already left the window. Only a negative
                        // increment can bring it back, as a positive residue.
                        if value < 0.0 {
                            entry.insert(-value);
                        }
                    }
                }
            }
        }

        if evicted > 0 {
            debug!(
                evicted,
                retained = self.history.len(),
                active_metrics = self.window_sum.len(),
                "evicted batches older than window"
            );
        }
    }

    /// Compute rates for every known metric as of `now`, sorted by name.
    pub(crate) fn snapshot(&self, now: Duration) -> Summary {
        let elapsed = now.as_secs_f64();
        let window_span = self
            .window
            .as_secs_f64()
            .min(elapsed)
            .max(MIN_WINDOW_SPAN_SECS);

        let mut rates: Vec<Rate> = self
            .totals
            .iter()
            .map(|(name, &total)| {
                let window_value = self.window_sum.get(name).copied().unwrap_or(0.0);
                Rate {
                    name: name.clone(),
                    total,
                    total_rate: if elapsed > 0.0 { total / elapsed } else { 0.0 },
                    window_value,
                    window_rate: window_value / window_span,
                }
            })
            .collect();
        rates.sort_unstable_by(|a, b| a.name.cmp(&b.name));

        Summary {
            elapsed_secs: elapsed,
            window_secs: window_span,
            rates,
        }
    }

    pub(crate) fn total(&self, name: &str) -> Option<f64> {
        self.totals.get(name).copied()
    }

    pub(crate) fn window_value(&self, name: &str) -> Option<f64> {
        self.window_sum.get(name).copied()
    }

    pub(crate) fn metrics_len(&self) -> usize {
        self.totals.len()
    }

    #[cfg(test)]
    fn history_len(&self) -> usize {
        self.history.len()
    }
}
