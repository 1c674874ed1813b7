//! Point-in-time rates produced by a [`WindowedCounter`](crate::WindowedCounter)
//!
//! The [`Display`](std::fmt::Display) form of [`Summary`] is the one-line
//! status text, for instance:
//!
//! ```text
//! bytes: 1024.00/sec (last 300s: 980.25/sec), items: 3.10/sec (last 300s: 2.75/sec)
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// The rates of a single metric.
pub struct Rate {
    /// The metric name.
    pub name: String,
    /// Sum of every increment recorded since construction.
    pub total: f64,
    /// `total` divided by the seconds elapsed since construction, zero if no
    /// time has elapsed.
    pub total_rate: f64,
    /// Sum of the increments still inside the trailing window, zero if the
    /// metric has no active window entry.
    pub window_value: f64,
    /// `window_value` divided by the effective window span.
    pub window_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Rates for every metric a counter has seen, sorted by metric name.
pub struct Summary {
    /// Seconds elapsed between construction and this summary.
    pub elapsed_secs: f64,
    /// The effective window span in seconds: the configured window, or the
    /// elapsed time if shorter, never less than one second.
    pub window_secs: f64,
    /// Per-metric rates in lexicographic order of name.
    pub rates: Vec<Rate>,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let span = self.window_secs.floor();
        for (idx, rate) in self.rates.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(
                f,
                "{}: {:.2}/sec (last {span:.0}s: {:.2}/sec)",
                rate.name, rate.total_rate, rate.window_rate
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Rate, Summary};

    fn rate(name: &str, total_rate: f64, window_rate: f64) -> Rate {
        Rate {
            name: name.to_string(),
            total: 0.0,
            total_rate,
            window_value: 0.0,
            window_rate,
        }
    }

    #[test]
    fn fragments_join_with_comma() {
        let summary = Summary {
            elapsed_secs: 12.5,
            window_secs: 2.9,
            rates: vec![rate("a", 1.0, 0.124), rate("b", 1234.5678, 0.0)],
        };
        assert_eq!(
            summary.to_string(),
            "a: 1.00/sec (last 2s: 0.12/sec), b: 1234.57/sec (last 2s: 0.00/sec)"
        );
    }

    #[test]
    fn no_rates_is_empty() {
        let summary = Summary {
            elapsed_secs: 0.0,
            window_secs: 1.0,
            rates: Vec::new(),
        };
        assert_eq!(summary.to_string(), "");
    }

    #[test]
    fn serializes_as_json() {
        let summary = Summary {
            elapsed_secs: 4.0,
            window_secs: 4.0,
            rates: vec![rate("tokens", 2.0, 1.5)],
        };
        let json = serde_json::to_string(&summary).expect("serialize");
        let back: Summary = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, summary);
        assert!(json.contains(r#""name":"tokens""#));
    }
}
