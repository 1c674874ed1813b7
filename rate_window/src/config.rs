//! Configuration for a [`WindowedCounter`](crate::WindowedCounter)
//!
//! Deserializes from the same YAML documents the rest of a program's
//! configuration lives in, for instance:
//!
//! ```yaml
//! window_seconds: 60
//! ```
//!
//! A zero window is rejected when deserialized.

use std::{num::NonZeroU32, time::Duration};

use serde::{Deserialize, Serialize};

/// Trailing window used when none is configured, five minutes.
pub const DEFAULT_WINDOW_SECONDS: NonZeroU32 = match NonZeroU32::new(300) {
    Some(w) => w,
    None => panic!("default window must be non-zero"),
};

fn default_window_seconds() -> NonZeroU32 {
    DEFAULT_WINDOW_SECONDS
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(deny_unknown_fields)]
/// Configuration of a windowed counter.
pub struct Config {
    /// Length of the trailing window, in seconds.
    #[serde(default = "default_window_seconds")]
    pub window_seconds: NonZeroU32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window_seconds: DEFAULT_WINDOW_SECONDS,
        }
    }
}

impl Config {
    /// The configured window as a [`Duration`].
    #[must_use]
    pub fn window(&self) -> Duration {
        Duration::from_secs(u64::from(self.window_seconds.get()))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::Config;

    #[test]
    fn empty_document_is_default() {
        let config: Config = serde_yaml::from_str("{}").expect("parse");
        assert_eq!(config, Config::default());
        assert_eq!(config.window(), Duration::from_secs(300));
    }

    #[test]
    fn window_seconds_parses() {
        let config: Config = serde_yaml::from_str("window_seconds: 60").expect("parse");
        assert_eq!(config.window_seconds.get(), 60);
        assert_eq!(config.window(), Duration::from_secs(60));
    }

    #[test]
    fn zero_window_rejected() {
        assert!(serde_yaml::from_str::<Config>("window_seconds: 0").is_err());
    }

    #[test]
    fn unknown_field_rejected() {
        assert!(serde_yaml::from_str::<Config>("window: 60").is_err());
    }
}
