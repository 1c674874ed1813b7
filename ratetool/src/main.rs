//! Report the rate of increment batches read from stdin
//!
//! Each line of input is a JSON object mapping metric names to numeric
//! increments, for instance `{"items": 1, "bytes": 512}`. Every batch is
//! recorded into a windowed counter and the lifetime and trailing-window rates
//! are logged on a fixed interval and once more when input ends.

use std::{
    num::{NonZeroU32, NonZeroU64},
    path::PathBuf,
    time::Duration,
};

use clap::Parser;
use rate_window::{Config, WindowedCounter};
use rustc_hash::FxHashMap;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    time::{self, Instant},
};
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// path to a YAML file configuring the counter
    #[clap(long)]
    config_path: Option<PathBuf>,

    /// length of the trailing window in seconds, overrides the config file
    #[clap(long)]
    window_seconds: Option<NonZeroU32>,

    /// seconds between rate reports
    #[clap(long, default_value = "10")]
    report_interval_seconds: NonZeroU64,
}

#[derive(thiserror::Error, Debug)]
enum Error {
    #[error("Failed to read config file {path:?}: {source}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to deserialize yaml: {0}")]
    SerdeYaml(#[from] serde_yaml::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

async fn load_config(args: &Args) -> Result<Config, Error> {
    let mut config = match &args.config_path {
        Some(path) => {
            let contents = tokio::fs::read_to_string(path)
                .await
                .map_err(|source| Error::ReadConfig {
                    path: path.clone(),
                    source,
                })?;
            parse_config(&contents)?
        }
        None => Config::default(),
    };
    if let Some(window_seconds) = args.window_seconds {
        config.window_seconds = window_seconds;
    }
    Ok(config)
}

fn parse_config(contents: &str) -> Result<Config, serde_yaml::Error> {
    serde_yaml::from_str(contents)
}

/// Parse one input line into a batch. Blank lines carry no batch.
fn parse_batch(line: &str) -> Result<Option<FxHashMap<String, f64>>, serde_json::Error> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(line).map(Some)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .finish()
        .init();

    let args = Args::parse();
    let config = load_config(&args).await?;
    info!(
        window_seconds = config.window_seconds.get(),
        report_interval_seconds = args.report_interval_seconds.get(),
        "Welcome to ratetool"
    );

    let counter = WindowedCounter::from_config(&config);
    let period = Duration::from_secs(args.report_interval_seconds.get());
    let mut report = time::interval_at(Instant::now() + period, period);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut line_number: u64 = 0;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!(line_number, "End of input");
                    break;
                };
                line_number += 1;
                match parse_batch(&line) {
                    Ok(Some(batch)) => counter.record(batch),
                    Ok(None) => {}
                    Err(err) => warn!(line_number, %err, "Skipping malformed batch"),
                }
            }
            _ = report.tick() => {
                info!(rates = %counter, "Current rates");
            }
        }
    }

    info!(rates = %counter, metrics = counter.metrics_len(), "Final rates");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{parse_batch, parse_config};

    #[test]
    fn batch_parses_integers_and_floats() {
        let batch = parse_batch(r#"{"items": 3, "bytes": 512.5}"#)
            .expect("valid json")
            .expect("non-empty line");
        assert_eq!(batch.get("items"), Some(&3.0));
        assert_eq!(batch.get("bytes"), Some(&512.5));
    }

    #[test]
    fn blank_line_is_no_batch() {
        assert!(parse_batch("   ").expect("blank").is_none());
    }

    #[test]
    fn malformed_line_is_error() {
        assert!(parse_batch(r#"{"items": "three"}"#).is_err());
        assert!(parse_batch("[1, 2]").is_err());
    }

    #[test]
    fn config_file_parses() {
        let config = parse_config("window_seconds: 30\n").expect("valid yaml");
        assert_eq!(config.window_seconds.get(), 30);
        assert!(parse_config("window_seconds: 0\n").is_err());
    }
}
