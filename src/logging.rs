//! Structured logging setup.
//!
//! Logs go to stderr so stdout stays reserved for generation records.
//! `RUST_LOG` takes precedence; otherwise this crate logs at `warn`, or
//! `debug` with `--verbose`.

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable console output
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

pub fn level_for(verbose: bool) -> Level {
    if verbose { Level::DEBUG } else { Level::WARN }
}

fn build_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("scientific_writer={level},warn")))
}

/// Install the global subscriber. Later calls are ignored.
pub fn init(verbose: bool, format: LogFormat) {
    INIT.call_once(|| {
        let filter = build_filter(level_for(verbose));
        let result = match format {
            LogFormat::Json => tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr))
                .try_init(),
            LogFormat::Pretty => tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_target(false)
                        .compact()
                        .with_writer(std::io::stderr),
                )
                .try_init(),
        };
        if let Err(e) = result {
            eprintln!("Failed to initialize logging: {e}");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for_verbose() {
        assert_eq!(level_for(true), Level::DEBUG);
        assert_eq!(level_for(false), Level::WARN);
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init(false, LogFormat::Pretty);
        init(true, LogFormat::Json);
    }
}
