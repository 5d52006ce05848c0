//! Tracing subscriber setup for the binary

use std::fmt;
use tracing_subscriber::{fmt as fmt_layer, EnvFilter, Registry};

/// Logging configuration error
#[derive(Debug)]
pub enum LoggingError {
    TracingInit(String),
    InvalidFilter(String),
}

impl fmt::Display for LoggingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoggingError::TracingInit(e) => write!(f, "Failed to initialize tracing subscriber: {}", e),
            LoggingError::InvalidFilter(e) => write!(f, "Invalid log filter: {}", e),
        }
    }
}

impl std::error::Error for LoggingError {}

/// Level used when `RUST_LOG` is not set, from the number of `-v` flags.
pub fn default_level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Installs a compact stderr subscriber. `RUST_LOG` overrides the verbosity.
pub fn init_logging(verbosity: u8) -> Result<(), LoggingError> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let filter = match std::env::var("RUST_LOG") {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::try_new(&directives)
            .map_err(|e| LoggingError::InvalidFilter(format!("RUST_LOG={}: {}", directives, e)))?,
        _ => EnvFilter::new(format!("sonos_grouper={}", default_level(verbosity))),
    };

    Registry::default()
        .with(
            fmt_layer::layer()
                .with_writer(std::io::stderr)
                .with_target(verbosity >= 2)
                .compact(),
        )
        .with(filter)
        .try_init()
        .map_err(|e| LoggingError::TracingInit(e.to_string()))
}
