//! Log output setup for the catalogue binary.

use std::env;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// How log lines are filtered and formatted.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset (e.g., "info", "catalogue_media=debug")
    pub log_level: String,
    /// Emit JSON lines instead of text
    pub json_logs: bool,
}

impl LoggingConfig {
    /// Configuration at the given level.
    pub fn new(log_level: impl Into<String>) -> Self {
        Self {
            log_level: log_level.into(),
            json_logs: false,
        }
    }

    /// Enable JSON-formatted logs.
    pub fn with_json_logs(mut self, enabled: bool) -> Self {
        self.json_logs = enabled;
        self
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::new(env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
    }
}

/// Install the global subscriber. `RUST_LOG` wins over `config.log_level`.
///
/// # Errors
///
/// Returns an error if the filter directive does not parse or a subscriber
/// is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.log_level))?;

    let fmt_layer = if config.json_logs {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
