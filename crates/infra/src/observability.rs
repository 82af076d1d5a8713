//! Process-wide tracing setup
//!
//! `RUST_LOG` wins over the configured level. Output goes to stderr so that
//! command output on stdout stays machine-readable.

use evosync_domain::{EvosyncError, LoggingConfig, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

/// Filter from `RUST_LOG`, falling back to `config.level`.
///
/// # Errors
/// `EvosyncError::Config` when the configured level is not a valid filter.
pub fn env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.level)
            .map_err(|err| EvosyncError::Config(format!("Invalid log level '{}': {err}", config.level))),
    }
}

/// Install the global subscriber.
///
/// # Errors
/// `EvosyncError::Config` for a bad level, `EvosyncError::Internal` when a
/// subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = env_filter(config)?;

    let layer = if config.json {
        fmt::layer().json().with_current_span(false).with_writer(std::io::stderr).boxed()
    } else {
        fmt::layer().with_target(false).with_writer(std::io::stderr).boxed()
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .map_err(|err| EvosyncError::Internal(format!("tracing already initialised: {err}")))
}
