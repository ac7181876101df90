//! Tracing subscriber setup.

use clauseguard_core::config::LoggingConfig;
use clauseguard_core::error::{ClauseError, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `config.level`.
///
/// # Errors
///
/// Returns `ClauseError::Config` if a global subscriber is already set.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    let result = if config.json {
        subscriber
            .with(fmt::layer().json().with_target(true))
            .try_init()
    } else {
        subscriber.with(fmt::layer().with_target(true)).try_init()
    };

    result.map_err(|e| ClauseError::config(format!("Failed to install tracing subscriber: {}", e)))
}
