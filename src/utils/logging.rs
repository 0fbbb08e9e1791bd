//! Structured logging setup for the binaries.
//!
//! Logs go to stderr so that stdout carries nothing but client results and
//! generated keys. `RUST_LOG` wins over the configured level when set.

use tracing::debug;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::error::{ProtocolError, Result};

/// Install the global fmt subscriber.
///
/// # Errors
/// `ProtocolError::ConfigError` if a global subscriber is already set.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => {
            EnvFilter::default().add_directive(LevelFilter::from_level(config.log_level).into())
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(config.ansi)
        .with_target(false)
        .try_init()
        .map_err(|e| ProtocolError::ConfigError(format!("Failed to install logger: {e}")))?;

    debug!(app = %config.app_name, "Logging initialized");
    Ok(())
}
