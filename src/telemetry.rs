//! `tracing` subscriber initialisation.

use crate::config::{LogConfig, LogFormat};
use thiserror::Error;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Errors raised while installing the global subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The filter directive could not be parsed.
    #[error("invalid log filter '{directive}': {reason}")]
    Filter {
        /// Rejected directive.
        directive: String,
        /// Parser message.
        reason: String,
    },
}

/// Installs the global subscriber described by `config`.
///
/// Returns `Ok(false)` when a subscriber was already installed, so calling
/// this more than once is harmless.
///
/// # Errors
///
/// Returns [`TelemetryError::Filter`] for an unparsable filter directive.
pub fn init_tracing(config: &LogConfig) -> Result<bool, TelemetryError> {
    let filter = EnvFilter::try_new(&config.filter).map_err(|err| TelemetryError::Filter {
        directive: config.filter.clone(),
        reason: err.to_string(),
    })?;
    let registry = tracing_subscriber::registry().with(filter);
    let installed = match config.format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        LogFormat::Compact => registry
            .with(tracing_subscriber::fmt::layer().compact())
            .try_init(),
    };
    Ok(installed.is_ok())
}
