//! Applies pending schema migrations to the configured database.
//!
//! Usage:
//!
//! ```text
//! CONTRIVANCE_DATABASE_URL=postgres://localhost/contrivance contrivance-migrate
//! ```
//!
//! Logging follows `CONTRIVANCE_LOG_FILTER` and `CONTRIVANCE_LOG_FORMAT`.

use contrivance::{
    config::{AppConfig, ConfigError, LogConfig},
    db::{self, DbError},
    telemetry::{self, TelemetryError},
};
use std::process::ExitCode;
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
enum MigrateError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error("CONTRIVANCE_DATABASE_URL is not set")]
    MissingDatabase,
    #[error(transparent)]
    Database(#[from] DbError),
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if matches!(err, MigrateError::Config(_) | MigrateError::Telemetry(_)) {
                // Fall back to defaults so the failure is still reported.
                let _installed = telemetry::init_tracing(&LogConfig::default());
            }
            error!(error = %err, "migration run failed");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), MigrateError> {
    let config = AppConfig::from_env()?;
    telemetry::init_tracing(&config.log)?;
    let database = config.database.ok_or(MigrateError::MissingDatabase)?;

    let pool = db::build_pool(&database)?;
    let applied = db::migrate_pool(&pool)?;
    if applied.is_empty() {
        info!("schema is up to date");
    } else {
        info!(count = applied.len(), migrations = ?applied, "migrations applied");
    }
    Ok(())
}
