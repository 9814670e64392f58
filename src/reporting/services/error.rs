//! Errors returned by the reporting service.

use crate::{discovery::ports::DiscoveryRepositoryError, error::ErrorKind};
use thiserror::Error;

/// Service-level errors for report generation.
#[derive(Debug, Error)]
pub enum ReportingError {
    /// Loading the session or its responses failed.
    #[error(transparent)]
    Repository(#[from] DiscoveryRepositoryError),
}

impl ReportingError {
    /// Returns the machine-readable error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Repository(err) => err.kind(),
        }
    }
}

/// Result type for reporting operations.
pub type ReportingResult<T> = Result<T, ReportingError>;
