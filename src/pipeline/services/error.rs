//! Service-level errors shared by the pipeline services.

use crate::{
    error::ErrorKind,
    pipeline::{
        domain::{PipelineDomainError, RowId, SpreadsheetId},
        ports::PipelineRepositoryError,
    },
};
use thiserror::Error;

/// Service-level errors for pipeline operations.
#[derive(Debug, Error)]
pub enum PipelineServiceError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] PipelineDomainError),

    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] PipelineRepositoryError),

    /// A todo referenced a row of a different spreadsheet.
    #[error("row {row} belongs to spreadsheet {actual}, not {expected}")]
    RowOutsideSpreadsheet {
        /// Referenced row.
        row: RowId,
        /// Spreadsheet named by the request.
        expected: SpreadsheetId,
        /// Spreadsheet that owns the row.
        actual: SpreadsheetId,
    },
}

impl PipelineServiceError {
    /// Returns the machine-readable error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(_) | Self::RowOutsideSpreadsheet { .. } => ErrorKind::Validation,
            Self::Repository(err) => err.kind(),
        }
    }
}

/// Result type for pipeline service operations.
pub type PipelineServiceResult<T> = Result<T, PipelineServiceError>;
