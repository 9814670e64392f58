//! Service-level errors shared by the discovery services.

use crate::{
    discovery::{
        domain::{DiscoveryDomainError, ResponseId, SessionId},
        ports::DiscoveryRepositoryError,
    },
    error::ErrorKind,
};
use thiserror::Error;

/// Service-level errors for discovery operations.
#[derive(Debug, Error)]
pub enum DiscoveryServiceError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] DiscoveryDomainError),

    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] DiscoveryRepositoryError),

    /// A note referenced a response recorded against another session.
    #[error("response {response} does not belong to session {session}")]
    ResponseOutsideSession {
        /// Referenced response.
        response: ResponseId,
        /// Session named by the note.
        session: SessionId,
    },

    /// The export payload could not be serialised.
    #[error("export rendering failed: {0}")]
    Render(#[from] serde_json::Error),
}

impl DiscoveryServiceError {
    /// Returns the machine-readable error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(_) | Self::ResponseOutsideSession { .. } => ErrorKind::Validation,
            Self::Repository(err) => err.kind(),
            Self::Render(_) => ErrorKind::Internal,
        }
    }
}

/// Result type for discovery service operations.
pub type DiscoveryServiceResult<T> = Result<T, DiscoveryServiceError>;
