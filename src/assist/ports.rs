//! Port onto the external text-completion service.

use super::domain::CompletionRequest;
use crate::error::ErrorKind;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for completion operations.
pub type AssistResult<T> = Result<T, AssistError>;

/// Turns a prompt into completion text. Implementations hold no state
/// beyond their connection settings.
#[async_trait]
pub trait TextCompletion: Send + Sync {
    /// Requests a completion for the prompt.
    async fn complete(&self, request: &CompletionRequest) -> AssistResult<String>;
}

/// Errors returned by the completion collaborator and insight service.
#[derive(Debug, Clone, Error)]
pub enum AssistError {
    /// No credential was configured, so chat features are disabled.
    #[error("chat completion is not configured")]
    NotConfigured,

    /// The service could not be reached.
    #[error("chat completion unavailable: {0}")]
    Unavailable(Arc<dyn std::error::Error + Send + Sync>),

    /// The service answered with an error status.
    #[error("chat completion rejected with status {status}: {message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Error message reported by the service.
        message: String,
    },

    /// The service answered with something other than a completion.
    #[error("invalid chat completion response: {0}")]
    InvalidResponse(String),

    /// The prompt template failed to render.
    #[error("prompt template failed to render: {0}")]
    Template(String),
}

impl AssistError {
    /// Wraps a transport failure.
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unavailable(Arc::new(err))
    }

    /// Returns the machine-readable error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotConfigured | Self::Unavailable(_) | Self::Rejected { .. } => {
                ErrorKind::Unavailable
            }
            Self::InvalidResponse(_) | Self::Template(_) => ErrorKind::Internal,
        }
    }
}
