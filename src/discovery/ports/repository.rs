//! Repository ports for discovery sessions, responses, notes, and exports.
//!
//! Every mutating method takes the [`AuditEntry`] describing the mutation;
//! implementations persist both in one atomic storage operation.

use crate::{
    audit::domain::AuditEntry,
    discovery::domain::{
        DiscoveryNote, DiscoveryResponse, DiscoverySession, ExportRecord, NoteId, ResponseId,
        SessionId,
    },
    error::ErrorKind,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for discovery repository operations.
pub type DiscoveryRepositoryResult<T> = Result<T, DiscoveryRepositoryError>;

/// Session, response, and note persistence.
#[async_trait]
pub trait DiscoveryRepository: Send + Sync {
    /// Stores a new session.
    async fn insert_session(
        &self,
        session: &DiscoverySession,
        audit: &AuditEntry,
    ) -> DiscoveryRepositoryResult<()>;

    /// Persists session status and metadata changes.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryRepositoryError::SessionNotFound`] when absent.
    async fn update_session(
        &self,
        session: &DiscoverySession,
        audit: &AuditEntry,
    ) -> DiscoveryRepositoryResult<()>;

    /// Finds a session by identifier.
    async fn find_session(&self, id: SessionId)
    -> DiscoveryRepositoryResult<Option<DiscoverySession>>;

    /// Lists an account's sessions by creation time, oldest first.
    async fn list_sessions_for_account(
        &self,
        account_id: &str,
    ) -> DiscoveryRepositoryResult<Vec<DiscoverySession>>;

    /// Inserts the response or, when one exists for the same session and
    /// question, replaces its answer in place. Returns the stored response,
    /// whose identifier is the surviving one.
    ///
    /// `audit` is recorded in the same write against the surviving
    /// identifier, whatever entity identifier it carried on the way in.
    ///
    /// The uniqueness of `(session_id, question_id)` must be enforced by the
    /// storage itself so concurrent saves cannot both insert.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryRepositoryError::SessionNotFound`] for an unknown
    /// session.
    async fn upsert_response(
        &self,
        response: &DiscoveryResponse,
        audit: &AuditEntry,
    ) -> DiscoveryRepositoryResult<DiscoveryResponse>;

    /// Finds a response by identifier.
    async fn find_response(
        &self,
        id: ResponseId,
    ) -> DiscoveryRepositoryResult<Option<DiscoveryResponse>>;

    /// Lists a session's responses by answer time, oldest first.
    async fn list_responses(
        &self,
        session_id: SessionId,
    ) -> DiscoveryRepositoryResult<Vec<DiscoveryResponse>>;

    /// Stores a new note.
    async fn insert_note(
        &self,
        note: &DiscoveryNote,
        audit: &AuditEntry,
    ) -> DiscoveryRepositoryResult<()>;

    /// Persists note edits.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryRepositoryError::NoteNotFound`] when absent.
    async fn update_note(
        &self,
        note: &DiscoveryNote,
        audit: &AuditEntry,
    ) -> DiscoveryRepositoryResult<()>;

    /// Deletes a note. The related response is untouched.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryRepositoryError::NoteNotFound`] when absent.
    async fn delete_note(&self, id: NoteId, audit: &AuditEntry) -> DiscoveryRepositoryResult<()>;

    /// Finds a note by identifier.
    async fn find_note(&self, id: NoteId) -> DiscoveryRepositoryResult<Option<DiscoveryNote>>;

    /// Lists a session's notes, newest first.
    async fn list_notes(&self, session_id: SessionId)
    -> DiscoveryRepositoryResult<Vec<DiscoveryNote>>;
}

/// Append-only record of export attempts.
#[async_trait]
pub trait ExportRepository: Send + Sync {
    /// Appends an export record. Records may name sessions that do not
    /// exist, since failed attempts against unknown sessions are kept too.
    async fn insert_export(
        &self,
        record: &ExportRecord,
        audit: &AuditEntry,
    ) -> DiscoveryRepositoryResult<()>;

    /// Lists a session's export records, newest first.
    async fn list_exports(&self, session_id: SessionId)
    -> DiscoveryRepositoryResult<Vec<ExportRecord>>;
}

/// Errors returned by discovery repository implementations.
#[derive(Debug, Clone, Error)]
pub enum DiscoveryRepositoryError {
    /// The session does not exist.
    #[error("discovery session not found: {0}")]
    SessionNotFound(SessionId),

    /// The response does not exist.
    #[error("discovery response not found: {0}")]
    ResponseNotFound(ResponseId),

    /// The note does not exist.
    #[error("discovery note not found: {0}")]
    NoteNotFound(NoteId),

    /// Persisted data could not be reconstructed into domain types.
    #[error("invalid persisted data: {0}")]
    InvalidPersistedData(Arc<dyn std::error::Error + Send + Sync>),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl DiscoveryRepositoryError {
    /// Wraps a reconstruction failure.
    pub fn invalid_persisted_data(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::InvalidPersistedData(Arc::new(err))
    }

    /// Wraps a persistence failure.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }

    /// Returns the machine-readable error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::SessionNotFound(_) | Self::ResponseNotFound(_) | Self::NoteNotFound(_) => {
                ErrorKind::NotFound
            }
            Self::InvalidPersistedData(_) => ErrorKind::Internal,
            Self::Persistence(_) => ErrorKind::Unavailable,
        }
    }
}
