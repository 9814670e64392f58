//! Free-text notes attached to a session.

use super::{DiscoveryServiceError, DiscoveryServiceResult};
use crate::{
    audit::domain::{AuditAction, AuditEntity, AuditEntry},
    discovery::{
        domain::{DiscoveryDomainError, DiscoveryNote, NoteId, NoteText, ResponseId, SessionId},
        ports::{DiscoveryRepository, DiscoveryRepositoryError},
    },
    ids::UserId,
};
use mockable::Clock;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

/// Request payload for adding a note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddNoteRequest {
    session_id: SessionId,
    author: UserId,
    text: String,
    note_type: Option<String>,
    related_response: Option<ResponseId>,
}

impl AddNoteRequest {
    /// Creates a request for a plain note.
    #[must_use]
    pub fn new(session_id: SessionId, author: UserId, text: impl Into<String>) -> Self {
        Self {
            session_id,
            author,
            text: text.into(),
            note_type: None,
            related_response: None,
        }
    }

    /// Tags the note.
    #[must_use]
    pub fn with_note_type(mut self, note_type: impl Into<String>) -> Self {
        self.note_type = Some(note_type.into());
        self
    }

    /// Links the note to a response of the same session.
    #[must_use]
    pub const fn related_to(mut self, response: ResponseId) -> Self {
        self.related_response = Some(response);
        self
    }
}

/// Changes applied by a note update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteChanges {
    /// Replacement text.
    pub text: Option<String>,
    /// Replacement tag.
    pub note_type: Option<String>,
}

impl NoteChanges {
    const fn is_empty(&self) -> bool {
        self.text.is_none() && self.note_type.is_none()
    }
}

/// Note management service.
#[derive(Clone)]
pub struct DiscoveryNoteService<R, C>
where
    R: DiscoveryRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> DiscoveryNoteService<R, C>
where
    R: DiscoveryRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new note service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Adds a note to a session.
    ///
    /// # Errors
    ///
    /// Returns a domain error for blank text, a not-found error for an
    /// unknown session or response, and
    /// [`DiscoveryServiceError::ResponseOutsideSession`] when the related
    /// response belongs elsewhere.
    #[tracing::instrument(skip(self, request), fields(session = %request.session_id))]
    pub async fn add_note(&self, request: AddNoteRequest) -> DiscoveryServiceResult<DiscoveryNote> {
        let AddNoteRequest {
            session_id,
            author,
            text,
            note_type,
            related_response,
        } = request;
        let note_text = NoteText::new(text)?;
        if self.repository.find_session(session_id).await?.is_none() {
            return Err(DiscoveryRepositoryError::SessionNotFound(session_id).into());
        }
        if let Some(response_id) = related_response {
            self.check_related(session_id, response_id).await?;
        }

        let note = DiscoveryNote::new(
            session_id,
            author,
            note_text,
            note_type.as_deref(),
            related_response,
            &*self.clock,
        );
        let audit = AuditEntry::record(
            AuditAction::Create,
            AuditEntity::DiscoveryNote,
            note.id().into_inner(),
            json!({
                "session_id": session_id,
                "note_type": note.note_type(),
                "related_response_id": related_response,
            }),
            Some(author),
            &*self.clock,
        );
        self.repository.insert_note(&note, &audit).await?;
        info!(note = %note.id(), "discovery note added");
        Ok(note)
    }

    /// Edits a note's text or tag.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryDomainError::EmptyNoteUpdate`] (wrapped) when no
    /// change is given and a not-found error for an unknown note.
    #[tracing::instrument(skip(self, changes))]
    pub async fn update_note(
        &self,
        id: NoteId,
        changes: NoteChanges,
        actor: Option<UserId>,
    ) -> DiscoveryServiceResult<DiscoveryNote> {
        if changes.is_empty() {
            return Err(DiscoveryDomainError::EmptyNoteUpdate.into());
        }
        let NoteChanges { text, note_type } = changes;
        let new_text = text.map(NoteText::new).transpose()?;
        let mut note = self.get_note(id).await?;

        let audit = AuditEntry::record(
            AuditAction::Update,
            AuditEntity::DiscoveryNote,
            id.into_inner(),
            json!({
                "text_changed": new_text.is_some(),
                "note_type": note_type,
            }),
            actor,
            &*self.clock,
        );
        note.edit(new_text, note_type.as_deref(), &*self.clock);
        self.repository.update_note(&note, &audit).await?;
        Ok(note)
    }

    /// Deletes a note. The related response is untouched.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown note.
    #[tracing::instrument(skip(self))]
    pub async fn delete_note(&self, id: NoteId, actor: Option<UserId>) -> DiscoveryServiceResult<()> {
        let audit = AuditEntry::record(
            AuditAction::Delete,
            AuditEntity::DiscoveryNote,
            id.into_inner(),
            json!({}),
            actor,
            &*self.clock,
        );
        self.repository.delete_note(id, &audit).await?;
        info!(note = %id, "discovery note deleted");
        Ok(())
    }

    /// Returns a note.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown note.
    pub async fn get_note(&self, id: NoteId) -> DiscoveryServiceResult<DiscoveryNote> {
        self.repository
            .find_note(id)
            .await?
            .ok_or_else(|| DiscoveryRepositoryError::NoteNotFound(id).into())
    }

    /// Lists a session's notes, newest first.
    ///
    /// # Errors
    ///
    /// Returns repository errors.
    pub async fn list_notes(&self, session_id: SessionId) -> DiscoveryServiceResult<Vec<DiscoveryNote>> {
        Ok(self.repository.list_notes(session_id).await?)
    }

    async fn check_related(
        &self,
        session_id: SessionId,
        response_id: ResponseId,
    ) -> DiscoveryServiceResult<()> {
        let response = self
            .repository
            .find_response(response_id)
            .await?
            .ok_or(DiscoveryRepositoryError::ResponseNotFound(response_id))?;
        if response.session_id() == session_id {
            Ok(())
        } else {
            Err(DiscoveryServiceError::ResponseOutsideSession {
                response: response_id,
                session: session_id,
            })
        }
    }
}
