//! Session lifecycle and idempotent response saves.

use super::{DiscoveryServiceError, DiscoveryServiceResult};
use crate::{
    audit::domain::{AuditAction, AuditEntity, AuditEntry},
    discovery::{
        domain::{
            AccountRef, DiscoveryDomainError, DiscoveryResponse, DiscoverySession, QuestionId,
            QuestionType, ResponseContent, SessionDetails, SessionId, SessionMetadata,
            SessionStatus, SizingSelections, VendorSelections, Vertical,
        },
        ports::{DiscoveryRepository, DiscoveryRepositoryError},
    },
    ids::UserId,
};
use mockable::Clock;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, info};

/// Request payload for starting a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSessionRequest {
    account_id: String,
    account_name: String,
    owner: UserId,
    vertical: String,
    metadata: SessionMetadata,
}

impl CreateSessionRequest {
    /// Creates a request for an account and a vertical tag.
    #[must_use]
    pub fn new(
        account_id: impl Into<String>,
        account_name: impl Into<String>,
        owner: UserId,
        vertical: impl Into<String>,
    ) -> Self {
        Self {
            account_id: account_id.into(),
            account_name: account_name.into(),
            owner,
            vertical: vertical.into(),
            metadata: SessionMetadata::new(),
        }
    }

    /// Attaches free-form metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: SessionMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Request payload for saving one answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveResponseRequest {
    session_id: SessionId,
    question_id: String,
    question_title: String,
    question_type: String,
    value: Value,
    raw: Option<String>,
    vendor_selections: Value,
    sizing_selections: Value,
    actor: Option<UserId>,
}

impl SaveResponseRequest {
    /// Creates a request answering `question_id` with `value`.
    #[must_use]
    pub fn new(
        session_id: SessionId,
        question_id: impl Into<String>,
        question_type: impl Into<String>,
        value: Value,
    ) -> Self {
        Self {
            session_id,
            question_id: question_id.into(),
            question_title: String::new(),
            question_type: question_type.into(),
            value,
            raw: None,
            vendor_selections: Value::Null,
            sizing_selections: Value::Null,
            actor: None,
        }
    }

    /// Sets the question title shown in exports.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.question_title = title.into();
        self
    }

    /// Sets the full vendor selection map. Every save replaces the whole
    /// map; categories left out are dropped.
    #[must_use]
    pub fn with_vendor_selections(mut self, selections: Value) -> Self {
        self.vendor_selections = selections;
        self
    }

    /// Sets the sizing selection map.
    #[must_use]
    pub fn with_sizing_selections(mut self, selections: Value) -> Self {
        self.sizing_selections = selections;
        self
    }

    /// Keeps the raw text the answer was captured from.
    #[must_use]
    pub fn with_raw(mut self, raw: impl Into<String>) -> Self {
        self.raw = Some(raw.into());
        self
    }

    /// Records the answering user.
    #[must_use]
    pub const fn with_actor(mut self, actor: UserId) -> Self {
        self.actor = Some(actor);
        self
    }
}

/// Discovery session and response service.
#[derive(Clone)]
pub struct DiscoverySessionService<R, C>
where
    R: DiscoveryRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> DiscoverySessionService<R, C>
where
    R: DiscoveryRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new session service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Starts a discovery session for an account.
    ///
    /// # Errors
    ///
    /// Returns a domain error for a blank account or an unknown vertical.
    #[tracing::instrument(skip(self, request), fields(account = %request.account_id))]
    pub async fn create_session(
        &self,
        request: CreateSessionRequest,
    ) -> DiscoveryServiceResult<DiscoverySession> {
        let CreateSessionRequest {
            account_id,
            account_name,
            owner,
            vertical,
            metadata,
        } = request;
        let account = AccountRef::new(account_id, account_name)?;
        let parsed_vertical =
            Vertical::try_from(vertical.as_str()).map_err(DiscoveryDomainError::from)?;
        let session = DiscoverySession::new(account, owner, parsed_vertical, metadata, &*self.clock);
        let audit = AuditEntry::record(
            AuditAction::Create,
            AuditEntity::DiscoverySession,
            session.id().into_inner(),
            json!({
                "account_id": session.account().id(),
                "account_name": session.account().name(),
                "vertical": session.vertical().as_str(),
                "status": session.status().as_str(),
            }),
            Some(owner),
            &*self.clock,
        );
        self.repository.insert_session(&session, &audit).await?;
        info!(session = %session.id(), vertical = %session.vertical(), "discovery session started");
        Ok(session)
    }

    /// Returns a session with its responses and notes.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryRepositoryError::SessionNotFound`] (wrapped) for
    /// an unknown session.
    pub async fn get_session(&self, id: SessionId) -> DiscoveryServiceResult<SessionDetails> {
        let session = self.require_session(id).await?;
        let responses = self.repository.list_responses(id).await?;
        let notes = self.repository.list_notes(id).await?;
        Ok(SessionDetails::new(session, responses, notes))
    }

    /// Lists an account's sessions, oldest first.
    ///
    /// # Errors
    ///
    /// Returns repository errors.
    pub async fn list_sessions_by_account(
        &self,
        account_id: &str,
    ) -> DiscoveryServiceResult<Vec<DiscoverySession>> {
        Ok(self
            .repository
            .list_sessions_for_account(account_id.trim())
            .await?)
    }

    /// Returns the account's most recently created session.
    ///
    /// # Errors
    ///
    /// Returns repository errors.
    pub async fn current_session(
        &self,
        account_id: &str,
    ) -> DiscoveryServiceResult<Option<DiscoverySession>> {
        let mut sessions = self.list_sessions_by_account(account_id).await?;
        Ok(sessions.pop())
    }

    /// Moves a session to `in_progress`, `completed`, or `archived`.
    ///
    /// # Errors
    ///
    /// Returns a domain error for an unknown or unsettable status and
    /// [`DiscoveryRepositoryError::SessionNotFound`] (wrapped) for an
    /// unknown session.
    #[tracing::instrument(skip(self))]
    pub async fn update_status(
        &self,
        id: SessionId,
        status: &str,
        actor: Option<UserId>,
    ) -> DiscoveryServiceResult<DiscoverySession> {
        let target = SessionStatus::try_from(status).map_err(DiscoveryDomainError::from)?;
        let mut session = self.require_session(id).await?;
        let previous = session.status();
        session.set_status(target, &*self.clock)?;
        let audit = AuditEntry::record(
            AuditAction::Update,
            AuditEntity::DiscoverySession,
            id.into_inner(),
            json!({ "status": { "from": previous.as_str(), "to": target.as_str() } }),
            actor,
            &*self.clock,
        );
        self.repository.update_session(&session, &audit).await?;
        info!(session = %id, from = %previous, to = %target, "session status changed");
        Ok(session)
    }

    /// Replaces a session's metadata map.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryDomainError::MetadataNotObject`] (wrapped) for a
    /// non-object payload and a not-found error for an unknown session.
    #[tracing::instrument(skip(self, metadata))]
    pub async fn update_metadata(
        &self,
        id: SessionId,
        metadata: Value,
        actor: Option<UserId>,
    ) -> DiscoveryServiceResult<DiscoverySession> {
        let Value::Object(map) = metadata else {
            return Err(DiscoveryDomainError::MetadataNotObject.into());
        };
        let mut session = self.require_session(id).await?;
        let audit = AuditEntry::record(
            AuditAction::Update,
            AuditEntity::DiscoverySession,
            id.into_inner(),
            json!({ "metadata": Value::Object(map.clone()) }),
            actor,
            &*self.clock,
        );
        session.replace_metadata(map, &*self.clock);
        self.repository.update_session(&session, &audit).await?;
        Ok(session)
    }

    /// Saves an answer. A second save for the same question replaces the
    /// stored answer in place; the response keeps its identifier.
    ///
    /// # Errors
    ///
    /// Returns a domain error when the question identifier or type is
    /// invalid or the value does not fit the type, and a not-found error
    /// for an unknown session.
    #[tracing::instrument(
        skip(self, request),
        fields(session = %request.session_id, question = %request.question_id)
    )]
    pub async fn save_response(
        &self,
        request: SaveResponseRequest,
    ) -> DiscoveryServiceResult<DiscoveryResponse> {
        let SaveResponseRequest {
            session_id,
            question_id,
            question_title,
            question_type,
            value,
            raw,
            vendor_selections,
            sizing_selections,
            actor,
        } = request;

        let question = QuestionId::new(question_id)?;
        let kind =
            QuestionType::try_from(question_type.as_str()).map_err(DiscoveryDomainError::from)?;
        let mut content = ResponseContent::new(question.clone(), question_title, kind, value)?
            .with_vendor_selections(VendorSelections::from_json(&vendor_selections)?)
            .with_sizing_selections(SizingSelections::from_json(&sizing_selections)?);
        if let Some(text) = raw {
            content = content.with_raw(text);
        }
        self.require_session(session_id).await?;

        let candidate = DiscoveryResponse::new(session_id, content, &*self.clock);
        let audit = AuditEntry::record(
            AuditAction::Upsert,
            AuditEntity::DiscoveryResponse,
            candidate.id().into_inner(),
            json!({
                "question_id": question.as_str(),
                "value": candidate.value(),
                "vendor_selections": candidate.vendor_selections().to_json(),
                "sizing_selections": candidate.sizing_selections().to_json(),
            }),
            actor,
            &*self.clock,
        );
        let stored = self.repository.upsert_response(&candidate, &audit).await?;
        debug!(
            response = %stored.id(),
            replaced = stored.id() != candidate.id(),
            "discovery response saved"
        );
        Ok(stored)
    }

    /// Lists a session's responses by answer time.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown session.
    pub async fn list_responses(
        &self,
        id: SessionId,
    ) -> DiscoveryServiceResult<Vec<DiscoveryResponse>> {
        self.require_session(id).await?;
        Ok(self.repository.list_responses(id).await?)
    }

    async fn require_session(&self, id: SessionId) -> DiscoveryServiceResult<DiscoverySession> {
        self.repository
            .find_session(id)
            .await?
            .ok_or_else(|| DiscoveryServiceError::from(DiscoveryRepositoryError::SessionNotFound(id)))
    }
}
