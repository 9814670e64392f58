//! Discovery session aggregate root.

use super::{
    DiscoveryDomainError, DiscoveryNote, DiscoveryResponse, ParseSessionStatusError,
    ParseVerticalError, SessionId, normalize_tag,
};
use crate::ids::UserId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Free-form session metadata.
pub type SessionMetadata = Map<String, Value>;

/// Reference to an account held by the external CRM.
///
/// Only the opaque identifier and display name are stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountRef {
    id: String,
    name: String,
}

impl AccountRef {
    /// Creates a validated account reference.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryDomainError::EmptyAccountId`] or
    /// [`DiscoveryDomainError::EmptyAccountName`] for blank input.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<Self, DiscoveryDomainError> {
        let raw_id = id.into();
        let raw_name = name.into();
        let trimmed_id = raw_id.trim();
        if trimmed_id.is_empty() {
            return Err(DiscoveryDomainError::EmptyAccountId);
        }
        let trimmed_name = raw_name.trim();
        if trimmed_name.is_empty() {
            return Err(DiscoveryDomainError::EmptyAccountName);
        }
        Ok(Self {
            id: trimmed_id.to_owned(),
            name: trimmed_name.to_owned(),
        })
    }

    /// Returns the CRM account identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the account display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns a lowercase, hyphen-separated form of the account name for
    /// use in file names.
    #[must_use]
    pub fn slug(&self) -> String {
        let mut slug = String::with_capacity(self.name.len());
        for ch in self.name.chars() {
            if ch.is_ascii_alphanumeric() {
                slug.push(ch.to_ascii_lowercase());
            } else if !slug.is_empty() && !slug.ends_with('-') {
                slug.push('-');
            }
        }
        while slug.ends_with('-') {
            slug.pop();
        }
        if slug.is_empty() {
            "account".to_owned()
        } else {
            slug
        }
    }
}

/// Technology domain a discovery session covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vertical {
    /// Campus, branch, and WAN networking.
    Networking,
    /// Network and identity security.
    Security,
    /// Public and hybrid cloud.
    Cloud,
    /// Compute, storage, and virtualisation.
    DataCenter,
    /// Voice, video, and contact centre.
    Collaboration,
    /// Monitoring and observability tooling.
    Observability,
}

impl Vertical {
    /// Every supported vertical.
    pub const ALL: [Self; 6] = [
        Self::Networking,
        Self::Security,
        Self::Cloud,
        Self::DataCenter,
        Self::Collaboration,
        Self::Observability,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Networking => "networking",
            Self::Security => "security",
            Self::Cloud => "cloud",
            Self::DataCenter => "data_center",
            Self::Collaboration => "collaboration",
            Self::Observability => "observability",
        }
    }
}

impl fmt::Display for Vertical {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Vertical {
    type Error = ParseVerticalError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = normalize_tag(value);
        Self::ALL
            .into_iter()
            .find(|vertical| vertical.as_str() == normalized)
            .ok_or_else(|| ParseVerticalError(value.to_owned()))
    }
}

/// Lifecycle state of a discovery session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Not yet started.
    Draft,
    /// Questions are being answered.
    InProgress,
    /// The questionnaire pass is finished.
    Completed,
    /// Kept for reference only.
    Archived,
}

impl SessionStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Archived => "archived",
        }
    }

    /// Returns `true` for states a status update may move a session into.
    #[must_use]
    pub const fn is_settable(self) -> bool {
        !matches!(self, Self::Draft)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for SessionStatus {
    type Error = ParseSessionStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match normalize_tag(value).as_str() {
            "draft" => Ok(Self::Draft),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "archived" => Ok(Self::Archived),
            _ => Err(ParseSessionStatusError(value.to_owned())),
        }
    }
}

/// One questionnaire pass against one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoverySession {
    id: SessionId,
    account: AccountRef,
    owner: UserId,
    vertical: Vertical,
    status: SessionStatus,
    metadata: SessionMetadata,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedSessionData {
    /// Persisted identifier.
    pub id: SessionId,
    /// Persisted account reference.
    pub account: AccountRef,
    /// Owning user.
    pub owner: UserId,
    /// Persisted vertical.
    pub vertical: Vertical,
    /// Persisted status.
    pub status: SessionStatus,
    /// Persisted metadata.
    pub metadata: SessionMetadata,
    /// When answering began.
    pub started_at: DateTime<Utc>,
    /// When the session was completed.
    pub completed_at: Option<DateTime<Utc>>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl DiscoverySession {
    /// Starts a new session. Sessions begin in progress.
    #[must_use]
    pub fn new(
        account: AccountRef,
        owner: UserId,
        vertical: Vertical,
        metadata: SessionMetadata,
        clock: &impl Clock,
    ) -> Self {
        let timestamp = clock.utc();
        Self {
            id: SessionId::new(),
            account,
            owner,
            vertical,
            status: SessionStatus::InProgress,
            metadata,
            started_at: timestamp,
            completed_at: None,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a session from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedSessionData) -> Self {
        Self {
            id: data.id,
            account: data.account,
            owner: data.owner,
            vertical: data.vertical,
            status: data.status,
            metadata: data.metadata,
            started_at: data.started_at,
            completed_at: data.completed_at,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the session identifier.
    #[must_use]
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// Returns the account reference.
    #[must_use]
    pub const fn account(&self) -> &AccountRef {
        &self.account
    }

    /// Returns the owning user.
    #[must_use]
    pub const fn owner(&self) -> UserId {
        self.owner
    }

    /// Returns the vertical.
    #[must_use]
    pub const fn vertical(&self) -> Vertical {
        self.vertical
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> SessionStatus {
        self.status
    }

    /// Returns the metadata map.
    #[must_use]
    pub const fn metadata(&self) -> &SessionMetadata {
        &self.metadata
    }

    /// Returns when answering began.
    #[must_use]
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Returns when the session was completed, if it has been.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Moves the session to a new status. Completing stamps `completed_at`;
    /// other moves keep any earlier completion time.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryDomainError::StatusNotSettable`] for
    /// [`SessionStatus::Draft`].
    pub fn set_status(
        &mut self,
        status: SessionStatus,
        clock: &impl Clock,
    ) -> Result<(), DiscoveryDomainError> {
        if !status.is_settable() {
            return Err(DiscoveryDomainError::StatusNotSettable(
                status.as_str().to_owned(),
            ));
        }
        let now = clock.utc();
        if status == SessionStatus::Completed {
            self.completed_at = Some(now);
        }
        self.status = status;
        self.updated_at = now;
        Ok(())
    }

    /// Replaces the metadata map.
    pub fn replace_metadata(&mut self, metadata: SessionMetadata, clock: &impl Clock) {
        self.metadata = metadata;
        self.updated_at = clock.utc();
    }
}

/// A session with everything recorded against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDetails {
    /// The session.
    pub session: DiscoverySession,
    /// Responses ordered by answer time.
    pub responses: Vec<DiscoveryResponse>,
    /// Notes, newest first.
    pub notes: Vec<DiscoveryNote>,
    /// Number of answered questions.
    pub total_questions_answered: usize,
}

impl SessionDetails {
    /// Assembles details, counting the responses.
    #[must_use]
    pub const fn new(
        session: DiscoverySession,
        responses: Vec<DiscoveryResponse>,
        notes: Vec<DiscoveryNote>,
    ) -> Self {
        let total_questions_answered = responses.len();
        Self {
            session,
            responses,
            notes,
            total_questions_answered,
        }
    }
}
