//! Append-only audit records.

use crate::ids::{UserId, uuid_identifier};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

uuid_identifier!(
    /// Unique identifier for an audit entry.
    AuditEntryId
);

/// Kind of mutation recorded by an audit entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// A new entity was inserted.
    Create,
    /// An existing entity was modified.
    Update,
    /// An entity was removed.
    Delete,
    /// An entity was inserted or replaced through a uniqueness key.
    Upsert,
    /// A read-side export was produced (or attempted).
    Export,
}

impl AuditAction {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Upsert => "upsert",
            Self::Export => "export",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for AuditAction {
    type Error = ParseAuditError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "create" => Ok(Self::Create),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            "upsert" => Ok(Self::Upsert),
            "export" => Ok(Self::Export),
            _ => Err(ParseAuditError::Action(value.to_owned())),
        }
    }
}

/// Entity families that produce audit entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEntity {
    /// A pipeline spreadsheet.
    Spreadsheet,
    /// A column definition.
    Column,
    /// A spreadsheet row.
    Row,
    /// A todo item.
    Todo,
    /// A discovery session.
    DiscoverySession,
    /// A discovery response.
    DiscoveryResponse,
    /// A discovery note.
    DiscoveryNote,
}

impl AuditEntity {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Spreadsheet => "spreadsheet",
            Self::Column => "column",
            Self::Row => "row",
            Self::Todo => "todo",
            Self::DiscoverySession => "discovery_session",
            Self::DiscoveryResponse => "discovery_response",
            Self::DiscoveryNote => "discovery_note",
        }
    }
}

impl fmt::Display for AuditEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for AuditEntity {
    type Error = ParseAuditError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "spreadsheet" => Ok(Self::Spreadsheet),
            "column" => Ok(Self::Column),
            "row" => Ok(Self::Row),
            "todo" => Ok(Self::Todo),
            "discovery_session" => Ok(Self::DiscoverySession),
            "discovery_response" => Ok(Self::DiscoveryResponse),
            "discovery_note" => Ok(Self::DiscoveryNote),
            _ => Err(ParseAuditError::Entity(value.to_owned())),
        }
    }
}

/// Errors raised while parsing persisted audit values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseAuditError {
    /// Unknown action tag.
    #[error("unknown audit action: {0}")]
    Action(String),
    /// Unknown entity tag.
    #[error("unknown audit entity: {0}")]
    Entity(String),
}

/// Immutable record of one mutation.
///
/// Entries are written in the same storage operation as the mutation they
/// describe and are never updated or deleted afterwards.
///
/// # Examples
///
/// ```rust
/// use contrivance::audit::domain::{AuditAction, AuditEntity, AuditEntry};
/// use mockable::DefaultClock;
/// use serde_json::json;
/// use uuid::Uuid;
///
/// let entry = AuditEntry::record(
///     AuditAction::Create,
///     AuditEntity::Row,
///     Uuid::new_v4(),
///     json!({"Account": "Acme"}),
///     None,
///     &DefaultClock,
/// );
/// assert_eq!(entry.action(), AuditAction::Create);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    id: AuditEntryId,
    action: AuditAction,
    entity: AuditEntity,
    entity_id: Uuid,
    changes: Value,
    actor: Option<UserId>,
    recorded_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted audit entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedAuditData {
    /// Persisted entry identifier.
    pub id: AuditEntryId,
    /// Persisted action.
    pub action: AuditAction,
    /// Persisted entity family.
    pub entity: AuditEntity,
    /// Persisted entity identifier.
    pub entity_id: Uuid,
    /// Persisted change payload.
    pub changes: Value,
    /// Persisted actor.
    pub actor: Option<UserId>,
    /// Persisted timestamp.
    pub recorded_at: DateTime<Utc>,
}

impl AuditEntry {
    /// Records a new audit entry stamped with the current clock time.
    #[must_use]
    pub fn record(
        action: AuditAction,
        entity: AuditEntity,
        entity_id: Uuid,
        changes: Value,
        actor: Option<UserId>,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: AuditEntryId::new(),
            action,
            entity,
            entity_id,
            changes,
            actor,
            recorded_at: clock.utc(),
        }
    }

    /// Reconstructs an entry from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedAuditData) -> Self {
        Self {
            id: data.id,
            action: data.action,
            entity: data.entity,
            entity_id: data.entity_id,
            changes: data.changes,
            actor: data.actor,
            recorded_at: data.recorded_at,
        }
    }

    /// Re-targets the entry at the identifier a store actually kept.
    #[must_use]
    pub const fn for_entity(mut self, entity_id: Uuid) -> Self {
        self.entity_id = entity_id;
        self
    }

    /// Returns the entry identifier.
    #[must_use]
    pub const fn id(&self) -> AuditEntryId {
        self.id
    }

    /// Returns the recorded action.
    #[must_use]
    pub const fn action(&self) -> AuditAction {
        self.action
    }

    /// Returns the entity family.
    #[must_use]
    pub const fn entity(&self) -> AuditEntity {
        self.entity
    }

    /// Returns the entity identifier.
    #[must_use]
    pub const fn entity_id(&self) -> Uuid {
        self.entity_id
    }

    /// Returns the change payload.
    #[must_use]
    pub const fn changes(&self) -> &Value {
        &self.changes
    }

    /// Returns the acting user, if known.
    #[must_use]
    pub const fn actor(&self) -> Option<UserId> {
        self.actor
    }

    /// Returns the time the entry was recorded.
    #[must_use]
    pub const fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }
}
