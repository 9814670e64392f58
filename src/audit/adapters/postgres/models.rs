//! Diesel row models for audit persistence.

use super::schema::audit_entries;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for audit entries.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = audit_entries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AuditEntryRow {
    /// Entry identifier.
    pub id: uuid::Uuid,
    /// Mutation kind.
    pub action: String,
    /// Entity family.
    pub entity_type: String,
    /// Entity identifier.
    pub entity_id: uuid::Uuid,
    /// Change payload.
    pub changes: Value,
    /// Acting user.
    pub actor_id: Option<uuid::Uuid>,
    /// Recording timestamp.
    pub recorded_at: DateTime<Utc>,
}

/// Insert model for audit entries.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = audit_entries)]
pub struct NewAuditEntryRow {
    /// Entry identifier.
    pub id: uuid::Uuid,
    /// Mutation kind.
    pub action: String,
    /// Entity family.
    pub entity_type: String,
    /// Entity identifier.
    pub entity_id: uuid::Uuid,
    /// Change payload.
    pub changes: Value,
    /// Acting user.
    pub actor_id: Option<uuid::Uuid>,
    /// Recording timestamp.
    pub recorded_at: DateTime<Utc>,
}
