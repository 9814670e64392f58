//! Diesel row models for discovery persistence.

use super::schema::{discovery_exports, discovery_notes, discovery_responses, discovery_sessions};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

/// Session record.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = discovery_sessions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SessionRecord {
    /// Session identifier.
    pub id: Uuid,
    /// CRM account identifier.
    pub account_id: String,
    /// Account display name.
    pub account_name: String,
    /// Owning user.
    pub user_id: Uuid,
    /// Vertical tag.
    pub vertical: String,
    /// Lifecycle status.
    pub status: String,
    /// Metadata payload.
    pub metadata: Value,
    /// When answering began.
    pub started_at: DateTime<Utc>,
    /// When the session was completed.
    pub completed_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Response record.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = discovery_responses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ResponseRecord {
    /// Response identifier.
    pub id: Uuid,
    /// Owning session.
    pub session_id: Uuid,
    /// Question catalog key.
    pub question_id: String,
    /// Question title.
    pub question_title: String,
    /// Question type tag.
    pub question_type: String,
    /// Answer value.
    pub response_value: Value,
    /// Raw captured text.
    pub response_raw: Option<String>,
    /// Vendor selection payload.
    pub vendor_selections: Value,
    /// Sizing selection payload.
    pub sizing_selections: Value,
    /// When the current answer was given.
    pub answered_at: DateTime<Utc>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Note record.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = discovery_notes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NoteRecord {
    /// Note identifier.
    pub id: Uuid,
    /// Owning session.
    pub session_id: Uuid,
    /// Writing user.
    pub user_id: Uuid,
    /// Note text.
    pub note_text: String,
    /// Note tag.
    pub note_type: String,
    /// Response the note is about.
    pub related_response_id: Option<Uuid>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Export attempt record.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = discovery_exports)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ExportRecordRow {
    /// Record identifier.
    pub id: Uuid,
    /// Exported session.
    pub session_id: Uuid,
    /// Requesting user.
    pub user_id: Option<Uuid>,
    /// Requested format.
    pub export_format: String,
    /// Outcome.
    pub status: String,
    /// Failure reason.
    pub error_message: Option<String>,
    /// Payload digest.
    pub payload_digest: Option<String>,
    /// Attempt timestamp.
    pub created_at: DateTime<Utc>,
}
