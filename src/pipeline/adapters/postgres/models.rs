//! Diesel row models for pipeline persistence.
//!
//! The same struct serves reads and inserts because every column is written
//! on insert.

use super::schema::{spreadsheet_columns, spreadsheet_rows, spreadsheets, todos};
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

/// Spreadsheet record.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = spreadsheets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SpreadsheetRecord {
    /// Spreadsheet identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Owning user.
    pub owner_id: Uuid,
    /// Visibility flag.
    pub is_public: bool,
    /// Settings payload.
    pub settings: Value,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Column definition record.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = spreadsheet_columns)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ColumnRecord {
    /// Column identifier.
    pub id: Uuid,
    /// Owning spreadsheet.
    pub spreadsheet_id: Uuid,
    /// Column name.
    pub name: String,
    /// Type tag.
    pub column_type: String,
    /// Validation payload.
    pub validation: Value,
    /// Display hints.
    pub display: Value,
    /// Display position.
    pub position: i32,
    /// Required flag.
    pub is_required: bool,
    /// Default value.
    pub default_value: Option<Value>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Row record.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = spreadsheet_rows)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RowRecord {
    /// Row identifier.
    pub id: Uuid,
    /// Owning spreadsheet.
    pub spreadsheet_id: Uuid,
    /// Attribute map.
    pub data: Value,
    /// Display position.
    pub position: i32,
    /// Creating user.
    pub created_by: Option<Uuid>,
    /// Last updating user.
    pub updated_by: Option<Uuid>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Todo record.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = todos)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub struct TodoRecord {
    /// Todo identifier.
    pub id: Uuid,
    /// Owning spreadsheet.
    pub spreadsheet_id: Uuid,
    /// Bound row.
    pub row_id: Option<Uuid>,
    /// Title.
    pub title: String,
    /// Description.
    pub description: Option<String>,
    /// Priority tag.
    pub priority: String,
    /// Completion flag.
    pub completed: bool,
    /// Due date.
    pub due_date: Option<NaiveDate>,
    /// Supporting artifact link.
    pub supporting_artifact: Option<String>,
    /// Creating user.
    pub created_by: Option<Uuid>,
    /// Assigned user.
    pub assigned_to: Option<Uuid>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}
