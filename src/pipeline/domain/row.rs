//! Spreadsheet row aggregate.

use super::{RowData, RowId, SpreadsheetId};
use crate::ids::UserId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// One record of a spreadsheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    id: RowId,
    spreadsheet_id: SpreadsheetId,
    data: RowData,
    position: i32,
    created_by: Option<UserId>,
    updated_by: Option<UserId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted row.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedRowData {
    /// Persisted identifier.
    pub id: RowId,
    /// Owning spreadsheet.
    pub spreadsheet_id: SpreadsheetId,
    /// Persisted attribute map.
    pub data: RowData,
    /// Persisted position.
    pub position: i32,
    /// Creating user.
    pub created_by: Option<UserId>,
    /// Last updating user.
    pub updated_by: Option<UserId>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Partial update applied to a stored row.
///
/// Stores merge `data` into the current attribute map under their own lock
/// or transaction, so two patches to different keys never lose each other.
#[derive(Debug, Clone, PartialEq)]
pub struct RowPatch {
    /// Target row.
    pub row_id: RowId,
    /// Coerced values to overlay.
    pub data: RowData,
    /// User applying the patch.
    pub updated_by: Option<UserId>,
    /// Time of the patch.
    pub updated_at: DateTime<Utc>,
}

impl Row {
    /// Creates a row at the given position.
    #[must_use]
    pub fn new(
        spreadsheet_id: SpreadsheetId,
        data: RowData,
        position: i32,
        created_by: Option<UserId>,
        clock: &impl Clock,
    ) -> Self {
        let timestamp = clock.utc();
        Self {
            id: RowId::new(),
            spreadsheet_id,
            data,
            position,
            created_by,
            updated_by: created_by,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a row from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedRowData) -> Self {
        Self {
            id: data.id,
            spreadsheet_id: data.spreadsheet_id,
            data: data.data,
            position: data.position,
            created_by: data.created_by,
            updated_by: data.updated_by,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the row identifier.
    #[must_use]
    pub const fn id(&self) -> RowId {
        self.id
    }

    /// Returns the owning spreadsheet.
    #[must_use]
    pub const fn spreadsheet_id(&self) -> SpreadsheetId {
        self.spreadsheet_id
    }

    /// Returns the attribute map.
    #[must_use]
    pub const fn data(&self) -> &RowData {
        &self.data
    }

    /// Returns the display position.
    #[must_use]
    pub const fn position(&self) -> i32 {
        self.position
    }

    /// Returns the creating user.
    #[must_use]
    pub const fn created_by(&self) -> Option<UserId> {
        self.created_by
    }

    /// Returns the last updating user.
    #[must_use]
    pub const fn updated_by(&self) -> Option<UserId> {
        self.updated_by
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

    /// Applies a patch in place.
    pub fn apply(&mut self, patch: &RowPatch) {
        self.data.merge(&patch.data);
        if patch.updated_by.is_some() {
            self.updated_by = patch.updated_by;
        }
        self.updated_at = patch.updated_at;
    }
}
