//! Pipeline spreadsheet aggregate root.

use super::{PipelineDomainError, SpreadsheetId};
use crate::ids::UserId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Validated spreadsheet name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpreadsheetName(String);

impl SpreadsheetName {
    /// Creates a validated, trimmed spreadsheet name.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineDomainError::EmptySpreadsheetName`] when the value is
    /// empty after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, PipelineDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PipelineDomainError::EmptySpreadsheetName);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SpreadsheetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Free-form settings map.
pub type SpreadsheetSettings = Map<String, Value>;

/// Pipeline spreadsheet aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spreadsheet {
    id: SpreadsheetId,
    name: SpreadsheetName,
    description: Option<String>,
    owner: UserId,
    is_public: bool,
    settings: SpreadsheetSettings,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedSpreadsheetData {
    /// Persisted identifier.
    pub id: SpreadsheetId,
    /// Persisted name.
    pub name: SpreadsheetName,
    /// Persisted description.
    pub description: Option<String>,
    /// Persisted owner.
    pub owner: UserId,
    /// Persisted visibility flag.
    pub is_public: bool,
    /// Persisted settings.
    pub settings: SpreadsheetSettings,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Spreadsheet {
    /// Creates a private spreadsheet with empty settings.
    #[must_use]
    pub fn new(name: SpreadsheetName, owner: UserId, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: SpreadsheetId::new(),
            name,
            description: None,
            owner,
            is_public: false,
            settings: Map::new(),
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a spreadsheet from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedSpreadsheetData) -> Self {
        Self {
            id: data.id,
            name: data.name,
            description: data.description,
            owner: data.owner,
            is_public: data.is_public,
            settings: data.settings,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the spreadsheet identifier.
    #[must_use]
    pub const fn id(&self) -> SpreadsheetId {
        self.id
    }

    /// Returns the spreadsheet name.
    #[must_use]
    pub const fn name(&self) -> &SpreadsheetName {
        &self.name
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the owning user.
    #[must_use]
    pub const fn owner(&self) -> UserId {
        self.owner
    }

    /// Returns whether every user may see the spreadsheet.
    #[must_use]
    pub const fn is_public(&self) -> bool {
        self.is_public
    }

    /// Returns the settings map.
    #[must_use]
    pub const fn settings(&self) -> &SpreadsheetSettings {
        &self.settings
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

    /// Returns `true` when `user` owns the spreadsheet or it is public.
    #[must_use]
    pub fn is_visible_to(&self, user: UserId) -> bool {
        self.is_public || self.owner == user
    }

    /// Renames the spreadsheet.
    pub fn rename(&mut self, name: SpreadsheetName, clock: &impl Clock) {
        self.name = name;
        self.touch(clock);
    }

    /// Replaces the description. Blank text clears it.
    pub fn set_description(&mut self, description: Option<String>, clock: &impl Clock) {
        self.description = description.filter(|text| !text.trim().is_empty());
        self.touch(clock);
    }

    /// Changes visibility.
    pub fn set_public(&mut self, is_public: bool, clock: &impl Clock) {
        self.is_public = is_public;
        self.touch(clock);
    }

    /// Replaces the settings map.
    pub fn replace_settings(&mut self, settings: SpreadsheetSettings, clock: &impl Clock) {
        self.settings = settings;
        self.touch(clock);
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
