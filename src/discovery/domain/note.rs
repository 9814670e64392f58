//! Free-text notes attached to a session.

use super::{DiscoveryDomainError, NoteId, ResponseId, SessionId};
use crate::ids::UserId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Tag used when a note is saved without one.
pub const DEFAULT_NOTE_TYPE: &str = "general";

/// Validated, trimmed note text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteText(String);

impl NoteText {
    /// Creates validated note text.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryDomainError::EmptyNoteText`] for blank input.
    pub fn new(value: impl Into<String>) -> Result<Self, DiscoveryDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DiscoveryDomainError::EmptyNoteText);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the text as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Normalises a note type tag, falling back to [`DEFAULT_NOTE_TYPE`].
#[must_use]
pub fn note_type_or_default(tag: Option<&str>) -> String {
    tag.map(str::trim)
        .filter(|value| !value.is_empty())
        .map_or_else(|| DEFAULT_NOTE_TYPE.to_owned(), str::to_ascii_lowercase)
}

/// A free-text note on a session, optionally about one response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryNote {
    id: NoteId,
    session_id: SessionId,
    author: UserId,
    text: NoteText,
    note_type: String,
    related_response: Option<ResponseId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedNoteData {
    /// Persisted identifier.
    pub id: NoteId,
    /// Owning session.
    pub session_id: SessionId,
    /// Writing user.
    pub author: UserId,
    /// Persisted text.
    pub text: NoteText,
    /// Persisted tag.
    pub note_type: String,
    /// Response the note is about.
    pub related_response: Option<ResponseId>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl DiscoveryNote {
    /// Creates a note.
    #[must_use]
    pub fn new(
        session_id: SessionId,
        author: UserId,
        text: NoteText,
        note_type: Option<&str>,
        related_response: Option<ResponseId>,
        clock: &impl Clock,
    ) -> Self {
        let timestamp = clock.utc();
        Self::from_persisted(PersistedNoteData {
            id: NoteId::new(),
            session_id,
            author,
            text,
            note_type: note_type_or_default(note_type),
            related_response,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a note from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedNoteData) -> Self {
        Self {
            id: data.id,
            session_id: data.session_id,
            author: data.author,
            text: data.text,
            note_type: data.note_type,
            related_response: data.related_response,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the note identifier.
    #[must_use]
    pub const fn id(&self) -> NoteId {
        self.id
    }

    /// Returns the owning session.
    #[must_use]
    pub const fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Returns the writing user.
    #[must_use]
    pub const fn author(&self) -> UserId {
        self.author
    }

    /// Returns the note text.
    #[must_use]
    pub const fn text(&self) -> &NoteText {
        &self.text
    }

    /// Returns the note tag.
    #[must_use]
    pub fn note_type(&self) -> &str {
        &self.note_type
    }

    /// Returns the response the note is about.
    #[must_use]
    pub const fn related_response(&self) -> Option<ResponseId> {
        self.related_response
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

    /// Replaces the text and, when given, the tag.
    pub fn edit(&mut self, text: Option<NoteText>, note_type: Option<&str>, clock: &impl Clock) {
        if let Some(value) = text {
            self.text = value;
        }
        if note_type.is_some() {
            self.note_type = note_type_or_default(note_type);
        }
        self.updated_at = clock.utc();
    }
}
