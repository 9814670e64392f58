//! Domain model for technology discovery.
//!
//! A session is one questionnaire pass against one account. Responses are
//! keyed by question within a session and carry either a plain value or
//! hierarchical vendor and sizing selections.

mod error;
mod export;
mod ids;
mod note;
mod response;
mod session;

pub use error::{
    DiscoveryDomainError, ParseExportFormatError, ParseExportStatusError, ParseQuestionTypeError,
    ParseSessionStatusError, ParseVerticalError,
};
pub use export::{
    CSV_HEADERS, ExportFormat, ExportRecord, ExportStatus, PersistedExportData, escape_field,
    payload_digest, render_csv,
};
pub use ids::{ExportId, NoteId, ResponseId, SessionId};
pub use note::{
    DEFAULT_NOTE_TYPE, DiscoveryNote, NoteText, PersistedNoteData, note_type_or_default,
};
pub use response::{
    DiscoveryResponse, PersistedResponseData, QuestionId, QuestionType, ResponseContent,
    SizingSelections, VendorSelections, flatten_value,
};
pub use session::{
    AccountRef, DiscoverySession, PersistedSessionData, SessionDetails, SessionMetadata,
    SessionStatus, Vertical,
};

/// Lowercases a tag and folds hyphens and spaces into underscores.
fn normalize_tag(value: &str) -> String {
    value
        .trim()
        .chars()
        .map(|ch| match ch {
            '-' | ' ' => '_',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}
