//! Error types for discovery domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing or mutating discovery domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DiscoveryDomainError {
    /// The account identifier is empty after trimming.
    #[error("account identifier must not be empty")]
    EmptyAccountId,

    /// The account display name is empty after trimming.
    #[error("account name must not be empty")]
    EmptyAccountName,

    /// The vertical is not one of the supported technology domains.
    #[error(transparent)]
    Vertical(#[from] ParseVerticalError),

    /// The session status is not recognised.
    #[error(transparent)]
    Status(#[from] ParseSessionStatusError),

    /// The session status cannot be set explicitly.
    #[error("session status cannot be set to '{0}'")]
    StatusNotSettable(String),

    /// The question type is not recognised.
    #[error(transparent)]
    QuestionType(#[from] ParseQuestionTypeError),

    /// The question identifier is empty after trimming.
    #[error("question identifier must not be empty")]
    EmptyQuestionId,

    /// A response value does not fit its question type.
    #[error("{question_type} question expects {expected}")]
    InvalidResponseValue {
        /// Question type tag.
        question_type: &'static str,
        /// Human-readable description of the accepted shape.
        expected: &'static str,
    },

    /// The vendor selection payload is not a map of vendor lists.
    #[error("vendor selections must map category keys to lists of vendor codes")]
    InvalidVendorSelections,

    /// The sizing selection payload is not a JSON object.
    #[error("sizing selections must be a JSON object")]
    SizingNotObject,

    /// Session metadata is not a JSON object.
    #[error("session metadata must be a JSON object")]
    MetadataNotObject,

    /// The note text is empty after trimming.
    #[error("note text must not be empty")]
    EmptyNoteText,

    /// A note update changes nothing.
    #[error("note update must change at least one field")]
    EmptyNoteUpdate,

    /// The export format is not supported.
    #[error(transparent)]
    ExportFormat(#[from] ParseExportFormatError),
}

/// Error returned when parsing an unknown vertical.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown vertical: {0}")]
pub struct ParseVerticalError(pub String);

/// Error returned when parsing an unknown session status.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown session status: {0}")]
pub struct ParseSessionStatusError(pub String);

/// Error returned when parsing an unknown question type.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown question type: {0}")]
pub struct ParseQuestionTypeError(pub String);

/// Error returned when parsing an unknown export format.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unsupported export format: {0}")]
pub struct ParseExportFormatError(pub String);

/// Error returned when parsing an unknown export status.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown export status: {0}")]
pub struct ParseExportStatusError(pub String);
