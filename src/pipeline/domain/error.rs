//! Error types for pipeline domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing or mutating pipeline domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PipelineDomainError {
    /// The spreadsheet name is empty after trimming.
    #[error("spreadsheet name must not be empty")]
    EmptySpreadsheetName,

    /// The column name is empty after trimming.
    #[error("column name must not be empty")]
    EmptyColumnName,

    /// The column name exceeds the storage limit.
    #[error("column name exceeds 255 character limit: {0}")]
    ColumnNameTooLong(String),

    /// An explicit column or row position was not positive.
    #[error("position must be positive, got {0}")]
    InvalidPosition(i32),

    /// The column type tag is not recognised.
    #[error(transparent)]
    ColumnType(#[from] ParseColumnTypeError),

    /// A select option catalog is malformed.
    #[error("invalid select options: {0}")]
    InvalidSelectOptions(String),

    /// A select option catalog repeats a value.
    #[error("select options must be unique, '{0}' appears more than once")]
    DuplicateSelectOption(String),

    /// A number or currency cell could not be parsed.
    #[error("column '{column}' expects a number, got '{value}'")]
    InvalidNumber {
        /// Column being written.
        column: String,
        /// Offending input.
        value: String,
    },

    /// A cell value has a JSON shape the column type cannot accept.
    #[error("column '{column}' expects {expected}")]
    UnexpectedShape {
        /// Column being written.
        column: String,
        /// Human-readable description of the accepted shape.
        expected: &'static str,
    },

    /// A required column was left empty.
    #[error("column '{0}' requires a value")]
    MissingRequiredValue(String),

    /// Row data was not a JSON object.
    #[error("row data must be a JSON object")]
    RowDataNotObject,

    /// The todo title is empty after trimming.
    #[error("todo title must not be empty")]
    EmptyTodoTitle,

    /// The todo priority is not recognised.
    #[error(transparent)]
    Priority(#[from] ParseTodoPriorityError),

    /// An update request carried no changes.
    #[error("update must change at least one field")]
    EmptyUpdate,

    /// Spreadsheet settings were not a JSON object.
    #[error("spreadsheet settings must be a JSON object")]
    SettingsNotObject,
}

/// Error returned while parsing a column type tag.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown column type: {0}")]
pub struct ParseColumnTypeError(pub String);

/// Error returned while parsing a todo priority.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown todo priority: {0}")]
pub struct ParseTodoPriorityError(pub String);
