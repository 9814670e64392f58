//! Repository ports for spreadsheets, rows, and todos.
//!
//! Every mutating method takes the [`AuditEntry`] describing the mutation;
//! implementations persist both in one atomic storage operation.

use crate::{
    audit::domain::AuditEntry,
    error::ErrorKind,
    ids::UserId,
    pipeline::domain::{
        Column, ColumnId, ColumnName, Row, RowId, RowPatch, Spreadsheet, SpreadsheetId, Todo,
        TodoId,
    },
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for pipeline repository operations.
pub type PipelineRepositoryResult<T> = Result<T, PipelineRepositoryError>;

/// Spreadsheet and column definition persistence.
#[async_trait]
pub trait SchemaRepository: Send + Sync {
    /// Stores a new spreadsheet together with its initial columns, each
    /// paired with its own audit entry. Either everything is stored or
    /// nothing is.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineRepositoryError::DuplicateColumnName`] or
    /// [`PipelineRepositoryError::DuplicateColumnPosition`] when two initial
    /// columns clash.
    async fn insert_spreadsheet(
        &self,
        spreadsheet: &Spreadsheet,
        audit: &AuditEntry,
        columns: &[(Column, AuditEntry)],
    ) -> PipelineRepositoryResult<()>;

    /// Persists spreadsheet attribute changes.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineRepositoryError::SpreadsheetNotFound`] when absent.
    async fn update_spreadsheet(
        &self,
        spreadsheet: &Spreadsheet,
        audit: &AuditEntry,
    ) -> PipelineRepositoryResult<()>;

    /// Deletes a spreadsheet with its columns, rows, and todos.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineRepositoryError::SpreadsheetNotFound`] when absent.
    async fn delete_spreadsheet(
        &self,
        id: SpreadsheetId,
        audit: &AuditEntry,
    ) -> PipelineRepositoryResult<()>;

    /// Finds a spreadsheet by identifier.
    async fn find_spreadsheet(
        &self,
        id: SpreadsheetId,
    ) -> PipelineRepositoryResult<Option<Spreadsheet>>;

    /// Lists spreadsheets owned by `user` or public, most recently updated
    /// first.
    async fn list_spreadsheets_visible_to(
        &self,
        user: UserId,
    ) -> PipelineRepositoryResult<Vec<Spreadsheet>>;

    /// Returns one past the highest column position, or 1 for an empty
    /// spreadsheet.
    async fn next_column_position(&self, id: SpreadsheetId) -> PipelineRepositoryResult<i32>;

    /// Stores a new column.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineRepositoryError::DuplicateColumnName`] or
    /// [`PipelineRepositoryError::DuplicateColumnPosition`] when the
    /// spreadsheet already has a column with that name or position, and
    /// [`PipelineRepositoryError::SpreadsheetNotFound`] when the spreadsheet
    /// does not exist.
    async fn insert_column(&self, column: &Column, audit: &AuditEntry)
    -> PipelineRepositoryResult<()>;

    /// Persists a renamed column.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineRepositoryError::DuplicateColumnName`] on a name
    /// clash and [`PipelineRepositoryError::ColumnNotFound`] when absent.
    async fn update_column(&self, column: &Column, audit: &AuditEntry)
    -> PipelineRepositoryResult<()>;

    /// Removes a column definition. Row data is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineRepositoryError::ColumnNotFound`] when absent.
    async fn delete_column(&self, id: ColumnId, audit: &AuditEntry)
    -> PipelineRepositoryResult<()>;

    /// Finds a column by identifier.
    async fn find_column(&self, id: ColumnId) -> PipelineRepositoryResult<Option<Column>>;

    /// Lists a spreadsheet's columns by ascending position, ties in
    /// insertion order.
    async fn list_columns(&self, id: SpreadsheetId) -> PipelineRepositoryResult<Vec<Column>>;
}

/// Row persistence.
#[async_trait]
pub trait RowRepository: Send + Sync {
    /// Returns one past the highest row position, or 1 for an empty
    /// spreadsheet.
    async fn next_row_position(&self, id: SpreadsheetId) -> PipelineRepositoryResult<i32>;

    /// Stores a new row.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineRepositoryError::SpreadsheetNotFound`] when the
    /// spreadsheet does not exist.
    async fn insert_row(&self, row: &Row, audit: &AuditEntry) -> PipelineRepositoryResult<()>;

    /// Merges a patch into a stored row atomically and returns the result.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineRepositoryError::RowNotFound`] when absent.
    async fn merge_row(&self, patch: &RowPatch, audit: &AuditEntry)
    -> PipelineRepositoryResult<Row>;

    /// Deletes a row and unbinds its todos.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineRepositoryError::RowNotFound`] when absent.
    async fn delete_row(&self, id: RowId, audit: &AuditEntry) -> PipelineRepositoryResult<()>;

    /// Finds a row by identifier.
    async fn find_row(&self, id: RowId) -> PipelineRepositoryResult<Option<Row>>;

    /// Lists a spreadsheet's rows by position, ties by creation time.
    async fn list_rows(&self, id: SpreadsheetId) -> PipelineRepositoryResult<Vec<Row>>;
}

/// Todo persistence.
#[async_trait]
pub trait TodoRepository: Send + Sync {
    /// Stores a new todo.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineRepositoryError::SpreadsheetNotFound`] or
    /// [`PipelineRepositoryError::RowNotFound`] for dangling references.
    async fn insert_todo(&self, todo: &Todo, audit: &AuditEntry) -> PipelineRepositoryResult<()>;

    /// Persists todo changes.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineRepositoryError::TodoNotFound`] when absent.
    async fn update_todo(&self, todo: &Todo, audit: &AuditEntry) -> PipelineRepositoryResult<()>;

    /// Deletes a todo.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineRepositoryError::TodoNotFound`] when absent.
    async fn delete_todo(&self, id: TodoId, audit: &AuditEntry) -> PipelineRepositoryResult<()>;

    /// Finds a todo by identifier.
    async fn find_todo(&self, id: TodoId) -> PipelineRepositoryResult<Option<Todo>>;

    /// Lists todos not bound to any row, newest first.
    async fn list_pipeline_todos(&self, id: SpreadsheetId) -> PipelineRepositoryResult<Vec<Todo>>;

    /// Lists every todo of a spreadsheet, newest first.
    async fn list_spreadsheet_todos(
        &self,
        id: SpreadsheetId,
    ) -> PipelineRepositoryResult<Vec<Todo>>;

    /// Lists todos bound to a row, newest first.
    async fn list_row_todos(&self, id: RowId) -> PipelineRepositoryResult<Vec<Todo>>;
}

/// Errors returned by pipeline repository implementations.
#[derive(Debug, Clone, Error)]
pub enum PipelineRepositoryError {
    /// The spreadsheet was not found.
    #[error("spreadsheet not found: {0}")]
    SpreadsheetNotFound(SpreadsheetId),

    /// The column was not found.
    #[error("column not found: {0}")]
    ColumnNotFound(ColumnId),

    /// The row was not found.
    #[error("row not found: {0}")]
    RowNotFound(RowId),

    /// The todo was not found.
    #[error("todo not found: {0}")]
    TodoNotFound(TodoId),

    /// The spreadsheet already has a column with this name.
    #[error("spreadsheet {spreadsheet} already has a column named '{name}'")]
    DuplicateColumnName {
        /// Spreadsheet holding the clash.
        spreadsheet: SpreadsheetId,
        /// Clashing name.
        name: ColumnName,
    },

    /// The spreadsheet already has a column at this position.
    #[error("spreadsheet {spreadsheet} already has a column at position {position}")]
    DuplicateColumnPosition {
        /// Spreadsheet holding the clash.
        spreadsheet: SpreadsheetId,
        /// Clashing position.
        position: i32,
    },

    /// Persisted data could not be reconstructed into domain types.
    #[error("invalid persisted data: {0}")]
    InvalidPersistedData(Arc<dyn std::error::Error + Send + Sync>),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl PipelineRepositoryError {
    /// Wraps a data-quality or deserialization error from persisted rows.
    pub fn invalid_persisted_data(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::InvalidPersistedData(Arc::new(err))
    }

    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }

    /// Returns the machine-readable error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::SpreadsheetNotFound(_)
            | Self::ColumnNotFound(_)
            | Self::RowNotFound(_)
            | Self::TodoNotFound(_) => ErrorKind::NotFound,
            Self::DuplicateColumnName { .. } | Self::DuplicateColumnPosition { .. } => {
                ErrorKind::Conflict
            }
            Self::InvalidPersistedData(_) => ErrorKind::Internal,
            Self::Persistence(_) => ErrorKind::Unavailable,
        }
    }
}
