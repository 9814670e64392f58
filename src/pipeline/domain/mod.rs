//! Domain model for pipeline spreadsheets.
//!
//! Spreadsheets hold user-defined columns and rows whose attribute maps are
//! keyed by column name. Todos attach to a spreadsheet and optionally to one
//! row; a row's todos roll up into a [`TechnicalWinStatus`].

mod cell;
mod column;
mod error;
mod ids;
mod row;
mod spreadsheet;
mod status;
mod todo;

pub use cell::{CellValue, CoercionMode, RowData, coerce_cell, coerce_row_data};
pub use column::{Column, ColumnName, ColumnSpec, ColumnType, PersistedColumnData, SelectOption};
pub use error::{ParseColumnTypeError, ParseTodoPriorityError, PipelineDomainError};
pub use ids::{ColumnId, RowId, SpreadsheetId, TodoId};
pub use row::{PersistedRowData, Row, RowPatch};
pub use spreadsheet::{PersistedSpreadsheetData, Spreadsheet, SpreadsheetName, SpreadsheetSettings};
pub use status::{RowCompletion, TechnicalWinStatus};
pub(crate) use status::rounded_percentage;
pub use todo::{
    PersistedTodoData, Todo, TodoChanges, TodoDetails, TodoPriority, TodoStats, TodoTitle,
};
