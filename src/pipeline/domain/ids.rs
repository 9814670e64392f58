//! Identifier types for the pipeline domain.

use crate::ids::uuid_identifier;

uuid_identifier!(
    /// Unique identifier for a pipeline spreadsheet.
    SpreadsheetId
);

uuid_identifier!(
    /// Unique identifier for a column definition.
    ColumnId
);

uuid_identifier!(
    /// Unique identifier for a spreadsheet row.
    RowId
);

uuid_identifier!(
    /// Unique identifier for a todo.
    TodoId
);
