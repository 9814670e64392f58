//! Application services orchestrating pipeline operations.

mod error;
mod import;
mod rows;
mod schema;
mod status;
mod todos;

pub use error::{PipelineServiceError, PipelineServiceResult};
pub use import::{ImportFailure, ImportRecord, ImportReport, PipelineImportService};
pub use rows::{CreateRowRequest, RowStoreService, SpreadsheetDetails};
pub use schema::{
    CreateSpreadsheetRequest, DefineColumnRequest, SchemaRegistryService, SpreadsheetSchema,
    UpdateSpreadsheetRequest,
};
pub use status::{StatusDerivationEngine, StatusFields};
pub use todos::{CreateTodoRequest, TodoLedgerService, TodoOutcome};
