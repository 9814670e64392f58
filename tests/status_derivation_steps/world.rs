//! Shared world state for status derivation BDD scenarios.

use std::{collections::HashMap, sync::Arc};

use contrivance::pipeline::{
    adapters::memory::InMemoryPipelineStore,
    domain::{RowCompletion, RowId, SpreadsheetId, TodoId},
    services::{RowStoreService, SchemaRegistryService, StatusFields, TodoLedgerService},
};
use mockable::DefaultClock;
use rstest::fixture;

/// Scenario world for status derivation behaviour tests.
pub struct StatusWorld {
    pub schema: SchemaRegistryService<InMemoryPipelineStore, DefaultClock>,
    pub rows: RowStoreService<InMemoryPipelineStore, DefaultClock>,
    pub todos: TodoLedgerService<InMemoryPipelineStore, DefaultClock>,
    pub spreadsheet: Option<SpreadsheetId>,
    pub row: Option<RowId>,
    pub todo_ids: HashMap<String, TodoId>,
    pub last_completion: Option<Option<RowCompletion>>,
}

impl StatusWorld {
    /// Creates a world backed by a fresh in-memory store.
    #[must_use]
    pub fn new() -> Self {
        let store = Arc::new(InMemoryPipelineStore::new());
        let clock = Arc::new(DefaultClock);
        Self {
            schema: SchemaRegistryService::new(Arc::clone(&store), Arc::clone(&clock)),
            rows: RowStoreService::new(Arc::clone(&store), Arc::clone(&clock)),
            todos: TodoLedgerService::new(store, clock, StatusFields::default()),
            spreadsheet: None,
            row: None,
            todo_ids: HashMap::new(),
            last_completion: None,
        }
    }

    /// Returns the scenario spreadsheet.
    pub fn spreadsheet(&self) -> Result<SpreadsheetId, eyre::Report> {
        self.spreadsheet
            .ok_or_else(|| eyre::eyre!("missing spreadsheet in scenario world"))
    }

    /// Returns the scenario row.
    pub fn row(&self) -> Result<RowId, eyre::Report> {
        self.row
            .ok_or_else(|| eyre::eyre!("missing row in scenario world"))
    }
}

impl Default for StatusWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> StatusWorld {
    StatusWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
