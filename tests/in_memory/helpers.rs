//! Shared test helpers for in-memory integration tests.

use contrivance::{
    audit::adapters::memory::InMemoryAuditLog,
    discovery::{
        adapters::memory::InMemoryDiscoveryStore,
        domain::DiscoverySession,
        services::{
            CreateSessionRequest, DiscoveryExportService, DiscoveryNoteService,
            DiscoverySessionService,
        },
    },
    ids::UserId,
    pipeline::{
        adapters::memory::InMemoryPipelineStore,
        domain::{Row, SpreadsheetId},
        services::{
            CreateRowRequest, CreateSpreadsheetRequest, DefineColumnRequest,
            PipelineImportService, RowStoreService, SchemaRegistryService, StatusFields,
            TodoLedgerService,
        },
    },
    reporting::services::ReportingService,
};
use mockable::DefaultClock;
use rstest::fixture;
use serde_json::Value;
use std::sync::Arc;

/// Every service wired onto in-memory stores sharing one audit log.
pub struct Workspace {
    pub audit: InMemoryAuditLog,
    pub pipeline_store: Arc<InMemoryPipelineStore>,
    pub discovery_store: Arc<InMemoryDiscoveryStore>,
    pub schema: SchemaRegistryService<InMemoryPipelineStore, DefaultClock>,
    pub rows: RowStoreService<InMemoryPipelineStore, DefaultClock>,
    pub todos: TodoLedgerService<InMemoryPipelineStore, DefaultClock>,
    pub import: PipelineImportService<InMemoryPipelineStore, DefaultClock>,
    pub sessions: DiscoverySessionService<InMemoryDiscoveryStore, DefaultClock>,
    pub notes: DiscoveryNoteService<InMemoryDiscoveryStore, DefaultClock>,
    pub exports: DiscoveryExportService<InMemoryDiscoveryStore, DefaultClock>,
    pub reports: ReportingService<InMemoryDiscoveryStore>,
    pub owner: UserId,
}

impl Workspace {
    /// Wires every service with the default status fields.
    #[must_use]
    pub fn new() -> Self {
        let audit = InMemoryAuditLog::new();
        let pipeline_store = Arc::new(InMemoryPipelineStore::with_audit_log(audit.clone()));
        let discovery_store = Arc::new(InMemoryDiscoveryStore::with_audit_log(audit.clone()));
        let clock = Arc::new(DefaultClock);

        Self {
            schema: SchemaRegistryService::new(Arc::clone(&pipeline_store), Arc::clone(&clock)),
            rows: RowStoreService::new(Arc::clone(&pipeline_store), Arc::clone(&clock)),
            todos: TodoLedgerService::new(
                Arc::clone(&pipeline_store),
                Arc::clone(&clock),
                StatusFields::default(),
            ),
            import: PipelineImportService::new(Arc::clone(&pipeline_store), Arc::clone(&clock)),
            sessions: DiscoverySessionService::new(
                Arc::clone(&discovery_store),
                Arc::clone(&clock),
            ),
            notes: DiscoveryNoteService::new(Arc::clone(&discovery_store), Arc::clone(&clock)),
            exports: DiscoveryExportService::new(Arc::clone(&discovery_store), clock),
            reports: ReportingService::new(Arc::clone(&discovery_store)),
            audit,
            pipeline_store,
            discovery_store,
            owner: UserId::new(),
        }
    }

    /// Creates the account pipeline used across tests.
    pub async fn account_pipeline(&self) -> SpreadsheetId {
        self.schema
            .create_spreadsheet(
                CreateSpreadsheetRequest::new("Q3 pipeline", self.owner)
                    .with_column(DefineColumnRequest::new("Account", "text").required())
                    .with_column(DefineColumnRequest::new("Amount", "currency"))
                    .with_column(
                        DefineColumnRequest::new("Stage", "select").with_validation(
                            serde_json::json!({ "options": ["Discovery", "Proposal", "Closed"] }),
                        ),
                    )
                    .with_column(DefineColumnRequest::new("Strategic", "boolean")),
            )
            .await
            .expect("spreadsheet creation should succeed")
            .spreadsheet
            .id()
    }

    /// Adds a row with raw data.
    pub async fn add_row(&self, spreadsheet: SpreadsheetId, data: Value) -> Row {
        self.rows
            .create_row(CreateRowRequest::new(spreadsheet, data).with_actor(self.owner))
            .await
            .expect("row creation should succeed")
    }

    /// Starts a security discovery session for Acme.
    pub async fn acme_session(&self) -> DiscoverySession {
        self.sessions
            .create_session(CreateSessionRequest::new(
                "001A",
                "Acme Corp",
                self.owner,
                "security",
            ))
            .await
            .expect("session creation should succeed")
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

/// Provides a fresh workspace for each test.
#[fixture]
pub fn workspace() -> Workspace {
    Workspace::new()
}
