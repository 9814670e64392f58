//! Shared test helpers for `PostgreSQL` integration tests.

use contrivance::{
    audit::adapters::postgres::PostgresAuditTrail,
    config::DatabaseConfig,
    db::{self, PgPool},
    discovery::{
        adapters::postgres::PostgresDiscoveryStore,
        domain::DiscoverySession,
        services::{
            CreateSessionRequest, DiscoveryExportService, DiscoveryNoteService,
            DiscoverySessionService,
        },
    },
    ids::UserId,
    pipeline::{
        adapters::postgres::PostgresPipelineStore,
        domain::SpreadsheetId,
        services::{
            CreateSpreadsheetRequest, DefineColumnRequest, RowStoreService,
            SchemaRegistryService, StatusFields, TodoLedgerService,
        },
    },
};
use mockable::DefaultClock;
use rstest::fixture;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Environment variable naming the test database.
pub const DATABASE_URL_VAR: &str = "CONTRIVANCE_TEST_DATABASE_URL";

static MIGRATION_LOCK: Mutex<()> = Mutex::new(());

/// Services wired onto the `PostgreSQL` adapters.
pub struct PgWorkspace {
    pub audit: PostgresAuditTrail,
    pub schema: SchemaRegistryService<PostgresPipelineStore, DefaultClock>,
    pub rows: RowStoreService<PostgresPipelineStore, DefaultClock>,
    pub todos: TodoLedgerService<PostgresPipelineStore, DefaultClock>,
    pub sessions: DiscoverySessionService<PostgresDiscoveryStore, DefaultClock>,
    pub notes: DiscoveryNoteService<PostgresDiscoveryStore, DefaultClock>,
    pub exports: DiscoveryExportService<PostgresDiscoveryStore, DefaultClock>,
    pub owner: UserId,
}

impl PgWorkspace {
    /// Wires every service onto one pool.
    #[must_use]
    pub fn new(pool: &PgPool) -> Self {
        let pipeline = Arc::new(PostgresPipelineStore::new(pool.clone()));
        let discovery = Arc::new(PostgresDiscoveryStore::new(pool.clone()));
        let clock = Arc::new(DefaultClock);
        Self {
            audit: PostgresAuditTrail::new(pool.clone()),
            schema: SchemaRegistryService::new(Arc::clone(&pipeline), Arc::clone(&clock)),
            rows: RowStoreService::new(Arc::clone(&pipeline), Arc::clone(&clock)),
            todos: TodoLedgerService::new(pipeline, Arc::clone(&clock), StatusFields::default()),
            sessions: DiscoverySessionService::new(Arc::clone(&discovery), Arc::clone(&clock)),
            notes: DiscoveryNoteService::new(Arc::clone(&discovery), Arc::clone(&clock)),
            exports: DiscoveryExportService::new(discovery, clock),
            owner: UserId::new(),
        }
    }

    /// Creates a spreadsheet with a required account column and an amount.
    pub async fn pipeline(&self) -> SpreadsheetId {
        self.schema
            .create_spreadsheet(
                CreateSpreadsheetRequest::new(format!("pipeline-{}", Uuid::new_v4()), self.owner)
                    .with_column(DefineColumnRequest::new("Account", "text").required())
                    .with_column(DefineColumnRequest::new("Amount", "currency")),
            )
            .await
            .expect("spreadsheet creation should succeed")
            .spreadsheet
            .id()
    }

    /// Starts a session for an account unique to the calling test.
    pub async fn session(&self) -> DiscoverySession {
        self.sessions
            .create_session(CreateSessionRequest::new(
                Uuid::new_v4().to_string(),
                "Initech",
                self.owner,
                "networking",
            ))
            .await
            .expect("session creation should succeed")
    }
}

/// Connects to the test database and applies pending migrations.
///
/// Returns `None` when no test database is configured.
#[must_use]
pub fn test_pool() -> Option<PgPool> {
    let url = std::env::var(DATABASE_URL_VAR).ok()?;
    let pool = db::build_pool(&DatabaseConfig { url, pool_size: 4 })
        .expect("test database should accept connections");
    {
        let _guard = MIGRATION_LOCK
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        db::migrate_pool(&pool).expect("migrations should apply");
    }
    Some(pool)
}

/// Provides a workspace, or `None` when no test database is configured.
#[fixture]
pub fn pg_workspace() -> Option<PgWorkspace> {
    test_pool().map(|pool| PgWorkspace::new(&pool))
}
