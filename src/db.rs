//! `PostgreSQL` pooling and embedded schema migrations.

use crate::config::DatabaseConfig;
use diesel::connection::SimpleConnection;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool, PoolError};
use thiserror::Error;
use tracing::info;

/// Connection pool shared by the `PostgreSQL` adapters.
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// One embedded migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Migration {
    /// Directory name under `migrations/`, used as the version key.
    pub name: &'static str,
    /// Forward SQL.
    pub up: &'static str,
}

/// Every migration, in application order.
pub const MIGRATIONS: [Migration; 3] = [
    Migration {
        name: "2026-10-01-000000_create_audit_entries",
        up: include_str!("../migrations/2026-10-01-000000_create_audit_entries/up.sql"),
    },
    Migration {
        name: "2026-10-01-000001_create_pipeline_tables",
        up: include_str!("../migrations/2026-10-01-000001_create_pipeline_tables/up.sql"),
    },
    Migration {
        name: "2026-10-01-000002_create_discovery_tables",
        up: include_str!("../migrations/2026-10-01-000002_create_discovery_tables/up.sql"),
    },
];

const CREATE_VERSION_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS contrivance_schema_migrations (
    version VARCHAR(255) PRIMARY KEY,
    applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)";

diesel::table! {
    /// Applied migration versions.
    contrivance_schema_migrations (version) {
        /// Migration directory name.
        version -> Varchar,
        /// When the migration ran.
        applied_at -> Timestamptz,
    }
}

/// Errors raised while preparing the database.
#[derive(Debug, Error)]
pub enum DbError {
    /// The pool could not open its connections.
    #[error("failed to build connection pool: {0}")]
    Pool(#[from] PoolError),

    /// A connection could not be established.
    #[error("failed to connect: {0}")]
    Connection(#[from] ConnectionError),

    /// A migration statement failed.
    #[error("migration {name} failed: {source}")]
    Migration {
        /// Migration that failed.
        name: &'static str,
        /// Underlying database error.
        source: diesel::result::Error,
    },

    /// The version table could not be read or written.
    #[error("migration bookkeeping failed: {0}")]
    Bookkeeping(#[from] diesel::result::Error),
}

/// Builds a connection pool from configuration.
///
/// # Errors
///
/// Returns [`DbError::Pool`] when the initial connections cannot be opened.
pub fn build_pool(config: &DatabaseConfig) -> Result<PgPool, DbError> {
    let manager = ConnectionManager::<PgConnection>::new(config.url.as_str());
    Ok(Pool::builder().max_size(config.pool_size).build(manager)?)
}

/// Opens a single connection outside any pool.
///
/// # Errors
///
/// Returns [`DbError::Connection`] when the server cannot be reached.
pub fn connect(url: &str) -> Result<PgConnection, DbError> {
    Ok(PgConnection::establish(url)?)
}

/// Applies every migration not yet recorded, each in its own transaction.
/// Returns the names of the migrations that ran.
///
/// # Errors
///
/// Returns [`DbError::Migration`] naming the first failing migration;
/// earlier migrations stay applied.
pub fn apply_migrations(connection: &mut PgConnection) -> Result<Vec<&'static str>, DbError> {
    connection.batch_execute(CREATE_VERSION_TABLE_SQL)?;
    let applied: Vec<String> = contrivance_schema_migrations::table
        .select(contrivance_schema_migrations::version)
        .load(connection)?;

    let mut ran = Vec::new();
    for migration in MIGRATIONS
        .iter()
        .filter(|migration| !applied.iter().any(|name| name == migration.name))
    {
        connection
            .transaction::<_, diesel::result::Error, _>(|tx| {
                tx.batch_execute(migration.up)?;
                diesel::insert_into(contrivance_schema_migrations::table)
                    .values(contrivance_schema_migrations::version.eq(migration.name))
                    .execute(tx)?;
                Ok(())
            })
            .map_err(|source| DbError::Migration {
                name: migration.name,
                source,
            })?;
        info!(migration = migration.name, "migration applied");
        ran.push(migration.name);
    }
    Ok(ran)
}

/// Checks a pooled connection out and applies pending migrations.
///
/// # Errors
///
/// Returns [`DbError::Pool`] when no connection is available and migration
/// errors from [`apply_migrations`].
pub fn migrate_pool(pool: &PgPool) -> Result<Vec<&'static str>, DbError> {
    let mut connection = pool.get()?;
    apply_migrations(&mut connection)
}

#[cfg(test)]
mod tests {
    use super::MIGRATIONS;

    #[test]
    fn migrations_are_ordered_and_unique() {
        let names: Vec<&str> = MIGRATIONS.iter().map(|migration| migration.name).collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(names, sorted);
    }

    #[test]
    fn migrations_create_the_adapter_tables() {
        let all: String = MIGRATIONS.iter().map(|migration| migration.up).collect();
        for table in [
            "audit_entries",
            "spreadsheets",
            "spreadsheet_columns",
            "spreadsheet_rows",
            "todos",
            "discovery_sessions",
            "discovery_responses",
            "discovery_notes",
            "discovery_exports",
        ] {
            assert!(
                all.contains(&format!("CREATE TABLE {table} (")),
                "missing table {table}"
            );
        }
        for constraint in [
            "idx_spreadsheet_columns_name",
            "idx_spreadsheet_columns_position",
            "fk_todos_row",
            "UNIQUE (session_id, question_id)",
        ] {
            assert!(all.contains(constraint), "missing {constraint}");
        }
    }
}
