//! `PostgreSQL` adapters for audit persistence.

mod models;
mod repository;
mod schema;

pub(crate) use repository::insert_entry;
pub use repository::PostgresAuditTrail;
