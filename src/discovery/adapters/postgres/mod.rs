//! `PostgreSQL` adapters for discovery persistence.

mod models;
mod repository;
mod schema;

pub use repository::PostgresDiscoveryStore;
