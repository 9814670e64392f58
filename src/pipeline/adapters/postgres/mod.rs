//! `PostgreSQL` adapters for pipeline persistence.

mod models;
mod repository;
mod schema;

pub use repository::PostgresPipelineStore;
