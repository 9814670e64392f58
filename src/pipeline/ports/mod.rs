//! Port contracts for pipeline persistence.

mod repository;

pub use repository::{
    PipelineRepositoryError, PipelineRepositoryResult, RowRepository, SchemaRepository,
    TodoRepository,
};
