//! In-memory pipeline adapters.

mod store;

pub use store::InMemoryPipelineStore;
