//! Port contracts for discovery persistence.

mod repository;

pub use repository::{
    DiscoveryRepository, DiscoveryRepositoryError, DiscoveryRepositoryResult, ExportRepository,
};
