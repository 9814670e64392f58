//! In-memory discovery adapters.

mod store;

pub use store::InMemoryDiscoveryStore;
