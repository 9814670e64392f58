//! Audit trail adapters.

pub mod memory;
pub mod postgres;
