//! Append-only audit trail.
//!
//! Every mutating operation in the pipeline and discovery stores records one
//! [`domain::AuditEntry`] in the same storage operation as the mutation.
//! The [`ports::AuditTrail`] port is read-only.

pub mod adapters;
pub mod domain;
pub mod ports;
