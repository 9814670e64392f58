//! Sales pipeline spreadsheets for Contrivance.
//!
//! A spreadsheet carries a user-defined column schema and rows whose values
//! are coerced against it. Todos attach to a spreadsheet or to one of its
//! rows, and a row's todos roll up into its technical win status. The
//! module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
