//! Technology discovery questionnaires for Contrivance.
//!
//! A session records one questionnaire pass against one CRM account. Each
//! question holds at most one response per session, so saving an answer
//! again replaces it in place. Notes and an export trail hang off the
//! session. The module follows hexagonal architecture:
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
