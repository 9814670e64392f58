//! External CRM collaborator.
//!
//! Contrivance never writes to the CRM. Accounts are looked up through
//! [`ports::AccountDirectory`] and only their identifier and name are
//! stored; opportunities are read through [`ports::OpportunitySource`] and
//! imported as pipeline rows by [`services::CrmImportService`].

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
