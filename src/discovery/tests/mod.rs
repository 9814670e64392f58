//! Unit tests for the discovery bounded context.

mod domain_tests;
mod export_tests;
