//! `PostgreSQL` integration tests for the diesel adapters.
//!
//! Tests run against the database named by `CONTRIVANCE_TEST_DATABASE_URL`
//! and return early when it is unset. Each test works on freshly created
//! spreadsheets and sessions, so a shared database is fine.
//!
//! - `helpers`: Pool setup, one-time migrations and service wiring
//! - `pipeline_tests`: Spreadsheets, rows, todos and constraint mapping
//! - `discovery_tests`: Sessions, response upserts, notes and exports
//! - `audit_tests`: Audit entries written alongside each mutation

mod postgres {
    pub mod helpers;

    mod audit_tests;
    mod discovery_tests;
    mod pipeline_tests;
}
