//! In-memory adapter integration tests.
//!
//! Tests are organized into modules by functionality:
//! - `pipeline_flow_tests`: Spreadsheets, rows, todos, and status roll-up
//! - `import_tests`: Batch and CRM imports with partial failure
//! - `discovery_flow_tests`: Sessions, responses, notes, exports, reports
//! - `audit_trail_tests`: One audit entry per mutation

mod in_memory {
    pub mod helpers;

    mod audit_trail_tests;
    mod discovery_flow_tests;
    mod import_tests;
    mod pipeline_flow_tests;
}
