//! Contrivance: sales-engineering pipeline and discovery core.
//!
//! This crate holds the business rules behind account pipelines, the todos
//! that roll up into each row's technical win status, and the discovery
//! questionnaire with its exports and reports. Presentation, authentication,
//! and the CRM and chat services it talks to live elsewhere.
//!
//! # Architecture
//!
//! Each bounded context follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (in-memory, `PostgreSQL`, HTTP)
//! - **Services**: Orchestration that validates input and records audit entries
//!
//! # Modules
//!
//! - [`pipeline`]: Spreadsheets, typed columns, rows, todos, and status roll-up
//! - [`discovery`]: Questionnaire sessions, responses, notes, and exports
//! - [`reporting`]: Category trees, vendor flow graphs, and session summaries
//! - [`audit`]: Append-only record of every mutation
//! - [`crm`]: Read-only CRM ports and the opportunity import
//! - [`assist`]: Chat-completion port and discovery insights
//! - [`config`], [`telemetry`], [`db`]: Environment configuration, logging,
//!   and database plumbing

pub mod assist;
pub mod audit;
pub mod config;
pub mod crm;
pub mod db;
pub mod discovery;
pub mod error;
pub mod ids;
pub mod pipeline;
pub mod reporting;
pub mod telemetry;
