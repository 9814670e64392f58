//! Reporting services.

mod error;
mod reports;

pub use error::{ReportingError, ReportingResult};
pub use reports::ReportingService;
