//! Read-only ports onto the external CRM.

use super::domain::{CrmAccount, CrmOpportunity};
use crate::error::ErrorKind;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for CRM port operations.
pub type CrmResult<T> = Result<T, CrmError>;

/// Lists accounts known to the CRM.
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    /// Lists every visible account.
    async fn list_accounts(&self) -> CrmResult<Vec<CrmAccount>>;

    /// Finds an account by identifier.
    async fn find_account(&self, id: &str) -> CrmResult<Option<CrmAccount>>;
}

/// Lists opportunities held by the CRM.
#[async_trait]
pub trait OpportunitySource: Send + Sync {
    /// Lists every visible opportunity.
    async fn list_opportunities(&self) -> CrmResult<Vec<CrmOpportunity>>;
}

/// Errors returned by CRM adapters.
#[derive(Debug, Clone, Error)]
pub enum CrmError {
    /// No CRM connection has been configured for the caller.
    #[error("no CRM connection is configured")]
    NotConnected,

    /// The CRM could not be reached or answered with an error.
    #[error("CRM unavailable: {0}")]
    Unavailable(Arc<dyn std::error::Error + Send + Sync>),
}

impl CrmError {
    /// Wraps a transport or upstream failure.
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unavailable(Arc::new(err))
    }

    /// Returns the machine-readable error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotConnected => ErrorKind::Validation,
            Self::Unavailable(_) => ErrorKind::Unavailable,
        }
    }
}
