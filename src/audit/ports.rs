//! Read port over the audit trail.

use super::domain::{AuditEntity, AuditEntry};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Result type for audit trail queries.
pub type AuditTrailResult<T> = Result<T, AuditTrailError>;

/// Read access to recorded audit entries.
///
/// Writes never go through this port: each mutating store appends its own
/// entry alongside the mutation.
#[async_trait]
pub trait AuditTrail: Send + Sync {
    /// Returns entries for one entity in recording order.
    async fn entries_for(
        &self,
        entity: AuditEntity,
        entity_id: Uuid,
    ) -> AuditTrailResult<Vec<AuditEntry>>;

    /// Returns the most recent entries, newest first.
    async fn recent(&self, limit: usize) -> AuditTrailResult<Vec<AuditEntry>>;
}

/// Errors returned by audit trail implementations.
#[derive(Debug, Clone, Error)]
pub enum AuditTrailError {
    /// Persisted data could not be reconstructed into domain types.
    #[error("invalid persisted data: {0}")]
    InvalidPersistedData(Arc<dyn std::error::Error + Send + Sync>),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl AuditTrailError {
    /// Wraps a data-quality or deserialization error from persisted rows.
    pub fn invalid_persisted_data(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::InvalidPersistedData(Arc::new(err))
    }

    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }

    /// Returns the machine-readable error kind.
    #[must_use]
    pub const fn kind(&self) -> crate::error::ErrorKind {
        match self {
            Self::InvalidPersistedData(_) => crate::error::ErrorKind::Internal,
            Self::Persistence(_) => crate::error::ErrorKind::Unavailable,
        }
    }
}
