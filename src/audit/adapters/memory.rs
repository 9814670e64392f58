//! In-memory audit log shared by the in-memory stores.

use crate::audit::{
    domain::{AuditEntity, AuditEntry},
    ports::{AuditTrail, AuditTrailError, AuditTrailResult},
};
use async_trait::async_trait;
use std::sync::{Arc, PoisonError, RwLock};
use uuid::Uuid;

/// Thread-safe append-only audit log.
///
/// Cloning shares the underlying log, so one instance can be handed to every
/// in-memory store that must record entries.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAuditLog {
    entries: Arc<RwLock<Vec<AuditEntry>>>,
}

impl InMemoryAuditLog {
    /// Creates an empty audit log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry.
    ///
    /// Stores call this while still holding their own state lock so the
    /// mutation and its entry become visible together.
    pub(crate) fn append(&self, entry: &AuditEntry) -> Result<(), std::io::Error> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        entries.push(entry.clone());
        Ok(())
    }

    /// Returns the number of recorded entries.
    ///
    /// # Errors
    ///
    /// Returns [`AuditTrailError::Persistence`] when the lock is poisoned.
    pub fn len(&self) -> AuditTrailResult<usize> {
        let entries = self
            .entries
            .read()
            .map_err(|err| AuditTrailError::persistence(poisoned(err)))?;
        Ok(entries.len())
    }

    /// Returns `true` when no entries have been recorded.
    ///
    /// # Errors
    ///
    /// Returns [`AuditTrailError::Persistence`] when the lock is poisoned.
    pub fn is_empty(&self) -> AuditTrailResult<bool> {
        Ok(self.len()? == 0)
    }
}

fn poisoned<T>(err: PoisonError<T>) -> std::io::Error {
    std::io::Error::other(err.to_string())
}

#[async_trait]
impl AuditTrail for InMemoryAuditLog {
    async fn entries_for(
        &self,
        entity: AuditEntity,
        entity_id: Uuid,
    ) -> AuditTrailResult<Vec<AuditEntry>> {
        let entries = self
            .entries
            .read()
            .map_err(|err| AuditTrailError::persistence(poisoned(err)))?;
        Ok(entries
            .iter()
            .filter(|entry| entry.entity() == entity && entry.entity_id() == entity_id)
            .cloned()
            .collect())
    }

    async fn recent(&self, limit: usize) -> AuditTrailResult<Vec<AuditEntry>> {
        let entries = self
            .entries
            .read()
            .map_err(|err| AuditTrailError::persistence(poisoned(err)))?;
        Ok(entries.iter().rev().take(limit).cloned().collect())
    }
}
