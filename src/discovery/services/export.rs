//! Session exports and the export trail.

use super::{DiscoveryServiceError, DiscoveryServiceResult};
use crate::{
    audit::domain::{AuditAction, AuditEntity, AuditEntry},
    discovery::{
        domain::{DiscoveryDomainError, ExportFormat, ExportRecord, SessionDetails, SessionId},
        ports::{DiscoveryRepository, DiscoveryRepositoryError, ExportRepository},
    },
    ids::UserId,
};
use mockable::Clock;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

/// A rendered export ready to hand to a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPayload {
    /// Rendered format.
    pub format: ExportFormat,
    /// MIME type of `bytes`.
    pub content_type: &'static str,
    /// Suggested download file name.
    pub file_name: String,
    /// Rendered document.
    pub bytes: Vec<u8>,
    /// Trail record written for this export.
    pub record: ExportRecord,
}

/// Exports sessions as JSON or CSV and keeps the export trail.
#[derive(Clone)]
pub struct DiscoveryExportService<R, C>
where
    R: DiscoveryRepository + ExportRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> DiscoveryExportService<R, C>
where
    R: DiscoveryRepository + ExportRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new export service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Renders a session in the requested format. Every attempt, failed or
    /// not, is written to the export trail.
    ///
    /// # Errors
    ///
    /// Returns a domain error for an unsupported format and
    /// [`DiscoveryRepositoryError::SessionNotFound`] (wrapped) for an
    /// unknown session. When the trail itself cannot be written, that
    /// storage error is returned instead.
    #[tracing::instrument(skip(self))]
    pub async fn export_session(
        &self,
        session_id: SessionId,
        format: &str,
        actor: Option<UserId>,
    ) -> DiscoveryServiceResult<ExportPayload> {
        match self.render(session_id, format).await {
            Ok((parsed, details, bytes)) => {
                let record =
                    ExportRecord::succeeded(session_id, actor, parsed, &bytes, &*self.clock);
                self.append(&record).await?;
                info!(
                    session = %session_id,
                    format = parsed.as_str(),
                    bytes = bytes.len(),
                    "session exported"
                );
                Ok(ExportPayload {
                    format: parsed,
                    content_type: parsed.content_type(),
                    file_name: parsed.file_name(&details),
                    bytes,
                    record,
                })
            }
            Err(err) => {
                let record = ExportRecord::failed(session_id, actor, format, &err, &*self.clock);
                self.append(&record).await?;
                warn!(session = %session_id, format, error = %err, "session export failed");
                Err(err)
            }
        }
    }

    /// Lists a session's export attempts, newest first.
    ///
    /// # Errors
    ///
    /// Returns repository errors.
    pub async fn list_exports(
        &self,
        session_id: SessionId,
    ) -> DiscoveryServiceResult<Vec<ExportRecord>> {
        Ok(self.repository.list_exports(session_id).await?)
    }

    async fn render(
        &self,
        session_id: SessionId,
        format: &str,
    ) -> DiscoveryServiceResult<(ExportFormat, SessionDetails, Vec<u8>)> {
        let parsed = ExportFormat::try_from(format).map_err(DiscoveryDomainError::from)?;
        let session = self
            .repository
            .find_session(session_id)
            .await?
            .ok_or(DiscoveryRepositoryError::SessionNotFound(session_id))?;
        let responses = self.repository.list_responses(session_id).await?;
        let notes = self.repository.list_notes(session_id).await?;
        let details = SessionDetails::new(session, responses, notes);
        let bytes = parsed
            .render(&details)
            .map_err(DiscoveryServiceError::Render)?;
        Ok((parsed, details, bytes))
    }

    async fn append(&self, record: &ExportRecord) -> DiscoveryServiceResult<()> {
        let audit = AuditEntry::record(
            AuditAction::Export,
            AuditEntity::DiscoverySession,
            record.session_id().into_inner(),
            json!({
                "export_id": record.id(),
                "format": record.format(),
                "status": record.status().as_str(),
                "digest": record.digest(),
                "error": record.error_message(),
            }),
            record.requested_by(),
            &*self.clock,
        );
        self.repository.insert_export(record, &audit).await?;
        Ok(())
    }
}
