//! One-directional import of CRM opportunities into a pipeline.

use super::{
    domain::FieldMapping,
    ports::{CrmError, OpportunitySource},
};
use crate::{
    error::ErrorKind,
    ids::UserId,
    pipeline::{
        domain::SpreadsheetId,
        ports::{RowRepository, SchemaRepository},
        services::{ImportRecord, ImportReport, PipelineImportService, PipelineServiceError},
    },
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Errors returned by [`CrmImportService`].
#[derive(Debug, Error)]
pub enum CrmImportError {
    /// Reading from the CRM failed.
    #[error(transparent)]
    Source(#[from] CrmError),

    /// The pipeline rejected the batch as a whole.
    #[error(transparent)]
    Pipeline(#[from] PipelineServiceError),
}

impl CrmImportError {
    /// Returns the machine-readable error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Source(err) => err.kind(),
            Self::Pipeline(err) => err.kind(),
        }
    }
}

/// Maps CRM opportunities onto rows of a spreadsheet.
#[derive(Clone)]
pub struct CrmImportService<S, R, C>
where
    S: OpportunitySource,
    R: SchemaRepository + RowRepository,
    C: Clock + Send + Sync,
{
    source: Arc<S>,
    import: PipelineImportService<R, C>,
    mapping: FieldMapping,
}

impl<S, R, C> CrmImportService<S, R, C>
where
    S: OpportunitySource,
    R: SchemaRepository + RowRepository,
    C: Clock + Send + Sync,
{
    /// Creates an import service using the default opportunity mapping.
    #[must_use]
    pub fn new(source: Arc<S>, repository: Arc<R>, clock: Arc<C>) -> Self {
        Self {
            source,
            import: PipelineImportService::new(repository, clock),
            mapping: FieldMapping::opportunity_defaults(),
        }
    }

    /// Replaces the field mapping.
    #[must_use]
    pub fn with_mapping(mut self, mapping: FieldMapping) -> Self {
        self.mapping = mapping;
        self
    }

    /// Reads every opportunity and imports it as a row. Records the
    /// pipeline rejects are listed in the report; the rest are stored.
    ///
    /// # Errors
    ///
    /// Returns [`CrmImportError::Source`] when the CRM cannot be read and
    /// [`CrmImportError::Pipeline`] when the spreadsheet is unknown or
    /// storage is unavailable.
    #[tracing::instrument(skip(self))]
    pub async fn import_opportunities(
        &self,
        spreadsheet_id: SpreadsheetId,
        actor: Option<UserId>,
    ) -> Result<ImportReport, CrmImportError> {
        let opportunities = self.source.list_opportunities().await?;
        let records = opportunities
            .iter()
            .map(|opportunity| {
                ImportRecord::new(self.mapping.apply(opportunity))
                    .with_external_id(opportunity.id.clone())
            })
            .collect();
        let report = self
            .import
            .import_rows(spreadsheet_id, records, actor)
            .await?;
        info!(
            fetched = opportunities.len(),
            imported = report.created.len(),
            rejected = report.failures.len(),
            "CRM opportunities imported"
        );
        Ok(report)
    }
}
