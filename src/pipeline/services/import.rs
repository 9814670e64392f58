//! Batch row import with per-record failure reporting.

use super::{CreateRowRequest, PipelineServiceResult, RowStoreService};
use crate::{
    error::ErrorKind,
    ids::UserId,
    pipeline::{
        domain::{Row, SpreadsheetId},
        ports::{PipelineRepositoryError, RowRepository, SchemaRepository},
    },
};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

/// One record of an import batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRecord {
    /// Identifier of the record in the source system.
    pub external_id: Option<String>,
    /// Raw attribute map keyed by column name.
    pub data: Value,
}

impl ImportRecord {
    /// Creates a record without a source identifier.
    #[must_use]
    pub const fn new(data: Value) -> Self {
        Self {
            external_id: None,
            data,
        }
    }

    /// Sets the source identifier.
    #[must_use]
    pub fn with_external_id(mut self, id: impl Into<String>) -> Self {
        self.external_id = Some(id.into());
        self
    }
}

/// A record that could not be imported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportFailure {
    /// Zero-based index of the record within the batch.
    pub index: usize,
    /// Source identifier, if the record had one.
    pub external_id: Option<String>,
    /// Human-readable reason.
    pub reason: String,
    /// Machine-readable error kind.
    pub kind: ErrorKind,
}

/// Outcome of an import batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportReport {
    /// Rows created, in batch order.
    pub created: Vec<Row>,
    /// Records that failed, in batch order.
    pub failures: Vec<ImportFailure>,
}

impl ImportReport {
    /// Returns the number of records processed.
    #[must_use]
    pub const fn processed(&self) -> usize {
        self.created.len().saturating_add(self.failures.len())
    }

    /// Returns `true` when every record was imported.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Imports batches of records as rows.
#[derive(Clone)]
pub struct PipelineImportService<R, C>
where
    R: SchemaRepository + RowRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    rows: RowStoreService<R, C>,
}

impl<R, C> PipelineImportService<R, C>
where
    R: SchemaRepository + RowRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new import service.
    #[must_use]
    pub fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self {
            rows: RowStoreService::new(Arc::clone(&repository), clock),
            repository,
        }
    }

    /// Creates one row per record. A failing record is reported and the
    /// batch continues; rows already created stay stored.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown spreadsheet. An
    /// `unavailable` failure aborts the batch and is returned as an error.
    #[tracing::instrument(skip(self, records), fields(records = records.len()))]
    pub async fn import_rows(
        &self,
        spreadsheet_id: SpreadsheetId,
        records: Vec<ImportRecord>,
        actor: Option<UserId>,
    ) -> PipelineServiceResult<ImportReport> {
        if self.repository.find_spreadsheet(spreadsheet_id).await?.is_none() {
            return Err(PipelineRepositoryError::SpreadsheetNotFound(spreadsheet_id).into());
        }

        let mut report = ImportReport::default();
        for (index, record) in records.into_iter().enumerate() {
            let ImportRecord { external_id, data } = record;
            let mut request = CreateRowRequest::new(spreadsheet_id, data);
            if let Some(user) = actor {
                request = request.with_actor(user);
            }
            match self.rows.create_row(request).await {
                Ok(row) => report.created.push(row),
                Err(err) if err.kind() == ErrorKind::Unavailable => return Err(err),
                Err(err) => {
                    warn!(index, external_id = ?external_id, error = %err, "import record rejected");
                    report.failures.push(ImportFailure {
                        index,
                        external_id,
                        reason: err.to_string(),
                        kind: err.kind(),
                    });
                }
            }
        }

        info!(
            created = report.created.len(),
            failed = report.failures.len(),
            "import finished"
        );
        Ok(report)
    }
}
