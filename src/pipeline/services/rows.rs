//! Row store: coerced writes against a spreadsheet's current columns.

use super::PipelineServiceResult;
use crate::{
    audit::domain::{AuditAction, AuditEntity, AuditEntry},
    ids::UserId,
    pipeline::{
        domain::{
            Column, CoercionMode, PipelineDomainError, Row, RowId, RowPatch, Spreadsheet,
            SpreadsheetId, coerce_row_data,
        },
        ports::{PipelineRepositoryError, RowRepository, SchemaRepository},
    },
};
use mockable::Clock;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use tracing::{debug, info};

/// Request payload for creating a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRowRequest {
    spreadsheet_id: SpreadsheetId,
    data: Value,
    position: Option<i32>,
    actor: Option<UserId>,
}

impl CreateRowRequest {
    /// Creates a request with raw, uncoerced data keyed by column name.
    #[must_use]
    pub const fn new(spreadsheet_id: SpreadsheetId, data: Value) -> Self {
        Self {
            spreadsheet_id,
            data,
            position: None,
            actor: None,
        }
    }

    /// Requests an explicit position instead of appending.
    #[must_use]
    pub const fn with_position(mut self, position: i32) -> Self {
        self.position = Some(position);
        self
    }

    /// Records the creating user.
    #[must_use]
    pub const fn with_actor(mut self, actor: UserId) -> Self {
        self.actor = Some(actor);
        self
    }
}

/// A spreadsheet with its ordered columns and rows.
#[derive(Debug, Clone, PartialEq)]
pub struct SpreadsheetDetails {
    /// The spreadsheet.
    pub spreadsheet: Spreadsheet,
    /// Columns ordered by position.
    pub columns: Vec<Column>,
    /// Rows ordered by position.
    pub rows: Vec<Row>,
}

/// Row creation, update, and deletion service.
#[derive(Clone)]
pub struct RowStoreService<R, C>
where
    R: SchemaRepository + RowRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> RowStoreService<R, C>
where
    R: SchemaRepository + RowRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new row store service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Creates a row, coercing every column's value and appending it after
    /// the current highest position unless one is given.
    ///
    /// # Errors
    ///
    /// Returns a domain error for malformed input or a missing required
    /// value, and [`PipelineRepositoryError::SpreadsheetNotFound`] (wrapped)
    /// for an unknown spreadsheet. Nothing is stored on failure.
    #[tracing::instrument(skip(self, request), fields(spreadsheet = %request.spreadsheet_id))]
    pub async fn create_row(&self, request: CreateRowRequest) -> PipelineServiceResult<Row> {
        let CreateRowRequest {
            spreadsheet_id,
            data,
            position,
            actor,
        } = request;

        let raw = object_from(data)?;
        if let Some(requested) = position
            && requested < 1
        {
            return Err(PipelineDomainError::InvalidPosition(requested).into());
        }
        self.require_spreadsheet(spreadsheet_id).await?;
        let columns = self.repository.list_columns(spreadsheet_id).await?;
        let coerced = coerce_row_data(&columns, &raw, CoercionMode::Full)?;

        let assigned = match position {
            Some(requested) => requested,
            None => self.repository.next_row_position(spreadsheet_id).await?,
        };
        let row = Row::new(spreadsheet_id, coerced, assigned, actor, &*self.clock);
        let audit = AuditEntry::record(
            AuditAction::Create,
            AuditEntity::Row,
            row.id().into_inner(),
            row.data().to_json(),
            actor,
            &*self.clock,
        );
        self.repository.insert_row(&row, &audit).await?;
        info!(row = %row.id(), position = row.position(), "row created");
        Ok(row)
    }

    /// Coerces the supplied keys and merges them into the stored row.
    /// Keys not mentioned keep their values.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineRepositoryError::RowNotFound`] (wrapped) for an
    /// unknown row, [`PipelineDomainError::EmptyUpdate`] (wrapped) for an
    /// empty patch, and other domain errors for malformed values.
    #[tracing::instrument(skip(self, data))]
    pub async fn update_row(
        &self,
        id: RowId,
        data: Value,
        actor: Option<UserId>,
    ) -> PipelineServiceResult<Row> {
        let raw = object_from(data)?;
        if raw.is_empty() {
            return Err(PipelineDomainError::EmptyUpdate.into());
        }
        let existing = self.get_row(id).await?;
        let columns = self
            .repository
            .list_columns(existing.spreadsheet_id())
            .await?;
        let coerced = coerce_row_data(&columns, &raw, CoercionMode::Partial)?;

        let patch = RowPatch {
            row_id: id,
            data: coerced,
            updated_by: actor,
            updated_at: self.clock.utc(),
        };
        let audit = AuditEntry::record(
            AuditAction::Update,
            AuditEntity::Row,
            id.into_inner(),
            patch.data.to_json(),
            actor,
            &*self.clock,
        );
        let merged = self.repository.merge_row(&patch, &audit).await?;
        debug!(row = %id, keys = patch.data.len(), "row updated");
        Ok(merged)
    }

    /// Deletes a row. Todos bound to it become pipeline-level.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineRepositoryError::RowNotFound`] (wrapped) for an
    /// unknown row.
    #[tracing::instrument(skip(self))]
    pub async fn delete_row(&self, id: RowId, actor: Option<UserId>) -> PipelineServiceResult<()> {
        let audit = AuditEntry::record(
            AuditAction::Delete,
            AuditEntity::Row,
            id.into_inner(),
            json!({ "todos": "unbound" }),
            actor,
            &*self.clock,
        );
        self.repository.delete_row(id, &audit).await?;
        info!(row = %id, "row deleted");
        Ok(())
    }

    /// Returns a row.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineRepositoryError::RowNotFound`] (wrapped) for an
    /// unknown row.
    pub async fn get_row(&self, id: RowId) -> PipelineServiceResult<Row> {
        self.repository
            .find_row(id)
            .await?
            .ok_or_else(|| PipelineRepositoryError::RowNotFound(id).into())
    }

    /// Lists a spreadsheet's rows by position.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineRepositoryError::SpreadsheetNotFound`] (wrapped)
    /// for an unknown spreadsheet.
    pub async fn list_rows(&self, id: SpreadsheetId) -> PipelineServiceResult<Vec<Row>> {
        self.require_spreadsheet(id).await?;
        Ok(self.repository.list_rows(id).await?)
    }

    /// Returns a spreadsheet with its ordered columns and rows.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineRepositoryError::SpreadsheetNotFound`] (wrapped)
    /// for an unknown spreadsheet.
    pub async fn get_spreadsheet_details(
        &self,
        id: SpreadsheetId,
    ) -> PipelineServiceResult<SpreadsheetDetails> {
        let spreadsheet = self.require_spreadsheet(id).await?;
        let columns = self.repository.list_columns(id).await?;
        let rows = self.repository.list_rows(id).await?;
        Ok(SpreadsheetDetails {
            spreadsheet,
            columns,
            rows,
        })
    }

    async fn require_spreadsheet(&self, id: SpreadsheetId) -> PipelineServiceResult<Spreadsheet> {
        self.repository
            .find_spreadsheet(id)
            .await?
            .ok_or_else(|| PipelineRepositoryError::SpreadsheetNotFound(id).into())
    }
}

fn object_from(data: Value) -> Result<Map<String, Value>, PipelineDomainError> {
    match data {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        _ => Err(PipelineDomainError::RowDataNotObject),
    }
}
