//! Derives a row's technical win status from its todos and writes it back.

use super::{PipelineServiceResult, RowStoreService};
use crate::{
    ids::UserId,
    pipeline::{
        domain::{RowCompletion, RowId},
        ports::{RowRepository, SchemaRepository, TodoRepository},
    },
};
use mockable::Clock;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

/// Row attributes that receive the derived status label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusFields {
    /// Primary attribute name.
    pub primary: String,
    /// Display attribute kept in sync with the primary one.
    pub display: String,
}

impl Default for StatusFields {
    fn default() -> Self {
        Self {
            primary: "Technical Win Status".to_owned(),
            display: "TW Status".to_owned(),
        }
    }
}

/// Recomputes row status after todo changes.
#[derive(Clone)]
pub struct StatusDerivationEngine<R, C>
where
    R: SchemaRepository + RowRepository + TodoRepository,
    C: Clock + Send + Sync,
{
    rows: RowStoreService<R, C>,
    repository: Arc<R>,
    fields: StatusFields,
}

impl<R, C> StatusDerivationEngine<R, C>
where
    R: SchemaRepository + RowRepository + TodoRepository,
    C: Clock + Send + Sync,
{
    /// Creates an engine writing to the given attributes.
    #[must_use]
    pub fn new(repository: Arc<R>, clock: Arc<C>, fields: StatusFields) -> Self {
        Self {
            rows: RowStoreService::new(Arc::clone(&repository), clock),
            repository,
            fields,
        }
    }

    /// Returns the attributes the engine writes.
    #[must_use]
    pub const fn fields(&self) -> &StatusFields {
        &self.fields
    }

    /// Counts the row's todos, derives the status, and stores its label in
    /// both status attributes through the row store.
    ///
    /// # Errors
    ///
    /// Returns repository errors, including a missing row.
    #[tracing::instrument(skip(self))]
    pub async fn recompute_row_status(
        &self,
        row_id: RowId,
        actor: Option<UserId>,
    ) -> PipelineServiceResult<RowCompletion> {
        let todos = self.repository.list_row_todos(row_id).await?;
        let completion = RowCompletion::from_todos(&todos);
        let label = Value::String(completion.status().label().to_owned());

        let mut patch = Map::new();
        patch.insert(self.fields.primary.clone(), label.clone());
        patch.insert(self.fields.display.clone(), label);
        self.rows
            .update_row(row_id, Value::Object(patch), actor)
            .await?;

        debug!(
            row = %row_id,
            total = completion.total(),
            completed = completion.completed(),
            percentage = completion.percentage(),
            status = completion.status().label(),
            "row status recomputed"
        );
        Ok(completion)
    }
}
