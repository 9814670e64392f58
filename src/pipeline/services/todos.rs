//! Todo ledger: todos on spreadsheets and rows, with row status upkeep.

use super::{PipelineServiceError, PipelineServiceResult, StatusDerivationEngine, StatusFields};
use crate::{
    audit::domain::{AuditAction, AuditEntity, AuditEntry},
    ids::UserId,
    pipeline::{
        domain::{
            PipelineDomainError, RowCompletion, RowId, SpreadsheetId, Todo, TodoChanges,
            TodoDetails, TodoId, TodoPriority, TodoStats, TodoTitle,
        },
        ports::{PipelineRepositoryError, RowRepository, SchemaRepository, TodoRepository},
    },
};
use chrono::NaiveDate;
use mockable::Clock;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

/// Request payload for creating a todo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTodoRequest {
    spreadsheet_id: SpreadsheetId,
    row_id: Option<RowId>,
    title: String,
    description: Option<String>,
    priority: Option<String>,
    due_date: Option<NaiveDate>,
    supporting_artifact: Option<String>,
    assigned_to: Option<UserId>,
    actor: Option<UserId>,
}

impl CreateTodoRequest {
    /// Creates a pipeline-level todo request.
    #[must_use]
    pub fn new(spreadsheet_id: SpreadsheetId, title: impl Into<String>) -> Self {
        Self {
            spreadsheet_id,
            row_id: None,
            title: title.into(),
            description: None,
            priority: None,
            due_date: None,
            supporting_artifact: None,
            assigned_to: None,
            actor: None,
        }
    }

    /// Binds the todo to a row of the same spreadsheet.
    #[must_use]
    pub const fn for_row(mut self, row_id: RowId) -> Self {
        self.row_id = Some(row_id);
        self
    }

    /// Adds a description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the priority from its wire form (`low`, `medium`, `high`).
    #[must_use]
    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    /// Sets a due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Links a supporting artifact.
    #[must_use]
    pub fn with_supporting_artifact(mut self, artifact: impl Into<String>) -> Self {
        self.supporting_artifact = Some(artifact.into());
        self
    }

    /// Assigns the todo.
    #[must_use]
    pub const fn assigned_to(mut self, user: UserId) -> Self {
        self.assigned_to = Some(user);
        self
    }

    /// Records the creating user.
    #[must_use]
    pub const fn with_actor(mut self, actor: UserId) -> Self {
        self.actor = Some(actor);
        self
    }
}

/// A todo after a mutation, with the recomputed status of its row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoOutcome {
    /// The stored todo.
    pub todo: Todo,
    /// Recomputed completion of the bound row; `None` for pipeline-level
    /// todos.
    pub row_completion: Option<RowCompletion>,
}

/// Todo ledger service.
///
/// Every mutation of a row-bound todo is followed by a status recomputation
/// for that row. The todo write and the row write are separate operations;
/// a failed recomputation is reported while the todo change stays stored.
#[derive(Clone)]
pub struct TodoLedgerService<R, C>
where
    R: SchemaRepository + RowRepository + TodoRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
    status: StatusDerivationEngine<R, C>,
}

impl<R, C> TodoLedgerService<R, C>
where
    R: SchemaRepository + RowRepository + TodoRepository,
    C: Clock + Send + Sync,
{
    /// Creates a ledger writing status to the given row attributes.
    #[must_use]
    pub fn new(repository: Arc<R>, clock: Arc<C>, fields: StatusFields) -> Self {
        let status = StatusDerivationEngine::new(Arc::clone(&repository), Arc::clone(&clock), fields);
        Self {
            repository,
            clock,
            status,
        }
    }

    /// Creates a todo, optionally bound to a row.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank title, an unknown priority, or
    /// a row of another spreadsheet, and not-found errors for an unknown
    /// spreadsheet or row.
    #[tracing::instrument(skip(self, request), fields(spreadsheet = %request.spreadsheet_id))]
    pub async fn create_todo(&self, request: CreateTodoRequest) -> PipelineServiceResult<TodoOutcome> {
        let CreateTodoRequest {
            spreadsheet_id,
            row_id,
            title,
            description,
            priority,
            due_date,
            supporting_artifact,
            assigned_to,
            actor,
        } = request;

        let validated_title = TodoTitle::new(title)?;
        let parsed_priority = match priority {
            Some(raw) => TodoPriority::try_from(raw.as_str()).map_err(PipelineDomainError::from)?,
            None => TodoPriority::default(),
        };
        self.require_spreadsheet(spreadsheet_id).await?;
        if let Some(row) = row_id {
            self.require_row_in(row, spreadsheet_id).await?;
        }

        let details = TodoDetails {
            description: description.filter(|text| !text.trim().is_empty()),
            priority: parsed_priority,
            due_date,
            supporting_artifact,
            assigned_to,
        };
        let todo = Todo::new(
            spreadsheet_id,
            row_id,
            validated_title,
            details,
            actor,
            &*self.clock,
        );
        let audit = self.audit(AuditAction::Create, &todo, actor);
        self.repository.insert_todo(&todo, &audit).await?;
        info!(todo = %todo.id(), row = ?todo.row_id(), "todo created");
        self.with_completion(todo, actor).await
    }

    /// Returns a todo.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineRepositoryError::TodoNotFound`] (wrapped) for an
    /// unknown todo.
    pub async fn get_todo(&self, id: TodoId) -> PipelineServiceResult<Todo> {
        self.repository
            .find_todo(id)
            .await?
            .ok_or_else(|| PipelineRepositoryError::TodoNotFound(id).into())
    }

    /// Lists the pipeline-level (unbound) todos of a spreadsheet, newest
    /// first.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown spreadsheet.
    pub async fn list_by_spreadsheet(&self, id: SpreadsheetId) -> PipelineServiceResult<Vec<Todo>> {
        self.require_spreadsheet(id).await?;
        Ok(self.repository.list_pipeline_todos(id).await?)
    }

    /// Lists every todo of a spreadsheet, bound or not, newest first.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown spreadsheet.
    pub async fn list_all(&self, id: SpreadsheetId) -> PipelineServiceResult<Vec<Todo>> {
        self.require_spreadsheet(id).await?;
        Ok(self.repository.list_spreadsheet_todos(id).await?)
    }

    /// Lists the todos bound to a row, newest first.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown row.
    pub async fn list_by_row(&self, id: RowId) -> PipelineServiceResult<Vec<Todo>> {
        if self.repository.find_row(id).await?.is_none() {
            return Err(PipelineRepositoryError::RowNotFound(id).into());
        }
        Ok(self.repository.list_row_todos(id).await?)
    }

    /// Applies field-level changes to a todo.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineDomainError::EmptyUpdate`] (wrapped) when nothing
    /// would change, and a not-found error for an unknown todo.
    #[tracing::instrument(skip(self, changes))]
    pub async fn update_todo(
        &self,
        id: TodoId,
        changes: TodoChanges,
        actor: Option<UserId>,
    ) -> PipelineServiceResult<TodoOutcome> {
        if changes.is_empty() {
            return Err(PipelineDomainError::EmptyUpdate.into());
        }
        let mut todo = self.get_todo(id).await?;
        todo.apply(changes, &*self.clock);
        self.store_update(todo, actor).await
    }

    /// Flips a todo's completion flag.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown todo.
    #[tracing::instrument(skip(self))]
    pub async fn toggle_todo(
        &self,
        id: TodoId,
        actor: Option<UserId>,
    ) -> PipelineServiceResult<TodoOutcome> {
        let mut todo = self.get_todo(id).await?;
        todo.toggle(&*self.clock);
        self.store_update(todo, actor).await
    }

    /// Marks a todo as done.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown todo.
    pub async fn complete_todo(
        &self,
        id: TodoId,
        actor: Option<UserId>,
    ) -> PipelineServiceResult<TodoOutcome> {
        self.set_completed(id, true, actor).await
    }

    /// Reopens a todo.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown todo.
    pub async fn uncomplete_todo(
        &self,
        id: TodoId,
        actor: Option<UserId>,
    ) -> PipelineServiceResult<TodoOutcome> {
        self.set_completed(id, false, actor).await
    }

    /// Deletes a todo and recomputes the status of the row it was bound to.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown todo.
    #[tracing::instrument(skip(self))]
    pub async fn delete_todo(
        &self,
        id: TodoId,
        actor: Option<UserId>,
    ) -> PipelineServiceResult<Option<RowCompletion>> {
        let todo = self.get_todo(id).await?;
        let audit = AuditEntry::record(
            AuditAction::Delete,
            AuditEntity::Todo,
            id.into_inner(),
            json!({ "title": todo.title().as_str() }),
            actor,
            &*self.clock,
        );
        self.repository.delete_todo(id, &audit).await?;
        info!(todo = %id, "todo deleted");
        match todo.row_id() {
            Some(row) => Ok(Some(self.status.recompute_row_status(row, actor).await?)),
            None => Ok(None),
        }
    }

    /// Counts a spreadsheet's todos by completion and priority.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown spreadsheet.
    pub async fn stats(&self, id: SpreadsheetId) -> PipelineServiceResult<TodoStats> {
        let todos = self.list_all(id).await?;
        Ok(TodoStats::from_todos(&todos))
    }

    /// Recomputes a row's status without changing any todo.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown row.
    pub async fn recompute_row_status(
        &self,
        row_id: RowId,
        actor: Option<UserId>,
    ) -> PipelineServiceResult<RowCompletion> {
        self.status.recompute_row_status(row_id, actor).await
    }

    async fn set_completed(
        &self,
        id: TodoId,
        completed: bool,
        actor: Option<UserId>,
    ) -> PipelineServiceResult<TodoOutcome> {
        let mut todo = self.get_todo(id).await?;
        todo.set_completed(completed, &*self.clock);
        self.store_update(todo, actor).await
    }

    async fn store_update(
        &self,
        todo: Todo,
        actor: Option<UserId>,
    ) -> PipelineServiceResult<TodoOutcome> {
        let audit = self.audit(AuditAction::Update, &todo, actor);
        self.repository.update_todo(&todo, &audit).await?;
        info!(todo = %todo.id(), completed = todo.is_completed(), "todo updated");
        self.with_completion(todo, actor).await
    }

    async fn with_completion(
        &self,
        todo: Todo,
        actor: Option<UserId>,
    ) -> PipelineServiceResult<TodoOutcome> {
        let row_completion = match todo.row_id() {
            Some(row) => Some(self.status.recompute_row_status(row, actor).await?),
            None => None,
        };
        Ok(TodoOutcome {
            todo,
            row_completion,
        })
    }

    async fn require_spreadsheet(&self, id: SpreadsheetId) -> PipelineServiceResult<()> {
        if self.repository.find_spreadsheet(id).await?.is_none() {
            return Err(PipelineRepositoryError::SpreadsheetNotFound(id).into());
        }
        Ok(())
    }

    async fn require_row_in(&self, row: RowId, expected: SpreadsheetId) -> PipelineServiceResult<()> {
        let found = self
            .repository
            .find_row(row)
            .await?
            .ok_or(PipelineRepositoryError::RowNotFound(row))?;
        let actual = found.spreadsheet_id();
        if actual != expected {
            return Err(PipelineServiceError::RowOutsideSpreadsheet {
                row,
                expected,
                actual,
            });
        }
        Ok(())
    }

    fn audit(&self, action: AuditAction, todo: &Todo, actor: Option<UserId>) -> AuditEntry {
        AuditEntry::record(
            action,
            AuditEntity::Todo,
            todo.id().into_inner(),
            json!({
                "title": todo.title().as_str(),
                "row_id": todo.row_id(),
                "priority": todo.priority().as_str(),
                "completed": todo.is_completed(),
            }),
            actor,
            &*self.clock,
        )
    }
}
