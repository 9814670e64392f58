//! In-memory pipeline store for tests and embedded use.

use async_trait::async_trait;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{
    audit::{adapters::memory::InMemoryAuditLog, domain::AuditEntry},
    ids::UserId,
    pipeline::{
        domain::{Column, ColumnId, Row, RowId, RowPatch, Spreadsheet, SpreadsheetId, Todo, TodoId},
        ports::{
            PipelineRepositoryError, PipelineRepositoryResult, RowRepository, SchemaRepository,
            TodoRepository,
        },
    },
};

/// Thread-safe in-memory implementation of every pipeline port.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPipelineStore {
    state: Arc<RwLock<PipelineState>>,
    audit: InMemoryAuditLog,
}

#[derive(Debug, Default)]
struct PipelineState {
    spreadsheets: HashMap<SpreadsheetId, Spreadsheet>,
    // Insertion order is the tie-breaker for equal positions.
    columns: Vec<Column>,
    rows: HashMap<RowId, Row>,
    todos: Vec<Todo>,
}

impl PipelineState {
    fn require_spreadsheet(&self, id: SpreadsheetId) -> PipelineRepositoryResult<()> {
        if self.spreadsheets.contains_key(&id) {
            Ok(())
        } else {
            Err(PipelineRepositoryError::SpreadsheetNotFound(id))
        }
    }

    fn todo_mut(&mut self, id: TodoId) -> PipelineRepositoryResult<&mut Todo> {
        self.todos
            .iter_mut()
            .find(|todo| todo.id() == id)
            .ok_or(PipelineRepositoryError::TodoNotFound(id))
    }

    fn todos_newest_first(&self, filter: impl Fn(&Todo) -> bool) -> Vec<Todo> {
        let mut todos: Vec<Todo> = self
            .todos
            .iter()
            .rev()
            .filter(|todo| filter(todo))
            .cloned()
            .collect();
        todos.sort_by_key(|todo| Reverse(todo.created_at()));
        todos
    }
}

impl InMemoryPipelineStore {
    /// Creates an empty store with its own audit log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store that records into a shared audit log.
    #[must_use]
    pub fn with_audit_log(audit: InMemoryAuditLog) -> Self {
        Self {
            state: Arc::default(),
            audit,
        }
    }

    /// Returns the audit log this store records into.
    #[must_use]
    pub const fn audit_log(&self) -> &InMemoryAuditLog {
        &self.audit
    }

    fn read(&self) -> PipelineRepositoryResult<RwLockReadGuard<'_, PipelineState>> {
        self.state.read().map_err(poisoned)
    }

    fn write(&self) -> PipelineRepositoryResult<RwLockWriteGuard<'_, PipelineState>> {
        self.state.write().map_err(poisoned)
    }

    fn record(&self, entry: &AuditEntry) -> PipelineRepositoryResult<()> {
        self.audit
            .append(entry)
            .map_err(PipelineRepositoryError::persistence)
    }
}

/// Rejects `column` when a sibling already holds its name or position.
fn column_clash<'a>(
    siblings: impl IntoIterator<Item = &'a Column>,
    column: &Column,
) -> PipelineRepositoryResult<()> {
    for existing in siblings {
        if existing.name() == column.name() {
            return Err(PipelineRepositoryError::DuplicateColumnName {
                spreadsheet: column.spreadsheet_id(),
                name: column.name().clone(),
            });
        }
        if existing.position() == column.position() {
            return Err(PipelineRepositoryError::DuplicateColumnPosition {
                spreadsheet: column.spreadsheet_id(),
                position: column.position(),
            });
        }
    }
    Ok(())
}

fn poisoned<T>(err: PoisonError<T>) -> PipelineRepositoryError {
    PipelineRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl SchemaRepository for InMemoryPipelineStore {
    async fn insert_spreadsheet(
        &self,
        spreadsheet: &Spreadsheet,
        audit: &AuditEntry,
        columns: &[(Column, AuditEntry)],
    ) -> PipelineRepositoryResult<()> {
        let mut state = self.write()?;
        for (index, (column, _)) in columns.iter().enumerate() {
            let earlier = columns.iter().take(index).map(|(existing, _)| existing);
            column_clash(earlier, column)?;
        }
        state
            .spreadsheets
            .insert(spreadsheet.id(), spreadsheet.clone());
        state
            .columns
            .extend(columns.iter().map(|(column, _)| column.clone()));
        self.record(audit)?;
        columns
            .iter()
            .try_for_each(|(_, entry)| self.record(entry))
    }

    async fn update_spreadsheet(
        &self,
        spreadsheet: &Spreadsheet,
        audit: &AuditEntry,
    ) -> PipelineRepositoryResult<()> {
        let mut state = self.write()?;
        state.require_spreadsheet(spreadsheet.id())?;
        state
            .spreadsheets
            .insert(spreadsheet.id(), spreadsheet.clone());
        self.record(audit)
    }

    async fn delete_spreadsheet(
        &self,
        id: SpreadsheetId,
        audit: &AuditEntry,
    ) -> PipelineRepositoryResult<()> {
        let mut state = self.write()?;
        if state.spreadsheets.remove(&id).is_none() {
            return Err(PipelineRepositoryError::SpreadsheetNotFound(id));
        }
        state.columns.retain(|column| column.spreadsheet_id() != id);
        state.rows.retain(|_, row| row.spreadsheet_id() != id);
        state.todos.retain(|todo| todo.spreadsheet_id() != id);
        self.record(audit)
    }

    async fn find_spreadsheet(
        &self,
        id: SpreadsheetId,
    ) -> PipelineRepositoryResult<Option<Spreadsheet>> {
        Ok(self.read()?.spreadsheets.get(&id).cloned())
    }

    async fn list_spreadsheets_visible_to(
        &self,
        user: UserId,
    ) -> PipelineRepositoryResult<Vec<Spreadsheet>> {
        let state = self.read()?;
        let mut visible: Vec<Spreadsheet> = state
            .spreadsheets
            .values()
            .filter(|sheet| sheet.is_visible_to(user))
            .cloned()
            .collect();
        visible.sort_by_key(|sheet| Reverse(sheet.updated_at()));
        Ok(visible)
    }

    async fn next_column_position(&self, id: SpreadsheetId) -> PipelineRepositoryResult<i32> {
        let state = self.read()?;
        let max = state
            .columns
            .iter()
            .filter(|column| column.spreadsheet_id() == id)
            .map(Column::position)
            .max()
            .unwrap_or(0);
        Ok(max.saturating_add(1))
    }

    async fn insert_column(
        &self,
        column: &Column,
        audit: &AuditEntry,
    ) -> PipelineRepositoryResult<()> {
        let mut state = self.write()?;
        let sheet = column.spreadsheet_id();
        state.require_spreadsheet(sheet)?;
        column_clash(
            state
                .columns
                .iter()
                .filter(|existing| existing.spreadsheet_id() == sheet),
            column,
        )?;
        state.columns.push(column.clone());
        self.record(audit)
    }

    async fn update_column(
        &self,
        column: &Column,
        audit: &AuditEntry,
    ) -> PipelineRepositoryResult<()> {
        let mut state = self.write()?;
        let clash = state.columns.iter().any(|existing| {
            existing.spreadsheet_id() == column.spreadsheet_id()
                && existing.id() != column.id()
                && existing.name() == column.name()
        });
        if clash {
            return Err(PipelineRepositoryError::DuplicateColumnName {
                spreadsheet: column.spreadsheet_id(),
                name: column.name().clone(),
            });
        }
        let slot = state
            .columns
            .iter_mut()
            .find(|existing| existing.id() == column.id())
            .ok_or(PipelineRepositoryError::ColumnNotFound(column.id()))?;
        *slot = column.clone();
        self.record(audit)
    }

    async fn delete_column(&self, id: ColumnId, audit: &AuditEntry) -> PipelineRepositoryResult<()> {
        let mut state = self.write()?;
        let before = state.columns.len();
        state.columns.retain(|column| column.id() != id);
        if state.columns.len() == before {
            return Err(PipelineRepositoryError::ColumnNotFound(id));
        }
        self.record(audit)
    }

    async fn find_column(&self, id: ColumnId) -> PipelineRepositoryResult<Option<Column>> {
        let state = self.read()?;
        Ok(state.columns.iter().find(|column| column.id() == id).cloned())
    }

    async fn list_columns(&self, id: SpreadsheetId) -> PipelineRepositoryResult<Vec<Column>> {
        let state = self.read()?;
        let mut columns: Vec<Column> = state
            .columns
            .iter()
            .filter(|column| column.spreadsheet_id() == id)
            .cloned()
            .collect();
        columns.sort_by_key(Column::position);
        Ok(columns)
    }
}

#[async_trait]
impl RowRepository for InMemoryPipelineStore {
    async fn next_row_position(&self, id: SpreadsheetId) -> PipelineRepositoryResult<i32> {
        let state = self.read()?;
        let max = state
            .rows
            .values()
            .filter(|row| row.spreadsheet_id() == id)
            .map(Row::position)
            .max()
            .unwrap_or(0);
        Ok(max.saturating_add(1))
    }

    async fn insert_row(&self, row: &Row, audit: &AuditEntry) -> PipelineRepositoryResult<()> {
        let mut state = self.write()?;
        state.require_spreadsheet(row.spreadsheet_id())?;
        state.rows.insert(row.id(), row.clone());
        self.record(audit)
    }

    async fn merge_row(
        &self,
        patch: &RowPatch,
        audit: &AuditEntry,
    ) -> PipelineRepositoryResult<Row> {
        let mut state = self.write()?;
        let row = state
            .rows
            .get_mut(&patch.row_id)
            .ok_or(PipelineRepositoryError::RowNotFound(patch.row_id))?;
        row.apply(patch);
        let merged = row.clone();
        self.record(audit)?;
        Ok(merged)
    }

    async fn delete_row(&self, id: RowId, audit: &AuditEntry) -> PipelineRepositoryResult<()> {
        let mut state = self.write()?;
        if state.rows.remove(&id).is_none() {
            return Err(PipelineRepositoryError::RowNotFound(id));
        }
        let unbind_at = audit.recorded_at();
        for todo in state.todos.iter_mut().filter(|todo| todo.row_id() == Some(id)) {
            todo.unbind_row(unbind_at);
        }
        self.record(audit)
    }

    async fn find_row(&self, id: RowId) -> PipelineRepositoryResult<Option<Row>> {
        Ok(self.read()?.rows.get(&id).cloned())
    }

    async fn list_rows(&self, id: SpreadsheetId) -> PipelineRepositoryResult<Vec<Row>> {
        let state = self.read()?;
        let mut rows: Vec<Row> = state
            .rows
            .values()
            .filter(|row| row.spreadsheet_id() == id)
            .cloned()
            .collect();
        rows.sort_by_key(|row| (row.position(), row.created_at()));
        Ok(rows)
    }
}

#[async_trait]
impl TodoRepository for InMemoryPipelineStore {
    async fn insert_todo(&self, todo: &Todo, audit: &AuditEntry) -> PipelineRepositoryResult<()> {
        let mut state = self.write()?;
        state.require_spreadsheet(todo.spreadsheet_id())?;
        if let Some(row_id) = todo.row_id()
            && !state.rows.contains_key(&row_id)
        {
            return Err(PipelineRepositoryError::RowNotFound(row_id));
        }
        state.todos.push(todo.clone());
        self.record(audit)
    }

    async fn update_todo(&self, todo: &Todo, audit: &AuditEntry) -> PipelineRepositoryResult<()> {
        let mut state = self.write()?;
        let slot = state.todo_mut(todo.id())?;
        *slot = todo.clone();
        self.record(audit)
    }

    async fn delete_todo(&self, id: TodoId, audit: &AuditEntry) -> PipelineRepositoryResult<()> {
        let mut state = self.write()?;
        let before = state.todos.len();
        state.todos.retain(|todo| todo.id() != id);
        if state.todos.len() == before {
            return Err(PipelineRepositoryError::TodoNotFound(id));
        }
        self.record(audit)
    }

    async fn find_todo(&self, id: TodoId) -> PipelineRepositoryResult<Option<Todo>> {
        let state = self.read()?;
        Ok(state.todos.iter().find(|todo| todo.id() == id).cloned())
    }

    async fn list_pipeline_todos(&self, id: SpreadsheetId) -> PipelineRepositoryResult<Vec<Todo>> {
        let state = self.read()?;
        Ok(state.todos_newest_first(|todo| todo.spreadsheet_id() == id && todo.row_id().is_none()))
    }

    async fn list_spreadsheet_todos(
        &self,
        id: SpreadsheetId,
    ) -> PipelineRepositoryResult<Vec<Todo>> {
        let state = self.read()?;
        Ok(state.todos_newest_first(|todo| todo.spreadsheet_id() == id))
    }

    async fn list_row_todos(&self, id: RowId) -> PipelineRepositoryResult<Vec<Todo>> {
        let state = self.read()?;
        Ok(state.todos_newest_first(|todo| todo.row_id() == Some(id)))
    }
}
