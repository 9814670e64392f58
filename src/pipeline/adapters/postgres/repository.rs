//! `PostgreSQL` implementation of the pipeline ports.

use super::{
    models::{ColumnRecord, RowRecord, SpreadsheetRecord, TodoRecord},
    schema::{spreadsheet_columns, spreadsheet_rows, spreadsheets, todos},
};
use crate::{
    audit::{adapters::postgres::insert_entry, domain::AuditEntry},
    db::PgPool,
    ids::UserId,
    pipeline::{
        domain::{
            Column, ColumnId, ColumnName, ColumnSpec, ColumnType, PersistedColumnData,
            PersistedRowData, PersistedSpreadsheetData, PersistedTodoData, Row, RowData, RowId,
            RowPatch, Spreadsheet, SpreadsheetId, SpreadsheetName, Todo, TodoDetails, TodoId,
            TodoPriority, TodoTitle,
        },
        ports::{
            PipelineRepositoryError, PipelineRepositoryResult, RowRepository, SchemaRepository,
            TodoRepository,
        },
    },
};
use async_trait::async_trait;
use diesel::dsl::max;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};
use serde_json::Value;

const COLUMN_NAME_CONSTRAINT: &str = "idx_spreadsheet_columns_name";
const COLUMN_POSITION_CONSTRAINT: &str = "idx_spreadsheet_columns_position";
const TODO_ROW_CONSTRAINT: &str = "fk_todos_row";

/// `PostgreSQL`-backed pipeline store.
#[derive(Debug, Clone)]
pub struct PostgresPipelineStore {
    pool: PgPool,
}

impl PostgresPipelineStore {
    /// Creates a store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> PipelineRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> PipelineRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(PipelineRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(PipelineRepositoryError::persistence)?
    }
}

impl From<DieselError> for PipelineRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

#[async_trait]
impl SchemaRepository for PostgresPipelineStore {
    async fn insert_spreadsheet(
        &self,
        spreadsheet: &Spreadsheet,
        audit: &AuditEntry,
        columns: &[(Column, AuditEntry)],
    ) -> PipelineRepositoryResult<()> {
        let record = spreadsheet_to_record(spreadsheet);
        let entry = audit.clone();
        let initial = columns.to_vec();
        self.run_blocking(move |connection| {
            connection.transaction::<_, PipelineRepositoryError, _>(|tx| {
                diesel::insert_into(spreadsheets::table)
                    .values(&record)
                    .execute(tx)?;
                insert_entry(tx, &entry)?;
                for (column, column_entry) in &initial {
                    store_column(tx, column, column_entry)?;
                }
                Ok(())
            })
        })
        .await
    }

    async fn update_spreadsheet(
        &self,
        spreadsheet: &Spreadsheet,
        audit: &AuditEntry,
    ) -> PipelineRepositoryResult<()> {
        let record = spreadsheet_to_record(spreadsheet);
        let entry = audit.clone();
        self.run_blocking(move |connection| {
            connection.transaction::<_, PipelineRepositoryError, _>(|tx| {
                let updated = diesel::update(spreadsheets::table.find(record.id))
                    .set((
                        spreadsheets::name.eq(&record.name),
                        spreadsheets::description.eq(&record.description),
                        spreadsheets::is_public.eq(record.is_public),
                        spreadsheets::settings.eq(&record.settings),
                        spreadsheets::updated_at.eq(record.updated_at),
                    ))
                    .execute(tx)?;
                if updated == 0 {
                    return Err(PipelineRepositoryError::SpreadsheetNotFound(
                        SpreadsheetId::from_uuid(record.id),
                    ));
                }
                insert_entry(tx, &entry)?;
                Ok(())
            })
        })
        .await
    }

    async fn delete_spreadsheet(
        &self,
        id: SpreadsheetId,
        audit: &AuditEntry,
    ) -> PipelineRepositoryResult<()> {
        let entry = audit.clone();
        self.run_blocking(move |connection| {
            connection.transaction::<_, PipelineRepositoryError, _>(|tx| {
                // Columns, rows, and todos cascade through their foreign keys.
                let deleted =
                    diesel::delete(spreadsheets::table.find(id.into_inner())).execute(tx)?;
                if deleted == 0 {
                    return Err(PipelineRepositoryError::SpreadsheetNotFound(id));
                }
                insert_entry(tx, &entry)?;
                Ok(())
            })
        })
        .await
    }

    async fn find_spreadsheet(
        &self,
        id: SpreadsheetId,
    ) -> PipelineRepositoryResult<Option<Spreadsheet>> {
        self.run_blocking(move |connection| {
            let record = spreadsheets::table
                .find(id.into_inner())
                .select(SpreadsheetRecord::as_select())
                .first::<SpreadsheetRecord>(connection)
                .optional()?;
            record.map(record_to_spreadsheet).transpose()
        })
        .await
    }

    async fn list_spreadsheets_visible_to(
        &self,
        user: UserId,
    ) -> PipelineRepositoryResult<Vec<Spreadsheet>> {
        self.run_blocking(move |connection| {
            let records = spreadsheets::table
                .filter(
                    spreadsheets::owner_id
                        .eq(user.into_inner())
                        .or(spreadsheets::is_public.eq(true)),
                )
                .order(spreadsheets::updated_at.desc())
                .select(SpreadsheetRecord::as_select())
                .load::<SpreadsheetRecord>(connection)?;
            records.into_iter().map(record_to_spreadsheet).collect()
        })
        .await
    }

    async fn next_column_position(&self, id: SpreadsheetId) -> PipelineRepositoryResult<i32> {
        self.run_blocking(move |connection| {
            let current = spreadsheet_columns::table
                .filter(spreadsheet_columns::spreadsheet_id.eq(id.into_inner()))
                .select(max(spreadsheet_columns::position))
                .first::<Option<i32>>(connection)?;
            Ok(current.unwrap_or(0).saturating_add(1))
        })
        .await
    }

    async fn insert_column(
        &self,
        column: &Column,
        audit: &AuditEntry,
    ) -> PipelineRepositoryResult<()> {
        let stored = column.clone();
        let entry = audit.clone();
        self.run_blocking(move |connection| {
            connection.transaction::<_, PipelineRepositoryError, _>(|tx| {
                store_column(tx, &stored, &entry)
            })
        })
        .await
    }

    async fn update_column(
        &self,
        column: &Column,
        audit: &AuditEntry,
    ) -> PipelineRepositoryResult<()> {
        let record = column_to_record(column);
        let entry = audit.clone();
        let spreadsheet = column.spreadsheet_id();
        let name = column.name().clone();
        self.run_blocking(move |connection| {
            connection.transaction::<_, PipelineRepositoryError, _>(|tx| {
                let updated = diesel::update(spreadsheet_columns::table.find(record.id))
                    .set((
                        spreadsheet_columns::name.eq(&record.name),
                        spreadsheet_columns::updated_at.eq(record.updated_at),
                    ))
                    .execute(tx)
                    .map_err(|err| match err {
                        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                            PipelineRepositoryError::DuplicateColumnName {
                                spreadsheet,
                                name: name.clone(),
                            }
                        }
                        _ => PipelineRepositoryError::persistence(err),
                    })?;
                if updated == 0 {
                    return Err(PipelineRepositoryError::ColumnNotFound(ColumnId::from_uuid(
                        record.id,
                    )));
                }
                insert_entry(tx, &entry)?;
                Ok(())
            })
        })
        .await
    }

    async fn delete_column(&self, id: ColumnId, audit: &AuditEntry) -> PipelineRepositoryResult<()> {
        let entry = audit.clone();
        self.run_blocking(move |connection| {
            connection.transaction::<_, PipelineRepositoryError, _>(|tx| {
                let deleted =
                    diesel::delete(spreadsheet_columns::table.find(id.into_inner())).execute(tx)?;
                if deleted == 0 {
                    return Err(PipelineRepositoryError::ColumnNotFound(id));
                }
                insert_entry(tx, &entry)?;
                Ok(())
            })
        })
        .await
    }

    async fn find_column(&self, id: ColumnId) -> PipelineRepositoryResult<Option<Column>> {
        self.run_blocking(move |connection| {
            let record = spreadsheet_columns::table
                .find(id.into_inner())
                .select(ColumnRecord::as_select())
                .first::<ColumnRecord>(connection)
                .optional()?;
            record.map(record_to_column).transpose()
        })
        .await
    }

    async fn list_columns(&self, id: SpreadsheetId) -> PipelineRepositoryResult<Vec<Column>> {
        self.run_blocking(move |connection| {
            let records = spreadsheet_columns::table
                .filter(spreadsheet_columns::spreadsheet_id.eq(id.into_inner()))
                .order((
                    spreadsheet_columns::position.asc(),
                    spreadsheet_columns::created_at.asc(),
                ))
                .select(ColumnRecord::as_select())
                .load::<ColumnRecord>(connection)?;
            records.into_iter().map(record_to_column).collect()
        })
        .await
    }
}

#[async_trait]
impl RowRepository for PostgresPipelineStore {
    async fn next_row_position(&self, id: SpreadsheetId) -> PipelineRepositoryResult<i32> {
        self.run_blocking(move |connection| {
            let current = spreadsheet_rows::table
                .filter(spreadsheet_rows::spreadsheet_id.eq(id.into_inner()))
                .select(max(spreadsheet_rows::position))
                .first::<Option<i32>>(connection)?;
            Ok(current.unwrap_or(0).saturating_add(1))
        })
        .await
    }

    async fn insert_row(&self, row: &Row, audit: &AuditEntry) -> PipelineRepositoryResult<()> {
        let record = row_to_record(row);
        let entry = audit.clone();
        let spreadsheet = row.spreadsheet_id();
        self.run_blocking(move |connection| {
            connection.transaction::<_, PipelineRepositoryError, _>(|tx| {
                diesel::insert_into(spreadsheet_rows::table)
                    .values(&record)
                    .execute(tx)
                    .map_err(|err| match err {
                        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                            PipelineRepositoryError::SpreadsheetNotFound(spreadsheet)
                        }
                        _ => PipelineRepositoryError::persistence(err),
                    })?;
                insert_entry(tx, &entry)?;
                Ok(())
            })
        })
        .await
    }

    async fn merge_row(
        &self,
        patch: &RowPatch,
        audit: &AuditEntry,
    ) -> PipelineRepositoryResult<Row> {
        let owned_patch = patch.clone();
        let entry = audit.clone();
        self.run_blocking(move |connection| {
            connection.transaction::<_, PipelineRepositoryError, _>(|tx| {
                let record = spreadsheet_rows::table
                    .find(owned_patch.row_id.into_inner())
                    .for_update()
                    .select(RowRecord::as_select())
                    .first::<RowRecord>(tx)
                    .optional()?
                    .ok_or(PipelineRepositoryError::RowNotFound(owned_patch.row_id))?;
                let mut row = record_to_row(record)?;
                row.apply(&owned_patch);
                diesel::update(spreadsheet_rows::table.find(row.id().into_inner()))
                    .set((
                        spreadsheet_rows::data.eq(row.data().to_json()),
                        spreadsheet_rows::updated_by.eq(row.updated_by().map(UserId::into_inner)),
                        spreadsheet_rows::updated_at.eq(row.updated_at()),
                    ))
                    .execute(tx)?;
                insert_entry(tx, &entry)?;
                Ok(row)
            })
        })
        .await
    }

    async fn delete_row(&self, id: RowId, audit: &AuditEntry) -> PipelineRepositoryResult<()> {
        let entry = audit.clone();
        self.run_blocking(move |connection| {
            connection.transaction::<_, PipelineRepositoryError, _>(|tx| {
                diesel::update(todos::table.filter(todos::row_id.eq(id.into_inner())))
                    .set((
                        todos::row_id.eq(None::<uuid::Uuid>),
                        todos::updated_at.eq(entry.recorded_at()),
                    ))
                    .execute(tx)?;
                let deleted =
                    diesel::delete(spreadsheet_rows::table.find(id.into_inner())).execute(tx)?;
                if deleted == 0 {
                    return Err(PipelineRepositoryError::RowNotFound(id));
                }
                insert_entry(tx, &entry)?;
                Ok(())
            })
        })
        .await
    }

    async fn find_row(&self, id: RowId) -> PipelineRepositoryResult<Option<Row>> {
        self.run_blocking(move |connection| {
            let record = spreadsheet_rows::table
                .find(id.into_inner())
                .select(RowRecord::as_select())
                .first::<RowRecord>(connection)
                .optional()?;
            record.map(record_to_row).transpose()
        })
        .await
    }

    async fn list_rows(&self, id: SpreadsheetId) -> PipelineRepositoryResult<Vec<Row>> {
        self.run_blocking(move |connection| {
            let records = spreadsheet_rows::table
                .filter(spreadsheet_rows::spreadsheet_id.eq(id.into_inner()))
                .order((
                    spreadsheet_rows::position.asc(),
                    spreadsheet_rows::created_at.asc(),
                ))
                .select(RowRecord::as_select())
                .load::<RowRecord>(connection)?;
            records.into_iter().map(record_to_row).collect()
        })
        .await
    }
}

#[async_trait]
impl TodoRepository for PostgresPipelineStore {
    async fn insert_todo(&self, todo: &Todo, audit: &AuditEntry) -> PipelineRepositoryResult<()> {
        let record = todo_to_record(todo);
        let entry = audit.clone();
        let spreadsheet = todo.spreadsheet_id();
        let row = todo.row_id();
        self.run_blocking(move |connection| {
            connection.transaction::<_, PipelineRepositoryError, _>(|tx| {
                diesel::insert_into(todos::table)
                    .values(&record)
                    .execute(tx)
                    .map_err(|err| match (err, row) {
                        (
                            DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info),
                            Some(row_id),
                        ) if violates(info.as_ref(), TODO_ROW_CONSTRAINT) => {
                            PipelineRepositoryError::RowNotFound(row_id)
                        }
                        (
                            DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _),
                            _,
                        ) => PipelineRepositoryError::SpreadsheetNotFound(spreadsheet),
                        (other, _) => PipelineRepositoryError::persistence(other),
                    })?;
                insert_entry(tx, &entry)?;
                Ok(())
            })
        })
        .await
    }

    async fn update_todo(&self, todo: &Todo, audit: &AuditEntry) -> PipelineRepositoryResult<()> {
        let record = todo_to_record(todo);
        let entry = audit.clone();
        self.run_blocking(move |connection| {
            connection.transaction::<_, PipelineRepositoryError, _>(|tx| {
                let updated = diesel::update(todos::table.find(record.id))
                    .set(&record)
                    .execute(tx)?;
                if updated == 0 {
                    return Err(PipelineRepositoryError::TodoNotFound(TodoId::from_uuid(
                        record.id,
                    )));
                }
                insert_entry(tx, &entry)?;
                Ok(())
            })
        })
        .await
    }

    async fn delete_todo(&self, id: TodoId, audit: &AuditEntry) -> PipelineRepositoryResult<()> {
        let entry = audit.clone();
        self.run_blocking(move |connection| {
            connection.transaction::<_, PipelineRepositoryError, _>(|tx| {
                let deleted = diesel::delete(todos::table.find(id.into_inner())).execute(tx)?;
                if deleted == 0 {
                    return Err(PipelineRepositoryError::TodoNotFound(id));
                }
                insert_entry(tx, &entry)?;
                Ok(())
            })
        })
        .await
    }

    async fn find_todo(&self, id: TodoId) -> PipelineRepositoryResult<Option<Todo>> {
        self.run_blocking(move |connection| {
            let record = todos::table
                .find(id.into_inner())
                .select(TodoRecord::as_select())
                .first::<TodoRecord>(connection)
                .optional()?;
            record.map(record_to_todo).transpose()
        })
        .await
    }

    async fn list_pipeline_todos(&self, id: SpreadsheetId) -> PipelineRepositoryResult<Vec<Todo>> {
        self.run_blocking(move |connection| {
            let records = todos::table
                .filter(todos::spreadsheet_id.eq(id.into_inner()))
                .filter(todos::row_id.is_null())
                .order(todos::created_at.desc())
                .select(TodoRecord::as_select())
                .load::<TodoRecord>(connection)?;
            records.into_iter().map(record_to_todo).collect()
        })
        .await
    }

    async fn list_spreadsheet_todos(
        &self,
        id: SpreadsheetId,
    ) -> PipelineRepositoryResult<Vec<Todo>> {
        self.run_blocking(move |connection| {
            let records = todos::table
                .filter(todos::spreadsheet_id.eq(id.into_inner()))
                .order(todos::created_at.desc())
                .select(TodoRecord::as_select())
                .load::<TodoRecord>(connection)?;
            records.into_iter().map(record_to_todo).collect()
        })
        .await
    }

    async fn list_row_todos(&self, id: RowId) -> PipelineRepositoryResult<Vec<Todo>> {
        self.run_blocking(move |connection| {
            let records = todos::table
                .filter(todos::row_id.eq(id.into_inner()))
                .order(todos::created_at.desc())
                .select(TodoRecord::as_select())
                .load::<TodoRecord>(connection)?;
            records.into_iter().map(record_to_todo).collect()
        })
        .await
    }
}

/// Inserts a column and its audit entry on an open transaction, mapping
/// unique and foreign-key violations to repository errors.
fn store_column(
    tx: &mut PgConnection,
    column: &Column,
    entry: &AuditEntry,
) -> PipelineRepositoryResult<()> {
    let spreadsheet = column.spreadsheet_id();
    diesel::insert_into(spreadsheet_columns::table)
        .values(&column_to_record(column))
        .execute(tx)
        .map_err(|err| match err {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                if violates(info.as_ref(), COLUMN_POSITION_CONSTRAINT) =>
            {
                PipelineRepositoryError::DuplicateColumnPosition {
                    spreadsheet,
                    position: column.position(),
                }
            }
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                if violates(info.as_ref(), COLUMN_NAME_CONSTRAINT) =>
            {
                PipelineRepositoryError::DuplicateColumnName {
                    spreadsheet,
                    name: column.name().clone(),
                }
            }
            DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                PipelineRepositoryError::SpreadsheetNotFound(spreadsheet)
            }
            _ => PipelineRepositoryError::persistence(err),
        })?;
    insert_entry(tx, entry)?;
    Ok(())
}

fn violates(info: &dyn DatabaseErrorInformation, constraint: &str) -> bool {
    info.constraint_name().is_some_and(|name| name == constraint)
}

fn spreadsheet_to_record(spreadsheet: &Spreadsheet) -> SpreadsheetRecord {
    SpreadsheetRecord {
        id: spreadsheet.id().into_inner(),
        name: spreadsheet.name().as_str().to_owned(),
        description: spreadsheet.description().map(str::to_owned),
        owner_id: spreadsheet.owner().into_inner(),
        is_public: spreadsheet.is_public(),
        settings: Value::Object(spreadsheet.settings().clone()),
        created_at: spreadsheet.created_at(),
        updated_at: spreadsheet.updated_at(),
    }
}

fn record_to_spreadsheet(record: SpreadsheetRecord) -> PipelineRepositoryResult<Spreadsheet> {
    let SpreadsheetRecord {
        id,
        name,
        description,
        owner_id,
        is_public,
        settings,
        created_at,
        updated_at,
    } = record;
    let parsed_name =
        SpreadsheetName::new(name).map_err(PipelineRepositoryError::invalid_persisted_data)?;
    let parsed_settings = match settings {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    };
    Ok(Spreadsheet::from_persisted(PersistedSpreadsheetData {
        id: SpreadsheetId::from_uuid(id),
        name: parsed_name,
        description,
        owner: UserId::from_uuid(owner_id),
        is_public,
        settings: parsed_settings,
        created_at,
        updated_at,
    }))
}

fn column_to_record(column: &Column) -> ColumnRecord {
    ColumnRecord {
        id: column.id().into_inner(),
        spreadsheet_id: column.spreadsheet_id().into_inner(),
        name: column.name().as_str().to_owned(),
        column_type: column.column_type().kind().to_owned(),
        validation: column.validation(),
        display: column.display().clone(),
        position: column.position(),
        is_required: column.is_required(),
        default_value: column.default_value().cloned(),
        created_at: column.created_at(),
        updated_at: column.updated_at(),
    }
}

fn record_to_column(record: ColumnRecord) -> PipelineRepositoryResult<Column> {
    let ColumnRecord {
        id,
        spreadsheet_id,
        name,
        column_type,
        validation,
        display,
        position,
        is_required,
        default_value,
        created_at,
        updated_at,
    } = record;
    let parsed_name =
        ColumnName::new(name).map_err(PipelineRepositoryError::invalid_persisted_data)?;
    let parsed_type = ColumnType::parse(&column_type, &validation)
        .map_err(PipelineRepositoryError::invalid_persisted_data)?;
    Ok(Column::from_persisted(PersistedColumnData {
        id: ColumnId::from_uuid(id),
        spreadsheet_id: SpreadsheetId::from_uuid(spreadsheet_id),
        spec: ColumnSpec {
            name: parsed_name,
            column_type: parsed_type,
            constraints: validation,
            display,
            is_required,
            default_value,
        },
        position,
        created_at,
        updated_at,
    }))
}

fn row_to_record(row: &Row) -> RowRecord {
    RowRecord {
        id: row.id().into_inner(),
        spreadsheet_id: row.spreadsheet_id().into_inner(),
        data: row.data().to_json(),
        position: row.position(),
        created_by: row.created_by().map(UserId::into_inner),
        updated_by: row.updated_by().map(UserId::into_inner),
        created_at: row.created_at(),
        updated_at: row.updated_at(),
    }
}

fn record_to_row(record: RowRecord) -> PipelineRepositoryResult<Row> {
    let RowRecord {
        id,
        spreadsheet_id,
        data,
        position,
        created_by,
        updated_by,
        created_at,
        updated_at,
    } = record;
    let parsed_data =
        RowData::from_json(data).map_err(PipelineRepositoryError::invalid_persisted_data)?;
    Ok(Row::from_persisted(PersistedRowData {
        id: RowId::from_uuid(id),
        spreadsheet_id: SpreadsheetId::from_uuid(spreadsheet_id),
        data: parsed_data,
        position,
        created_by: created_by.map(UserId::from_uuid),
        updated_by: updated_by.map(UserId::from_uuid),
        created_at,
        updated_at,
    }))
}

fn todo_to_record(todo: &Todo) -> TodoRecord {
    TodoRecord {
        id: todo.id().into_inner(),
        spreadsheet_id: todo.spreadsheet_id().into_inner(),
        row_id: todo.row_id().map(RowId::into_inner),
        title: todo.title().as_str().to_owned(),
        description: todo.description().map(str::to_owned),
        priority: todo.priority().as_str().to_owned(),
        completed: todo.is_completed(),
        due_date: todo.due_date(),
        supporting_artifact: todo.supporting_artifact().map(str::to_owned),
        created_by: todo.created_by().map(UserId::into_inner),
        assigned_to: todo.assigned_to().map(UserId::into_inner),
        created_at: todo.created_at(),
        updated_at: todo.updated_at(),
    }
}

fn record_to_todo(record: TodoRecord) -> PipelineRepositoryResult<Todo> {
    let TodoRecord {
        id,
        spreadsheet_id,
        row_id,
        title,
        description,
        priority,
        completed,
        due_date,
        supporting_artifact,
        created_by,
        assigned_to,
        created_at,
        updated_at,
    } = record;
    let parsed_title =
        TodoTitle::new(title).map_err(PipelineRepositoryError::invalid_persisted_data)?;
    let parsed_priority = TodoPriority::try_from(priority.as_str())
        .map_err(PipelineRepositoryError::invalid_persisted_data)?;
    Ok(Todo::from_persisted(PersistedTodoData {
        id: TodoId::from_uuid(id),
        spreadsheet_id: SpreadsheetId::from_uuid(spreadsheet_id),
        row_id: row_id.map(RowId::from_uuid),
        title: parsed_title,
        details: TodoDetails {
            description,
            priority: parsed_priority,
            due_date,
            supporting_artifact,
            assigned_to: assigned_to.map(UserId::from_uuid),
        },
        completed,
        created_by: created_by.map(UserId::from_uuid),
        created_at,
        updated_at,
    }))
}
