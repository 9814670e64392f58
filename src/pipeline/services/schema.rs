//! Schema registry: spreadsheets and their column definitions.

use super::PipelineServiceResult;
use crate::{
    audit::domain::{AuditAction, AuditEntity, AuditEntry},
    ids::UserId,
    pipeline::{
        domain::{
            Column, ColumnId, ColumnName, ColumnSpec, ColumnType, PipelineDomainError,
            Spreadsheet, SpreadsheetId, SpreadsheetName, SpreadsheetSettings,
        },
        ports::{PipelineRepositoryError, SchemaRepository},
    },
};
use mockable::Clock;
use serde_json::{Value, json};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;

/// Request payload for defining a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefineColumnRequest {
    name: String,
    kind: String,
    validation: Value,
    display: Value,
    position: Option<i32>,
    is_required: bool,
    default_value: Option<Value>,
}

impl DefineColumnRequest {
    /// Creates a request with a name and type tag (`text`, `number`,
    /// `currency`, `boolean`, `date`, `select`, `select_single`,
    /// `select_multi`).
    #[must_use]
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            validation: Value::Null,
            display: Value::Null,
            position: None,
            is_required: false,
            default_value: None,
        }
    }

    /// Sets the validation payload (`{options, multiple}` for select types).
    #[must_use]
    pub fn with_validation(mut self, validation: Value) -> Self {
        self.validation = validation;
        self
    }

    /// Sets display hints.
    #[must_use]
    pub fn with_display(mut self, display: Value) -> Self {
        self.display = display;
        self
    }

    /// Requests an explicit position instead of appending.
    #[must_use]
    pub const fn with_position(mut self, position: i32) -> Self {
        self.position = Some(position);
        self
    }

    /// Marks the column as required.
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.is_required = true;
        self
    }

    /// Sets the default value used when new rows omit the column.
    #[must_use]
    pub fn with_default(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }

    fn into_spec(self) -> Result<(ColumnSpec, Option<i32>), PipelineDomainError> {
        let Self {
            name,
            kind,
            validation,
            display,
            position,
            is_required,
            default_value,
        } = self;
        if let Some(requested) = position
            && requested < 1
        {
            return Err(PipelineDomainError::InvalidPosition(requested));
        }
        let column_type = ColumnType::parse(&kind, &validation)?;
        let spec = ColumnSpec {
            name: ColumnName::new(name)?,
            column_type,
            constraints: validation,
            display,
            is_required,
            default_value,
        };
        Ok((spec, position))
    }
}

/// Request payload for creating a spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSpreadsheetRequest {
    name: String,
    owner: UserId,
    description: Option<String>,
    is_public: bool,
    settings: Value,
    columns: Vec<DefineColumnRequest>,
}

impl CreateSpreadsheetRequest {
    /// Creates a request for a private spreadsheet.
    #[must_use]
    pub fn new(name: impl Into<String>, owner: UserId) -> Self {
        Self {
            name: name.into(),
            owner,
            description: None,
            is_public: false,
            settings: Value::Null,
            columns: Vec::new(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Makes the spreadsheet visible to every user.
    #[must_use]
    pub const fn public(mut self) -> Self {
        self.is_public = true;
        self
    }

    /// Sets the settings map.
    #[must_use]
    pub fn with_settings(mut self, settings: Value) -> Self {
        self.settings = settings;
        self
    }

    /// Adds an initial column, defined in order after creation.
    #[must_use]
    pub fn with_column(mut self, column: DefineColumnRequest) -> Self {
        self.columns.push(column);
        self
    }
}

/// Request payload for changing spreadsheet attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateSpreadsheetRequest {
    name: Option<String>,
    description: Option<Option<String>>,
    is_public: Option<bool>,
    settings: Option<Value>,
}

impl UpdateSpreadsheetRequest {
    /// Creates an empty update.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Renames the spreadsheet.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Replaces or clears the description.
    #[must_use]
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = Some(description);
        self
    }

    /// Changes visibility.
    #[must_use]
    pub const fn with_public(mut self, is_public: bool) -> Self {
        self.is_public = Some(is_public);
        self
    }

    /// Replaces the settings map.
    #[must_use]
    pub fn with_settings(mut self, settings: Value) -> Self {
        self.settings = Some(settings);
        self
    }
}

fn settings_from(value: Value) -> Result<SpreadsheetSettings, PipelineDomainError> {
    match value {
        Value::Null => Ok(SpreadsheetSettings::new()),
        Value::Object(map) => Ok(map),
        _ => Err(PipelineDomainError::SettingsNotObject),
    }
}

/// A spreadsheet with its columns, as returned by creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpreadsheetSchema {
    /// The spreadsheet.
    pub spreadsheet: Spreadsheet,
    /// Columns ordered by position.
    pub columns: Vec<Column>,
}

/// Spreadsheet and column definition service.
#[derive(Clone)]
pub struct SchemaRegistryService<R, C>
where
    R: SchemaRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> SchemaRegistryService<R, C>
where
    R: SchemaRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new schema registry service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Creates a spreadsheet and defines any initial columns in order.
    ///
    /// Every column request is validated and positioned before anything is
    /// stored: an omitted position takes one past the highest position
    /// claimed so far in the batch. The spreadsheet and its columns are then
    /// stored in one repository call, so a rejected request leaves nothing
    /// behind.
    ///
    /// # Errors
    ///
    /// Returns a domain error for invalid names, types, or settings, a
    /// conflict for repeated initial column names or positions, and a
    /// repository error when persistence fails.
    #[tracing::instrument(skip(self, request), fields(owner = %request.owner))]
    pub async fn create_spreadsheet(
        &self,
        request: CreateSpreadsheetRequest,
    ) -> PipelineServiceResult<SpreadsheetSchema> {
        let CreateSpreadsheetRequest {
            name,
            owner,
            description,
            is_public,
            settings,
            columns,
        } = request;

        let mut spreadsheet = Spreadsheet::new(SpreadsheetName::new(name)?, owner, &*self.clock);
        spreadsheet.set_description(description, &*self.clock);
        spreadsheet.set_public(is_public, &*self.clock);
        spreadsheet.replace_settings(settings_from(settings)?, &*self.clock);

        let mut initial = Vec::with_capacity(columns.len());
        let mut names = HashSet::new();
        let mut positions = HashSet::new();
        let mut highest: i32 = 0;
        for column_request in columns {
            let (spec, requested) = column_request.into_spec()?;
            let position = requested.unwrap_or_else(|| highest.saturating_add(1));
            if !names.insert(spec.name.clone()) {
                return Err(PipelineRepositoryError::DuplicateColumnName {
                    spreadsheet: spreadsheet.id(),
                    name: spec.name,
                }
                .into());
            }
            if !positions.insert(position) {
                return Err(PipelineRepositoryError::DuplicateColumnPosition {
                    spreadsheet: spreadsheet.id(),
                    position,
                }
                .into());
            }
            highest = highest.max(position);
            let column = Column::new(spreadsheet.id(), spec, position, &*self.clock);
            let entry = self.column_created(&column, Some(owner));
            initial.push((column, entry));
        }

        let audit = self.audit(
            AuditAction::Create,
            AuditEntity::Spreadsheet,
            spreadsheet.id().into_inner(),
            json!({
                "name": spreadsheet.name().as_str(),
                "is_public": spreadsheet.is_public(),
                "columns": initial.len(),
            }),
            Some(owner),
        );
        self.repository
            .insert_spreadsheet(&spreadsheet, &audit, &initial)
            .await?;
        info!(
            spreadsheet = %spreadsheet.id(),
            columns = initial.len(),
            "spreadsheet created"
        );

        let mut defined: Vec<Column> = initial.into_iter().map(|(column, _)| column).collect();
        defined.sort_by_key(Column::position);

        Ok(SpreadsheetSchema {
            spreadsheet,
            columns: defined,
        })
    }

    /// Lists spreadsheets the user owns or that are public, most recently
    /// updated first.
    ///
    /// # Errors
    ///
    /// Returns a repository error when persistence fails.
    pub async fn list_spreadsheets(&self, user: UserId) -> PipelineServiceResult<Vec<Spreadsheet>> {
        Ok(self.repository.list_spreadsheets_visible_to(user).await?)
    }

    /// Returns a spreadsheet.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineRepositoryError::SpreadsheetNotFound`] (wrapped)
    /// when it does not exist.
    pub async fn get_spreadsheet(&self, id: SpreadsheetId) -> PipelineServiceResult<Spreadsheet> {
        self.repository
            .find_spreadsheet(id)
            .await?
            .ok_or_else(|| PipelineRepositoryError::SpreadsheetNotFound(id).into())
    }

    /// Applies attribute changes to a spreadsheet.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineDomainError::EmptyUpdate`] (wrapped) when the request
    /// changes nothing, other domain errors for invalid values, and
    /// repository errors when the spreadsheet is missing or persistence
    /// fails.
    #[tracing::instrument(skip(self, request))]
    pub async fn update_spreadsheet(
        &self,
        id: SpreadsheetId,
        request: UpdateSpreadsheetRequest,
        actor: Option<UserId>,
    ) -> PipelineServiceResult<Spreadsheet> {
        if request == UpdateSpreadsheetRequest::default() {
            return Err(PipelineDomainError::EmptyUpdate.into());
        }
        let UpdateSpreadsheetRequest {
            name,
            description,
            is_public,
            settings,
        } = request;

        let mut spreadsheet = self.get_spreadsheet(id).await?;
        let mut changes = serde_json::Map::new();
        if let Some(raw) = name {
            let validated = SpreadsheetName::new(raw)?;
            changes.insert("name".to_owned(), json!(validated.as_str()));
            spreadsheet.rename(validated, &*self.clock);
        }
        if let Some(text) = description {
            changes.insert("description".to_owned(), json!(text));
            spreadsheet.set_description(text, &*self.clock);
        }
        if let Some(flag) = is_public {
            changes.insert("is_public".to_owned(), json!(flag));
            spreadsheet.set_public(flag, &*self.clock);
        }
        if let Some(raw) = settings {
            let parsed = settings_from(raw)?;
            changes.insert("settings".to_owned(), Value::Object(parsed.clone()));
            spreadsheet.replace_settings(parsed, &*self.clock);
        }

        let audit = self.audit(
            AuditAction::Update,
            AuditEntity::Spreadsheet,
            id.into_inner(),
            Value::Object(changes),
            actor,
        );
        self.repository
            .update_spreadsheet(&spreadsheet, &audit)
            .await?;
        Ok(spreadsheet)
    }

    /// Deletes a spreadsheet with its columns, rows, and todos.
    ///
    /// # Errors
    ///
    /// Returns repository errors when the spreadsheet is missing or
    /// persistence fails.
    #[tracing::instrument(skip(self))]
    pub async fn delete_spreadsheet(
        &self,
        id: SpreadsheetId,
        actor: Option<UserId>,
    ) -> PipelineServiceResult<()> {
        let audit = self.audit(
            AuditAction::Delete,
            AuditEntity::Spreadsheet,
            id.into_inner(),
            Value::Null,
            actor,
        );
        self.repository.delete_spreadsheet(id, &audit).await?;
        info!(spreadsheet = %id, "spreadsheet deleted");
        Ok(())
    }

    /// Defines a column. Without an explicit position the column is
    /// appended after the current highest position.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineRepositoryError::DuplicateColumnName`] (wrapped)
    /// when the name is taken, domain errors for invalid input, and
    /// [`PipelineRepositoryError::SpreadsheetNotFound`] for an unknown
    /// spreadsheet.
    #[tracing::instrument(skip(self, request))]
    pub async fn define_column(
        &self,
        spreadsheet_id: SpreadsheetId,
        request: DefineColumnRequest,
        actor: Option<UserId>,
    ) -> PipelineServiceResult<Column> {
        let (spec, position) = request.into_spec()?;
        self.get_spreadsheet(spreadsheet_id).await?;
        self.store_column(spreadsheet_id, spec, position, actor)
            .await
    }

    /// Lists a spreadsheet's columns by ascending position.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineRepositoryError::SpreadsheetNotFound`] (wrapped)
    /// for an unknown spreadsheet.
    pub async fn list_columns(&self, id: SpreadsheetId) -> PipelineServiceResult<Vec<Column>> {
        self.get_spreadsheet(id).await?;
        Ok(self.repository.list_columns(id).await?)
    }

    /// Renames a column. Rows keep their values under the old key.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineRepositoryError::DuplicateColumnName`] (wrapped) on
    /// a clash and [`PipelineRepositoryError::ColumnNotFound`] when absent.
    #[tracing::instrument(skip(self, name))]
    pub async fn rename_column(
        &self,
        id: ColumnId,
        name: &str,
        actor: Option<UserId>,
    ) -> PipelineServiceResult<Column> {
        let validated = ColumnName::new(name)?;
        let mut column = self
            .repository
            .find_column(id)
            .await?
            .ok_or(PipelineRepositoryError::ColumnNotFound(id))?;
        let previous = column.name().clone();
        column.rename(validated, &*self.clock);

        let audit = self.audit(
            AuditAction::Update,
            AuditEntity::Column,
            id.into_inner(),
            json!({ "name": { "from": previous.as_str(), "to": column.name().as_str() } }),
            actor,
        );
        self.repository.update_column(&column, &audit).await?;
        Ok(column)
    }

    /// Removes a column definition. Row data under its name is kept.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineRepositoryError::ColumnNotFound`] (wrapped) when
    /// absent.
    #[tracing::instrument(skip(self))]
    pub async fn delete_column(
        &self,
        id: ColumnId,
        actor: Option<UserId>,
    ) -> PipelineServiceResult<()> {
        let audit = self.audit(
            AuditAction::Delete,
            AuditEntity::Column,
            id.into_inner(),
            Value::Null,
            actor,
        );
        self.repository.delete_column(id, &audit).await?;
        Ok(())
    }

    async fn store_column(
        &self,
        spreadsheet_id: SpreadsheetId,
        spec: ColumnSpec,
        position: Option<i32>,
        actor: Option<UserId>,
    ) -> PipelineServiceResult<Column> {
        let assigned = match position {
            Some(requested) => requested,
            None => self.repository.next_column_position(spreadsheet_id).await?,
        };
        let column = Column::new(spreadsheet_id, spec, assigned, &*self.clock);
        let audit = self.column_created(&column, actor);
        self.repository.insert_column(&column, &audit).await?;
        info!(
            spreadsheet = %spreadsheet_id,
            column = %column.name(),
            position = column.position(),
            "column defined"
        );
        Ok(column)
    }

    fn column_created(&self, column: &Column, actor: Option<UserId>) -> AuditEntry {
        self.audit(
            AuditAction::Create,
            AuditEntity::Column,
            column.id().into_inner(),
            json!({
                "spreadsheet_id": column.spreadsheet_id(),
                "name": column.name().as_str(),
                "type": column.column_type().kind(),
                "position": column.position(),
            }),
            actor,
        )
    }

    fn audit(
        &self,
        action: AuditAction,
        entity: AuditEntity,
        entity_id: uuid::Uuid,
        changes: Value,
        actor: Option<UserId>,
    ) -> AuditEntry {
        AuditEntry::record(action, entity, entity_id, changes, actor, &*self.clock)
    }
}
