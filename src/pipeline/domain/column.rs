//! Column definitions and their runtime type tags.

use super::{ColumnId, ParseColumnTypeError, PipelineDomainError, SpreadsheetId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::HashSet;
use std::fmt;

/// Maximum length for a column name, matching the `VARCHAR(255)` column.
const MAX_NAME_LENGTH: usize = 255;

/// Validated column name.
///
/// The name is the key into every row's attribute map, so it is trimmed but
/// otherwise kept exactly as entered (case and spacing are significant).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnName(String);

impl ColumnName {
    /// Creates a validated column name.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineDomainError::EmptyColumnName`] when the value is
    /// empty after trimming or [`PipelineDomainError::ColumnNameTooLong`]
    /// when it exceeds 255 characters.
    pub fn new(value: impl Into<String>) -> Result<Self, PipelineDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PipelineDomainError::EmptyColumnName);
        }
        if trimmed.chars().count() > MAX_NAME_LENGTH {
            return Err(PipelineDomainError::ColumnNameTooLong(raw));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the column name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ColumnName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ColumnName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One entry in a select column's option catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    value: String,
    label: String,
    metadata: Map<String, Value>,
}

impl SelectOption {
    /// Creates an option without metadata.
    #[must_use]
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            metadata: Map::new(),
        }
    }

    /// Attaches a metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Returns the stored value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns the display label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns any extra metadata carried by the option.
    #[must_use]
    pub const fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    fn to_json(&self) -> Value {
        let mut object = self.metadata.clone();
        object.insert("value".to_owned(), Value::String(self.value.clone()));
        object.insert("label".to_owned(), Value::String(self.label.clone()));
        Value::Object(object)
    }

    fn parse(raw: &Value) -> Result<Self, PipelineDomainError> {
        match raw {
            Value::String(text) => Ok(Self::new(text.clone(), text.clone())),
            Value::Object(object) => {
                let value = object.get("value").and_then(scalar_text).ok_or_else(|| {
                    PipelineDomainError::InvalidSelectOptions(
                        "every option needs a scalar value".to_owned(),
                    )
                })?;
                let label = object
                    .get("label")
                    .and_then(Value::as_str)
                    .map_or_else(|| value.clone(), str::to_owned);
                let metadata = object
                    .iter()
                    .filter(|(key, _)| key.as_str() != "value" && key.as_str() != "label")
                    .map(|(key, entry)| (key.clone(), entry.clone()))
                    .collect();
                Ok(Self {
                    value,
                    label,
                    metadata,
                })
            }
            other => Err(PipelineDomainError::InvalidSelectOptions(format!(
                "unsupported option entry {other}"
            ))),
        }
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

/// Runtime type tag of a column.
///
/// The tag decides which coercion rule applies when a row is written and
/// what shape the persisted `validation` payload has.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "options", rename_all = "snake_case")]
pub enum ColumnType {
    /// Free text.
    Text,
    /// Decimal number.
    Number,
    /// Decimal amount; coerced like [`ColumnType::Number`].
    Currency,
    /// Truthy flag.
    Boolean,
    /// Date kept as entered.
    Date,
    /// One value chosen from a catalog.
    SelectSingle(Vec<SelectOption>),
    /// Any number of values chosen from a catalog.
    SelectMulti(Vec<SelectOption>),
}

impl ColumnType {
    /// Returns the storage tag. Both select variants share `select`; the
    /// `multiple` flag in the validation payload tells them apart.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Currency => "currency",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::SelectSingle(_) | Self::SelectMulti(_) => "select",
        }
    }

    /// Parses a type tag together with its validation payload.
    ///
    /// Accepts the storage tags plus the `select_single`/`select_multi`
    /// spellings used by API callers.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineDomainError::ColumnType`] for unknown tags and
    /// [`PipelineDomainError::InvalidSelectOptions`] or
    /// [`PipelineDomainError::DuplicateSelectOption`] for a malformed
    /// catalog.
    pub fn parse(kind: &str, validation: &Value) -> Result<Self, PipelineDomainError> {
        let normalized = kind.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "text" => Ok(Self::Text),
            "number" => Ok(Self::Number),
            "currency" => Ok(Self::Currency),
            "boolean" | "bool" => Ok(Self::Boolean),
            "date" => Ok(Self::Date),
            "select" => {
                let options = parse_options(validation)?;
                let multiple = validation
                    .get("multiple")
                    .and_then(Value::as_bool)
                    .unwrap_or(false);
                Ok(if multiple {
                    Self::SelectMulti(options)
                } else {
                    Self::SelectSingle(options)
                })
            }
            "select_single" => Ok(Self::SelectSingle(parse_options(validation)?)),
            "select_multi" | "multiselect" | "multi_select" => {
                Ok(Self::SelectMulti(parse_options(validation)?))
            }
            _ => Err(ParseColumnTypeError(kind.to_owned()).into()),
        }
    }

    /// Returns the option catalog for select types.
    #[must_use]
    pub fn options(&self) -> Option<&[SelectOption]> {
        match self {
            Self::SelectSingle(options) | Self::SelectMulti(options) => Some(options),
            _ => None,
        }
    }

    /// Returns `true` for the multi-value select type.
    #[must_use]
    pub const fn is_multiple(&self) -> bool {
        matches!(self, Self::SelectMulti(_))
    }

    /// Returns the canonical `{options, multiple}` payload for select types.
    #[must_use]
    pub fn validation_payload(&self) -> Option<Value> {
        self.options().map(|options| {
            let entries: Vec<Value> = options.iter().map(SelectOption::to_json).collect();
            json!({ "options": entries, "multiple": self.is_multiple() })
        })
    }
}

fn parse_options(validation: &Value) -> Result<Vec<SelectOption>, PipelineDomainError> {
    let Some(raw) = validation.get("options") else {
        return Ok(Vec::new());
    };
    let entries = raw.as_array().ok_or_else(|| {
        PipelineDomainError::InvalidSelectOptions("options must be an array".to_owned())
    })?;
    let options = entries
        .iter()
        .map(SelectOption::parse)
        .collect::<Result<Vec<_>, _>>()?;

    let mut seen = HashSet::new();
    for option in &options {
        if !seen.insert(option.value()) {
            return Err(PipelineDomainError::DuplicateSelectOption(
                option.value().to_owned(),
            ));
        }
    }
    Ok(options)
}

/// Caller-supplied attributes of a column, independent of identity and
/// position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    /// Column name.
    pub name: ColumnName,
    /// Column type tag.
    pub column_type: ColumnType,
    /// Informal constraints for non-select types.
    pub constraints: Value,
    /// Display hints.
    pub display: Value,
    /// Whether row writes must supply a non-empty value.
    pub is_required: bool,
    /// Value used when a new row omits the column.
    pub default_value: Option<Value>,
}

/// Column definition aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    id: ColumnId,
    spreadsheet_id: SpreadsheetId,
    name: ColumnName,
    column_type: ColumnType,
    constraints: Value,
    display: Value,
    position: i32,
    is_required: bool,
    default_value: Option<Value>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedColumnData {
    /// Persisted column identifier.
    pub id: ColumnId,
    /// Owning spreadsheet.
    pub spreadsheet_id: SpreadsheetId,
    /// Persisted attributes.
    pub spec: ColumnSpec,
    /// Persisted position.
    pub position: i32,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Column {
    /// Creates a new column at the given position.
    #[must_use]
    pub fn new(
        spreadsheet_id: SpreadsheetId,
        spec: ColumnSpec,
        position: i32,
        clock: &impl Clock,
    ) -> Self {
        let timestamp = clock.utc();
        Self::from_persisted(PersistedColumnData {
            id: ColumnId::new(),
            spreadsheet_id,
            spec,
            position,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a column from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedColumnData) -> Self {
        let ColumnSpec {
            name,
            column_type,
            constraints,
            display,
            is_required,
            default_value,
        } = data.spec;
        let normalized_constraints = if column_type.options().is_some() {
            Value::Null
        } else {
            constraints
        };
        Self {
            id: data.id,
            spreadsheet_id: data.spreadsheet_id,
            name,
            column_type,
            constraints: normalized_constraints,
            display,
            position: data.position,
            is_required,
            default_value,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the column identifier.
    #[must_use]
    pub const fn id(&self) -> ColumnId {
        self.id
    }

    /// Returns the owning spreadsheet.
    #[must_use]
    pub const fn spreadsheet_id(&self) -> SpreadsheetId {
        self.spreadsheet_id
    }

    /// Returns the column name.
    #[must_use]
    pub const fn name(&self) -> &ColumnName {
        &self.name
    }

    /// Returns the column type.
    #[must_use]
    pub const fn column_type(&self) -> &ColumnType {
        &self.column_type
    }

    /// Returns the persisted validation payload: the option catalog for
    /// select types, the informal constraints otherwise.
    #[must_use]
    pub fn validation(&self) -> Value {
        self.column_type
            .validation_payload()
            .unwrap_or_else(|| self.constraints.clone())
    }

    /// Returns display hints.
    #[must_use]
    pub const fn display(&self) -> &Value {
        &self.display
    }

    /// Returns the display position.
    #[must_use]
    pub const fn position(&self) -> i32 {
        self.position
    }

    /// Returns whether the column requires a value.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.is_required
    }

    /// Returns the default value for new rows.
    #[must_use]
    pub const fn default_value(&self) -> Option<&Value> {
        self.default_value.as_ref()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Renames the column. Existing row data keeps the old key.
    pub fn rename(&mut self, name: ColumnName, clock: &impl Clock) {
        self.name = name;
        self.updated_at = clock.utc();
    }
}
