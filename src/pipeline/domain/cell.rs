//! Typed cell values and the per-type coercion applied on row writes.

use super::{Column, ColumnType, PipelineDomainError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;

/// Strings that coerce to `false` in a boolean column.
const FALSY_STRINGS: [&str; 6] = ["", "false", "no", "n", "0", "off"];

/// One coerced cell.
///
/// Serializes untagged so a row's attribute map reads as plain JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Explicitly empty.
    Null,
    /// Boolean flag.
    Bool(bool),
    /// Decimal number.
    Number(f64),
    /// Text, dates, and single select values.
    Text(String),
    /// Multi-select values.
    List(Vec<String>),
    /// Anything else, kept verbatim (orphaned or unknown keys).
    Raw(Value),
}

impl CellValue {
    /// Wraps arbitrary JSON without coercion.
    #[must_use]
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(flag) => Self::Bool(flag),
            Value::Number(ref number) => number.as_f64().map_or(Self::Raw(value), Self::Number),
            Value::String(text) => Self::Text(text),
            Value::Array(ref items) if items.iter().all(Value::is_string) => Self::List(
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_owned)
                    .collect(),
            ),
            other => Self::Raw(other),
        }
    }

    /// Converts the cell back to plain JSON.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(flag) => Value::Bool(*flag),
            Self::Number(number) => Number::from_f64(*number).map_or(Value::Null, Value::Number),
            Self::Text(text) => Value::String(text.clone()),
            Self::List(items) => Value::Array(items.iter().cloned().map(Value::String).collect()),
            Self::Raw(value) => value.clone(),
        }
    }

    /// Returns `true` for values a required column must not hold.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(text) => text.trim().is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Raw(value) => value.is_null(),
            Self::Bool(_) | Self::Number(_) => false,
        }
    }

    /// Returns the text payload, if any.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// A row's attribute map keyed by column name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowData(BTreeMap<String, CellValue>);

impl RowData {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a JSON object without coercion, as read back from storage.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineDomainError::RowDataNotObject`] for non-object JSON.
    pub fn from_json(value: Value) -> Result<Self, PipelineDomainError> {
        match value {
            Value::Object(object) => Ok(Self(
                object
                    .into_iter()
                    .map(|(key, cell)| (key, CellValue::from_json(cell)))
                    .collect(),
            )),
            Value::Null => Ok(Self::new()),
            _ => Err(PipelineDomainError::RowDataNotObject),
        }
    }

    /// Converts the map to a JSON object.
    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(key, cell)| (key.clone(), cell.to_json()))
                .collect(),
        )
    }

    /// Returns the cell stored under a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.0.get(key)
    }

    /// Stores a cell, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: CellValue) {
        self.0.insert(key.into(), value);
    }

    /// Overlays every entry of `patch`, keeping keys the patch omits.
    pub fn merge(&mut self, patch: &Self) {
        for (key, value) in &patch.0 {
            self.0.insert(key.clone(), value.clone());
        }
    }

    /// Iterates entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Returns the number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when the map holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// How a write treats columns missing from the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoercionMode {
    /// Row creation: every column gets a value, using defaults and the
    /// per-type empty value for absent keys.
    Full,
    /// Row update: only keys present in the input are coerced.
    Partial,
}

/// Coerces raw input against a spreadsheet's columns.
///
/// Keys that match no column pass through unvalidated.
///
/// # Errors
///
/// Returns the first coercion or required-value failure. Nothing is written
/// by the caller when this fails.
pub fn coerce_row_data(
    columns: &[Column],
    raw: &Map<String, Value>,
    mode: CoercionMode,
) -> Result<RowData, PipelineDomainError> {
    let mut data = RowData::new();

    for column in columns {
        let key = column.name().as_str();
        let supplied = raw.get(key);
        if mode == CoercionMode::Partial && supplied.is_none() {
            continue;
        }
        let input = match (mode, supplied) {
            (CoercionMode::Full, None | Some(Value::Null)) => column.default_value(),
            _ => supplied,
        };
        let cell = coerce_cell(column, input)?;
        if column.is_required() && cell.is_empty() {
            return Err(PipelineDomainError::MissingRequiredValue(key.to_owned()));
        }
        data.insert(key, cell);
    }

    for (key, value) in raw {
        if !columns.iter().any(|column| column.name().as_str() == key) {
            data.insert(key.clone(), CellValue::from_json(value.clone()));
        }
    }

    Ok(data)
}

/// Coerces one input value according to the column's type.
///
/// # Errors
///
/// Returns [`PipelineDomainError::InvalidNumber`] for unparsable numeric
/// input and [`PipelineDomainError::UnexpectedShape`] for JSON shapes the
/// type cannot hold.
pub fn coerce_cell(column: &Column, input: Option<&Value>) -> Result<CellValue, PipelineDomainError> {
    let name = column.name().as_str();
    match column.column_type() {
        ColumnType::Number | ColumnType::Currency => coerce_number(name, input),
        ColumnType::Boolean => Ok(CellValue::Bool(coerce_bool(input))),
        ColumnType::SelectSingle(_) => coerce_single(name, input),
        ColumnType::SelectMulti(_) => coerce_multi(name, input),
        ColumnType::Text | ColumnType::Date => Ok(coerce_text(input)),
    }
}

fn coerce_number(column: &str, input: Option<&Value>) -> Result<CellValue, PipelineDomainError> {
    match input {
        None | Some(Value::Null) => Ok(CellValue::Null),
        Some(Value::Number(number)) => Ok(number.as_f64().map_or(CellValue::Null, CellValue::Number)),
        Some(Value::String(text)) => parse_decimal(column, text),
        Some(_) => Err(PipelineDomainError::UnexpectedShape {
            column: column.to_owned(),
            expected: "a number or numeric string",
        }),
    }
}

fn parse_decimal(column: &str, text: &str) -> Result<CellValue, PipelineDomainError> {
    let cleaned: String = text
        .trim()
        .trim_start_matches(['$', '€', '£'])
        .chars()
        .filter(|c| !matches!(c, ',' | '_') && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return Ok(CellValue::Null);
    }
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
        .map(CellValue::Number)
        .ok_or_else(|| PipelineDomainError::InvalidNumber {
            column: column.to_owned(),
            value: text.to_owned(),
        })
}

fn coerce_bool(input: Option<&Value>) -> bool {
    match input {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(number)) => number
            .as_i64()
            .map_or_else(|| number.as_f64().is_some_and(f64::is_normal), |n| n != 0),
        Some(Value::String(text)) => {
            let normalized = text.trim().to_ascii_lowercase();
            !FALSY_STRINGS.contains(&normalized.as_str())
        }
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(object)) => !object.is_empty(),
    }
}

fn coerce_single(column: &str, input: Option<&Value>) -> Result<CellValue, PipelineDomainError> {
    match input {
        None | Some(Value::Null) => Ok(CellValue::Null),
        Some(scalar @ (Value::String(_) | Value::Number(_) | Value::Bool(_))) => {
            Ok(CellValue::from_json(scalar.clone()))
        }
        Some(_) => Err(PipelineDomainError::UnexpectedShape {
            column: column.to_owned(),
            expected: "a single scalar option",
        }),
    }
}

fn coerce_multi(column: &str, input: Option<&Value>) -> Result<CellValue, PipelineDomainError> {
    match input {
        None | Some(Value::Null) => Ok(CellValue::List(Vec::new())),
        Some(Value::Array(items)) => Ok(CellValue::List(
            items
                .iter()
                .filter(|item| !item.is_null())
                .map(|item| {
                    item.as_str()
                        .map_or_else(|| item.to_string(), str::to_owned)
                })
                .collect(),
        )),
        Some(Value::String(text)) => Ok(CellValue::List(
            text.split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(str::to_owned)
                .collect(),
        )),
        Some(scalar @ (Value::Number(_) | Value::Bool(_))) => {
            Ok(CellValue::List(vec![scalar.to_string()]))
        }
        Some(Value::Object(_)) => Err(PipelineDomainError::UnexpectedShape {
            column: column.to_owned(),
            expected: "a list of options",
        }),
    }
}

fn coerce_text(input: Option<&Value>) -> CellValue {
    match input {
        None | Some(Value::Null) => CellValue::Text(String::new()),
        Some(Value::String(text)) => CellValue::Text(text.clone()),
        Some(other) => CellValue::Text(other.to_string()),
    }
}
