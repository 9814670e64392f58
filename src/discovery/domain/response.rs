//! Questionnaire responses and their selection payloads.

use super::{DiscoveryDomainError, ParseQuestionTypeError, ResponseId, SessionId, normalize_tag};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Key into the static question catalog.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(String);

impl QuestionId {
    /// Creates a validated, trimmed question identifier.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryDomainError::EmptyQuestionId`] for blank input.
    pub fn new(value: impl Into<String>) -> Result<Self, DiscoveryDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DiscoveryDomainError::EmptyQuestionId);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Answer shape of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    /// Free text.
    Text,
    /// One choice among several.
    Radio,
    /// Any number of choices.
    Checkbox,
    /// Vendors chosen per category.
    VendorMulti,
    /// Any number of options from a list.
    MultiSelect,
}

impl QuestionType {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Radio => "radio",
            Self::Checkbox => "checkbox",
            Self::VendorMulti => "vendor_multi",
            Self::MultiSelect => "multi_select",
        }
    }

    /// Checks that a response value has a shape this type accepts. `null`
    /// is accepted by every type.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryDomainError::InvalidResponseValue`] otherwise.
    pub fn validate_value(self, value: &Value) -> Result<(), DiscoveryDomainError> {
        let accepted = match self {
            Self::Text => value.is_null() || value.is_string(),
            Self::Radio => is_scalar(value),
            Self::Checkbox | Self::MultiSelect => match value {
                Value::Null => true,
                Value::Array(items) => items.iter().all(is_scalar),
                _ => false,
            },
            Self::VendorMulti => !matches!(value, Value::Bool(_) | Value::Number(_)),
        };
        if accepted {
            return Ok(());
        }
        Err(DiscoveryDomainError::InvalidResponseValue {
            question_type: self.as_str(),
            expected: match self {
                Self::Text => "a string",
                Self::Radio => "a single scalar choice",
                Self::Checkbox | Self::MultiSelect => "a list of choices",
                Self::VendorMulti => "a list, map, or string of vendors",
            },
        })
    }
}

fn is_scalar(value: &Value) -> bool {
    matches!(
        value,
        Value::Null | Value::String(_) | Value::Number(_) | Value::Bool(_)
    )
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for QuestionType {
    type Error = ParseQuestionTypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match normalize_tag(value).as_str() {
            "text" | "textarea" => Ok(Self::Text),
            "radio" => Ok(Self::Radio),
            "checkbox" => Ok(Self::Checkbox),
            "vendor_multi" | "vendor_multiselect" => Ok(Self::VendorMulti),
            "multi_select" | "multiselect" => Ok(Self::MultiSelect),
            _ => Err(ParseQuestionTypeError(value.to_owned())),
        }
    }
}

/// Hierarchical vendor answer: category key to an ordered list of vendor
/// codes.
///
/// Every save carries the full map for the question; maps are replaced,
/// never merged per category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VendorSelections(BTreeMap<String, Vec<String>>);

impl VendorSelections {
    /// Creates an empty selection map.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Parses the wire payload. `null` is an empty map.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryDomainError::InvalidVendorSelections`] unless the
    /// payload is an object whose values are lists of strings.
    pub fn from_json(value: &Value) -> Result<Self, DiscoveryDomainError> {
        let object = match value {
            Value::Null => return Ok(Self::new()),
            Value::Object(object) => object,
            _ => return Err(DiscoveryDomainError::InvalidVendorSelections),
        };
        let mut selections = BTreeMap::new();
        for (category, vendors) in object {
            let list = vendors
                .as_array()
                .ok_or(DiscoveryDomainError::InvalidVendorSelections)?
                .iter()
                .map(|vendor| vendor.as_str().map(str::to_owned))
                .collect::<Option<Vec<_>>>()
                .ok_or(DiscoveryDomainError::InvalidVendorSelections)?;
            selections.insert(category.clone(), list);
        }
        Ok(Self(selections))
    }

    /// Adds a category with its vendors, replacing any previous list.
    #[must_use]
    pub fn with_category(
        mut self,
        category: impl Into<String>,
        vendors: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.0
            .insert(category.into(), vendors.into_iter().map(Into::into).collect());
        self
    }

    /// Converts the map to its wire form.
    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(category, vendors)| {
                    (
                        category.clone(),
                        Value::Array(vendors.iter().cloned().map(Value::String).collect()),
                    )
                })
                .collect(),
        )
    }

    /// Iterates categories with their vendor lists.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0
            .iter()
            .map(|(category, vendors)| (category.as_str(), vendors.as_slice()))
    }

    /// Returns the distinct vendor codes across every category.
    #[must_use]
    pub fn vendors(&self) -> BTreeSet<&str> {
        self.0.values().flatten().map(String::as_str).collect()
    }

    /// Returns `true` when no category is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Flattens the map to `Category: A; B | Other: C`.
    #[must_use]
    pub fn flatten(&self) -> String {
        self.0
            .iter()
            .map(|(category, vendors)| format!("{category}: {}", vendors.join("; ")))
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

/// Sizing answer: free-form map of sizing keys to values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SizingSelections(Map<String, Value>);

impl SizingSelections {
    /// Parses the wire payload. `null` is an empty map.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryDomainError::SizingNotObject`] for non-object input.
    pub fn from_json(value: &Value) -> Result<Self, DiscoveryDomainError> {
        match value {
            Value::Null => Ok(Self::default()),
            Value::Object(object) => Ok(Self(object.clone())),
            _ => Err(DiscoveryDomainError::SizingNotObject),
        }
    }

    /// Converts the map to its wire form.
    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Object(self.0.clone())
    }

    /// Returns the underlying map.
    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Returns `true` when no sizing key is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Flattens the map to `key: value | other: value`.
    #[must_use]
    pub fn flatten(&self) -> String {
        self.0
            .iter()
            .map(|(key, value)| format!("{key}: {}", flatten_value(value)))
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

/// Renders a JSON value as plain text for flat exports: strings unquoted,
/// lists joined with `; `, `null` empty.
#[must_use]
pub fn flatten_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Array(items) => items
            .iter()
            .map(flatten_value)
            .collect::<Vec<_>>()
            .join("; "),
        other => other.to_string(),
    }
}

/// The answer content of a response, validated against its question type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseContent {
    question_id: QuestionId,
    question_title: String,
    question_type: QuestionType,
    value: Value,
    raw: Option<String>,
    vendor_selections: VendorSelections,
    sizing_selections: SizingSelections,
}

impl ResponseContent {
    /// Creates validated content. A blank title falls back to the question
    /// identifier.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryDomainError::InvalidResponseValue`] when the value
    /// does not fit the question type.
    pub fn new(
        question_id: QuestionId,
        question_title: impl Into<String>,
        question_type: QuestionType,
        value: Value,
    ) -> Result<Self, DiscoveryDomainError> {
        question_type.validate_value(&value)?;
        let raw_title = question_title.into();
        let title = match raw_title.trim() {
            "" => question_id.as_str().to_owned(),
            trimmed => trimmed.to_owned(),
        };
        Ok(Self {
            question_id,
            question_title: title,
            question_type,
            value,
            raw: None,
            vendor_selections: VendorSelections::new(),
            sizing_selections: SizingSelections::default(),
        })
    }

    /// Attaches the vendor selection map.
    #[must_use]
    pub fn with_vendor_selections(mut self, selections: VendorSelections) -> Self {
        self.vendor_selections = selections;
        self
    }

    /// Attaches the sizing selection map.
    #[must_use]
    pub fn with_sizing_selections(mut self, selections: SizingSelections) -> Self {
        self.sizing_selections = selections;
        self
    }

    /// Attaches the raw text the answer was captured from.
    #[must_use]
    pub fn with_raw(mut self, raw: impl Into<String>) -> Self {
        self.raw = Some(raw.into());
        self
    }

    /// Returns the question identifier.
    #[must_use]
    pub const fn question_id(&self) -> &QuestionId {
        &self.question_id
    }
}

/// One answer to one question within a session.
///
/// `(session_id, question_id)` identifies at most one stored response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryResponse {
    id: ResponseId,
    session_id: SessionId,
    question_id: QuestionId,
    question_title: String,
    question_type: QuestionType,
    value: Value,
    raw: Option<String>,
    vendor_selections: VendorSelections,
    sizing_selections: SizingSelections,
    answered_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedResponseData {
    /// Persisted identifier.
    pub id: ResponseId,
    /// Owning session.
    pub session_id: SessionId,
    /// Persisted answer content.
    pub content: ResponseContent,
    /// When the current answer was given.
    pub answered_at: DateTime<Utc>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl DiscoveryResponse {
    /// Creates a response answered now.
    #[must_use]
    pub fn new(session_id: SessionId, content: ResponseContent, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self::from_persisted(PersistedResponseData {
            id: ResponseId::new(),
            session_id,
            content,
            answered_at: timestamp,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a response from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedResponseData) -> Self {
        let ResponseContent {
            question_id,
            question_title,
            question_type,
            value,
            raw,
            vendor_selections,
            sizing_selections,
        } = data.content;
        Self {
            id: data.id,
            session_id: data.session_id,
            question_id,
            question_title,
            question_type,
            value,
            raw,
            vendor_selections,
            sizing_selections,
            answered_at: data.answered_at,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Overwrites the answer with a later save of the same question. The
    /// identifier and creation time are kept.
    pub fn replace_answer(&mut self, later: &Self) {
        self.question_title.clone_from(&later.question_title);
        self.question_type = later.question_type;
        self.value.clone_from(&later.value);
        self.raw.clone_from(&later.raw);
        self.vendor_selections.clone_from(&later.vendor_selections);
        self.sizing_selections.clone_from(&later.sizing_selections);
        self.answered_at = later.answered_at;
        self.updated_at = later.updated_at;
    }

    /// Returns the response identifier.
    #[must_use]
    pub const fn id(&self) -> ResponseId {
        self.id
    }

    /// Returns the owning session.
    #[must_use]
    pub const fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Returns the question identifier.
    #[must_use]
    pub const fn question_id(&self) -> &QuestionId {
        &self.question_id
    }

    /// Returns the question title.
    #[must_use]
    pub fn question_title(&self) -> &str {
        &self.question_title
    }

    /// Returns the question type.
    #[must_use]
    pub const fn question_type(&self) -> QuestionType {
        self.question_type
    }

    /// Returns the answer value.
    #[must_use]
    pub const fn value(&self) -> &Value {
        &self.value
    }

    /// Returns the raw captured text.
    #[must_use]
    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    /// Returns the vendor selections.
    #[must_use]
    pub const fn vendor_selections(&self) -> &VendorSelections {
        &self.vendor_selections
    }

    /// Returns the sizing selections.
    #[must_use]
    pub const fn sizing_selections(&self) -> &SizingSelections {
        &self.sizing_selections
    }

    /// Returns when the current answer was given.
    #[must_use]
    pub const fn answered_at(&self) -> DateTime<Utc> {
        self.answered_at
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
}
