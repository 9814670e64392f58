//! Todo aggregate and ledger statistics.

use super::{ParseTodoPriorityError, PipelineDomainError, RowId, SpreadsheetId, TodoId};
use crate::ids::UserId;
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Urgency of a todo.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoPriority {
    /// Can wait.
    Low,
    /// Normal urgency.
    #[default]
    Medium,
    /// Needs attention first.
    High,
}

impl TodoPriority {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for TodoPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TodoPriority {
    type Error = ParseTodoPriorityError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(ParseTodoPriorityError(value.to_owned())),
        }
    }
}

/// Validated, trimmed todo title.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoTitle(String);

impl TodoTitle {
    /// Creates a validated title.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineDomainError::EmptyTodoTitle`] for blank input.
    pub fn new(value: impl Into<String>) -> Result<Self, PipelineDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PipelineDomainError::EmptyTodoTitle);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the title as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TodoTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Optional attributes of a todo.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoDetails {
    /// Longer description.
    pub description: Option<String>,
    /// Urgency.
    pub priority: TodoPriority,
    /// Target completion date.
    pub due_date: Option<NaiveDate>,
    /// Link to a supporting document.
    pub supporting_artifact: Option<String>,
    /// Assigned user.
    pub assigned_to: Option<UserId>,
}

/// A trackable unit of work within a spreadsheet, optionally bound to a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    id: TodoId,
    spreadsheet_id: SpreadsheetId,
    row_id: Option<RowId>,
    title: TodoTitle,
    description: Option<String>,
    priority: TodoPriority,
    completed: bool,
    due_date: Option<NaiveDate>,
    supporting_artifact: Option<String>,
    created_by: Option<UserId>,
    assigned_to: Option<UserId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted todo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTodoData {
    /// Persisted identifier.
    pub id: TodoId,
    /// Owning spreadsheet.
    pub spreadsheet_id: SpreadsheetId,
    /// Bound row, if any.
    pub row_id: Option<RowId>,
    /// Persisted title.
    pub title: TodoTitle,
    /// Persisted optional attributes.
    pub details: TodoDetails,
    /// Persisted completion flag.
    pub completed: bool,
    /// Creating user.
    pub created_by: Option<UserId>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Field-level changes applied by an update. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoChanges {
    /// New title.
    pub title: Option<TodoTitle>,
    /// New description; `Some(None)` clears it.
    pub description: Option<Option<String>>,
    /// New priority.
    pub priority: Option<TodoPriority>,
    /// New completion flag.
    pub completed: Option<bool>,
    /// New due date; `Some(None)` clears it.
    pub due_date: Option<Option<NaiveDate>>,
    /// New artifact link; `Some(None)` clears it.
    pub supporting_artifact: Option<Option<String>>,
    /// New assignee; `Some(None)` clears it.
    pub assigned_to: Option<Option<UserId>>,
}

impl TodoChanges {
    /// Returns `true` when no field would change.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.completed.is_none()
            && self.due_date.is_none()
            && self.supporting_artifact.is_none()
            && self.assigned_to.is_none()
    }
}

impl Todo {
    /// Creates an open todo.
    #[must_use]
    pub fn new(
        spreadsheet_id: SpreadsheetId,
        row_id: Option<RowId>,
        title: TodoTitle,
        details: TodoDetails,
        created_by: Option<UserId>,
        clock: &impl Clock,
    ) -> Self {
        let timestamp = clock.utc();
        Self::from_persisted(PersistedTodoData {
            id: TodoId::new(),
            spreadsheet_id,
            row_id,
            title,
            details,
            completed: false,
            created_by,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a todo from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTodoData) -> Self {
        let TodoDetails {
            description,
            priority,
            due_date,
            supporting_artifact,
            assigned_to,
        } = data.details;
        Self {
            id: data.id,
            spreadsheet_id: data.spreadsheet_id,
            row_id: data.row_id,
            title: data.title,
            description,
            priority,
            completed: data.completed,
            due_date,
            supporting_artifact,
            created_by: data.created_by,
            assigned_to,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the todo identifier.
    #[must_use]
    pub const fn id(&self) -> TodoId {
        self.id
    }

    /// Returns the owning spreadsheet.
    #[must_use]
    pub const fn spreadsheet_id(&self) -> SpreadsheetId {
        self.spreadsheet_id
    }

    /// Returns the bound row, if any.
    #[must_use]
    pub const fn row_id(&self) -> Option<RowId> {
        self.row_id
    }

    /// Returns the title.
    #[must_use]
    pub const fn title(&self) -> &TodoTitle {
        &self.title
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> TodoPriority {
        self.priority
    }

    /// Returns whether the todo is done.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.completed
    }

    /// Returns the due date.
    #[must_use]
    pub const fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    /// Returns the supporting artifact link.
    #[must_use]
    pub fn supporting_artifact(&self) -> Option<&str> {
        self.supporting_artifact.as_deref()
    }

    /// Returns the creating user.
    #[must_use]
    pub const fn created_by(&self) -> Option<UserId> {
        self.created_by
    }

    /// Returns the assignee.
    #[must_use]
    pub const fn assigned_to(&self) -> Option<UserId> {
        self.assigned_to
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

    /// Sets the completion flag.
    pub fn set_completed(&mut self, completed: bool, clock: &impl Clock) {
        self.completed = completed;
        self.touch(clock);
    }

    /// Flips the completion flag.
    pub fn toggle(&mut self, clock: &impl Clock) {
        self.set_completed(!self.completed, clock);
    }

    /// Detaches the todo from its row, making it pipeline-level.
    ///
    /// Takes the timestamp of the row deletion that caused the unbind.
    pub const fn unbind_row(&mut self, at: DateTime<Utc>) {
        self.row_id = None;
        self.updated_at = at;
    }

    /// Applies field-level changes.
    pub fn apply(&mut self, changes: TodoChanges, clock: &impl Clock) {
        let TodoChanges {
            title,
            description,
            priority,
            completed,
            due_date,
            supporting_artifact,
            assigned_to,
        } = changes;
        if let Some(value) = title {
            self.title = value;
        }
        if let Some(value) = description {
            self.description = value;
        }
        if let Some(value) = priority {
            self.priority = value;
        }
        if let Some(value) = completed {
            self.completed = value;
        }
        if let Some(value) = due_date {
            self.due_date = value;
        }
        if let Some(value) = supporting_artifact {
            self.supporting_artifact = value;
        }
        if let Some(value) = assigned_to {
            self.assigned_to = value;
        }
        self.touch(clock);
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}

/// Completion and priority counts over a set of todos.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoStats {
    /// Number of todos.
    pub total: usize,
    /// Number of completed todos.
    pub completed: usize,
    /// Number of open todos.
    pub pending: usize,
    /// Number of high-priority todos.
    pub high_priority: usize,
    /// Number of medium-priority todos.
    pub medium_priority: usize,
    /// Number of low-priority todos.
    pub low_priority: usize,
}

impl TodoStats {
    /// Counts a slice of todos.
    #[must_use]
    pub fn from_todos(todos: &[Todo]) -> Self {
        todos.iter().fold(Self::default(), |mut stats, todo| {
            stats.total += 1;
            if todo.is_completed() {
                stats.completed += 1;
            } else {
                stats.pending += 1;
            }
            match todo.priority() {
                TodoPriority::High => stats.high_priority += 1,
                TodoPriority::Medium => stats.medium_priority += 1,
                TodoPriority::Low => stats.low_priority += 1,
            }
            stats
        })
    }
}
