//! Technical Win status derived from a row's todos.

use super::Todo;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse progress label written back into a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TechnicalWinStatus {
    /// The row has no bound todos.
    #[serde(rename = "No Todos")]
    NoTodos,
    /// Some bound todos are still open.
    #[serde(rename = "In Progress")]
    InProgress,
    /// Every bound todo is done.
    #[serde(rename = "Completed")]
    Completed,
}

impl TechnicalWinStatus {
    /// Returns the label stored in the row.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::NoTodos => "No Todos",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
        }
    }
}

impl fmt::Display for TechnicalWinStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Completion summary for one row.
///
/// # Examples
///
/// ```rust
/// use contrivance::pipeline::domain::{RowCompletion, TechnicalWinStatus};
///
/// let completion = RowCompletion::from_counts(3, 1);
/// assert_eq!(completion.percentage(), 33);
/// assert_eq!(completion.status(), TechnicalWinStatus::InProgress);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowCompletion {
    total: usize,
    completed: usize,
    percentage: u8,
    status: TechnicalWinStatus,
}

impl RowCompletion {
    /// Derives the summary from raw counts. `completed` is clamped to
    /// `total`.
    #[must_use]
    pub fn from_counts(total: usize, completed: usize) -> Self {
        let done = completed.min(total);
        let status = if total == 0 {
            TechnicalWinStatus::NoTodos
        } else if done == total {
            TechnicalWinStatus::Completed
        } else {
            TechnicalWinStatus::InProgress
        };
        Self {
            total,
            completed: done,
            percentage: rounded_percentage(total, done),
            status,
        }
    }

    /// Derives the summary from the todos bound to a row.
    #[must_use]
    pub fn from_todos(todos: &[Todo]) -> Self {
        let completed = todos.iter().filter(|todo| todo.is_completed()).count();
        Self::from_counts(todos.len(), completed)
    }

    /// Returns the number of bound todos.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.total
    }

    /// Returns the number of completed todos.
    #[must_use]
    pub const fn completed(&self) -> usize {
        self.completed
    }

    /// Returns the rounded completion percentage (0 when there are no
    /// todos).
    #[must_use]
    pub const fn percentage(&self) -> u8 {
        self.percentage
    }

    /// Returns the derived label.
    #[must_use]
    pub const fn status(&self) -> TechnicalWinStatus {
        self.status
    }
}

/// Half-up rounding of `100 * done / total` in integer arithmetic.
pub(crate) fn rounded_percentage(total: usize, done: usize) -> u8 {
    let total_wide = u64::try_from(total).unwrap_or(u64::MAX);
    let done_wide = u64::try_from(done).unwrap_or(u64::MAX);
    let numerator = done_wide.saturating_mul(200).saturating_add(total_wide);
    let denominator = total_wide.saturating_mul(2);
    numerator
        .checked_div(denominator)
        .and_then(|value| u8::try_from(value.min(100)).ok())
        .unwrap_or(0)
}
