//! Machine-readable error classification shared by every service.
//!
//! Each service error exposes a `kind()` so transports can map failures to
//! status codes without matching on individual variants, while `Display`
//! carries the human-readable message.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse classification of a failed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The request was malformed or violated a domain rule.
    Validation,
    /// A referenced entity does not exist.
    NotFound,
    /// The request collides with existing state.
    Conflict,
    /// Storage or an external collaborator could not be reached.
    Unavailable,
    /// Persisted state could not be interpreted.
    Internal,
}

impl ErrorKind {
    /// Returns the canonical wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Unavailable => "unavailable",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serializable error envelope for transport layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    /// Machine-readable classification.
    pub kind: ErrorKind,
    /// Human-readable description.
    pub message: String,
}

impl ErrorReport {
    /// Builds a report from any error exposing a kind.
    #[must_use]
    pub fn new(kind: ErrorKind, err: &impl std::error::Error) -> Self {
        Self {
            kind,
            message: err.to_string(),
        }
    }
}
