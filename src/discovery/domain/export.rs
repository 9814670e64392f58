//! Flat session exports and the record of each export attempt.

use super::{
    ExportId, ParseExportFormatError, ParseExportStatusError, SessionDetails, SessionId,
    flatten_value,
};
use crate::ids::UserId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Column headers of the CSV export, one record per response.
pub const CSV_HEADERS: [&str; 6] = [
    "Question ID",
    "Question Title",
    "Question Type",
    "Response Value",
    "Vendors Selected",
    "Sizing Selected",
];

/// Supported export encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    /// Pretty-printed session details.
    Json,
    /// One comma-separated record per response.
    Csv,
}

impl ExportFormat {
    /// Returns the canonical name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }

    /// Returns the MIME type of the payload.
    #[must_use]
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Csv => "text/csv",
        }
    }

    /// Renders session details in this format.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the details cannot be encoded.
    pub fn render(self, details: &SessionDetails) -> Result<Vec<u8>, serde_json::Error> {
        match self {
            Self::Json => serde_json::to_vec_pretty(details),
            Self::Csv => Ok(render_csv(details).into_bytes()),
        }
    }

    /// Returns the download file name for a session export.
    #[must_use]
    pub fn file_name(self, details: &SessionDetails) -> String {
        format!(
            "discovery-{}-{}.{}",
            details.session.account().slug(),
            details.session.id(),
            self.as_str()
        )
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ExportFormat {
    type Error = ParseExportFormatError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            _ => Err(ParseExportFormatError(value.to_owned())),
        }
    }
}

/// Renders one CSV record per response, quoting per RFC 4180 with CRLF line
/// endings.
#[must_use]
pub fn render_csv(details: &SessionDetails) -> String {
    let mut out = String::new();
    push_record(&mut out, CSV_HEADERS.iter().map(|header| (*header).to_owned()));
    for response in &details.responses {
        push_record(
            &mut out,
            [
                response.question_id().as_str().to_owned(),
                response.question_title().to_owned(),
                response.question_type().as_str().to_owned(),
                flatten_value(response.value()),
                response.vendor_selections().flatten(),
                response.sizing_selections().flatten(),
            ],
        );
    }
    out
}

fn push_record(out: &mut String, fields: impl IntoIterator<Item = String>) {
    for (index, field) in fields.into_iter().enumerate() {
        if index > 0 {
            out.push(',');
        }
        out.push_str(&escape_field(&field));
    }
    out.push_str("\r\n");
}

/// Quotes a field when it contains a delimiter, quote, or line break.
#[must_use]
pub fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_owned()
    }
}

/// Returns the lowercase hexadecimal SHA-256 digest of a payload.
#[must_use]
pub fn payload_digest(payload: &[u8]) -> String {
    format!("{:x}", Sha256::digest(payload))
}

/// Outcome of an export attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportStatus {
    /// The payload was produced.
    Success,
    /// The attempt failed; the record carries the reason.
    Failed,
}

impl ExportStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }
}

impl TryFrom<&str> for ExportStatus {
    type Error = ParseExportStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "success" => Ok(Self::Success),
            "failed" => Ok(Self::Failed),
            other => Err(ParseExportStatusError(other.to_owned())),
        }
    }
}

/// Record of one export attempt, successful or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRecord {
    id: ExportId,
    session_id: SessionId,
    requested_by: Option<UserId>,
    format: String,
    status: ExportStatus,
    error_message: Option<String>,
    digest: Option<String>,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted export record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedExportData {
    /// Persisted identifier.
    pub id: ExportId,
    /// Exported session.
    pub session_id: SessionId,
    /// Requesting user.
    pub requested_by: Option<UserId>,
    /// Requested format, verbatim.
    pub format: String,
    /// Outcome.
    pub status: ExportStatus,
    /// Failure reason.
    pub error_message: Option<String>,
    /// Payload digest for successful exports.
    pub digest: Option<String>,
    /// Attempt timestamp.
    pub created_at: DateTime<Utc>,
}

impl ExportRecord {
    /// Records a successful export.
    #[must_use]
    pub fn succeeded(
        session_id: SessionId,
        requested_by: Option<UserId>,
        format: ExportFormat,
        payload: &[u8],
        clock: &impl Clock,
    ) -> Self {
        Self::from_persisted(PersistedExportData {
            id: ExportId::new(),
            session_id,
            requested_by,
            format: format.as_str().to_owned(),
            status: ExportStatus::Success,
            error_message: None,
            digest: Some(payload_digest(payload)),
            created_at: clock.utc(),
        })
    }

    /// Records a failed export. `format` is kept verbatim, even when it is
    /// not a supported format.
    #[must_use]
    pub fn failed(
        session_id: SessionId,
        requested_by: Option<UserId>,
        format: &str,
        reason: &impl fmt::Display,
        clock: &impl Clock,
    ) -> Self {
        Self::from_persisted(PersistedExportData {
            id: ExportId::new(),
            session_id,
            requested_by,
            format: format.to_owned(),
            status: ExportStatus::Failed,
            error_message: Some(reason.to_string()),
            digest: None,
            created_at: clock.utc(),
        })
    }

    /// Reconstructs a record from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedExportData) -> Self {
        Self {
            id: data.id,
            session_id: data.session_id,
            requested_by: data.requested_by,
            format: data.format,
            status: data.status,
            error_message: data.error_message,
            digest: data.digest,
            created_at: data.created_at,
        }
    }

    /// Returns the record identifier.
    #[must_use]
    pub const fn id(&self) -> ExportId {
        self.id
    }

    /// Returns the exported session.
    #[must_use]
    pub const fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Returns the requesting user.
    #[must_use]
    pub const fn requested_by(&self) -> Option<UserId> {
        self.requested_by
    }

    /// Returns the requested format.
    #[must_use]
    pub fn format(&self) -> &str {
        &self.format
    }

    /// Returns the outcome.
    #[must_use]
    pub const fn status(&self) -> ExportStatus {
        self.status
    }

    /// Returns the failure reason.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Returns the payload digest.
    #[must_use]
    pub fn digest(&self) -> Option<&str> {
        self.digest.as_deref()
    }

    /// Returns the attempt timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
