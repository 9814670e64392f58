//! Identifier types for the discovery domain.

use crate::ids::uuid_identifier;

uuid_identifier!(
    /// Unique identifier for a discovery session.
    SessionId
);

uuid_identifier!(
    /// Unique identifier for a stored response.
    ResponseId
);

uuid_identifier!(
    /// Unique identifier for a session note.
    NoteId
);

uuid_identifier!(
    /// Unique identifier for an export attempt.
    ExportId
);
