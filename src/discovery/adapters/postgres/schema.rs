//! Diesel schema for discovery persistence.

diesel::table! {
    /// Discovery sessions.
    discovery_sessions (id) {
        /// Session identifier.
        id -> Uuid,
        /// CRM account identifier.
        #[max_length = 255]
        account_id -> Varchar,
        /// Account display name.
        #[max_length = 255]
        account_name -> Varchar,
        /// Owning user.
        user_id -> Uuid,
        /// Vertical tag.
        #[max_length = 64]
        vertical -> Varchar,
        /// Lifecycle status.
        #[max_length = 32]
        status -> Varchar,
        /// Free-form metadata as JSONB.
        metadata -> Jsonb,
        /// When answering began.
        started_at -> Timestamptz,
        /// When the session was completed.
        completed_at -> Nullable<Timestamptz>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Responses, unique per session and question.
    discovery_responses (id) {
        /// Response identifier.
        id -> Uuid,
        /// Owning session.
        session_id -> Uuid,
        /// Question catalog key.
        #[max_length = 255]
        question_id -> Varchar,
        /// Question title at answer time.
        question_title -> Text,
        /// Question type tag.
        #[max_length = 32]
        question_type -> Varchar,
        /// Answer value as JSONB.
        response_value -> Jsonb,
        /// Raw captured text.
        response_raw -> Nullable<Text>,
        /// Category to vendor list map as JSONB.
        vendor_selections -> Jsonb,
        /// Sizing map as JSONB.
        sizing_selections -> Jsonb,
        /// When the current answer was given.
        answered_at -> Timestamptz,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Session notes.
    discovery_notes (id) {
        /// Note identifier.
        id -> Uuid,
        /// Owning session.
        session_id -> Uuid,
        /// Writing user.
        user_id -> Uuid,
        /// Note text.
        note_text -> Text,
        /// Note tag.
        #[max_length = 64]
        note_type -> Varchar,
        /// Response the note is about.
        related_response_id -> Nullable<Uuid>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Export attempts. No foreign key: failed attempts may name unknown
    /// sessions.
    discovery_exports (id) {
        /// Record identifier.
        id -> Uuid,
        /// Exported session.
        session_id -> Uuid,
        /// Requesting user.
        user_id -> Nullable<Uuid>,
        /// Requested format, verbatim.
        export_format -> Text,
        /// Outcome.
        #[max_length = 16]
        status -> Varchar,
        /// Failure reason.
        error_message -> Nullable<Text>,
        /// SHA-256 of the payload, hex encoded.
        #[max_length = 64]
        payload_digest -> Nullable<Varchar>,
        /// Attempt timestamp.
        created_at -> Timestamptz,
    }
}

diesel::joinable!(discovery_responses -> discovery_sessions (session_id));
diesel::joinable!(discovery_notes -> discovery_sessions (session_id));

diesel::allow_tables_to_appear_in_same_query!(
    discovery_sessions,
    discovery_responses,
    discovery_notes,
    discovery_exports,
);
