//! Diesel schema for audit persistence.

diesel::table! {
    /// Append-only audit entries.
    audit_entries (id) {
        /// Entry identifier.
        id -> Uuid,
        /// Mutation kind.
        #[max_length = 32]
        action -> Varchar,
        /// Entity family.
        #[max_length = 64]
        entity_type -> Varchar,
        /// Entity identifier.
        entity_id -> Uuid,
        /// Change payload as JSONB.
        changes -> Jsonb,
        /// Acting user, if known.
        actor_id -> Nullable<Uuid>,
        /// Recording timestamp.
        recorded_at -> Timestamptz,
    }
}
