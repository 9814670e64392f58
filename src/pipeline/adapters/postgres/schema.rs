//! Diesel schema for pipeline persistence.

diesel::table! {
    /// Pipeline spreadsheets.
    spreadsheets (id) {
        /// Spreadsheet identifier.
        id -> Uuid,
        /// Display name.
        #[max_length = 255]
        name -> Varchar,
        /// Optional description.
        description -> Nullable<Text>,
        /// Owning user.
        owner_id -> Uuid,
        /// Visibility flag.
        is_public -> Bool,
        /// Free-form settings as JSONB.
        settings -> Jsonb,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Column definitions.
    spreadsheet_columns (id) {
        /// Column identifier.
        id -> Uuid,
        /// Owning spreadsheet.
        spreadsheet_id -> Uuid,
        /// Column name, unique per spreadsheet.
        #[max_length = 255]
        name -> Varchar,
        /// Type tag.
        #[max_length = 32]
        column_type -> Varchar,
        /// Option catalog or informal constraints as JSONB.
        validation -> Jsonb,
        /// Display hints as JSONB.
        display -> Jsonb,
        /// Display position, unique per spreadsheet.
        position -> Int4,
        /// Required flag.
        is_required -> Bool,
        /// Default value for new rows.
        default_value -> Nullable<Jsonb>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Spreadsheet rows.
    spreadsheet_rows (id) {
        /// Row identifier.
        id -> Uuid,
        /// Owning spreadsheet.
        spreadsheet_id -> Uuid,
        /// Attribute map keyed by column name.
        data -> Jsonb,
        /// Display position.
        position -> Int4,
        /// Creating user.
        created_by -> Nullable<Uuid>,
        /// Last updating user.
        updated_by -> Nullable<Uuid>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Todos, optionally bound to a row.
    todos (id) {
        /// Todo identifier.
        id -> Uuid,
        /// Owning spreadsheet.
        spreadsheet_id -> Uuid,
        /// Bound row.
        row_id -> Nullable<Uuid>,
        /// Title.
        #[max_length = 500]
        title -> Varchar,
        /// Description.
        description -> Nullable<Text>,
        /// Priority tag.
        #[max_length = 16]
        priority -> Varchar,
        /// Completion flag.
        completed -> Bool,
        /// Due date.
        due_date -> Nullable<Date>,
        /// Supporting artifact link.
        supporting_artifact -> Nullable<Text>,
        /// Creating user.
        created_by -> Nullable<Uuid>,
        /// Assigned user.
        assigned_to -> Nullable<Uuid>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}
