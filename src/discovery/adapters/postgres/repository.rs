//! `PostgreSQL` implementation of the discovery ports.

use super::{
    models::{ExportRecordRow, NoteRecord, ResponseRecord, SessionRecord},
    schema::{discovery_exports, discovery_notes, discovery_responses, discovery_sessions},
};
use crate::{
    audit::{adapters::postgres::insert_entry, domain::AuditEntry},
    db::PgPool,
    discovery::{
        domain::{
            AccountRef, DiscoveryDomainError, DiscoveryNote, DiscoveryResponse, DiscoverySession,
            ExportId, ExportRecord, ExportStatus, NoteId, NoteText, PersistedExportData,
            PersistedNoteData, PersistedResponseData, PersistedSessionData, QuestionId,
            QuestionType, ResponseContent, ResponseId, SessionId, SessionStatus,
            SizingSelections, VendorSelections, Vertical,
        },
        ports::{
            DiscoveryRepository, DiscoveryRepositoryError, DiscoveryRepositoryResult,
            ExportRepository,
        },
    },
    ids::UserId,
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::upsert::excluded;
use serde_json::Value;

/// `PostgreSQL`-backed discovery store.
#[derive(Debug, Clone)]
pub struct PostgresDiscoveryStore {
    pool: PgPool,
}

impl PostgresDiscoveryStore {
    /// Creates a store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> DiscoveryRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> DiscoveryRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(DiscoveryRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(DiscoveryRepositoryError::persistence)?
    }
}

impl From<DieselError> for DiscoveryRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

/// Maps a foreign-key violation on `session_id` to a missing session.
fn session_violation(session: SessionId) -> impl Fn(DieselError) -> DiscoveryRepositoryError {
    move |err| match err {
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
            DiscoveryRepositoryError::SessionNotFound(session)
        }
        _ => DiscoveryRepositoryError::persistence(err),
    }
}

#[async_trait]
impl DiscoveryRepository for PostgresDiscoveryStore {
    async fn insert_session(
        &self,
        session: &DiscoverySession,
        audit: &AuditEntry,
    ) -> DiscoveryRepositoryResult<()> {
        let record = session_to_record(session);
        let entry = audit.clone();
        self.run_blocking(move |connection| {
            connection.transaction::<_, DiscoveryRepositoryError, _>(|tx| {
                diesel::insert_into(discovery_sessions::table)
                    .values(&record)
                    .execute(tx)?;
                insert_entry(tx, &entry)?;
                Ok(())
            })
        })
        .await
    }

    async fn update_session(
        &self,
        session: &DiscoverySession,
        audit: &AuditEntry,
    ) -> DiscoveryRepositoryResult<()> {
        let record = session_to_record(session);
        let entry = audit.clone();
        self.run_blocking(move |connection| {
            connection.transaction::<_, DiscoveryRepositoryError, _>(|tx| {
                let updated = diesel::update(discovery_sessions::table.find(record.id))
                    .set((
                        discovery_sessions::status.eq(&record.status),
                        discovery_sessions::metadata.eq(&record.metadata),
                        discovery_sessions::completed_at.eq(record.completed_at),
                        discovery_sessions::updated_at.eq(record.updated_at),
                    ))
                    .execute(tx)?;
                if updated == 0 {
                    return Err(DiscoveryRepositoryError::SessionNotFound(
                        SessionId::from_uuid(record.id),
                    ));
                }
                insert_entry(tx, &entry)?;
                Ok(())
            })
        })
        .await
    }

    async fn find_session(
        &self,
        id: SessionId,
    ) -> DiscoveryRepositoryResult<Option<DiscoverySession>> {
        self.run_blocking(move |connection| {
            let record = discovery_sessions::table
                .find(id.into_inner())
                .select(SessionRecord::as_select())
                .first::<SessionRecord>(connection)
                .optional()?;
            record.map(record_to_session).transpose()
        })
        .await
    }

    async fn list_sessions_for_account(
        &self,
        account_id: &str,
    ) -> DiscoveryRepositoryResult<Vec<DiscoverySession>> {
        let account = account_id.to_owned();
        self.run_blocking(move |connection| {
            let records = discovery_sessions::table
                .filter(discovery_sessions::account_id.eq(&account))
                .order(discovery_sessions::created_at.asc())
                .select(SessionRecord::as_select())
                .load::<SessionRecord>(connection)?;
            records.into_iter().map(record_to_session).collect()
        })
        .await
    }

    async fn upsert_response(
        &self,
        response: &DiscoveryResponse,
        audit: &AuditEntry,
    ) -> DiscoveryRepositoryResult<DiscoveryResponse> {
        let record = response_to_record(response);
        let entry = audit.clone();
        let session = response.session_id();
        self.run_blocking(move |connection| {
            connection.transaction::<_, DiscoveryRepositoryError, _>(|tx| {
                let stored = diesel::insert_into(discovery_responses::table)
                    .values(&record)
                    .on_conflict((
                        discovery_responses::session_id,
                        discovery_responses::question_id,
                    ))
                    .do_update()
                    .set((
                        discovery_responses::question_title
                            .eq(excluded(discovery_responses::question_title)),
                        discovery_responses::question_type
                            .eq(excluded(discovery_responses::question_type)),
                        discovery_responses::response_value
                            .eq(excluded(discovery_responses::response_value)),
                        discovery_responses::response_raw
                            .eq(excluded(discovery_responses::response_raw)),
                        discovery_responses::vendor_selections
                            .eq(excluded(discovery_responses::vendor_selections)),
                        discovery_responses::sizing_selections
                            .eq(excluded(discovery_responses::sizing_selections)),
                        discovery_responses::answered_at
                            .eq(excluded(discovery_responses::answered_at)),
                        discovery_responses::updated_at
                            .eq(excluded(discovery_responses::updated_at)),
                    ))
                    .returning(ResponseRecord::as_returning())
                    .get_result::<ResponseRecord>(tx)
                    .map_err(session_violation(session))?;
                let response = record_to_response(stored)?;
                insert_entry(tx, &entry.for_entity(response.id().into_inner()))?;
                Ok(response)
            })
        })
        .await
    }

    async fn find_response(
        &self,
        id: ResponseId,
    ) -> DiscoveryRepositoryResult<Option<DiscoveryResponse>> {
        self.run_blocking(move |connection| {
            let record = discovery_responses::table
                .find(id.into_inner())
                .select(ResponseRecord::as_select())
                .first::<ResponseRecord>(connection)
                .optional()?;
            record.map(record_to_response).transpose()
        })
        .await
    }

    async fn list_responses(
        &self,
        session_id: SessionId,
    ) -> DiscoveryRepositoryResult<Vec<DiscoveryResponse>> {
        self.run_blocking(move |connection| {
            let records = discovery_responses::table
                .filter(discovery_responses::session_id.eq(session_id.into_inner()))
                .order((
                    discovery_responses::answered_at.asc(),
                    discovery_responses::question_id.asc(),
                ))
                .select(ResponseRecord::as_select())
                .load::<ResponseRecord>(connection)?;
            records.into_iter().map(record_to_response).collect()
        })
        .await
    }

    async fn insert_note(
        &self,
        note: &DiscoveryNote,
        audit: &AuditEntry,
    ) -> DiscoveryRepositoryResult<()> {
        let record = note_to_record(note);
        let entry = audit.clone();
        let session = note.session_id();
        self.run_blocking(move |connection| {
            connection.transaction::<_, DiscoveryRepositoryError, _>(|tx| {
                diesel::insert_into(discovery_notes::table)
                    .values(&record)
                    .execute(tx)
                    .map_err(session_violation(session))?;
                insert_entry(tx, &entry)?;
                Ok(())
            })
        })
        .await
    }

    async fn update_note(
        &self,
        note: &DiscoveryNote,
        audit: &AuditEntry,
    ) -> DiscoveryRepositoryResult<()> {
        let record = note_to_record(note);
        let entry = audit.clone();
        self.run_blocking(move |connection| {
            connection.transaction::<_, DiscoveryRepositoryError, _>(|tx| {
                let updated = diesel::update(discovery_notes::table.find(record.id))
                    .set((
                        discovery_notes::note_text.eq(&record.note_text),
                        discovery_notes::note_type.eq(&record.note_type),
                        discovery_notes::updated_at.eq(record.updated_at),
                    ))
                    .execute(tx)?;
                if updated == 0 {
                    return Err(DiscoveryRepositoryError::NoteNotFound(NoteId::from_uuid(
                        record.id,
                    )));
                }
                insert_entry(tx, &entry)?;
                Ok(())
            })
        })
        .await
    }

    async fn delete_note(&self, id: NoteId, audit: &AuditEntry) -> DiscoveryRepositoryResult<()> {
        let entry = audit.clone();
        self.run_blocking(move |connection| {
            connection.transaction::<_, DiscoveryRepositoryError, _>(|tx| {
                let deleted =
                    diesel::delete(discovery_notes::table.find(id.into_inner())).execute(tx)?;
                if deleted == 0 {
                    return Err(DiscoveryRepositoryError::NoteNotFound(id));
                }
                insert_entry(tx, &entry)?;
                Ok(())
            })
        })
        .await
    }

    async fn find_note(&self, id: NoteId) -> DiscoveryRepositoryResult<Option<DiscoveryNote>> {
        self.run_blocking(move |connection| {
            let record = discovery_notes::table
                .find(id.into_inner())
                .select(NoteRecord::as_select())
                .first::<NoteRecord>(connection)
                .optional()?;
            record.map(record_to_note).transpose()
        })
        .await
    }

    async fn list_notes(
        &self,
        session_id: SessionId,
    ) -> DiscoveryRepositoryResult<Vec<DiscoveryNote>> {
        self.run_blocking(move |connection| {
            let records = discovery_notes::table
                .filter(discovery_notes::session_id.eq(session_id.into_inner()))
                .order(discovery_notes::created_at.desc())
                .select(NoteRecord::as_select())
                .load::<NoteRecord>(connection)?;
            records.into_iter().map(record_to_note).collect()
        })
        .await
    }
}

#[async_trait]
impl ExportRepository for PostgresDiscoveryStore {
    async fn insert_export(
        &self,
        record: &ExportRecord,
        audit: &AuditEntry,
    ) -> DiscoveryRepositoryResult<()> {
        let row = export_to_record(record);
        let entry = audit.clone();
        self.run_blocking(move |connection| {
            connection.transaction::<_, DiscoveryRepositoryError, _>(|tx| {
                diesel::insert_into(discovery_exports::table)
                    .values(&row)
                    .execute(tx)?;
                insert_entry(tx, &entry)?;
                Ok(())
            })
        })
        .await
    }

    async fn list_exports(
        &self,
        session_id: SessionId,
    ) -> DiscoveryRepositoryResult<Vec<ExportRecord>> {
        self.run_blocking(move |connection| {
            let rows = discovery_exports::table
                .filter(discovery_exports::session_id.eq(session_id.into_inner()))
                .order(discovery_exports::created_at.desc())
                .select(ExportRecordRow::as_select())
                .load::<ExportRecordRow>(connection)?;
            rows.into_iter().map(record_to_export).collect()
        })
        .await
    }
}

fn session_to_record(session: &DiscoverySession) -> SessionRecord {
    SessionRecord {
        id: session.id().into_inner(),
        account_id: session.account().id().to_owned(),
        account_name: session.account().name().to_owned(),
        user_id: session.owner().into_inner(),
        vertical: session.vertical().as_str().to_owned(),
        status: session.status().as_str().to_owned(),
        metadata: Value::Object(session.metadata().clone()),
        started_at: session.started_at(),
        completed_at: session.completed_at(),
        created_at: session.created_at(),
        updated_at: session.updated_at(),
    }
}

fn record_to_session(record: SessionRecord) -> DiscoveryRepositoryResult<DiscoverySession> {
    let SessionRecord {
        id,
        account_id,
        account_name,
        user_id,
        vertical,
        status,
        metadata,
        started_at,
        completed_at,
        created_at,
        updated_at,
    } = record;
    let account = AccountRef::new(account_id, account_name)
        .map_err(DiscoveryRepositoryError::invalid_persisted_data)?;
    let parsed_vertical = Vertical::try_from(vertical.as_str())
        .map_err(DiscoveryRepositoryError::invalid_persisted_data)?;
    let parsed_status = SessionStatus::try_from(status.as_str())
        .map_err(DiscoveryRepositoryError::invalid_persisted_data)?;
    let Value::Object(parsed_metadata) = metadata else {
        return Err(DiscoveryRepositoryError::invalid_persisted_data(
            DiscoveryDomainError::MetadataNotObject,
        ));
    };
    Ok(DiscoverySession::from_persisted(PersistedSessionData {
        id: SessionId::from_uuid(id),
        account,
        owner: UserId::from_uuid(user_id),
        vertical: parsed_vertical,
        status: parsed_status,
        metadata: parsed_metadata,
        started_at,
        completed_at,
        created_at,
        updated_at,
    }))
}

fn response_to_record(response: &DiscoveryResponse) -> ResponseRecord {
    ResponseRecord {
        id: response.id().into_inner(),
        session_id: response.session_id().into_inner(),
        question_id: response.question_id().as_str().to_owned(),
        question_title: response.question_title().to_owned(),
        question_type: response.question_type().as_str().to_owned(),
        response_value: response.value().clone(),
        response_raw: response.raw().map(str::to_owned),
        vendor_selections: response.vendor_selections().to_json(),
        sizing_selections: response.sizing_selections().to_json(),
        answered_at: response.answered_at(),
        created_at: response.created_at(),
        updated_at: response.updated_at(),
    }
}

fn record_to_response(record: ResponseRecord) -> DiscoveryRepositoryResult<DiscoveryResponse> {
    let ResponseRecord {
        id,
        session_id,
        question_id,
        question_title,
        question_type,
        response_value,
        response_raw,
        vendor_selections,
        sizing_selections,
        answered_at,
        created_at,
        updated_at,
    } = record;
    let content = rebuild_content(
        question_id,
        question_title,
        &question_type,
        response_value,
        response_raw,
        &vendor_selections,
        &sizing_selections,
    )
    .map_err(DiscoveryRepositoryError::invalid_persisted_data)?;
    Ok(DiscoveryResponse::from_persisted(PersistedResponseData {
        id: ResponseId::from_uuid(id),
        session_id: SessionId::from_uuid(session_id),
        content,
        answered_at,
        created_at,
        updated_at,
    }))
}

fn rebuild_content(
    question_id: String,
    question_title: String,
    question_type: &str,
    value: Value,
    raw: Option<String>,
    vendor_selections: &Value,
    sizing_selections: &Value,
) -> Result<ResponseContent, DiscoveryDomainError> {
    let content = ResponseContent::new(
        QuestionId::new(question_id)?,
        question_title,
        QuestionType::try_from(question_type)?,
        value,
    )?
    .with_vendor_selections(VendorSelections::from_json(vendor_selections)?)
    .with_sizing_selections(SizingSelections::from_json(sizing_selections)?);
    Ok(match raw {
        Some(text) => content.with_raw(text),
        None => content,
    })
}

fn note_to_record(note: &DiscoveryNote) -> NoteRecord {
    NoteRecord {
        id: note.id().into_inner(),
        session_id: note.session_id().into_inner(),
        user_id: note.author().into_inner(),
        note_text: note.text().as_str().to_owned(),
        note_type: note.note_type().to_owned(),
        related_response_id: note.related_response().map(ResponseId::into_inner),
        created_at: note.created_at(),
        updated_at: note.updated_at(),
    }
}

fn record_to_note(record: NoteRecord) -> DiscoveryRepositoryResult<DiscoveryNote> {
    let NoteRecord {
        id,
        session_id,
        user_id,
        note_text,
        note_type,
        related_response_id,
        created_at,
        updated_at,
    } = record;
    let text = NoteText::new(note_text).map_err(DiscoveryRepositoryError::invalid_persisted_data)?;
    Ok(DiscoveryNote::from_persisted(PersistedNoteData {
        id: NoteId::from_uuid(id),
        session_id: SessionId::from_uuid(session_id),
        author: UserId::from_uuid(user_id),
        text,
        note_type,
        related_response: related_response_id.map(ResponseId::from_uuid),
        created_at,
        updated_at,
    }))
}

fn export_to_record(record: &ExportRecord) -> ExportRecordRow {
    ExportRecordRow {
        id: record.id().into_inner(),
        session_id: record.session_id().into_inner(),
        user_id: record.requested_by().map(UserId::into_inner),
        export_format: record.format().to_owned(),
        status: record.status().as_str().to_owned(),
        error_message: record.error_message().map(str::to_owned),
        payload_digest: record.digest().map(str::to_owned),
        created_at: record.created_at(),
    }
}

fn record_to_export(row: ExportRecordRow) -> DiscoveryRepositoryResult<ExportRecord> {
    let ExportRecordRow {
        id,
        session_id,
        user_id,
        export_format,
        status,
        error_message,
        payload_digest,
        created_at,
    } = row;
    let parsed_status = ExportStatus::try_from(status.as_str())
        .map_err(DiscoveryRepositoryError::invalid_persisted_data)?;
    Ok(ExportRecord::from_persisted(PersistedExportData {
        id: ExportId::from_uuid(id),
        session_id: SessionId::from_uuid(session_id),
        requested_by: user_id.map(UserId::from_uuid),
        format: export_format,
        status: parsed_status,
        error_message,
        digest: payload_digest,
        created_at,
    }))
}
