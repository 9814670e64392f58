//! In-memory discovery store for tests and embedded use.

use async_trait::async_trait;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{
    audit::{adapters::memory::InMemoryAuditLog, domain::AuditEntry},
    discovery::{
        domain::{
            DiscoveryNote, DiscoveryResponse, DiscoverySession, ExportRecord, NoteId, QuestionId,
            ResponseId, SessionId,
        },
        ports::{
            DiscoveryRepository, DiscoveryRepositoryError, DiscoveryRepositoryResult,
            ExportRepository,
        },
    },
};

/// Thread-safe in-memory implementation of the discovery ports.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDiscoveryStore {
    state: Arc<RwLock<DiscoveryState>>,
    audit: InMemoryAuditLog,
}

#[derive(Debug, Default)]
struct DiscoveryState {
    // Insertion order breaks creation-time ties.
    sessions: Vec<DiscoverySession>,
    responses: HashMap<(SessionId, QuestionId), DiscoveryResponse>,
    notes: Vec<DiscoveryNote>,
    exports: Vec<ExportRecord>,
}

impl DiscoveryState {
    fn has_session(&self, id: SessionId) -> bool {
        self.sessions.iter().any(|session| session.id() == id)
    }
}

impl InMemoryDiscoveryStore {
    /// Creates an empty store with its own audit log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store that records into a shared audit log.
    #[must_use]
    pub fn with_audit_log(audit: InMemoryAuditLog) -> Self {
        Self {
            state: Arc::default(),
            audit,
        }
    }

    /// Returns the audit log this store records into.
    #[must_use]
    pub const fn audit_log(&self) -> &InMemoryAuditLog {
        &self.audit
    }

    fn read(&self) -> DiscoveryRepositoryResult<RwLockReadGuard<'_, DiscoveryState>> {
        self.state.read().map_err(poisoned)
    }

    fn write(&self) -> DiscoveryRepositoryResult<RwLockWriteGuard<'_, DiscoveryState>> {
        self.state.write().map_err(poisoned)
    }

    fn record(&self, entry: &AuditEntry) -> DiscoveryRepositoryResult<()> {
        self.audit
            .append(entry)
            .map_err(DiscoveryRepositoryError::persistence)
    }
}

fn poisoned<T>(err: PoisonError<T>) -> DiscoveryRepositoryError {
    DiscoveryRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl DiscoveryRepository for InMemoryDiscoveryStore {
    async fn insert_session(
        &self,
        session: &DiscoverySession,
        audit: &AuditEntry,
    ) -> DiscoveryRepositoryResult<()> {
        let mut state = self.write()?;
        state.sessions.push(session.clone());
        self.record(audit)
    }

    async fn update_session(
        &self,
        session: &DiscoverySession,
        audit: &AuditEntry,
    ) -> DiscoveryRepositoryResult<()> {
        let mut state = self.write()?;
        let slot = state
            .sessions
            .iter_mut()
            .find(|existing| existing.id() == session.id())
            .ok_or(DiscoveryRepositoryError::SessionNotFound(session.id()))?;
        *slot = session.clone();
        self.record(audit)
    }

    async fn find_session(
        &self,
        id: SessionId,
    ) -> DiscoveryRepositoryResult<Option<DiscoverySession>> {
        let state = self.read()?;
        Ok(state
            .sessions
            .iter()
            .find(|session| session.id() == id)
            .cloned())
    }

    async fn list_sessions_for_account(
        &self,
        account_id: &str,
    ) -> DiscoveryRepositoryResult<Vec<DiscoverySession>> {
        let state = self.read()?;
        let mut sessions: Vec<DiscoverySession> = state
            .sessions
            .iter()
            .filter(|session| session.account().id() == account_id)
            .cloned()
            .collect();
        sessions.sort_by_key(DiscoverySession::created_at);
        Ok(sessions)
    }

    async fn upsert_response(
        &self,
        response: &DiscoveryResponse,
        audit: &AuditEntry,
    ) -> DiscoveryRepositoryResult<DiscoveryResponse> {
        let mut state = self.write()?;
        if !state.has_session(response.session_id()) {
            return Err(DiscoveryRepositoryError::SessionNotFound(
                response.session_id(),
            ));
        }
        let key = (response.session_id(), response.question_id().clone());
        let stored = state
            .responses
            .entry(key)
            .and_modify(|existing| existing.replace_answer(response))
            .or_insert_with(|| response.clone())
            .clone();
        self.record(&audit.clone().for_entity(stored.id().into_inner()))?;
        Ok(stored)
    }

    async fn find_response(
        &self,
        id: ResponseId,
    ) -> DiscoveryRepositoryResult<Option<DiscoveryResponse>> {
        let state = self.read()?;
        Ok(state
            .responses
            .values()
            .find(|response| response.id() == id)
            .cloned())
    }

    async fn list_responses(
        &self,
        session_id: SessionId,
    ) -> DiscoveryRepositoryResult<Vec<DiscoveryResponse>> {
        let state = self.read()?;
        let mut responses: Vec<DiscoveryResponse> = state
            .responses
            .values()
            .filter(|response| response.session_id() == session_id)
            .cloned()
            .collect();
        responses.sort_by(|left, right| {
            left.answered_at()
                .cmp(&right.answered_at())
                .then_with(|| left.question_id().cmp(right.question_id()))
        });
        Ok(responses)
    }

    async fn insert_note(
        &self,
        note: &DiscoveryNote,
        audit: &AuditEntry,
    ) -> DiscoveryRepositoryResult<()> {
        let mut state = self.write()?;
        if !state.has_session(note.session_id()) {
            return Err(DiscoveryRepositoryError::SessionNotFound(note.session_id()));
        }
        state.notes.push(note.clone());
        self.record(audit)
    }

    async fn update_note(
        &self,
        note: &DiscoveryNote,
        audit: &AuditEntry,
    ) -> DiscoveryRepositoryResult<()> {
        let mut state = self.write()?;
        let slot = state
            .notes
            .iter_mut()
            .find(|existing| existing.id() == note.id())
            .ok_or(DiscoveryRepositoryError::NoteNotFound(note.id()))?;
        *slot = note.clone();
        self.record(audit)
    }

    async fn delete_note(&self, id: NoteId, audit: &AuditEntry) -> DiscoveryRepositoryResult<()> {
        let mut state = self.write()?;
        let before = state.notes.len();
        state.notes.retain(|note| note.id() != id);
        if state.notes.len() == before {
            return Err(DiscoveryRepositoryError::NoteNotFound(id));
        }
        self.record(audit)
    }

    async fn find_note(&self, id: NoteId) -> DiscoveryRepositoryResult<Option<DiscoveryNote>> {
        let state = self.read()?;
        Ok(state.notes.iter().find(|note| note.id() == id).cloned())
    }

    async fn list_notes(
        &self,
        session_id: SessionId,
    ) -> DiscoveryRepositoryResult<Vec<DiscoveryNote>> {
        let state = self.read()?;
        let mut notes: Vec<DiscoveryNote> = state
            .notes
            .iter()
            .rev()
            .filter(|note| note.session_id() == session_id)
            .cloned()
            .collect();
        notes.sort_by_key(|note| Reverse(note.created_at()));
        Ok(notes)
    }
}

#[async_trait]
impl ExportRepository for InMemoryDiscoveryStore {
    async fn insert_export(
        &self,
        record: &ExportRecord,
        audit: &AuditEntry,
    ) -> DiscoveryRepositoryResult<()> {
        let mut state = self.write()?;
        state.exports.push(record.clone());
        self.record(audit)
    }

    async fn list_exports(
        &self,
        session_id: SessionId,
    ) -> DiscoveryRepositoryResult<Vec<ExportRecord>> {
        let state = self.read()?;
        let mut exports: Vec<ExportRecord> = state
            .exports
            .iter()
            .rev()
            .filter(|record| record.session_id() == session_id)
            .cloned()
            .collect();
        exports.sort_by_key(|record| Reverse(record.created_at()));
        Ok(exports)
    }
}
