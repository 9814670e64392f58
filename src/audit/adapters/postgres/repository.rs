//! `PostgreSQL` audit trail reader and the shared entry writer.

use super::{
    models::{AuditEntryRow, NewAuditEntryRow},
    schema::audit_entries,
};
use crate::{
    audit::{
        domain::{AuditAction, AuditEntity, AuditEntry, AuditEntryId, PersistedAuditData},
        ports::{AuditTrail, AuditTrailError, AuditTrailResult},
    },
    db::PgPool,
    ids::UserId,
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

/// Inserts an audit entry on an open connection.
///
/// Callers run this inside the transaction that performs the mutation so
/// both commit or neither does.
pub(crate) fn insert_entry(connection: &mut PgConnection, entry: &AuditEntry) -> QueryResult<()> {
    let row = NewAuditEntryRow {
        id: entry.id().into_inner(),
        action: entry.action().as_str().to_owned(),
        entity_type: entry.entity().as_str().to_owned(),
        entity_id: entry.entity_id(),
        changes: entry.changes().clone(),
        actor_id: entry.actor().map(UserId::into_inner),
        recorded_at: entry.recorded_at(),
    };
    diesel::insert_into(audit_entries::table)
        .values(&row)
        .execute(connection)?;
    Ok(())
}

/// `PostgreSQL`-backed audit trail reader.
#[derive(Debug, Clone)]
pub struct PostgresAuditTrail {
    pool: PgPool,
}

impl PostgresAuditTrail {
    /// Creates a reader from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> AuditTrailResult<T>
    where
        F: FnOnce(&mut PgConnection) -> AuditTrailResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(AuditTrailError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(AuditTrailError::persistence)?
    }
}

#[async_trait]
impl AuditTrail for PostgresAuditTrail {
    async fn entries_for(
        &self,
        entity: AuditEntity,
        entity_id: Uuid,
    ) -> AuditTrailResult<Vec<AuditEntry>> {
        self.run_blocking(move |connection| {
            let rows = audit_entries::table
                .filter(audit_entries::entity_type.eq(entity.as_str()))
                .filter(audit_entries::entity_id.eq(entity_id))
                .order(audit_entries::recorded_at.asc())
                .select(AuditEntryRow::as_select())
                .load::<AuditEntryRow>(connection)
                .map_err(AuditTrailError::persistence)?;
            rows.into_iter().map(row_to_entry).collect()
        })
        .await
    }

    async fn recent(&self, limit: usize) -> AuditTrailResult<Vec<AuditEntry>> {
        let bounded = i64::try_from(limit).unwrap_or(i64::MAX);
        self.run_blocking(move |connection| {
            let rows = audit_entries::table
                .order(audit_entries::recorded_at.desc())
                .limit(bounded)
                .select(AuditEntryRow::as_select())
                .load::<AuditEntryRow>(connection)
                .map_err(AuditTrailError::persistence)?;
            rows.into_iter().map(row_to_entry).collect()
        })
        .await
    }
}

fn row_to_entry(row: AuditEntryRow) -> AuditTrailResult<AuditEntry> {
    let AuditEntryRow {
        id,
        action,
        entity_type,
        entity_id,
        changes,
        actor_id,
        recorded_at,
    } = row;

    let parsed_action =
        AuditAction::try_from(action.as_str()).map_err(AuditTrailError::invalid_persisted_data)?;
    let parsed_entity = AuditEntity::try_from(entity_type.as_str())
        .map_err(AuditTrailError::invalid_persisted_data)?;

    Ok(AuditEntry::from_persisted(PersistedAuditData {
        id: AuditEntryId::from_uuid(id),
        action: parsed_action,
        entity: parsed_entity,
        entity_id,
        changes,
        actor: actor_id.map(UserId::from_uuid),
        recorded_at,
    }))
}
