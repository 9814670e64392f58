//! Audit entries written by the `PostgreSQL` adapters.

use super::helpers::{PgWorkspace, pg_workspace};
use contrivance::{
    audit::{
        domain::{AuditAction, AuditEntity},
        ports::AuditTrail,
    },
    discovery::services::SaveResponseRequest,
    pipeline::services::CreateRowRequest,
};
use rstest::rstest;
use serde_json::json;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn row_writes_are_audited_in_the_same_transaction(pg_workspace: Option<PgWorkspace>) {
    let Some(workspace) = pg_workspace else {
        return;
    };
    let sheet = workspace.pipeline().await;
    let row = workspace
        .rows
        .create_row(
            CreateRowRequest::new(sheet, json!({ "Account": "Initech" }))
                .with_actor(workspace.owner),
        )
        .await
        .expect("row created");
    workspace
        .rows
        .update_row(row.id(), json!({ "Amount": 10 }), Some(workspace.owner))
        .await
        .expect("row updated");

    let history = workspace
        .audit
        .entries_for(AuditEntity::Row, row.id().into_inner())
        .await
        .expect("trail readable");

    let actions: Vec<AuditAction> = history.iter().map(|entry| entry.action()).collect();
    assert_eq!(actions, vec![AuditAction::Create, AuditAction::Update]);
    assert!(history
        .iter()
        .all(|entry| entry.actor() == Some(workspace.owner)));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn response_upserts_are_audited(pg_workspace: Option<PgWorkspace>) {
    let Some(workspace) = pg_workspace else {
        return;
    };
    let session = workspace.session().await;
    let response = workspace
        .sessions
        .save_response(SaveResponseRequest::new(
            session.id(),
            "firewall_vendor",
            "text",
            json!("Fortinet"),
        ))
        .await
        .expect("answer saved");

    let history = workspace
        .audit
        .entries_for(AuditEntity::DiscoveryResponse, response.id().into_inner())
        .await
        .expect("trail readable");

    let entry = history.first().expect("one upsert entry");
    assert_eq!(entry.action(), AuditAction::Upsert);
    assert_eq!(entry.changes().get("question_id"), Some(&json!("firewall_vendor")));
}
