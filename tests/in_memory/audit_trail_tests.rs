//! Every mutation leaves exactly one audit entry.

use super::helpers::{Workspace, workspace};
use contrivance::{
    audit::{
        domain::{AuditAction, AuditEntity},
        ports::AuditTrail,
    },
    discovery::services::SaveResponseRequest,
    pipeline::services::CreateTodoRequest,
};
use rstest::rstest;
use serde_json::json;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn row_history_lists_create_then_status_updates(workspace: Workspace) {
    let sheet = workspace.account_pipeline().await;
    let row = workspace.add_row(sheet, json!({ "Account": "Acme" })).await;
    let outcome = workspace
        .todos
        .create_todo(CreateTodoRequest::new(sheet, "POC").for_row(row.id()))
        .await
        .expect("todo created");
    workspace
        .todos
        .toggle_todo(outcome.todo.id(), None)
        .await
        .expect("toggle succeeds");

    let row_history: Vec<AuditAction> = workspace
        .audit
        .entries_for(AuditEntity::Row, row.id().into_inner())
        .await
        .expect("trail readable")
        .iter()
        .map(|entry| entry.action())
        .collect();
    let todo_history: Vec<AuditAction> = workspace
        .audit
        .entries_for(AuditEntity::Todo, outcome.todo.id().into_inner())
        .await
        .expect("trail readable")
        .iter()
        .map(|entry| entry.action())
        .collect();

    assert_eq!(
        row_history,
        vec![AuditAction::Create, AuditAction::Update, AuditAction::Update]
    );
    assert_eq!(todo_history, vec![AuditAction::Create, AuditAction::Update]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn pipeline_and_discovery_share_one_trail(workspace: Workspace) {
    let sheet = workspace.account_pipeline().await;
    let session = workspace.acme_session().await;
    workspace
        .sessions
        .save_response(SaveResponseRequest::new(
            session.id(),
            "cloud_provider",
            "radio",
            json!("Azure"),
        ))
        .await
        .expect("answer saved");
    workspace
        .exports
        .export_session(session.id(), "json", None)
        .await
        .expect("json export succeeds");

    let recent = workspace.audit.recent(3).await.expect("trail readable");
    let summary: Vec<(AuditAction, AuditEntity)> = recent
        .iter()
        .map(|entry| (entry.action(), entry.entity()))
        .collect();

    assert_eq!(
        summary,
        vec![
            (AuditAction::Export, AuditEntity::DiscoverySession),
            (AuditAction::Upsert, AuditEntity::DiscoveryResponse),
            (AuditAction::Create, AuditEntity::DiscoverySession),
        ]
    );
    let sheet_history = workspace
        .audit
        .entries_for(AuditEntity::Spreadsheet, sheet.into_inner())
        .await
        .expect("trail readable");
    assert_eq!(sheet_history.len(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rejected_writes_leave_no_entry(workspace: Workspace) {
    let sheet = workspace.account_pipeline().await;
    let before = workspace.audit.len().expect("trail readable");

    workspace
        .rows
        .create_row(contrivance::pipeline::services::CreateRowRequest::new(
            sheet,
            json!({ "Amount": "12" }),
        ))
        .await
        .expect_err("account is required");

    assert_eq!(workspace.audit.len().expect("trail readable"), before);
}
