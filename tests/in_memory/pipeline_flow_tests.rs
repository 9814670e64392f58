//! End-to-end pipeline tests: rows, todos, and status roll-up.

use super::helpers::{Workspace, workspace};
use contrivance::{
    error::ErrorKind,
    pipeline::{
        domain::{CellValue, TechnicalWinStatus},
        services::{CreateRowRequest, CreateTodoRequest},
    },
};
use rstest::rstest;
use serde_json::json;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rows_are_coerced_against_current_columns(workspace: Workspace) {
    let sheet = workspace.account_pipeline().await;

    let row = workspace
        .add_row(
            sheet,
            json!({ "Account": "Acme", "Amount": "$1,250.50", "Strategic": "no", "Region": "EMEA" }),
        )
        .await;

    assert_eq!(row.position(), 1);
    assert_eq!(row.data().get("Amount"), Some(&CellValue::Number(1250.5)));
    assert_eq!(row.data().get("Strategic"), Some(&CellValue::Bool(false)));
    assert_eq!(row.data().get("Stage"), Some(&CellValue::Null));
    assert_eq!(
        row.data().get("Region"),
        Some(&CellValue::Text("EMEA".to_owned()))
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn malformed_rows_are_rejected_without_writes(workspace: Workspace) {
    let sheet = workspace.account_pipeline().await;

    let missing = workspace
        .rows
        .create_row(CreateRowRequest::new(
            sheet,
            json!({ "Amount": 10 }),
        ))
        .await
        .expect_err("account is required");
    let garbled = workspace
        .rows
        .create_row(CreateRowRequest::new(
            sheet,
            json!({ "Account": "Acme", "Amount": "lots" }),
        ))
        .await
        .expect_err("amount is not numeric");

    assert_eq!(missing.kind(), ErrorKind::Validation);
    assert_eq!(garbled.kind(), ErrorKind::Validation);
    let rows = workspace.rows.list_rows(sheet).await.expect("rows listed");
    assert!(rows.is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn todo_changes_roll_up_into_row_status(workspace: Workspace) {
    let sheet = workspace.account_pipeline().await;
    let row = workspace.add_row(sheet, json!({ "Account": "Acme" })).await;

    let first = workspace
        .todos
        .create_todo(CreateTodoRequest::new(sheet, "Run POC").for_row(row.id()))
        .await
        .expect("todo created");
    let second = workspace
        .todos
        .create_todo(CreateTodoRequest::new(sheet, "Send BOM").for_row(row.id()))
        .await
        .expect("todo created");
    let after_create = second.row_completion.expect("bound todo recomputes");
    assert_eq!(after_create.status(), TechnicalWinStatus::InProgress);
    assert_eq!(after_create.percentage(), 0);

    workspace
        .todos
        .toggle_todo(first.todo.id(), None)
        .await
        .expect("toggle succeeds");
    let done = workspace
        .todos
        .complete_todo(second.todo.id(), None)
        .await
        .expect("complete succeeds")
        .row_completion
        .expect("bound todo recomputes");

    assert_eq!(done.status(), TechnicalWinStatus::Completed);
    assert_eq!(done.percentage(), 100);
    let stored = workspace.rows.get_row(row.id()).await.expect("row exists");
    for field in ["Technical Win Status", "TW Status"] {
        assert_eq!(
            stored.data().get(field),
            Some(&CellValue::Text("Completed".to_owned())),
            "{field} should carry the derived label"
        );
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_the_last_todo_reports_no_todos(workspace: Workspace) {
    let sheet = workspace.account_pipeline().await;
    let row = workspace.add_row(sheet, json!({ "Account": "Acme" })).await;
    let outcome = workspace
        .todos
        .create_todo(CreateTodoRequest::new(sheet, "Run POC").for_row(row.id()))
        .await
        .expect("todo created");

    let completion = workspace
        .todos
        .delete_todo(outcome.todo.id(), None)
        .await
        .expect("todo deleted")
        .expect("bound todo recomputes");

    assert_eq!(completion.status(), TechnicalWinStatus::NoTodos);
    let stored = workspace.rows.get_row(row.id()).await.expect("row exists");
    assert_eq!(
        stored.data().get("TW Status"),
        Some(&CellValue::Text("No Todos".to_owned()))
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_a_row_unbinds_its_todos(workspace: Workspace) {
    let sheet = workspace.account_pipeline().await;
    let row = workspace.add_row(sheet, json!({ "Account": "Acme" })).await;
    let outcome = workspace
        .todos
        .create_todo(CreateTodoRequest::new(sheet, "Follow up").for_row(row.id()))
        .await
        .expect("todo created");

    workspace
        .rows
        .delete_row(row.id(), None)
        .await
        .expect("row deleted");

    let todo = workspace
        .todos
        .get_todo(outcome.todo.id())
        .await
        .expect("todo survives");
    assert_eq!(todo.row_id(), None);
    let pipeline_level = workspace
        .todos
        .list_by_spreadsheet(sheet)
        .await
        .expect("todos listed");
    assert_eq!(pipeline_level.len(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stats_count_every_todo_of_the_spreadsheet(workspace: Workspace) {
    let sheet = workspace.account_pipeline().await;
    let row = workspace.add_row(sheet, json!({ "Account": "Acme" })).await;
    workspace
        .todos
        .create_todo(CreateTodoRequest::new(sheet, "Kickoff").with_priority("high"))
        .await
        .expect("todo created");
    let bound = workspace
        .todos
        .create_todo(
            CreateTodoRequest::new(sheet, "POC")
                .for_row(row.id())
                .with_priority("low"),
        )
        .await
        .expect("todo created");
    workspace
        .todos
        .complete_todo(bound.todo.id(), None)
        .await
        .expect("complete succeeds");

    let stats = workspace.todos.stats(sheet).await.expect("stats computed");

    assert_eq!(stats.total, 2);
    assert_eq!(stats.completed, 1);
    assert_eq!(stats.pending, 1);
    assert_eq!(stats.high_priority, 1);
    assert_eq!(stats.low_priority, 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_a_spreadsheet_cascades(workspace: Workspace) {
    let sheet = workspace.account_pipeline().await;
    let row = workspace.add_row(sheet, json!({ "Account": "Acme" })).await;

    workspace
        .schema
        .delete_spreadsheet(sheet, Some(workspace.owner))
        .await
        .expect("spreadsheet deleted");

    let err = workspace
        .rows
        .get_row(row.id())
        .await
        .expect_err("rows go with the spreadsheet");
    assert_eq!(err.kind(), ErrorKind::NotFound);
    let visible = workspace
        .schema
        .list_spreadsheets(workspace.owner)
        .await
        .expect("spreadsheets listed");
    assert!(visible.is_empty());
}
