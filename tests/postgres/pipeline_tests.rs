//! Pipeline store tests against `PostgreSQL`.

use super::helpers::{PgWorkspace, pg_workspace};
use contrivance::{
    error::ErrorKind,
    pipeline::{
        domain::{CellValue, Column, ColumnId, SpreadsheetId, TechnicalWinStatus},
        services::{
            CreateRowRequest, CreateSpreadsheetRequest, CreateTodoRequest, DefineColumnRequest,
        },
    },
};
use rstest::rstest;
use serde_json::json;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rows_round_trip_coerced_values(pg_workspace: Option<PgWorkspace>) {
    let Some(workspace) = pg_workspace else {
        return;
    };
    let sheet = workspace.pipeline().await;

    let created = workspace
        .rows
        .create_row(CreateRowRequest::new(
            sheet,
            json!({ "Account": "Initech", "Amount": "$2,500" }),
        ))
        .await
        .expect("row created");
    let second = workspace
        .rows
        .create_row(CreateRowRequest::new(sheet, json!({ "Account": "Globex" })))
        .await
        .expect("row created");
    let stored = workspace.rows.get_row(created.id()).await.expect("row exists");

    assert_eq!(stored.id(), created.id());
    assert_eq!(stored.data().get("Amount"), Some(&CellValue::Number(2500.0)));
    assert_eq!(second.position(), 2);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn duplicate_column_names_conflict(pg_workspace: Option<PgWorkspace>) {
    let Some(workspace) = pg_workspace else {
        return;
    };
    let sheet = workspace.pipeline().await;

    let err = workspace
        .schema
        .define_column(sheet, DefineColumnRequest::new("Account", "text"), None)
        .await
        .expect_err("name is taken");

    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn todo_roll_up_is_persisted(pg_workspace: Option<PgWorkspace>) {
    let Some(workspace) = pg_workspace else {
        return;
    };
    let sheet = workspace.pipeline().await;
    let row = workspace
        .rows
        .create_row(CreateRowRequest::new(sheet, json!({ "Account": "Initech" })))
        .await
        .expect("row created");
    let outcome = workspace
        .todos
        .create_todo(CreateTodoRequest::new(sheet, "Run POC").for_row(row.id()))
        .await
        .expect("todo created");

    let completion = workspace
        .todos
        .toggle_todo(outcome.todo.id(), None)
        .await
        .expect("toggle succeeds")
        .row_completion
        .expect("bound todo recomputes");

    assert_eq!(completion.status(), TechnicalWinStatus::Completed);
    let stored = workspace.rows.get_row(row.id()).await.expect("row exists");
    assert_eq!(
        stored.data().get("TW Status"),
        Some(&CellValue::Text("Completed".to_owned()))
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_a_row_keeps_its_todos_unbound(pg_workspace: Option<PgWorkspace>) {
    let Some(workspace) = pg_workspace else {
        return;
    };
    let sheet = workspace.pipeline().await;
    let row = workspace
        .rows
        .create_row(CreateRowRequest::new(sheet, json!({ "Account": "Initech" })))
        .await
        .expect("row created");
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
}

async fn column_id(workspace: &PgWorkspace, sheet: SpreadsheetId, name: &str) -> ColumnId {
    workspace
        .schema
        .list_columns(sheet)
        .await
        .expect("columns listed")
        .iter()
        .find(|column| column.name().as_str() == name)
        .map(Column::id)
        .expect("column exists")
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn clashing_initial_positions_store_nothing(pg_workspace: Option<PgWorkspace>) {
    let Some(workspace) = pg_workspace else {
        return;
    };
    let request = CreateSpreadsheetRequest::new("Clashing", workspace.owner)
        .with_column(DefineColumnRequest::new("Account", "text").with_position(3))
        .with_column(DefineColumnRequest::new("Amount", "number").with_position(3));

    let err = workspace
        .schema
        .create_spreadsheet(request)
        .await
        .expect_err("two columns cannot share a position");

    assert_eq!(err.kind(), ErrorKind::Conflict);
    let visible = workspace
        .schema
        .list_spreadsheets(workspace.owner)
        .await
        .expect("spreadsheets listed");
    assert!(visible.iter().all(|sheet| sheet.owner() != workspace.owner));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn renaming_a_column_leaves_row_data_under_the_old_key(pg_workspace: Option<PgWorkspace>) {
    let Some(workspace) = pg_workspace else {
        return;
    };
    let sheet = workspace.pipeline().await;
    let existing = workspace
        .rows
        .create_row(CreateRowRequest::new(
            sheet,
            json!({ "Account": "Initech", "Amount": 42 }),
        ))
        .await
        .expect("row created");
    let amount = column_id(&workspace, sheet, "Amount").await;

    workspace
        .schema
        .rename_column(amount, "Value", None)
        .await
        .expect("rename succeeds");
    let fresh = workspace
        .rows
        .create_row(CreateRowRequest::new(
            sheet,
            json!({ "Account": "Globex", "Value": "7" }),
        ))
        .await
        .expect("row created");

    let kept = workspace.rows.get_row(existing.id()).await.expect("row exists");
    let reread = workspace.rows.get_row(fresh.id()).await.expect("row exists");
    assert_eq!(kept.data().get("Amount"), Some(&CellValue::Number(42.0)));
    assert_eq!(kept.data().get("Value"), None);
    assert_eq!(reread.data().get("Value"), Some(&CellValue::Number(7.0)));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn renaming_onto_a_taken_name_is_a_conflict(pg_workspace: Option<PgWorkspace>) {
    let Some(workspace) = pg_workspace else {
        return;
    };
    let sheet = workspace.pipeline().await;
    let amount = column_id(&workspace, sheet, "Amount").await;

    let err = workspace
        .schema
        .rename_column(amount, "Account", None)
        .await
        .expect_err("name is taken");

    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_a_column_keeps_the_orphaned_row_key(pg_workspace: Option<PgWorkspace>) {
    let Some(workspace) = pg_workspace else {
        return;
    };
    let sheet = workspace.pipeline().await;
    let row = workspace
        .rows
        .create_row(CreateRowRequest::new(
            sheet,
            json!({ "Account": "Initech", "Amount": 900 }),
        ))
        .await
        .expect("row created");
    let amount = column_id(&workspace, sheet, "Amount").await;

    workspace
        .schema
        .delete_column(amount, None)
        .await
        .expect("delete succeeds");

    let columns = workspace
        .schema
        .list_columns(sheet)
        .await
        .expect("columns listed");
    let kept = workspace.rows.get_row(row.id()).await.expect("row exists");
    assert_eq!(columns.len(), 1);
    assert_eq!(kept.data().get("Amount"), Some(&CellValue::Number(900.0)));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_columns_are_not_found(pg_workspace: Option<PgWorkspace>) {
    let Some(workspace) = pg_workspace else {
        return;
    };
    let missing = ColumnId::new();

    let renamed = workspace.schema.rename_column(missing, "Value", None).await;
    let deleted = workspace.schema.delete_column(missing, None).await;

    assert_eq!(renamed.map(|_| ()).map_err(|err| err.kind()), Err(ErrorKind::NotFound));
    assert_eq!(deleted.map_err(|err| err.kind()), Err(ErrorKind::NotFound));
}
