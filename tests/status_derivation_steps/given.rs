//! Given steps for status derivation BDD scenarios.

use super::world::{StatusWorld, run_async};
use contrivance::{
    ids::UserId,
    pipeline::services::{
        CreateRowRequest, CreateSpreadsheetRequest, CreateTodoRequest, DefineColumnRequest,
    },
};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use serde_json::json;

#[given("a pipeline spreadsheet with an account column")]
fn pipeline_spreadsheet(world: &mut StatusWorld) -> Result<(), eyre::Report> {
    let created = run_async(world.schema.create_spreadsheet(
        CreateSpreadsheetRequest::new("Pipeline", UserId::new())
            .with_column(DefineColumnRequest::new("Account", "text").required()),
    ))
    .wrap_err("create spreadsheet for status scenario")?;
    world.spreadsheet = Some(created.spreadsheet.id());
    Ok(())
}

#[given(r#"a row for account "{account}""#)]
fn row_for_account(world: &mut StatusWorld, account: String) -> Result<(), eyre::Report> {
    let spreadsheet = world.spreadsheet()?;
    let row = run_async(
        world
            .rows
            .create_row(CreateRowRequest::new(spreadsheet, json!({ "Account": account }))),
    )
    .wrap_err("create row for status scenario")?;
    world.row = Some(row.id());
    Ok(())
}

#[given(r#"the row has a todo "{title}""#)]
fn row_has_todo(world: &mut StatusWorld, title: String) -> Result<(), eyre::Report> {
    let spreadsheet = world.spreadsheet()?;
    let row = world.row()?;
    let outcome = run_async(
        world
            .todos
            .create_todo(CreateTodoRequest::new(spreadsheet, title.clone()).for_row(row)),
    )
    .wrap_err("create row todo")?;
    world.todo_ids.insert(title, outcome.todo.id());
    Ok(())
}

#[given(r#"the spreadsheet has a pipeline todo "{title}""#)]
fn pipeline_todo(world: &mut StatusWorld, title: String) -> Result<(), eyre::Report> {
    let spreadsheet = world.spreadsheet()?;
    let outcome = run_async(
        world
            .todos
            .create_todo(CreateTodoRequest::new(spreadsheet, title.clone())),
    )
    .wrap_err("create pipeline todo")?;
    world.todo_ids.insert(title, outcome.todo.id());
    Ok(())
}
