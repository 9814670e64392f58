//! When steps for status derivation BDD scenarios.

use super::world::{StatusWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::when;

#[when("the row status is recomputed")]
fn recompute(world: &mut StatusWorld) -> Result<(), eyre::Report> {
    let row = world.row()?;
    let completion = run_async(world.todos.recompute_row_status(row, None))
        .wrap_err("recompute row status")?;
    world.last_completion = Some(Some(completion));
    Ok(())
}

#[when(r#"the todo "{title}" is toggled"#)]
fn toggle(world: &mut StatusWorld, title: String) -> Result<(), eyre::Report> {
    let id = *world
        .todo_ids
        .get(&title)
        .ok_or_else(|| eyre::eyre!("unknown todo {title} in scenario world"))?;
    let outcome = run_async(world.todos.toggle_todo(id, None)).wrap_err("toggle todo")?;
    world.last_completion = Some(outcome.row_completion);
    Ok(())
}
