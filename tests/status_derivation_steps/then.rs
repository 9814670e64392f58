//! Then steps for status derivation BDD scenarios.

use super::world::{StatusWorld, run_async};
use contrivance::pipeline::domain::{CellValue, RowCompletion};
use eyre::WrapErr;
use rstest_bdd_macros::then;

fn completion(world: &StatusWorld) -> Result<&RowCompletion, eyre::Report> {
    world
        .last_completion
        .as_ref()
        .ok_or_else(|| eyre::eyre!("no todo change recorded"))?
        .as_ref()
        .ok_or_else(|| eyre::eyre!("last change did not recompute a row"))
}

#[then(r#"the row status is "{label}""#)]
fn row_status_is(world: &StatusWorld, label: String) -> Result<(), eyre::Report> {
    let derived = completion(world)?.status().label();
    if derived != label {
        return Err(eyre::eyre!("expected derived status {label}, found {derived}"));
    }

    let row = run_async(world.rows.get_row(world.row()?)).wrap_err("load row")?;
    let expected = CellValue::Text(label);
    for field in ["Technical Win Status", "TW Status"] {
        if row.data().get(field) != Some(&expected) {
            return Err(eyre::eyre!(
                "expected {field} to hold {expected:?}, found {:?}",
                row.data().get(field)
            ));
        }
    }
    Ok(())
}

#[then("the row completion is {percentage:u8} percent")]
fn row_completion_is(world: &StatusWorld, percentage: u8) -> Result<(), eyre::Report> {
    let actual = completion(world)?.percentage();
    if actual != percentage {
        return Err(eyre::eyre!("expected {percentage}% complete, found {actual}%"));
    }
    Ok(())
}

#[then("the last change recomputed no row")]
fn no_row_recomputed(world: &StatusWorld) -> Result<(), eyre::Report> {
    match world.last_completion {
        Some(None) => Ok(()),
        Some(Some(ref found)) => Err(eyre::eyre!("unexpected recomputation {found:?}")),
        None => Err(eyre::eyre!("no todo change recorded")),
    }
}

#[then("the stored row has no status label")]
fn no_status_label(world: &StatusWorld) -> Result<(), eyre::Report> {
    let row = run_async(world.rows.get_row(world.row()?)).wrap_err("load row")?;
    if row.data().get("Technical Win Status").is_some() {
        return Err(eyre::eyre!("row unexpectedly carries a status label"));
    }
    Ok(())
}
