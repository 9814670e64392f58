//! Behaviour tests for row status derivation from todos.

#[path = "status_derivation_steps/mod.rs"]
mod status_derivation_steps_defs;

use rstest_bdd_macros::scenario;
use status_derivation_steps_defs::world::{StatusWorld, world};

#[scenario(
    path = "tests/features/status_derivation.feature",
    name = "A row without todos reports no todos"
)]
#[tokio::test(flavor = "multi_thread")]
async fn row_without_todos(world: StatusWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/status_derivation.feature",
    name = "Partially completed todos keep the row in progress"
)]
#[tokio::test(flavor = "multi_thread")]
async fn partial_completion(world: StatusWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/status_derivation.feature",
    name = "Completing every todo completes the row"
)]
#[tokio::test(flavor = "multi_thread")]
async fn full_completion(world: StatusWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/status_derivation.feature",
    name = "Reopening a todo moves the row back to in progress"
)]
#[tokio::test(flavor = "multi_thread")]
async fn reopening_a_todo(world: StatusWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/status_derivation.feature",
    name = "Pipeline-level todos leave row status alone"
)]
#[tokio::test(flavor = "multi_thread")]
async fn pipeline_level_todos(world: StatusWorld) {
    let _ = world;
}
