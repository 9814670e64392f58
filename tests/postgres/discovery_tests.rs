//! Discovery store tests against `PostgreSQL`.

use super::helpers::{PgWorkspace, pg_workspace};
use contrivance::{
    discovery::{
        domain::ExportStatus,
        services::{AddNoteRequest, SaveResponseRequest},
    },
    error::ErrorKind,
};
use rstest::rstest;
use serde_json::json;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn upserts_replace_the_stored_answer(pg_workspace: Option<PgWorkspace>) {
    let Some(workspace) = pg_workspace else {
        return;
    };
    let session = workspace.session().await;

    let first = workspace
        .sessions
        .save_response(SaveResponseRequest::new(
            session.id(),
            "cloud_provider",
            "radio",
            json!("AWS"),
        ))
        .await
        .expect("first answer saved");
    let second = workspace
        .sessions
        .save_response(SaveResponseRequest::new(
            session.id(),
            "cloud_provider",
            "radio",
            json!("GCP"),
        ))
        .await
        .expect("second answer saved");

    assert_eq!(first.id(), second.id());
    let responses = workspace
        .sessions
        .list_responses(session.id())
        .await
        .expect("responses listed");
    let values: Vec<&serde_json::Value> = responses.iter().map(|r| r.value()).collect();
    assert_eq!(values, vec![&json!("GCP")]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn notes_reject_foreign_responses(pg_workspace: Option<PgWorkspace>) {
    let Some(workspace) = pg_workspace else {
        return;
    };
    let session = workspace.session().await;
    let other = workspace.session().await;
    let foreign = workspace
        .sessions
        .save_response(SaveResponseRequest::new(
            other.id(),
            "wan_links",
            "text",
            json!("MPLS"),
        ))
        .await
        .expect("answer saved");

    let err = workspace
        .notes
        .add_note(
            AddNoteRequest::new(session.id(), workspace.owner, "Check SD-WAN").related_to(foreign.id()),
        )
        .await
        .expect_err("response belongs elsewhere");

    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn export_attempts_are_listed_newest_first(pg_workspace: Option<PgWorkspace>) {
    let Some(workspace) = pg_workspace else {
        return;
    };
    let session = workspace.session().await;

    workspace
        .exports
        .export_session(session.id(), "json", None)
        .await
        .expect("json export succeeds");
    workspace
        .exports
        .export_session(session.id(), "docx", None)
        .await
        .expect_err("docx is unsupported");

    let trail = workspace
        .exports
        .list_exports(session.id())
        .await
        .expect("exports listed");
    let statuses: Vec<(ExportStatus, &str)> = trail
        .iter()
        .map(|record| (record.status(), record.format()))
        .collect();
    assert_eq!(
        statuses,
        vec![(ExportStatus::Failed, "docx"), (ExportStatus::Success, "json")]
    );
}
