//! End-to-end discovery tests: answering, notes, exports, and reports.

use super::helpers::{Workspace, workspace};
use async_trait::async_trait;
use contrivance::{
    assist::{
        domain::{CompletionRequest, Insight},
        ports::{AssistResult, TextCompletion},
        services::InsightService,
    },
    discovery::{
        domain::{ExportStatus, SessionStatus},
        services::{AddNoteRequest, SaveResponseRequest},
    },
    error::ErrorKind,
    reporting::domain::ReportCategory,
};
use rstest::rstest;
use serde_json::json;
use std::sync::Arc;

struct CannedCompletion(&'static str);

#[async_trait]
impl TextCompletion for CannedCompletion {
    async fn complete(&self, _request: &CompletionRequest) -> AssistResult<String> {
        Ok(self.0.to_owned())
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn answering_twice_keeps_one_response(workspace: Workspace) {
    let session = workspace.acme_session().await;
    let first = workspace
        .sessions
        .save_response(
            SaveResponseRequest::new(session.id(), "firewall_vendor", "vendor_multi", json!(null))
                .with_vendor_selections(json!({ "Firewall": ["Fortinet"] })),
        )
        .await
        .expect("first answer saved");
    let second = workspace
        .sessions
        .save_response(
            SaveResponseRequest::new(session.id(), "firewall_vendor", "vendor_multi", json!(null))
                .with_vendor_selections(json!({ "Firewall": ["Palo Alto", "Cisco"] })),
        )
        .await
        .expect("second answer saved");

    assert_eq!(first.id(), second.id());
    let details = workspace
        .sessions
        .get_session(session.id())
        .await
        .expect("session exists");
    assert_eq!(details.total_questions_answered, 1);
    let vendors: Vec<&str> = details
        .responses
        .first()
        .expect("one response")
        .vendor_selections()
        .vendors()
        .into_iter()
        .collect();
    assert_eq!(vendors, vec!["Cisco", "Palo Alto"]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn completing_a_session_stamps_it(workspace: Workspace) {
    let session = workspace.acme_session().await;
    assert_eq!(session.status(), SessionStatus::InProgress);

    let completed = workspace
        .sessions
        .update_status(session.id(), "completed", None)
        .await
        .expect("status updated");

    assert_eq!(completed.status(), SessionStatus::Completed);
    assert!(completed.completed_at().is_some());
    let current = workspace
        .sessions
        .current_session("001A")
        .await
        .expect("sessions listed")
        .expect("account has a session");
    assert_eq!(current.id(), session.id());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn notes_must_reference_responses_of_the_same_session(workspace: Workspace) {
    let session = workspace.acme_session().await;
    let other = workspace.acme_session().await;
    let response = workspace
        .sessions
        .save_response(SaveResponseRequest::new(
            other.id(),
            "cloud_provider",
            "radio",
            json!("AWS"),
        ))
        .await
        .expect("answer saved");

    let err = workspace
        .notes
        .add_note(
            AddNoteRequest::new(session.id(), workspace.owner, "Migrating next year")
                .related_to(response.id()),
        )
        .await
        .expect_err("response belongs elsewhere");

    assert_eq!(err.kind(), ErrorKind::Validation);
    let notes = workspace
        .notes
        .list_notes(session.id())
        .await
        .expect("notes listed");
    assert!(notes.is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn exports_render_and_are_recorded(workspace: Workspace) {
    let session = workspace.acme_session().await;
    workspace
        .sessions
        .save_response(
            SaveResponseRequest::new(session.id(), "siem_platform", "text", json!("Splunk, \"legacy\""))
                .with_title("SIEM in use"),
        )
        .await
        .expect("answer saved");

    let csv = workspace
        .exports
        .export_session(session.id(), "csv", Some(workspace.owner))
        .await
        .expect("csv export succeeds");
    let failed = workspace
        .exports
        .export_session(session.id(), "pdf", Some(workspace.owner))
        .await
        .expect_err("pdf is unsupported");

    assert_eq!(csv.content_type, "text/csv");
    assert!(csv.file_name.starts_with("discovery-acme-corp-"));
    assert!(csv.file_name.ends_with(".csv"));
    let body = String::from_utf8(csv.bytes).expect("csv is utf-8");
    assert!(body.contains("\"Splunk, \"\"legacy\"\"\""));
    assert_eq!(failed.kind(), ErrorKind::Validation);

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
        vec![(ExportStatus::Failed, "pdf"), (ExportStatus::Success, "csv")]
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reports_and_insights_read_the_stored_session(workspace: Workspace) {
    let session = workspace.acme_session().await;
    for request in [
        SaveResponseRequest::new(session.id(), "firewall_vendor", "vendor_multi", json!(null))
            .with_vendor_selections(json!({ "Firewall": ["Palo Alto"], "EDR": ["CrowdStrike"] })),
        SaveResponseRequest::new(session.id(), "wan_sizing", "text", json!("12 branches"))
            .with_sizing_selections(json!({ "branches": 12 })),
    ] {
        workspace
            .sessions
            .save_response(request)
            .await
            .expect("answer saved");
    }

    let tree = workspace
        .reports
        .category_tree(session.id())
        .await
        .expect("tree built");
    let flow = workspace
        .reports
        .flow_graph(session.id())
        .await
        .expect("flow built");
    let summary = workspace
        .reports
        .summarize_session(session.id(), Some(8))
        .await
        .expect("summary built");

    assert_eq!(tree.item_count(), 2);
    assert!(tree.category(ReportCategory::Security).is_some());
    assert!(tree.category(ReportCategory::Networking).is_some());
    assert_eq!(flow.weight("Firewall", "Palo Alto"), 1);
    assert_eq!(flow.weight("EDR", "CrowdStrike"), 1);
    assert_eq!(summary.answered, 2);
    assert_eq!(summary.progress_percentage, Some(25));
    assert_eq!(summary.sizing.get("branches"), Some(&json!(12)));

    let details = workspace
        .sessions
        .get_session(session.id())
        .await
        .expect("session exists");
    let insights = InsightService::new(Arc::new(CannedCompletion(
        "- Consolidation: two security vendors in play",
    )))
    .discovery_insights(&details)
    .await
    .expect("insights parsed");
    assert_eq!(
        insights,
        vec![Insight::new("Consolidation", "two security vendors in play")]
    );
}
