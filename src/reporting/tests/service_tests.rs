//! Reports built from sessions in the in-memory store.

use std::sync::Arc;

use crate::{
    discovery::{
        adapters::memory::InMemoryDiscoveryStore,
        domain::SessionId,
        services::{CreateSessionRequest, DiscoverySessionService, SaveResponseRequest},
    },
    error::ErrorKind,
    ids::UserId,
    reporting::{domain::ReportCategory, services::ReportingService},
};
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use serde_json::json;

struct Harness {
    sessions: DiscoverySessionService<InMemoryDiscoveryStore, DefaultClock>,
    reports: ReportingService<InMemoryDiscoveryStore>,
}

#[fixture]
fn harness() -> Harness {
    let store = Arc::new(InMemoryDiscoveryStore::new());
    Harness {
        sessions: DiscoverySessionService::new(Arc::clone(&store), Arc::new(DefaultClock)),
        reports: ReportingService::new(store),
    }
}

async fn session_with_answers(harness: &Harness) -> SessionId {
    let id = harness
        .sessions
        .create_session(CreateSessionRequest::new("001", "Acme", UserId::new(), "security"))
        .await
        .expect("session creation should succeed")
        .id();
    for (question, selections, sizing) in [
        (
            "branch_firewall",
            json!({"Firewall": ["Acme"]}),
            json!({"users": 500}),
        ),
        (
            "security_stack",
            json!({"Firewall": ["Acme"], "EDR": ["Zeta"]}),
            json!({"sites": 12, "users": 650}),
        ),
    ] {
        harness
            .sessions
            .save_response(
                SaveResponseRequest::new(id, question, "vendor_multi", json!(null))
                    .with_vendor_selections(selections)
                    .with_sizing_selections(sizing),
            )
            .await
            .expect("save should succeed");
    }
    id
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn flow_graph_aggregates_across_responses(harness: Harness) {
    let id = session_with_answers(&harness).await;

    let graph = harness.reports.flow_graph(id).await.expect("graph");

    assert_eq!(graph.weight("Firewall", "Acme"), 2);
    assert_eq!(graph.weight("EDR", "Zeta"), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn category_tree_for_session(harness: Harness) {
    let id = session_with_answers(&harness).await;

    let tree = harness.reports.category_tree(id).await.expect("tree");

    assert_eq!(tree.categories.len(), 1);
    let security = tree
        .category(ReportCategory::Security)
        .expect("security present");
    assert_eq!(security.items.len(), 2);
}

#[rstest]
#[case(Some(8), Some(25))]
#[case(Some(3), Some(67))]
#[case(Some(1), Some(100))]
#[case(Some(0), None)]
#[case(None, None)]
#[tokio::test(flavor = "multi_thread")]
async fn summary_reports_progress_and_selections(
    harness: Harness,
    #[case] catalog: Option<usize>,
    #[case] expected: Option<u8>,
) {
    let id = session_with_answers(&harness).await;

    let summary = harness
        .reports
        .summarize_session(id, catalog)
        .await
        .expect("summary");

    assert_eq!(summary.answered, 2);
    assert_eq!(summary.progress_percentage, expected);
    assert_eq!(
        summary.vendors.iter().map(String::as_str).collect::<Vec<_>>(),
        ["Acme", "Zeta"]
    );
    assert_eq!(summary.sizing.get("users"), Some(&json!(650)));
    assert_eq!(summary.sizing.get("sites"), Some(&json!(12)));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_session_is_not_found(harness: Harness) {
    let err = harness
        .reports
        .category_tree(SessionId::new())
        .await
        .expect_err("session is unknown");

    assert_eq!(err.kind(), ErrorKind::NotFound);
}
