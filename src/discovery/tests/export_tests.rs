//! Export rendering and the export trail.

use std::sync::Arc;

use crate::{
    audit::{domain::AuditEntity, ports::AuditTrail},
    discovery::{
        adapters::memory::InMemoryDiscoveryStore,
        domain::{ExportFormat, ExportStatus, SessionId, escape_field, payload_digest},
        services::{
            CreateSessionRequest, DiscoveryExportService, DiscoveryServiceError,
            DiscoverySessionService, SaveResponseRequest,
        },
    },
    error::ErrorKind,
    ids::UserId,
};
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

struct Harness {
    store: Arc<InMemoryDiscoveryStore>,
    sessions: DiscoverySessionService<InMemoryDiscoveryStore, DefaultClock>,
    exports: DiscoveryExportService<InMemoryDiscoveryStore, DefaultClock>,
}

#[fixture]
fn harness() -> Harness {
    let store = Arc::new(InMemoryDiscoveryStore::new());
    let clock = Arc::new(DefaultClock);
    Harness {
        sessions: DiscoverySessionService::new(Arc::clone(&store), Arc::clone(&clock)),
        exports: DiscoveryExportService::new(Arc::clone(&store), clock),
        store,
    }
}

async fn answered_session(harness: &Harness) -> SessionId {
    let id = harness
        .sessions
        .create_session(CreateSessionRequest::new(
            "001",
            "Acme Corp",
            UserId::new(),
            "networking",
        ))
        .await
        .expect("session creation should succeed")
        .id();
    harness
        .sessions
        .save_response(
            SaveResponseRequest::new(id, "campus", "text", json!("Two sites, \"HQ\" and DR"))
                .with_title("Campus layout"),
        )
        .await
        .expect("save should succeed");
    harness
        .sessions
        .save_response(
            SaveResponseRequest::new(id, "switching", "vendor_multi", Value::Null)
                .with_title("Switching vendors")
                .with_vendor_selections(json!({"Core": ["Acme", "Zeta"], "Access": ["Acme"]}))
                .with_sizing_selections(json!({"ports": 480})),
        )
        .await
        .expect("save should succeed");
    id
}

#[rstest]
#[case("Acme", "Acme")]
#[case("a,b", "\"a,b\"")]
#[case("say \"hi\"", "\"say \"\"hi\"\"\"")]
#[case("two\nlines", "\"two\nlines\"")]
fn csv_fields_are_quoted_when_needed(#[case] raw: &str, #[case] expected: &str) {
    assert_eq!(escape_field(raw), expected);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn csv_export_flattens_each_response(harness: Harness) {
    let id = answered_session(&harness).await;

    let payload = harness
        .exports
        .export_session(id, "CSV", None)
        .await
        .expect("export should succeed");

    let text = String::from_utf8(payload.bytes.clone()).expect("utf-8 csv");
    let lines: Vec<&str> = text.split("\r\n").collect();
    assert_eq!(
        lines.first().copied(),
        Some("Question ID,Question Title,Question Type,Response Value,Vendors Selected,Sizing Selected")
    );
    assert!(text.contains("campus,Campus layout,text,\"Two sites, \"\"HQ\"\" and DR\",,"));
    assert!(text.contains(
        "switching,Switching vendors,vendor_multi,,Access: Acme | Core: Acme; Zeta,ports: 480"
    ));
    assert_eq!(payload.content_type, "text/csv");
    assert_eq!(payload.file_name, format!("discovery-acme-corp-{id}.csv"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn json_export_records_a_digest(harness: Harness) {
    let id = answered_session(&harness).await;

    let payload = harness
        .exports
        .export_session(id, "json", None)
        .await
        .expect("export should succeed");

    let parsed: Value = serde_json::from_slice(&payload.bytes).expect("valid json");
    assert_eq!(parsed["total_questions_answered"], json!(2));
    assert_eq!(payload.format, ExportFormat::Json);
    assert_eq!(payload.content_type, "application/json");
    assert_eq!(payload.record.status(), ExportStatus::Success);
    assert_eq!(
        payload.record.digest(),
        Some(payload_digest(&payload.bytes).as_str())
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_exports_are_recorded(harness: Harness) {
    let id = answered_session(&harness).await;

    let err = harness
        .exports
        .export_session(id, "xlsx", None)
        .await
        .expect_err("format is unsupported");

    assert_eq!(err.kind(), ErrorKind::Validation);
    let records = harness.exports.list_exports(id).await.expect("listing");
    let [record] = records.as_slice() else {
        panic!("expected one export record");
    };
    assert_eq!(record.status(), ExportStatus::Failed);
    assert_eq!(record.format(), "xlsx");
    assert!(record.error_message().is_some());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn exporting_unknown_session_is_not_found_but_recorded(harness: Harness) {
    let missing = SessionId::new();

    let err = harness
        .exports
        .export_session(missing, "json", None)
        .await
        .expect_err("session is unknown");

    assert!(matches!(err, DiscoveryServiceError::Repository(_)));
    assert_eq!(err.kind(), ErrorKind::NotFound);
    let records = harness.exports.list_exports(missing).await.expect("listing");
    assert_eq!(records.len(), 1);
    let entries = harness
        .store
        .audit_log()
        .entries_for(AuditEntity::DiscoverySession, missing.into_inner())
        .await
        .expect("audit lookup");
    assert_eq!(entries.len(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn exports_are_listed_newest_first(harness: Harness) {
    let id = answered_session(&harness).await;
    harness
        .exports
        .export_session(id, "json", None)
        .await
        .expect("export should succeed");
    harness
        .exports
        .export_session(id, "csv", None)
        .await
        .expect("export should succeed");

    let records = harness.exports.list_exports(id).await.expect("listing");

    let formats: Vec<_> = records.iter().map(|record| record.format()).collect();
    assert_eq!(formats, ["csv", "json"]);
}
