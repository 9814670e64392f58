//! Batch and CRM import tests.

use super::helpers::{Workspace, workspace};
use contrivance::{
    crm::{
        adapters::StaticCrmDirectory,
        domain::{CrmAccount, CrmOpportunity},
        services::CrmImportService,
    },
    error::ErrorKind,
    pipeline::{domain::CellValue, services::ImportRecord},
};
use mockable::DefaultClock;
use rstest::rstest;
use serde_json::json;
use std::sync::Arc;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn import_keeps_good_records_and_reports_bad_ones(workspace: Workspace) {
    let sheet = workspace.account_pipeline().await;
    let records = vec![
        ImportRecord::new(json!({ "Account": "Acme", "Amount": "1,000" })).with_external_id("a"),
        ImportRecord::new(json!({ "Amount": 5 })).with_external_id("b"),
        ImportRecord::new(json!({ "Account": "Globex", "Amount": "n/a" })),
        ImportRecord::new(json!({ "Account": "Initech" })),
    ];

    let report = workspace
        .import
        .import_rows(sheet, records, Some(workspace.owner))
        .await
        .expect("batch runs");

    assert_eq!(report.processed(), 4);
    assert_eq!(report.created.len(), 2);
    let failed: Vec<(usize, Option<&str>, ErrorKind)> = report
        .failures
        .iter()
        .map(|failure| (failure.index, failure.external_id.as_deref(), failure.kind))
        .collect();
    assert_eq!(
        failed,
        vec![
            (1, Some("b"), ErrorKind::Validation),
            (2, None, ErrorKind::Validation),
        ]
    );
    let positions: Vec<i32> = workspace
        .rows
        .list_rows(sheet)
        .await
        .expect("rows listed")
        .iter()
        .map(|row| row.position())
        .collect();
    assert_eq!(positions, vec![1, 2]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn crm_opportunities_become_rows(workspace: Workspace) {
    let sheet = workspace.account_pipeline().await;
    let acme = CrmAccount::new("001A", "Acme Corp");
    let directory = StaticCrmDirectory::new()
        .with_opportunity(
            CrmOpportunity::new("006A", "Acme firewall refresh", "Proposal")
                .with_amount(48_000.0)
                .for_account(acme)
                .owned_by("Dana"),
        )
        .with_opportunity(CrmOpportunity::new("006B", "Orphan deal", "Discovery"));
    let service = CrmImportService::new(
        Arc::new(directory),
        Arc::clone(&workspace.pipeline_store),
        Arc::new(DefaultClock),
    );

    let report = service
        .import_opportunities(sheet, None)
        .await
        .expect("import runs");

    assert_eq!(report.created.len(), 1);
    let row = report.created.first().expect("one row imported");
    assert_eq!(
        row.data().get("Account"),
        Some(&CellValue::Text("Acme Corp".to_owned()))
    );
    assert_eq!(row.data().get("Amount"), Some(&CellValue::Number(48_000.0)));
    assert_eq!(
        row.data().get("Owner"),
        Some(&CellValue::Text("Dana".to_owned()))
    );
    let failure = report.failures.first().expect("orphan deal rejected");
    assert_eq!(failure.external_id.as_deref(), Some("006B"));
    assert_eq!(failure.kind, ErrorKind::Validation);
}
