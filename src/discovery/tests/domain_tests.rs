//! Parsing and validation of discovery domain values.

use crate::discovery::domain::{
    AccountRef, DiscoveryDomainError, QuestionType, SessionStatus, SizingSelections,
    VendorSelections, Vertical, note_type_or_default,
};
use rstest::rstest;
use serde_json::json;

#[rstest]
#[case("networking", Vertical::Networking)]
#[case("Data Center", Vertical::DataCenter)]
#[case("data-center", Vertical::DataCenter)]
#[case(" SECURITY ", Vertical::Security)]
fn verticals_parse_loosely(#[case] input: &str, #[case] expected: Vertical) {
    assert_eq!(Vertical::try_from(input).expect("known vertical"), expected);
}

#[rstest]
fn unknown_vertical_is_rejected() {
    let err = Vertical::try_from("mainframe").expect_err("unknown vertical");
    assert_eq!(err.0, "mainframe");
}

#[rstest]
#[case("in-progress", SessionStatus::InProgress)]
#[case("completed", SessionStatus::Completed)]
#[case("Archived", SessionStatus::Archived)]
fn statuses_parse(#[case] input: &str, #[case] expected: SessionStatus) {
    let status = SessionStatus::try_from(input).expect("known status");
    assert_eq!(status, expected);
    assert!(status.is_settable());
}

#[rstest]
fn draft_is_not_settable() {
    assert!(!SessionStatus::Draft.is_settable());
}

#[rstest]
#[case("vendor-multi", QuestionType::VendorMulti)]
#[case("multiselect", QuestionType::MultiSelect)]
#[case("textarea", QuestionType::Text)]
fn question_type_aliases(#[case] input: &str, #[case] expected: QuestionType) {
    assert_eq!(QuestionType::try_from(input).expect("known type"), expected);
}

#[rstest]
#[case(QuestionType::Text, json!("free text"))]
#[case(QuestionType::Radio, json!("yes"))]
#[case(QuestionType::Checkbox, json!(["a", "b"]))]
#[case(QuestionType::MultiSelect, json!([]))]
#[case(QuestionType::VendorMulti, json!(["Acme"]))]
#[case(QuestionType::Radio, json!(null))]
fn values_matching_their_type_are_accepted(
    #[case] kind: QuestionType,
    #[case] value: serde_json::Value,
) {
    assert!(kind.validate_value(&value).is_ok());
}

#[rstest]
#[case(QuestionType::Text, json!(5))]
#[case(QuestionType::Radio, json!(["a", "b"]))]
#[case(QuestionType::Checkbox, json!("a"))]
#[case(QuestionType::VendorMulti, json!(true))]
fn values_of_the_wrong_shape_are_rejected(
    #[case] kind: QuestionType,
    #[case] value: serde_json::Value,
) {
    let err = kind.validate_value(&value).expect_err("shape mismatch");
    assert!(matches!(err, DiscoveryDomainError::InvalidResponseValue { .. }));
}

#[rstest]
fn vendor_selections_keep_order_within_a_category() {
    let selections = VendorSelections::from_json(&json!({
        "Firewall": ["Zeta", "Acme"],
        "Switching": ["Acme"],
    }))
    .expect("valid selections");

    assert_eq!(
        selections.flatten(),
        "Firewall: Zeta; Acme | Switching: Acme"
    );
    assert_eq!(selections.vendors().into_iter().collect::<Vec<_>>(), ["Acme", "Zeta"]);
}

#[rstest]
#[case(json!(["Acme"]))]
#[case(json!({"Firewall": "Acme"}))]
#[case(json!({"Firewall": [1]}))]
fn malformed_vendor_selections_are_rejected(#[case] payload: serde_json::Value) {
    assert_eq!(
        VendorSelections::from_json(&payload),
        Err(DiscoveryDomainError::InvalidVendorSelections)
    );
}

#[rstest]
fn null_selections_are_empty() {
    assert!(VendorSelections::from_json(&json!(null)).expect("null").is_empty());
    assert!(SizingSelections::from_json(&json!(null)).expect("null").is_empty());
}

#[rstest]
fn sizing_selections_flatten_lists() {
    let sizing = SizingSelections::from_json(&json!({"sites": 12, "tiers": ["gold", "silver"]}))
        .expect("object");
    assert_eq!(sizing.flatten(), "sites: 12 | tiers: gold; silver");
}

#[rstest]
#[case("Acme Corp, Inc.", "acme-corp-inc")]
#[case("  Globex  ", "globex")]
#[case("!!!", "account")]
fn account_slugs(#[case] name: &str, #[case] expected: &str) {
    let account = AccountRef::new("001", name).expect("valid account");
    assert_eq!(account.slug(), expected);
}

#[rstest]
fn blank_account_fields_are_rejected() {
    assert_eq!(
        AccountRef::new(" ", "Acme"),
        Err(DiscoveryDomainError::EmptyAccountId)
    );
    assert_eq!(
        AccountRef::new("001", ""),
        Err(DiscoveryDomainError::EmptyAccountName)
    );
}

#[rstest]
#[case(None, "general")]
#[case(Some("  "), "general")]
#[case(Some("Risk"), "risk")]
fn note_types_default_to_general(#[case] tag: Option<&str>, #[case] expected: &str) {
    assert_eq!(note_type_or_default(tag), expected);
}
