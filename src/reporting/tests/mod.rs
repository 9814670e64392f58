//! Unit tests for reporting.

mod service_tests;

use crate::discovery::domain::{
    DiscoveryResponse, QuestionId, QuestionType, ResponseContent, SessionId, VendorSelections,
};
use mockable::DefaultClock;
use serde_json::Value;

fn response(question: &str, kind: QuestionType, value: Value) -> DiscoveryResponse {
    let content = ResponseContent::new(
        QuestionId::new(question).expect("valid question id"),
        "",
        kind,
        value,
    )
    .expect("value fits type");
    DiscoveryResponse::new(SessionId::new(), content, &DefaultClock)
}

fn vendor_response(question: &str, selections: VendorSelections) -> DiscoveryResponse {
    let content = ResponseContent::new(
        QuestionId::new(question).expect("valid question id"),
        "",
        QuestionType::VendorMulti,
        Value::Null,
    )
    .expect("null fits every type")
    .with_vendor_selections(selections);
    DiscoveryResponse::new(SessionId::new(), content, &DefaultClock)
}
