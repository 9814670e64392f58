//! Per-session progress summary.

use crate::{
    discovery::domain::{SessionDetails, SessionId},
    pipeline::domain::rounded_percentage,
};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Progress and selections recorded in one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    /// Summarised session.
    pub session_id: SessionId,
    /// Number of answered questions.
    pub answered: usize,
    /// Size of the question catalogue, when known.
    pub catalog_size: Option<usize>,
    /// Rounded share of the catalogue answered, capped at 100.
    pub progress_percentage: Option<u8>,
    /// Distinct vendors selected across every response.
    pub vendors: BTreeSet<String>,
    /// Sizing selections merged across responses; later answers win.
    pub sizing: Map<String, Value>,
}

/// Summarises a session. Progress is only reported for a non-empty
/// catalogue.
#[must_use]
pub fn summarize_session(details: &SessionDetails, catalog_size: Option<usize>) -> SessionSummary {
    let vendors = details
        .responses
        .iter()
        .flat_map(|response| response.vendor_selections().vendors())
        .map(str::to_owned)
        .collect();
    let mut sizing = Map::new();
    for response in &details.responses {
        for (key, value) in response.sizing_selections().as_map() {
            sizing.insert(key.clone(), value.clone());
        }
    }
    let catalog = catalog_size.filter(|size| *size > 0);
    SessionSummary {
        session_id: details.session.id(),
        answered: details.total_questions_answered,
        catalog_size: catalog,
        progress_percentage: catalog
            .map(|size| rounded_percentage(size, details.total_questions_answered)),
        vendors,
        sizing,
    }
}
