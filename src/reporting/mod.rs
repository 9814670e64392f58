//! Aggregated views over discovery responses.
//!
//! Responses are grouped into a category tree or a weighted
//! category-to-vendor flow graph for visualisation. Categories are inferred
//! from question identifiers by substring rules and are a best-effort
//! grouping rather than a classification.

pub mod domain;
pub mod services;

#[cfg(test)]
mod tests;
