//! Weighted category to vendor flow graph.

use super::infer_category;
use crate::discovery::domain::{DiscoveryResponse, QuestionType};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Role of a node in the flow graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowNodeKind {
    /// A selection category.
    Category,
    /// A vendor.
    Vendor,
}

/// A named node.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct FlowNode {
    /// Node role.
    pub kind: FlowNodeKind,
    /// Category key or vendor code.
    pub name: String,
}

/// A category to vendor edge weighted by how often the vendor was chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowEdge {
    /// Category key.
    pub source: String,
    /// Vendor code.
    pub target: String,
    /// Number of selections.
    pub weight: u64,
}

/// Vendor selections aggregated across responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FlowGraph {
    nodes: Vec<FlowNode>,
    edges: Vec<FlowEdge>,
}

impl FlowGraph {
    /// Builds the graph from `vendor_multi` responses.
    ///
    /// Each vendor listed under a category adds one to the
    /// category-to-vendor edge, so the same pair chosen twice yields one
    /// edge of weight 2. A response with a plain vendor list and no
    /// selection map counts under its inferred category label.
    #[must_use]
    pub fn from_responses(responses: &[DiscoveryResponse]) -> Self {
        let mut weights: BTreeMap<(String, String), u64> = BTreeMap::new();
        let mut bump = |category: &str, vendor: &str| {
            let weight = weights
                .entry((category.to_owned(), vendor.to_owned()))
                .or_default();
            *weight = weight.saturating_add(1);
        };

        for response in responses
            .iter()
            .filter(|response| response.question_type() == QuestionType::VendorMulti)
        {
            if response.vendor_selections().is_empty() {
                let category = infer_category(response.question_id().as_str()).label();
                for vendor in plain_vendors(response.value()) {
                    bump(category, vendor);
                }
            } else {
                for (category, vendors) in response.vendor_selections().iter() {
                    for vendor in vendors {
                        bump(category, vendor);
                    }
                }
            }
        }

        let mut nodes: Vec<FlowNode> = weights
            .keys()
            .flat_map(|(category, vendor)| {
                [
                    FlowNode {
                        kind: FlowNodeKind::Category,
                        name: category.clone(),
                    },
                    FlowNode {
                        kind: FlowNodeKind::Vendor,
                        name: vendor.clone(),
                    },
                ]
            })
            .collect();
        nodes.sort();
        nodes.dedup();

        let edges = weights
            .into_iter()
            .map(|((source, target), weight)| FlowEdge {
                source,
                target,
                weight,
            })
            .collect();
        Self { nodes, edges }
    }

    /// Returns the nodes, categories first, each group sorted by name.
    #[must_use]
    pub fn nodes(&self) -> &[FlowNode] {
        &self.nodes
    }

    /// Returns the edges sorted by category then vendor.
    #[must_use]
    pub fn edges(&self) -> &[FlowEdge] {
        &self.edges
    }

    /// Returns the weight of one edge, or zero when absent.
    #[must_use]
    pub fn weight(&self, category: &str, vendor: &str) -> u64 {
        self.edges
            .iter()
            .find(|edge| edge.source == category && edge.target == vendor)
            .map_or(0, |edge| edge.weight)
    }

    /// Returns `true` when no vendor was selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

fn plain_vendors(value: &Value) -> Vec<&str> {
    match value {
        Value::String(vendor) if !vendor.trim().is_empty() => vec![vendor.trim()],
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|vendor| !vendor.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}
