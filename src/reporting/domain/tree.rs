//! Two-level category to question tree.

use super::{ReportCategory, infer_category};
use crate::discovery::domain::{DiscoveryResponse, flatten_value};
use serde::Serialize;
use std::collections::BTreeMap;

/// One answered question under a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryItem {
    /// Question identifier.
    pub question_id: String,
    /// Question title.
    pub title: String,
    /// Flattened answer text.
    pub answer: String,
}

/// A category with the questions grouped under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryNode {
    /// The category.
    pub category: ReportCategory,
    /// Display label of the category.
    pub label: &'static str,
    /// Questions in response order.
    pub items: Vec<CategoryItem>,
}

/// Responses grouped by inferred category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryTree {
    /// Non-empty categories in [`ReportCategory`] order.
    pub categories: Vec<CategoryNode>,
}

impl CategoryTree {
    /// Groups responses by the category inferred from their question
    /// identifiers.
    #[must_use]
    pub fn from_responses(responses: &[DiscoveryResponse]) -> Self {
        let mut grouped: BTreeMap<ReportCategory, Vec<CategoryItem>> = BTreeMap::new();
        for response in responses {
            let category = infer_category(response.question_id().as_str());
            grouped.entry(category).or_default().push(CategoryItem {
                question_id: response.question_id().as_str().to_owned(),
                title: response.question_title().to_owned(),
                answer: answer_text(response),
            });
        }
        Self {
            categories: grouped
                .into_iter()
                .map(|(category, items)| CategoryNode {
                    category,
                    label: category.label(),
                    items,
                })
                .collect(),
        }
    }

    /// Returns the node for a category, if any response fell into it.
    #[must_use]
    pub fn category(&self, category: ReportCategory) -> Option<&CategoryNode> {
        self.categories.iter().find(|node| node.category == category)
    }

    /// Returns the number of items across every category.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.categories.iter().map(|node| node.items.len()).sum()
    }
}

fn answer_text(response: &DiscoveryResponse) -> String {
    if response.vendor_selections().is_empty() {
        flatten_value(response.value())
    } else {
        response.vendor_selections().flatten()
    }
}
