//! Read-only report structures built from discovery responses.
//!
//! Nothing here performs I/O; [`crate::reporting::services`] loads the
//! responses and hands them to these builders.

mod category;
mod flow;
mod summary;
mod tree;

pub use category::{CATEGORY_RULES, ReportCategory, infer_category};
pub use flow::{FlowEdge, FlowGraph, FlowNode, FlowNodeKind};
pub use summary::{SessionSummary, summarize_session};
pub use tree::{CategoryItem, CategoryNode, CategoryTree};
