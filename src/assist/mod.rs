//! External chat-completion collaborator.
//!
//! The collaborator keeps no state: [`adapters::ChatCompletionClient`] is
//! built from an explicit [`crate::config::ChatConfig`] and
//! [`services::InsightService`] turns a discovery session into a prompt and
//! the answer into a short insight list.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
