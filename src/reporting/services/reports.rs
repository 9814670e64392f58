//! Loads discovery sessions and builds reports from them.

use super::ReportingResult;
use crate::{
    discovery::{
        domain::{SessionDetails, SessionId},
        ports::{DiscoveryRepository, DiscoveryRepositoryError},
    },
    reporting::domain::{CategoryTree, FlowGraph, SessionSummary, summarize_session},
};
use std::sync::Arc;
use tracing::debug;

/// Read-only reporting over stored discovery sessions.
#[derive(Clone)]
pub struct ReportingService<R>
where
    R: DiscoveryRepository,
{
    repository: Arc<R>,
}

impl<R> ReportingService<R>
where
    R: DiscoveryRepository,
{
    /// Creates a new reporting service.
    #[must_use]
    pub const fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Groups a session's responses by inferred category.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryRepositoryError::SessionNotFound`] (wrapped) for
    /// an unknown session.
    pub async fn category_tree(&self, session_id: SessionId) -> ReportingResult<CategoryTree> {
        let details = self.load(session_id).await?;
        let tree = CategoryTree::from_responses(&details.responses);
        debug!(session = %session_id, categories = tree.categories.len(), "category tree built");
        Ok(tree)
    }

    /// Aggregates a session's vendor selections into a flow graph.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryRepositoryError::SessionNotFound`] (wrapped) for
    /// an unknown session.
    pub async fn flow_graph(&self, session_id: SessionId) -> ReportingResult<FlowGraph> {
        let details = self.load(session_id).await?;
        let graph = FlowGraph::from_responses(&details.responses);
        debug!(session = %session_id, edges = graph.edges().len(), "flow graph built");
        Ok(graph)
    }

    /// Summarises a session's progress against an optional catalogue size.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryRepositoryError::SessionNotFound`] (wrapped) for
    /// an unknown session.
    pub async fn summarize_session(
        &self,
        session_id: SessionId,
        catalog_size: Option<usize>,
    ) -> ReportingResult<SessionSummary> {
        let details = self.load(session_id).await?;
        Ok(summarize_session(&details, catalog_size))
    }

    async fn load(&self, session_id: SessionId) -> ReportingResult<SessionDetails> {
        let session = self
            .repository
            .find_session(session_id)
            .await?
            .ok_or(DiscoveryRepositoryError::SessionNotFound(session_id))?;
        let responses = self.repository.list_responses(session_id).await?;
        let notes = self.repository.list_notes(session_id).await?;
        Ok(SessionDetails::new(session, responses, notes))
    }
}
