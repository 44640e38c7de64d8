//! Query orchestration.
//!
//! [`QueryService`] validates arguments, runs the [`PathFinder`] on a graph
//! snapshot, and commits the resulting record to the [`SearchLog`] and the
//! [`RankingTracker`] together.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use sixdeg::{InMemoryGraphBackend, QueryService};
//!
//! let service = QueryService::new(Arc::new(InMemoryGraphBackend::new()));
//! service
//!     .load_graph(["A", "B", "C", "D"], [("A", "B"), ("B", "C")])
//!     .unwrap();
//!
//! let record = service.query("A", "D").unwrap();
//! assert!(!record.is_connected());
//! assert_eq!(service.history(5).len(), 1);
//! ```

use super::{PathFinder, RankingTracker, SearchLog};
use crate::models::{Edge, EventMeta, NodeId, RankingEntry, SearchEvent, SearchRecord};
use crate::observability::{EventBus, current_request_id};
use crate::storage::{GraphBackend, GraphFile, GraphStats};
use crate::{Error, NodeRole, Result};
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::instrument;

/// Service answering degrees-of-separation queries.
///
/// # Thread Safety
///
/// `query` may be called from many threads at once. Searches run in
/// parallel on snapshots; only the commit of each record is serialized, so
/// history order and ranking counts always agree.
pub struct QueryService<B: GraphBackend> {
    backend: Arc<B>,
    finder: PathFinder,
    rankings: RankingTracker,
    history: SearchLog,
    commit: Mutex<()>,
    events: Option<EventBus>,
}

impl<B: GraphBackend> QueryService<B> {
    /// Creates a service over `backend` with default history capacity.
    #[must_use]
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            finder: PathFinder::new(),
            rankings: RankingTracker::new(),
            history: SearchLog::default(),
            commit: Mutex::new(()),
            events: None,
        }
    }

    /// Sets the number of records retained in history.
    #[must_use]
    pub fn with_history_capacity(mut self, capacity: NonZeroUsize) -> Self {
        self.history = SearchLog::new(capacity);
        self
    }

    /// Publishes search and load events to `bus`.
    #[must_use]
    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.events = Some(bus);
        self
    }

    /// Returns the graph backend.
    #[must_use]
    pub fn graph(&self) -> &B {
        &self.backend
    }

    /// Returns the event bus, if one is attached.
    #[must_use]
    pub const fn event_bus(&self) -> Option<&EventBus> {
        self.events.as_ref()
    }

    /// Bulk loads nodes and edges into the graph.
    ///
    /// The load is all-or-nothing; see [`GraphBackend::load`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEdge`] for a self-loop, [`Error::UnknownNode`]
    /// for an edge endpoint that is not a node, and [`Error::InvalidInput`]
    /// for a blank or padded node id.
    pub fn load_graph<N, E, A, Z>(&self, nodes: N, edges: E) -> Result<GraphStats>
    where
        N: IntoIterator,
        N::Item: Into<NodeId>,
        E: IntoIterator<Item = (A, Z)>,
        A: Into<NodeId>,
        Z: Into<NodeId>,
    {
        let nodes: Vec<NodeId> = nodes.into_iter().map(Into::into).collect();
        let edges: Vec<Edge> = edges.into_iter().map(|(a, b)| Edge::new(a, b)).collect();
        self.load_parts(&nodes, &edges)
    }

    /// Bulk loads a decoded graph file.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load_graph`].
    pub fn load_graph_file(&self, file: GraphFile) -> Result<GraphStats> {
        let (nodes, edges) = file.into_parts();
        self.load_parts(&nodes, &edges)
    }

    fn load_parts(&self, nodes: &[NodeId], edges: &[Edge]) -> Result<GraphStats> {
        let stats = self.backend.load(nodes, edges)?;
        self.publish(SearchEvent::GraphLoaded {
            meta: EventMeta::new("query_service", current_request_id()),
            nodes: stats.node_count,
            edges: stats.edge_count,
        });
        Ok(stats)
    }

    /// Finds a shortest path between two people and records the search.
    ///
    /// Arguments are trimmed. A disconnected pair is a successful query with
    /// an empty path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyInput`] for a blank argument and
    /// [`Error::UnknownNode`] for a person not in the graph. Rejected queries
    /// leave history and rankings untouched.
    #[instrument(skip(self), fields(operation = "query"))]
    pub fn query(&self, from: &str, to: &str) -> Result<Arc<SearchRecord>> {
        let start = Instant::now();

        match self.execute(from, to) {
            Ok(record) => {
                let outcome = if record.is_connected() {
                    "connected"
                } else {
                    "disconnected"
                };
                metrics::counter!("sixdeg_queries_total", "outcome" => outcome).increment(1);
                metrics::histogram!("sixdeg_query_duration_ms")
                    .record(start.elapsed().as_secs_f64() * 1000.0);
                #[allow(clippy::cast_precision_loss)]
                let explored = record.explored_count() as f64;
                metrics::histogram!("sixdeg_explored_nodes").record(explored);

                tracing::info!(
                    search_id = %record.id,
                    hops = ?record.hop_count(),
                    explored = record.explored_count(),
                    duration_ms = %start.elapsed().as_millis(),
                    "Query completed"
                );
                Ok(record)
            },
            Err(e) => {
                metrics::counter!(
                    "sixdeg_queries_total",
                    "outcome" => "rejected",
                    "reason" => e.kind()
                )
                .increment(1);
                tracing::debug!(error = %e, "Query rejected");

                self.publish(SearchEvent::Rejected {
                    meta: EventMeta::new("query_service", current_request_id()),
                    from: from.to_string(),
                    to: to.to_string(),
                    reason: e.kind(),
                    message: e.to_string(),
                });
                Err(e)
            },
        }
    }

    fn execute(&self, from: &str, to: &str) -> Result<Arc<SearchRecord>> {
        let from = non_blank(from, NodeRole::From)?;
        let to = non_blank(to, NodeRole::To)?;

        let snapshot = self.backend.snapshot();
        let outcome = self.finder.find(&snapshot, from, to)?;
        let record = Arc::new(SearchRecord::new(
            NodeId::new(from),
            NodeId::new(to),
            outcome.path,
            outcome.explored,
        ));

        let _commit = self
            .commit
            .lock()
            .map_err(|_| Error::lock_poisoned("commit_search"))?;
        {
            // Both locks are taken before either aggregate changes.
            let mut history = self.history.writer()?;
            let mut rankings = self.rankings.writer()?;
            history.push(Arc::clone(&record));
            rankings.record(&record.path);
        }
        self.publish(SearchEvent::completed(
            Arc::clone(&record),
            current_request_id(),
        ));
        Ok(record)
    }

    /// Returns up to `n` ranking entries, most frequent first.
    #[must_use]
    pub fn rankings(&self, n: usize) -> Vec<RankingEntry> {
        self.rankings.top(n)
    }

    /// Returns up to `n` committed records, newest first.
    #[must_use]
    pub fn history(&self, n: usize) -> Vec<Arc<SearchRecord>> {
        self.history.recent(n)
    }

    /// Returns the history capacity.
    #[must_use]
    pub const fn history_capacity(&self) -> NonZeroUsize {
        self.history.capacity()
    }

    fn publish(&self, event: SearchEvent) {
        if let Some(bus) = &self.events {
            bus.publish(event);
        }
    }
}

fn non_blank(value: &str, role: NodeRole) -> Result<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::EmptyInput { role });
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryGraphBackend;

    fn service() -> QueryService<InMemoryGraphBackend> {
        let service = QueryService::new(Arc::new(InMemoryGraphBackend::new()));
        service
            .load_graph(["A", "B", "C"], [("A", "B"), ("B", "C")])
            .unwrap();
        service
    }

    #[test]
    fn test_query_trims_arguments() {
        let service = service();
        let record = service.query("  A ", "C\n").unwrap();
        assert_eq!(record.from, "A");
        assert_eq!(record.to, "C");
        assert_eq!(record.hop_count(), Some(2));
    }

    #[test]
    fn test_blank_argument_rejected_without_side_effects() {
        let service = service();
        let err = service.query("A", "   ").unwrap_err();
        assert!(matches!(err, Error::EmptyInput { role: NodeRole::To }));
        assert!(service.history(5).is_empty());
        assert!(service.rankings(5).is_empty());
    }

    #[test]
    fn test_unknown_node_carries_trimmed_id() {
        let service = service();
        let err = service.query(" Zed ", "A").unwrap_err();
        assert!(matches!(
            err,
            Error::UnknownNode { ref id, role: NodeRole::From } if id == "Zed"
        ));
        assert!(service.history(5).is_empty());
    }

    #[test]
    fn test_history_capacity_applies() {
        let service = service().with_history_capacity(NonZeroUsize::MIN);
        service.query("A", "B").unwrap();
        service.query("A", "C").unwrap();
        let history = service.history(5);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].to, "C");
        assert_eq!(service.history_capacity().get(), 1);
    }

    #[test]
    fn test_failed_commit_leaves_history_and_rankings_unchanged() {
        let service = service();
        service.query("A", "B").unwrap();
        service.rankings.poison();

        let err = service.query("A", "C").unwrap_err();

        assert!(matches!(err, Error::OperationFailed { ref operation, .. } if operation == "record_ranking"));
        let history = service.history(5);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].to, "B");
        assert_eq!(service.rankings.count("C"), 0);
        assert_eq!(service.rankings.count("A"), 1);
    }

    #[tokio::test]
    async fn test_events_published_for_completed_and_rejected() {
        let bus = EventBus::new(16);
        let mut receiver = bus.subscribe();
        let service = service().with_event_bus(bus);

        service.query("A", "C").unwrap();
        let _ = service.query("", "C");

        let first = receiver.recv().await.unwrap();
        assert_eq!(first.event_type(), "completed");
        assert_eq!(
            first
                .path()
                .map(|p| p.iter().map(NodeId::as_str).collect::<Vec<_>>()),
            Some(vec!["A", "B", "C"])
        );

        let second = receiver.recv().await.unwrap();
        assert!(matches!(
            second,
            SearchEvent::Rejected { reason: "empty_input", .. }
        ));
    }
}
