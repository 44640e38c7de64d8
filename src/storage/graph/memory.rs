//! In-memory graph backend.
//!
//! Holds the current [`GraphSnapshot`] behind an `RwLock<Arc<_>>`. Readers
//! clone the `Arc` and drop the lock immediately; writers build the next
//! snapshot and swap it in, so every mutation is atomic for readers.

use crate::models::{Edge, NodeId};
use crate::storage::graph::GraphSnapshot;
use crate::storage::traits::graph::{GraphBackend, GraphStats};
use crate::{Error, NodeRole, Result};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;
use tracing::instrument;

/// In-memory graph backend.
///
/// Data is not persisted between runs; the graph is bulk loaded at startup.
///
/// # Example
///
/// ```rust
/// use sixdeg::models::{Edge, NodeId};
/// use sixdeg::storage::{GraphBackend, InMemoryGraphBackend};
///
/// let backend = InMemoryGraphBackend::new();
/// let nodes = vec![NodeId::new("A"), NodeId::new("B")];
/// let stats = backend.load(&nodes, &[Edge::new("A", "B")]).unwrap();
/// assert_eq!(stats.edge_count, 1);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryGraphBackend {
    current: RwLock<Arc<GraphSnapshot>>,
}

impl InMemoryGraphBackend {
    /// Creates a new empty in-memory graph backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of nodes stored.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.snapshot().node_count()
    }

    /// Returns the number of edges stored.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.snapshot().edge_count()
    }

    /// Applies `mutate` to the current graph under the write lock.
    ///
    /// Copies the graph only when a search still holds the old snapshot.
    /// Callers must not leave partial changes behind on error.
    fn mutate<T>(
        &self,
        operation: &str,
        mutate: impl FnOnce(&mut GraphSnapshot) -> Result<T>,
    ) -> Result<T> {
        let mut current = self
            .current
            .write()
            .map_err(|_| Error::lock_poisoned(operation))?;
        mutate(Arc::make_mut(&mut current))
    }
}

impl GraphBackend for InMemoryGraphBackend {
    fn add_node(&self, id: &str) -> Result<bool> {
        self.mutate("add_node", |graph| graph.insert_node(id))
    }

    fn add_edge(&self, a: &str, b: &str) -> Result<bool> {
        self.mutate("add_edge", |graph| graph.insert_edge(a, b))
    }

    fn has_node(&self, id: &str) -> bool {
        self.snapshot().contains(id)
    }

    fn neighbors(&self, id: &str) -> Result<Vec<NodeId>> {
        self.snapshot()
            .neighbors(id)
            .map(<[NodeId]>::to_vec)
            .ok_or_else(|| Error::UnknownNode {
                id: id.to_string(),
                role: NodeRole::Lookup,
            })
    }

    fn snapshot(&self) -> Arc<GraphSnapshot> {
        // Writers only ever assign a finished snapshot, so a poisoned lock
        // still guards a complete graph.
        let current = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&current)
    }

    #[instrument(
        skip(self, nodes, edges),
        fields(operation = "graph_load", nodes = nodes.len(), edges = edges.len())
    )]
    fn load(&self, nodes: &[NodeId], edges: &[Edge]) -> Result<GraphStats> {
        let start = Instant::now();
        let mut current = self
            .current
            .write()
            .map_err(|_| Error::lock_poisoned("graph_load"))?;

        let mut staged = GraphSnapshot::clone(&current);
        let applied = nodes
            .iter()
            .try_for_each(|node| staged.insert_node(node.as_str()).map(drop))
            .and_then(|()| {
                edges.iter().try_for_each(|edge| {
                    let (a, b) = edge.endpoints();
                    staged.insert_edge(a.as_str(), b.as_str()).map(drop)
                })
            });

        if let Err(e) = applied {
            metrics::counter!("sixdeg_graph_load_total", "outcome" => "rejected").increment(1);
            tracing::warn!(error = %e, "Graph load aborted, nothing committed");
            return Err(e);
        }

        let stats = staged.stats();
        *current = Arc::new(staged);
        drop(current);

        metrics::counter!("sixdeg_graph_load_total", "outcome" => "committed").increment(1);
        tracing::info!(
            node_count = stats.node_count,
            edge_count = stats.edge_count,
            duration_ms = %start.elapsed().as_millis(),
            "Graph loaded"
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<NodeId> {
        names.iter().copied().map(NodeId::new).collect()
    }

    #[test]
    fn test_add_edge_requires_both_endpoints() {
        let backend = InMemoryGraphBackend::new();
        backend.add_node("A").unwrap();

        let err = backend.add_edge("A", "B").unwrap_err();
        assert!(matches!(err, Error::UnknownNode { ref id, .. } if id == "B"));

        backend.add_node("B").unwrap();
        assert!(backend.add_edge("A", "B").unwrap());
        assert!(!backend.add_edge("B", "A").unwrap());
    }

    #[test]
    fn test_neighbors_unknown_node() {
        let backend = InMemoryGraphBackend::new();
        let err = backend.neighbors("Nobody").unwrap_err();
        assert!(matches!(
            err,
            Error::UnknownNode { role: NodeRole::Lookup, .. }
        ));
    }

    #[test]
    fn test_load_is_all_or_nothing() {
        let backend = InMemoryGraphBackend::new();
        backend.load(&ids(&["A", "B"]), &[Edge::new("A", "B")]).unwrap();

        let err = backend
            .load(
                &ids(&["C", "D"]),
                &[Edge::new("C", "D"), Edge::new("D", "D")],
            )
            .unwrap_err();
        assert!(matches!(err, Error::InvalidEdge { .. }));

        assert_eq!(backend.node_count(), 2);
        assert_eq!(backend.edge_count(), 1);
        assert!(!backend.has_node("C"));
    }

    #[test]
    fn test_load_merges_with_existing_graph() {
        let backend = InMemoryGraphBackend::new();
        backend.load(&ids(&["A", "B"]), &[Edge::new("A", "B")]).unwrap();
        let stats = backend
            .load(&ids(&["C"]), &[Edge::new("B", "C")])
            .unwrap();
        assert_eq!(stats.node_count, 3);
        assert_eq!(stats.edge_count, 2);
    }

    #[test]
    fn test_snapshot_is_isolated_from_later_writes() {
        let backend = InMemoryGraphBackend::new();
        backend.load(&ids(&["A", "B"]), &[]).unwrap();

        let before = backend.snapshot();
        backend.add_edge("A", "B").unwrap();

        assert_eq!(before.edge_count(), 0);
        assert_eq!(backend.snapshot().edge_count(), 1);
    }

    #[test]
    fn test_concurrent_readers_see_whole_loads() {
        let backend = Arc::new(InMemoryGraphBackend::new());
        backend.load(&ids(&["hub"]), &[]).unwrap();

        let writer = {
            let backend = Arc::clone(&backend);
            std::thread::spawn(move || {
                for i in 0..50 {
                    let spoke = format!("spoke-{i}");
                    backend
                        .load(&ids(&[spoke.as_str()]), &[Edge::new("hub", spoke.as_str())])
                        .unwrap();
                }
            })
        };

        for _ in 0..200 {
            let snapshot = backend.snapshot();
            // Each load adds one node and one edge together.
            assert_eq!(snapshot.node_count(), snapshot.edge_count() + 1);
        }
        writer.join().unwrap();
        assert_eq!(backend.edge_count(), 50);
    }
}
