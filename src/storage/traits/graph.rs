//! Graph backend trait for the connection graph.
//!
//! The graph layer owns the node and edge set and answers adjacency and
//! membership queries. Searches never walk the live store: they take an
//! immutable [`GraphSnapshot`] so a whole search sees one consistent graph.
//!
//! # Error Modes and Guarantees
//!
//! All fallible operations return `Result<T>` with errors from [`crate::Error`].
//!
//! | Operation | Complexity | Notes |
//! |-----------|------------|-------|
//! | `add_node` | O(1) amortized | No-op for existing ids |
//! | `add_edge` | O(1) amortized | Idempotent in either endpoint order |
//! | `has_node` | O(1) | |
//! | `neighbors` | O(deg) | Edge insertion order |
//! | `snapshot` | O(1) | Shares the current immutable graph |
//! | `load` | O(n + m) | All-or-nothing |
//!
//! # Example
//!
//! ```rust
//! use sixdeg::storage::{GraphBackend, InMemoryGraphBackend};
//!
//! let backend = InMemoryGraphBackend::new();
//! backend.add_node("Alice").unwrap();
//! backend.add_node("Bob").unwrap();
//! backend.add_edge("Alice", "Bob").unwrap();
//!
//! let neighbors = backend.neighbors("Alice").unwrap();
//! assert_eq!(neighbors[0].as_str(), "Bob");
//! ```

use crate::Result;
use crate::models::{Edge, NodeId};
use crate::storage::graph::GraphSnapshot;
use serde::Serialize;
use std::sync::Arc;

/// Trait for graph layer backends.
///
/// # Implementor Notes
///
/// - Methods use `&self` to enable sharing via `Arc<dyn GraphBackend>`
/// - Each mutation must be atomic with respect to readers: a reader sees the
///   graph either entirely before or entirely after it
/// - `load` must leave the graph untouched when any entry is rejected
/// - Neighbour order must be the order edges were added in, since it decides
///   search tie-breaks
pub trait GraphBackend: Send + Sync {
    /// Adds a node if it is absent.
    ///
    /// Returns `true` if the node was inserted, `false` if it already existed.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidInput`] for blank or whitespace-padded ids.
    fn add_node(&self, id: &str) -> Result<bool>;

    /// Adds an undirected edge between two existing nodes.
    ///
    /// Returns `true` if the edge was inserted, `false` if it already existed
    /// in either order.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidEdge`] if `a == b`, or
    /// [`crate::Error::UnknownNode`] if either endpoint was never added.
    fn add_edge(&self, a: &str, b: &str) -> Result<bool>;

    /// Returns `true` if the node exists.
    fn has_node(&self, id: &str) -> bool;

    /// Returns the neighbours of a node in edge insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnknownNode`] if the node does not exist.
    fn neighbors(&self, id: &str) -> Result<Vec<NodeId>>;

    /// Returns the current immutable view of the graph.
    fn snapshot(&self) -> Arc<GraphSnapshot>;

    /// Bulk-loads nodes then edges.
    ///
    /// Either every entry is applied or none is.
    ///
    /// # Errors
    ///
    /// Returns the first error any individual `add_node` / `add_edge` would
    /// have returned; the graph is left unchanged.
    fn load(&self, nodes: &[NodeId], edges: &[Edge]) -> Result<GraphStats>;

    /// Returns statistics about the current graph.
    fn stats(&self) -> GraphStats {
        self.snapshot().stats()
    }
}

/// Statistics about the graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    /// Number of nodes.
    pub node_count: usize,
    /// Number of undirected edges.
    pub edge_count: usize,
    /// Nodes with no edges.
    pub isolated_nodes: usize,
    /// Highest degree of any node.
    pub max_degree: usize,
}
