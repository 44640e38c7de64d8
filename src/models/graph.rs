//! Node and edge types for the connection graph.
//!
//! The graph is simple and undirected: an [`Edge`] is an unordered pair of
//! distinct [`NodeId`]s, so `Edge::new("A", "B")` and `Edge::new("B", "A")`
//! compare equal.
//!
//! # Example
//!
//! ```rust
//! use sixdeg::models::{Edge, NodeId};
//!
//! let alice = NodeId::new("Alice");
//! assert_eq!(alice.as_str(), "Alice");
//!
//! assert_eq!(Edge::new("Alice", "Bob"), Edge::new("Bob", "Alice"));
//! ```

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Identifier of a person in the graph.
///
/// Case-sensitive and compared byte-for-byte. Backed by `Arc<str>` so paths,
/// explored orders and ranking keys share one allocation per name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(Arc<str>);

impl NodeId {
    /// Creates a new node ID.
    #[must_use]
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

impl PartialEq<str> for NodeId {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for NodeId {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

/// Undirected, unweighted connection between two people.
///
/// Endpoints are stored in lexicographic order so equality and hashing do
/// not depend on the order they were given in. Self-loops are representable
/// here and rejected by the graph store.
///
/// Serialized as an `[a, b]` pair, like the edge lists in graph files.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(NodeId, NodeId)", into = "(NodeId, NodeId)")]
pub struct Edge {
    a: NodeId,
    b: NodeId,
}

impl Edge {
    /// Creates an edge between two nodes.
    #[must_use]
    pub fn new(a: impl Into<NodeId>, b: impl Into<NodeId>) -> Self {
        let (a, b) = (a.into(), b.into());
        if a <= b {
            Self { a, b }
        } else {
            Self { a: b, b: a }
        }
    }

    /// Returns both endpoints, lexicographically ordered.
    #[must_use]
    pub const fn endpoints(&self) -> (&NodeId, &NodeId) {
        (&self.a, &self.b)
    }

    /// Returns `true` if both endpoints are the same node.
    #[must_use]
    pub fn is_self_loop(&self) -> bool {
        self.a == self.b
    }

    /// Returns `true` if `node` is one of the endpoints.
    #[must_use]
    pub fn touches(&self, node: &str) -> bool {
        self.a == *node || self.b == *node
    }
}

impl From<(NodeId, NodeId)> for Edge {
    fn from((a, b): (NodeId, NodeId)) -> Self {
        Self::new(a, b)
    }
}

impl From<Edge> for (NodeId, NodeId) {
    fn from(edge: Edge) -> Self {
        (edge.a, edge.b)
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -- {}", self.a, self.b)
    }
}
