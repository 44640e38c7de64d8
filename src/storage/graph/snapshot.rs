//! Immutable adjacency view used by searches.

use crate::models::{Edge, NodeId};
use crate::storage::traits::graph::GraphStats;
use crate::{Error, NodeRole, Result};
use std::collections::{HashMap, HashSet};

/// A consistent, immutable view of the connection graph.
///
/// Backends hand out `Arc<GraphSnapshot>`; a search holds one for its whole
/// run, so concurrent loads never change the graph underneath it.
#[derive(Debug, Clone, Default)]
pub struct GraphSnapshot {
    /// Nodes in insertion order.
    nodes: Vec<NodeId>,
    /// Neighbours per node, in edge insertion order.
    adjacency: HashMap<NodeId, Vec<NodeId>>,
    /// Undirected edge set for idempotent inserts.
    edges: HashSet<Edge>,
}

impl GraphSnapshot {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the node exists.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.adjacency.contains_key(id)
    }

    /// Returns the stored id for `id`, sharing its allocation.
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&NodeId> {
        self.adjacency.get_key_value(id).map(|(node, _)| node)
    }

    /// Returns the neighbours of `id` in edge insertion order.
    #[must_use]
    pub fn neighbors(&self, id: &str) -> Option<&[NodeId]> {
        self.adjacency.get(id).map(Vec::as_slice)
    }

    /// Returns `true` if `a` and `b` are connected by an edge.
    #[must_use]
    pub fn has_edge(&self, a: &str, b: &str) -> bool {
        self.neighbors(a)
            .is_some_and(|neighbors| neighbors.iter().any(|n| n == b))
    }

    /// Returns all nodes in insertion order.
    #[must_use]
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Returns the number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of undirected edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Computes graph statistics.
    #[must_use]
    pub fn stats(&self) -> GraphStats {
        let degrees = self.adjacency.values().map(Vec::len);
        GraphStats {
            node_count: self.node_count(),
            edge_count: self.edge_count(),
            isolated_nodes: degrees.clone().filter(|&d| d == 0).count(),
            max_degree: degrees.max().unwrap_or(0),
        }
    }

    /// Inserts a node if absent.
    pub(crate) fn insert_node(&mut self, id: &str) -> Result<bool> {
        validate_node_id(id)?;
        if self.contains(id) {
            return Ok(false);
        }

        let node = NodeId::new(id);
        self.adjacency.insert(node.clone(), Vec::new());
        self.nodes.push(node);
        Ok(true)
    }

    /// Inserts an undirected edge between two existing nodes.
    ///
    /// Validates everything before touching any state, so an error leaves
    /// the graph unchanged.
    pub(crate) fn insert_edge(&mut self, a: &str, b: &str) -> Result<bool> {
        if a == b {
            return Err(Error::InvalidEdge {
                node: a.to_string(),
            });
        }

        let a = self.require(a)?.clone();
        let b = self.require(b)?.clone();

        let edge = Edge::new(a.clone(), b.clone());
        if self.edges.contains(&edge) {
            return Ok(false);
        }

        if let Some(list) = self.adjacency.get_mut(&a) {
            list.push(b.clone());
        }
        if let Some(list) = self.adjacency.get_mut(&b) {
            list.push(a);
        }
        self.edges.insert(edge);
        Ok(true)
    }

    fn require(&self, id: &str) -> Result<&NodeId> {
        self.node(id).ok_or_else(|| Error::UnknownNode {
            id: id.to_string(),
            role: NodeRole::Edge,
        })
    }
}

/// Rejects ids that no trimmed query could ever name.
fn validate_node_id(id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(Error::InvalidInput("node id must not be blank".to_string()));
    }
    if id.trim() != id {
        return Err(Error::InvalidInput(format!(
            "node id '{id}' has leading or trailing whitespace"
        )));
    }
    Ok(())
}
