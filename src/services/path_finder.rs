//! Bidirectional breadth-first shortest path search.
//!
//! Two frontiers grow level by level, one from each endpoint. Each round
//! expands the non-empty frontier with fewer pending nodes; on a tie the side
//! that did not go last goes next, starting with the forward side. Every
//! dequeued node is appended to the explored order and checked against the
//! other side's visited set. The first such hit is the meeting point and
//! ends the search.
//!
//! Whole levels are expanded at a time, so until the frontiers meet the sum
//! of the two expanded depths never exceeds the true distance. The first
//! meeting therefore yields a minimum hop-count path.
//!
//! # Example
//!
//! ```rust
//! use sixdeg::services::PathFinder;
//! use sixdeg::storage::{GraphBackend, InMemoryGraphBackend};
//!
//! let graph = InMemoryGraphBackend::new();
//! for name in ["A", "B", "C"] {
//!     graph.add_node(name).unwrap();
//! }
//! graph.add_edge("A", "B").unwrap();
//! graph.add_edge("B", "C").unwrap();
//!
//! let outcome = PathFinder::new().find(&graph.snapshot(), "A", "C").unwrap();
//! assert_eq!(outcome.hop_count(), Some(2));
//! ```

use crate::models::NodeId;
use crate::storage::GraphSnapshot;
use crate::{Error, NodeRole, Result};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use tracing::instrument;

/// Result of one path search.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PathOutcome {
    /// Shortest path, inclusive of both endpoints; empty if disconnected.
    pub path: Vec<NodeId>,
    /// Nodes dequeued by either frontier, first visit first.
    pub explored: Vec<NodeId>,
}

impl PathOutcome {
    /// Returns `true` if a path was found.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        !self.path.is_empty()
    }

    /// Edges on the path, or `None` if disconnected.
    #[must_use]
    pub fn hop_count(&self) -> Option<usize> {
        self.path.len().checked_sub(1)
    }
}

/// Stateless shortest path finder.
///
/// Every call owns its frontier state, so one finder can serve any number of
/// concurrent searches.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathFinder;

impl PathFinder {
    /// Creates a new path finder.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Finds a shortest path between `from` and `to` in `graph`.
    ///
    /// An empty [`PathOutcome::path`] means the nodes are not connected.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownNode`] if either endpoint is absent; the
    /// search does not start in that case.
    #[instrument(skip(self, graph), fields(operation = "find_path"))]
    pub fn find(&self, graph: &GraphSnapshot, from: &str, to: &str) -> Result<PathOutcome> {
        let from = resolve(graph, from, NodeRole::From)?;
        let to = resolve(graph, to, NodeRole::To)?;

        if from == to {
            return Ok(PathOutcome {
                path: vec![from.clone()],
                explored: vec![from],
            });
        }

        let mut forward = Frontier::seeded(from);
        let mut backward = Frontier::seeded(to);
        let mut explored = ExploredOrder::default();
        let mut last = None;
        let mut rounds = 0_usize;

        while let Some(side) = next_side(&forward, &backward, last) {
            last = Some(side);
            rounds += 1;

            let meeting = match side {
                Side::Forward => forward.expand(graph, &backward, &mut explored),
                Side::Backward => backward.expand(graph, &forward, &mut explored),
            };

            if let Some(meeting) = meeting {
                let path = splice(&forward, &backward, &meeting);
                tracing::debug!(
                    rounds,
                    meeting = %meeting,
                    hops = path.len() - 1,
                    explored = explored.len(),
                    "Frontiers met"
                );
                return Ok(PathOutcome {
                    path,
                    explored: explored.into_vec(),
                });
            }
        }

        tracing::debug!(rounds, explored = explored.len(), "Frontiers exhausted");
        Ok(PathOutcome {
            path: Vec::new(),
            explored: explored.into_vec(),
        })
    }
}

fn resolve(graph: &GraphSnapshot, id: &str, role: NodeRole) -> Result<NodeId> {
    graph.node(id).cloned().ok_or_else(|| Error::UnknownNode {
        id: id.to_string(),
        role,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Forward,
    Backward,
}

/// Picks the frontier to expand next, or `None` once both are exhausted.
fn next_side(forward: &Frontier, backward: &Frontier, last: Option<Side>) -> Option<Side> {
    match (forward.pending.is_empty(), backward.pending.is_empty()) {
        (true, true) => None,
        (false, true) => Some(Side::Forward),
        (true, false) => Some(Side::Backward),
        (false, false) => Some(
            match forward.pending.len().cmp(&backward.pending.len()) {
                Ordering::Less => Side::Forward,
                Ordering::Greater => Side::Backward,
                Ordering::Equal if last == Some(Side::Forward) => Side::Backward,
                Ordering::Equal => Side::Forward,
            },
        ),
    }
}

/// One side of the search.
struct Frontier {
    /// Nodes queued for the next expansion, in discovery order.
    pending: Vec<NodeId>,
    /// Every node this side has discovered, mapped to its predecessor.
    visited: HashMap<NodeId, Option<NodeId>>,
}

impl Frontier {
    fn seeded(origin: NodeId) -> Self {
        let mut visited = HashMap::new();
        visited.insert(origin.clone(), None);
        Self {
            pending: vec![origin],
            visited,
        }
    }

    fn has_visited(&self, node: &NodeId) -> bool {
        self.visited.contains_key(node)
    }

    /// Expands one full level. Returns the meeting node if one is dequeued.
    fn expand(
        &mut self,
        graph: &GraphSnapshot,
        other: &Self,
        explored: &mut ExploredOrder,
    ) -> Option<NodeId> {
        let level = std::mem::take(&mut self.pending);
        for node in level {
            explored.push(&node);
            if other.has_visited(&node) {
                return Some(node);
            }

            for neighbor in graph.neighbors(node.as_str()).unwrap_or_default() {
                if !self.has_visited(neighbor) {
                    self.visited.insert(neighbor.clone(), Some(node.clone()));
                    self.pending.push(neighbor.clone());
                }
            }
        }
        None
    }

    /// Walks predecessors from `start` back to this side's origin.
    fn chain(&self, start: &NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut cursor = Some(start.clone());
        while let Some(node) = cursor {
            cursor = self.visited.get(&node).cloned().flatten();
            chain.push(node);
        }
        chain
    }
}

/// Joins `from ..= meeting` with `meeting ..= to`.
fn splice(forward: &Frontier, backward: &Frontier, meeting: &NodeId) -> Vec<NodeId> {
    let mut path = forward.chain(meeting);
    path.reverse();
    path.extend(backward.chain(meeting).into_iter().skip(1));
    path
}

/// Insertion-ordered set of explored nodes.
#[derive(Default)]
struct ExploredOrder {
    order: Vec<NodeId>,
    seen: HashSet<NodeId>,
}

impl ExploredOrder {
    fn push(&mut self, node: &NodeId) {
        if self.seen.insert(node.clone()) {
            self.order.push(node.clone());
        }
    }

    fn len(&self) -> usize {
        self.order.len()
    }

    fn into_vec(self) -> Vec<NodeId> {
        self.order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::demo_network;
    use std::collections::VecDeque;

    fn graph(nodes: &[&str], edges: &[(&str, &str)]) -> GraphSnapshot {
        let mut snapshot = GraphSnapshot::new();
        for node in nodes {
            snapshot.insert_node(node).unwrap();
        }
        for (a, b) in edges {
            snapshot.insert_edge(a, b).unwrap();
        }
        snapshot
    }

    fn names(ids: &[NodeId]) -> Vec<&str> {
        ids.iter().map(NodeId::as_str).collect()
    }

    /// Single-source BFS distance, used as the reference answer.
    fn bfs_distance(graph: &GraphSnapshot, from: &str, to: &str) -> Option<usize> {
        let mut dist: HashMap<&str, usize> = HashMap::new();
        let mut queue = VecDeque::new();
        dist.insert(from, 0);
        queue.push_back(from);
        while let Some(node) = queue.pop_front() {
            if node == to {
                return dist.get(node).copied();
            }
            let d = dist[node];
            for neighbor in graph.neighbors(node).unwrap_or_default() {
                if !dist.contains_key(neighbor.as_str()) {
                    dist.insert(neighbor.as_str(), d + 1);
                    queue.push_back(neighbor.as_str());
                }
            }
        }
        None
    }

    #[test]
    fn test_same_node_is_degenerate() {
        let snapshot = graph(&["A", "B"], &[("A", "B")]);
        let outcome = PathFinder::new().find(&snapshot, "A", "A").unwrap();
        assert_eq!(names(&outcome.path), vec!["A"]);
        assert_eq!(names(&outcome.explored), vec!["A"]);
        assert_eq!(outcome.hop_count(), Some(0));
    }

    #[test]
    fn test_three_node_line() {
        let snapshot = graph(&["A", "B", "C"], &[("A", "B"), ("B", "C")]);
        let outcome = PathFinder::new().find(&snapshot, "A", "C").unwrap();
        assert_eq!(names(&outcome.path), vec!["A", "B", "C"]);
        assert_eq!(names(&outcome.explored), vec!["A", "C", "B"]);
    }

    #[test]
    fn test_disconnected_pair_explores_both_sides() {
        let snapshot = graph(&["A", "B"], &[]);
        let outcome = PathFinder::new().find(&snapshot, "A", "B").unwrap();
        assert!(outcome.path.is_empty());
        assert_eq!(outcome.hop_count(), None);
        assert_eq!(names(&outcome.explored), vec!["A", "B"]);
    }

    #[test]
    fn test_unknown_endpoints_rejected_before_search() {
        let snapshot = graph(&["A"], &[]);
        let err = PathFinder::new().find(&snapshot, "Zed", "A").unwrap_err();
        assert!(matches!(
            err,
            Error::UnknownNode { ref id, role: NodeRole::From } if id == "Zed"
        ));
        let err = PathFinder::new().find(&snapshot, "A", "Zed").unwrap_err();
        assert!(matches!(err, Error::UnknownNode { role: NodeRole::To, .. }));
    }

    #[test]
    fn test_smaller_frontier_expands_first() {
        // A fans out to three nodes; Z has a single neighbour.
        let snapshot = graph(
            &["A", "B", "C", "D", "Z"],
            &[("A", "B"), ("A", "C"), ("A", "D"), ("D", "Z")],
        );
        let outcome = PathFinder::new().find(&snapshot, "A", "Z").unwrap();
        assert_eq!(names(&outcome.path), vec!["A", "D", "Z"]);
        // Round 1 forward (tie), then backward twice (1 pending vs 3).
        assert_eq!(names(&outcome.explored), vec!["A", "Z", "D"]);
    }

    #[test]
    fn test_shortcut_beats_long_way_round() {
        // Ring A-B-C-D-E-F-A plus a chord A-D.
        let snapshot = graph(
            &["A", "B", "C", "D", "E", "F"],
            &[
                ("A", "B"),
                ("B", "C"),
                ("C", "D"),
                ("D", "E"),
                ("E", "F"),
                ("F", "A"),
                ("A", "D"),
            ],
        );
        let outcome = PathFinder::new().find(&snapshot, "B", "E").unwrap();
        assert_eq!(outcome.hop_count(), bfs_distance(&snapshot, "B", "E"));
        assert_eq!(outcome.hop_count(), Some(3));
    }

    #[test]
    fn test_demo_network_matches_reference_distances() {
        let (nodes, edges) = demo_network().into_parts();
        let mut snapshot = GraphSnapshot::new();
        for node in &nodes {
            snapshot.insert_node(node.as_str()).unwrap();
        }
        for edge in &edges {
            let (a, b) = edge.endpoints();
            snapshot.insert_edge(a.as_str(), b.as_str()).unwrap();
        }

        let finder = PathFinder::new();
        for from in &nodes {
            for to in &nodes {
                let outcome = finder.find(&snapshot, from.as_str(), to.as_str()).unwrap();
                let expected = bfs_distance(&snapshot, from.as_str(), to.as_str());
                assert_eq!(outcome.hop_count(), expected, "{from} -> {to}");

                let explored: HashSet<&NodeId> = outcome.explored.iter().collect();
                assert_eq!(explored.len(), outcome.explored.len());
                assert!(outcome.path.iter().all(|n| explored.contains(n)));
                assert!(
                    outcome
                        .path
                        .windows(2)
                        .all(|w| snapshot.has_edge(w[0].as_str(), w[1].as_str()))
                );
            }
        }
    }

    #[test]
    fn test_search_is_deterministic() {
        let (nodes, edges) = demo_network().into_parts();
        let mut snapshot = GraphSnapshot::new();
        for node in &nodes {
            snapshot.insert_node(node.as_str()).unwrap();
        }
        for edge in &edges {
            let (a, b) = edge.endpoints();
            snapshot.insert_edge(a.as_str(), b.as_str()).unwrap();
        }

        let first = PathFinder::new().find(&snapshot, "Alice", "Ruby").unwrap();
        let second = PathFinder::new().find(&snapshot, "Alice", "Ruby").unwrap();
        assert_eq!(first, second);
        assert_eq!(first.path.first().map(NodeId::as_str), Some("Alice"));
        assert_eq!(first.path.last().map(NodeId::as_str), Some("Ruby"));
    }
}
