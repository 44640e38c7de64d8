//! Search records, summaries and ranking entries.

use super::NodeId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a completed search.
///
/// Uses UUID v7 so identifiers sort by creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchId(Uuid);

impl SearchId {
    /// Generates a new time-ordered search ID.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for SearchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of one completed query.
///
/// `path` is empty when the two people are not connected; that is a normal
/// result, not an error. `explored` lists every node the search examined, in
/// visitation order, without duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRecord {
    /// Unique identifier.
    pub id: SearchId,
    /// Start of the search.
    pub from: NodeId,
    /// Target of the search.
    pub to: NodeId,
    /// Shortest path from `from` to `to`, inclusive; empty if disconnected.
    pub path: Vec<NodeId>,
    /// Nodes examined while searching, in first-visit order.
    pub explored: Vec<NodeId>,
    /// When the search completed.
    pub timestamp: DateTime<Utc>,
}

impl SearchRecord {
    /// Creates a record stamped with a fresh ID and the current time.
    #[must_use]
    pub fn new(from: NodeId, to: NodeId, path: Vec<NodeId>, explored: Vec<NodeId>) -> Self {
        Self {
            id: SearchId::generate(),
            from,
            to,
            path,
            explored,
            timestamp: Utc::now(),
        }
    }

    /// Returns `true` if a connecting path was found.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        !self.path.is_empty()
    }

    /// Degrees of separation: edges on the path, or `None` if disconnected.
    #[must_use]
    pub fn hop_count(&self) -> Option<usize> {
        self.path.len().checked_sub(1)
    }

    /// Number of nodes examined during the search.
    #[must_use]
    pub fn explored_count(&self) -> usize {
        self.explored.len()
    }

    /// Returns the compact log-row view of this record.
    #[must_use]
    pub fn summary(&self) -> SearchSummary {
        SearchSummary {
            id: self.id,
            from: self.from.clone(),
            to: self.to.clone(),
            hop_count: self.hop_count(),
            explored_count: self.explored_count(),
            timestamp: self.timestamp,
        }
    }
}

/// One row of the search history as shown to users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSummary {
    /// Search identifier.
    pub id: SearchId,
    /// Start of the search.
    pub from: NodeId,
    /// Target of the search.
    pub to: NodeId,
    /// Degrees of separation, `None` when disconnected.
    pub hop_count: Option<usize>,
    /// Number of nodes examined.
    pub explored_count: usize,
    /// When the search completed.
    pub timestamp: DateTime<Utc>,
}

/// Cumulative path-membership count for one person.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RankingEntry {
    /// The person.
    pub node: NodeId,
    /// Number of completed searches whose path contained `node`.
    pub count: u64,
}

impl RankingEntry {
    /// Creates a ranking entry.
    #[must_use]
    pub const fn new(node: NodeId, count: u64) -> Self {
        Self { node, count }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<NodeId> {
        names.iter().copied().map(NodeId::new).collect()
    }

    #[test]
    fn test_hop_count_for_connected_record() {
        let record = SearchRecord::new(
            NodeId::new("A"),
            NodeId::new("C"),
            ids(&["A", "B", "C"]),
            ids(&["A", "C", "B"]),
        );
        assert!(record.is_connected());
        assert_eq!(record.hop_count(), Some(2));
        assert_eq!(record.explored_count(), 3);
    }

    #[test]
    fn test_hop_count_for_disconnected_record() {
        let record = SearchRecord::new(
            NodeId::new("A"),
            NodeId::new("B"),
            Vec::new(),
            ids(&["A", "B"]),
        );
        assert!(!record.is_connected());
        assert_eq!(record.hop_count(), None);
    }

    #[test]
    fn test_summary_copies_derived_fields() {
        let record = SearchRecord::new(
            NodeId::new("A"),
            NodeId::new("A"),
            ids(&["A"]),
            ids(&["A"]),
        );
        let summary = record.summary();
        assert_eq!(summary.id, record.id);
        assert_eq!(summary.hop_count, Some(0));
        assert_eq!(summary.explored_count, 1);
    }

    #[test]
    fn test_search_ids_are_unique_v7() {
        let first = SearchId::generate();
        let second = SearchId::generate();
        assert_ne!(first, second);
        assert_eq!(first.as_uuid().get_version_num(), 7);
    }
}
