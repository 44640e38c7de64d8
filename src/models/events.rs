//! Search event types for listeners and observability.

use std::sync::Arc;

use super::{NodeId, SearchRecord};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Shared event metadata required for observability.
#[derive(Debug, Clone)]
pub struct EventMeta {
    /// Unique identifier for this event.
    pub event_id: String,
    /// Optional correlation identifier for request/trace linking.
    pub correlation_id: Option<String>,
    /// Event source component.
    pub source: &'static str,
    /// When the event was created.
    pub timestamp: DateTime<Utc>,
}

impl EventMeta {
    /// Creates new event metadata using the current timestamp.
    #[must_use]
    pub fn new(source: &'static str, correlation_id: Option<String>) -> Self {
        Self::with_timestamp(source, correlation_id, Utc::now())
    }

    /// Creates new event metadata with a specified timestamp.
    #[must_use]
    pub fn with_timestamp(
        source: &'static str,
        correlation_id: Option<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4().to_string(),
            correlation_id,
            source,
            timestamp,
        }
    }
}

/// Events emitted by the query service.
///
/// A visualization layer subscribes to these instead of registering
/// rendering callbacks with the engine.
#[derive(Debug, Clone)]
pub enum SearchEvent {
    /// A query ran and its record was committed to history and rankings.
    Completed {
        /// Event metadata.
        meta: EventMeta,
        /// The committed record, shared with the search log.
        record: Arc<SearchRecord>,
    },
    /// A query was rejected before searching.
    Rejected {
        /// Event metadata.
        meta: EventMeta,
        /// Raw `from` argument as submitted.
        from: String,
        /// Raw `to` argument as submitted.
        to: String,
        /// Stable error label (see [`crate::Error::kind`]).
        reason: &'static str,
        /// Human-readable error message.
        message: String,
    },
    /// A graph was bulk loaded.
    GraphLoaded {
        /// Event metadata.
        meta: EventMeta,
        /// Node count after the load.
        nodes: usize,
        /// Edge count after the load.
        edges: usize,
    },
}

impl SearchEvent {
    /// Returns the event type as a string slice.
    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::Completed { .. } => "completed",
            Self::Rejected { .. } => "rejected",
            Self::GraphLoaded { .. } => "graph_loaded",
        }
    }

    /// Returns the event metadata.
    #[must_use]
    pub const fn meta(&self) -> &EventMeta {
        match self {
            Self::Completed { meta, .. }
            | Self::Rejected { meta, .. }
            | Self::GraphLoaded { meta, .. } => meta,
        }
    }

    /// Returns `true` if this event concerns a search touching `node`.
    ///
    /// Completed searches match on their endpoints and path; rejected ones
    /// on the raw arguments.
    #[must_use]
    pub fn involves(&self, node: &str) -> bool {
        match self {
            Self::Completed { record, .. } => {
                record.from == *node || record.to == *node || record.path.iter().any(|n| n == node)
            },
            Self::Rejected { from, to, .. } => from.trim() == node || to.trim() == node,
            Self::GraphLoaded { .. } => false,
        }
    }

    /// Builds a completion event for `record`.
    #[must_use]
    pub fn completed(record: Arc<SearchRecord>, correlation_id: Option<String>) -> Self {
        Self::Completed {
            meta: EventMeta::new("query_service", correlation_id),
            record,
        }
    }

    /// Returns the path of a completed search, if any.
    #[must_use]
    pub fn path(&self) -> Option<&[NodeId]> {
        match self {
            Self::Completed { record, .. } => Some(&record.path),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completed_event_involves_path_nodes() {
        let record = SearchRecord::new(
            NodeId::new("A"),
            NodeId::new("C"),
            vec![NodeId::new("A"), NodeId::new("B"), NodeId::new("C")],
            vec![NodeId::new("A"), NodeId::new("C"), NodeId::new("B")],
        );
        let event = SearchEvent::completed(Arc::new(record), Some("req-1".into()));

        assert_eq!(event.event_type(), "completed");
        assert_eq!(event.meta().correlation_id.as_deref(), Some("req-1"));
        assert!(event.involves("B"));
        assert!(!event.involves("D"));
        assert_eq!(event.path().map(<[NodeId]>::len), Some(3));
    }

    #[test]
    fn test_rejected_event_matches_trimmed_arguments() {
        let event = SearchEvent::Rejected {
            meta: EventMeta::with_timestamp("test", None, DateTime::<Utc>::UNIX_EPOCH),
            from: " Zed ".into(),
            to: "B".into(),
            reason: "unknown_node",
            message: "unknown node 'Zed' (from)".into(),
        };
        assert!(event.involves("Zed"));
        assert!(event.path().is_none());
        assert_eq!(event.meta().timestamp.timestamp(), 0);
    }

    #[test]
    fn test_meta_timestamp_matches_record_clock() {
        let record = SearchRecord::new(NodeId::new("A"), NodeId::new("A"), Vec::new(), Vec::new());
        let event = SearchEvent::completed(Arc::new(record), None);
        let SearchEvent::Completed { meta, record } = event else {
            unreachable!("completed() builds a Completed event");
        };
        assert!(meta.timestamp >= record.timestamp);
        assert!(meta.timestamp <= Utc::now());
    }
}
