//! # sixdeg
//!
//! Degrees-of-separation search over a social connection graph.
//!
//! Given two named people, sixdeg finds a shortest connecting path with a
//! bidirectional breadth-first search, records every node examined along the
//! way, and keeps two derived aggregates for display: a bounded history of
//! recent searches and a ranking of how often each person appears on a
//! resulting path.
//!
//! ## Layers
//!
//! - [`storage`]: the graph store ([`GraphBackend`], [`InMemoryGraphBackend`])
//!   and graph file loading
//! - [`services`]: [`PathFinder`], [`RankingTracker`], [`SearchLog`] and the
//!   orchestrating [`QueryService`]
//! - [`observability`]: tracing, metrics and the [`EventBus`] listener interface
//! - [`config`]: file and environment configuration
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use sixdeg::{InMemoryGraphBackend, QueryService};
//!
//! let service = QueryService::new(Arc::new(InMemoryGraphBackend::new()));
//! service
//!     .load_graph(["A", "B", "C"], [("A", "B"), ("B", "C")])
//!     .unwrap();
//!
//! let record = service.query("A", "C").unwrap();
//! assert_eq!(record.hop_count(), Some(2));
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use std::fmt;
use thiserror::Error as ThisError;

pub mod cli;
pub mod config;
pub mod models;
pub mod observability;
pub mod services;
pub mod storage;

pub use config::SixDegConfig;
pub use models::{
    Edge, EventMeta, NodeId, RankingEntry, SearchEvent, SearchId, SearchRecord, SearchSummary,
};
pub use observability::EventBus;
pub use services::{PathFinder, PathOutcome, QueryService, RankingTracker, SearchLog};
pub use storage::{GraphBackend, GraphSnapshot, GraphStats, InMemoryGraphBackend};

/// Which argument or structure a node identifier came from.
///
/// Carried by [`Error::EmptyInput`] and [`Error::UnknownNode`] so callers can
/// render a message that points at the offending input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRole {
    /// The `from` argument of a query.
    From,
    /// The `to` argument of a query.
    To,
    /// An endpoint of an edge being loaded.
    Edge,
    /// A direct adjacency lookup.
    Lookup,
}

impl NodeRole {
    /// Returns the role as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::From => "from",
            Self::To => "to",
            Self::Edge => "edge",
            Self::Lookup => "lookup",
        }
    }
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for sixdeg operations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `EmptyInput` | A query argument is empty or whitespace |
/// | `UnknownNode` | A query or edge names a node that was never added |
/// | `InvalidEdge` | A self-loop is loaded |
/// | `InvalidInput` | Malformed graph files, node ids or config values |
/// | `OperationFailed` | I/O, parsing, lock poisoning, observability init |
///
/// A query between two valid but disconnected nodes is *not* an error; it
/// yields a [`SearchRecord`] with an empty path.
#[derive(Debug, ThisError)]
pub enum Error {
    /// A query argument was blank after trimming.
    #[error("empty '{role}' argument")]
    EmptyInput {
        /// Which argument was blank.
        role: NodeRole,
    },

    /// A node identifier does not exist in the graph.
    ///
    /// Raised when:
    /// - A query names a person that was never loaded
    /// - An edge references an endpoint that was not added first
    /// - [`GraphBackend::neighbors`] is called for an absent node
    #[error("unknown node '{id}' ({role})")]
    UnknownNode {
        /// The offending identifier.
        id: String,
        /// Where the identifier came from.
        role: NodeRole,
    },

    /// An edge connects a node to itself.
    #[error("invalid edge: self-loop on '{node}'")]
    InvalidEdge {
        /// The node on both ends of the edge.
        node: String,
    },

    /// Invalid input was provided.
    ///
    /// Raised when:
    /// - A graph file cannot be decoded or references undeclared people
    /// - A node id is blank or padded with whitespace
    /// - A configuration value is out of range
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An operation failed.
    ///
    /// Raised when:
    /// - Filesystem I/O errors occur
    /// - A lock is poisoned by a panicking thread
    /// - Observability components fail to initialize
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

impl Error {
    /// Builds the error returned when a lock was poisoned.
    pub(crate) fn lock_poisoned(operation: &str) -> Self {
        Self::OperationFailed {
            operation: operation.to_string(),
            cause: "Lock poisoned".to_string(),
        }
    }

    /// Returns a short, stable label for metrics and events.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::EmptyInput { .. } => "empty_input",
            Self::UnknownNode { .. } => "unknown_node",
            Self::InvalidEdge { .. } => "invalid_edge",
            Self::InvalidInput(_) => "invalid_input",
            Self::OperationFailed { .. } => "operation_failed",
        }
    }
}

/// Result type alias for sixdeg operations.
pub type Result<T> = std::result::Result<T, Error>;
