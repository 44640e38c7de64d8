//! Data models for sixdeg.
//!
//! This module contains the plain data that crosses the engine boundary:
//! node identifiers, edges, search records and ranking entries.

mod events;
pub mod graph;
mod search;

pub use events::{EventMeta, SearchEvent};
pub use graph::{Edge, NodeId};
pub use search::{RankingEntry, SearchId, SearchRecord, SearchSummary};
