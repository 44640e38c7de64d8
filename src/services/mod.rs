//! Business logic services.
//!
//! [`QueryService`] orchestrates the graph backend, the stateless
//! [`PathFinder`], and the two derived aggregates ([`SearchLog`] and
//! [`RankingTracker`]).

mod path_finder;
mod query;
mod ranking;
mod search_log;

pub use path_finder::{PathFinder, PathOutcome};
pub use query::QueryService;
pub use ranking::RankingTracker;
pub use search_log::{DEFAULT_HISTORY_CAPACITY, SearchLog};
