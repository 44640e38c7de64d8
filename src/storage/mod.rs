//! Storage layer.
//!
//! - [`traits`]: the [`GraphBackend`] contract
//! - [`graph`]: the in-memory backend and its immutable [`GraphSnapshot`]
//! - [`loader`]: graph files and the bundled demo network

pub mod graph;
pub mod loader;
pub mod traits;

pub use graph::{GraphSnapshot, InMemoryGraphBackend};
pub use loader::{GraphFile, GraphFormat, PersonRecord, demo_network};
pub use traits::{GraphBackend, GraphStats};
