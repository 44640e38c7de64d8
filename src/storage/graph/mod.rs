//! Graph storage backends.
//!
//! # Available Backends
//!
//! | Backend | Use Case | Features |
//! |---------|----------|----------|
//! | [`InMemoryGraphBackend`] | Default | Copy-on-write snapshots, atomic bulk load |
//!
//! # Example
//!
//! ```rust
//! use sixdeg::storage::graph::InMemoryGraphBackend;
//! use sixdeg::storage::traits::GraphBackend;
//!
//! let backend = InMemoryGraphBackend::new();
//! backend.add_node("Alice").unwrap();
//! assert!(backend.has_node("Alice"));
//! assert!(!backend.has_node("alice"));
//! ```

mod memory;
mod snapshot;

pub use memory::InMemoryGraphBackend;
pub use snapshot::GraphSnapshot;

// Re-export trait for convenience
pub use crate::storage::traits::graph::{GraphBackend, GraphStats};
