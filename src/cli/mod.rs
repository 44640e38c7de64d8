//! CLI support.
//!
//! The `sixdeg` binary parses arguments and prints; the pieces that shape
//! input and output live here so they can be tested.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `query` | Find the degrees of separation between two people |
//! | `batch` | Run many queries concurrently, then show history and rankings |
//! | `stats` | Show graph statistics |
//! | `config` | Show the effective configuration |
//!
//! # Example Usage
//!
//! ```bash
//! # Query the bundled demo network
//! sixdeg query Alice Ruby
//!
//! # Query a graph file, JSON output
//! sixdeg --graph people.json query Alice Bob --format json
//!
//! # Batch queries from stdin
//! printf 'Alice,Ruby\nBob,Kate\n' | sixdeg batch
//! ```

mod batch;
mod render;

pub use batch::{BatchQuery, parse_batch};
pub use render::{OutputFormat, render_history, render_rankings, render_record, render_stats};
