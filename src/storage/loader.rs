//! Graph file loading.
//!
//! A graph file lists people and their connections in one of two shapes,
//! which may be mixed in the same file:
//!
//! - **edge list**: `nodes` plus `edges` as `[a, b]` pairs
//! - **adjacency records**: `people`, each with a `name` and `neighbors`
//!
//! ```json
//! {
//!   "nodes": ["Alice", "Bob"],
//!   "edges": [["Alice", "Bob"]],
//!   "people": [{ "name": "Carol", "neighbors": ["Alice"] }]
//! }
//! ```
//!
//! Files are decoded as JSON or TOML by extension. Decoding only checks
//! shape; the graph store enforces node existence and rejects self-loops
//! when the parts are loaded, aborting the whole load on the first problem.

use crate::models::{Edge, NodeId};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Supported graph file encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphFormat {
    /// JSON document.
    Json,
    /// TOML document.
    Toml,
}

impl GraphFormat {
    /// Detects the format from a file extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "json" => Some(Self::Json),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }
}

/// One adjacency record: a person and the people they are connected to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRecord {
    /// The person's name.
    pub name: String,
    /// Names of connected people; each must be declared in the file.
    #[serde(default)]
    pub neighbors: Vec<String>,
}

/// Decoded contents of a graph file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GraphFile {
    /// Declared people.
    #[serde(default)]
    pub nodes: Vec<String>,
    /// Connections as unordered pairs.
    #[serde(default)]
    pub edges: Vec<(String, String)>,
    /// Adjacency records; names are declared implicitly.
    #[serde(default)]
    pub people: Vec<PersonRecord>,
}

impl GraphFile {
    /// Reads and decodes a graph file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationFailed`] if the file cannot be read and
    /// [`Error::InvalidInput`] if the extension is unsupported or the
    /// contents are malformed.
    pub fn from_path(path: &Path) -> Result<Self> {
        let format = GraphFormat::from_path(path).ok_or_else(|| {
            Error::InvalidInput(format!(
                "unsupported graph file '{}': expected .json or .toml",
                path.display()
            ))
        })?;

        let contents = std::fs::read_to_string(path).map_err(|e| Error::OperationFailed {
            operation: "read_graph_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;

        Self::parse(&contents, format)
            .map_err(|e| Error::InvalidInput(format!("{}: {e}", path.display())))
    }

    /// Decodes graph file contents.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the contents are malformed.
    pub fn parse(contents: &str, format: GraphFormat) -> Result<Self> {
        match format {
            GraphFormat::Json => serde_json::from_str(contents)
                .map_err(|e| Error::InvalidInput(format!("malformed graph JSON: {e}"))),
            GraphFormat::Toml => toml::from_str(contents)
                .map_err(|e| Error::InvalidInput(format!("malformed graph TOML: {e}"))),
        }
    }

    /// Flattens the file into nodes and edges, preserving file order.
    ///
    /// Explicit nodes come before adjacency record names and explicit edges
    /// before adjacency edges, so neighbour order follows the file.
    #[must_use]
    pub fn into_parts(self) -> (Vec<NodeId>, Vec<Edge>) {
        let mut nodes: Vec<NodeId> = self.nodes.into_iter().map(NodeId::from).collect();
        nodes.extend(self.people.iter().map(|p| NodeId::new(&p.name)));

        let mut edges: Vec<Edge> = self
            .edges
            .into_iter()
            .map(|(a, b)| Edge::new(a, b))
            .collect();
        for person in self.people {
            let name = NodeId::from(person.name);
            edges.extend(
                person
                    .neighbors
                    .into_iter()
                    .map(|neighbor| Edge::new(name.clone(), neighbor)),
            );
        }

        (nodes, edges)
    }
}

const DEMO_PEOPLE: [&str; 18] = [
    "Alice", "Bob", "Charlie", "David", "Emma", "Frank", "Grace", "Henry", "Ivy", "Jack", "Kate",
    "Liam", "Mia", "Noah", "Olivia", "Paul", "Quinn", "Ruby",
];

const DEMO_CONNECTIONS: [(&str, &str); 24] = [
    ("Alice", "Bob"),
    ("Alice", "Charlie"),
    ("Bob", "David"),
    ("Charlie", "Emma"),
    ("David", "Frank"),
    ("Emma", "Grace"),
    ("Frank", "Henry"),
    ("Grace", "Ivy"),
    ("Henry", "Jack"),
    ("Ivy", "Kate"),
    ("Jack", "Liam"),
    ("Kate", "Mia"),
    ("Liam", "Noah"),
    ("Mia", "Olivia"),
    ("Noah", "Paul"),
    ("Olivia", "Quinn"),
    ("Paul", "Ruby"),
    ("Bob", "Emma"),
    ("Charlie", "Frank"),
    ("David", "Grace"),
    ("Emma", "Henry"),
    ("Frank", "Ivy"),
    ("Grace", "Jack"),
    ("Henry", "Kate"),
];

/// Returns the bundled 18-person demo network.
#[must_use]
pub fn demo_network() -> GraphFile {
    GraphFile {
        nodes: DEMO_PEOPLE.iter().map(ToString::to_string).collect(),
        edges: DEMO_CONNECTIONS
            .iter()
            .map(|(a, b)| ((*a).to_string(), (*b).to_string()))
            .collect(),
        people: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use test_case::test_case;

    #[test_case("graph.json" => Some(GraphFormat::Json); "json")]
    #[test_case("graph.TOML" => Some(GraphFormat::Toml); "toml uppercase")]
    #[test_case("graph.csv" => None; "unsupported")]
    #[test_case("graph" => None; "no extension")]
    fn test_format_detection(name: &str) -> Option<GraphFormat> {
        GraphFormat::from_path(Path::new(name))
    }

    #[test]
    fn test_parse_edge_list_json() {
        let file = GraphFile::parse(
            r#"{"nodes": ["A", "B"], "edges": [["A", "B"]]}"#,
            GraphFormat::Json,
        )
        .unwrap();
        let (nodes, edges) = file.into_parts();
        assert_eq!(nodes.len(), 2);
        assert_eq!(edges, vec![Edge::new("A", "B")]);
    }

    #[test]
    fn test_parse_adjacency_toml() {
        let file = GraphFile::parse(
            r#"
            nodes = ["Alice"]

            [[people]]
            name = "Bob"
            neighbors = ["Alice"]
            "#,
            GraphFormat::Toml,
        )
        .unwrap();
        let (nodes, edges) = file.into_parts();
        assert_eq!(nodes, vec![NodeId::new("Alice"), NodeId::new("Bob")]);
        assert_eq!(edges, vec![Edge::new("Bob", "Alice")]);
    }

    #[test]
    fn test_unknown_fields_are_malformed() {
        let err = GraphFile::parse(r#"{"vertices": []}"#, GraphFormat::Json).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_from_path_reads_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"nodes": ["A"]}}"#).unwrap();

        let graph = GraphFile::from_path(file.path()).unwrap();
        assert_eq!(graph.nodes, vec!["A".to_string()]);
    }

    #[test]
    fn test_from_path_missing_file() {
        let err = GraphFile::from_path(Path::new("/nonexistent/graph.json")).unwrap_err();
        assert!(matches!(err, Error::OperationFailed { .. }));
    }

    #[test]
    fn test_demo_network_shape() {
        let (nodes, edges) = demo_network().into_parts();
        assert_eq!(nodes.len(), 18);
        assert_eq!(edges.len(), 24);
    }
}
