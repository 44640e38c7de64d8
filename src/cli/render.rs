//! Text and JSON rendering for command output.

use crate::models::{NodeId, RankingEntry, SearchRecord};
use crate::storage::GraphStats;
use crate::{Error, Result};
use serde::Serialize;
use std::fmt::Write as _;
use std::sync::Arc;

/// Output format for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// One JSON document per result.
    Json,
}

/// Renders one search result.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render_record(record: &SearchRecord, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(record_text(record)),
        OutputFormat::Json => to_json(record),
    }
}

fn record_text(record: &SearchRecord) -> String {
    match record.hop_count() {
        Some(hops) => {
            let path: Vec<&str> = record.path.iter().map(NodeId::as_str).collect();
            format!(
                "{} -> {}: {hops} {} of separation\n  path:     {}\n  explored: {} nodes",
                record.from,
                record.to,
                if hops == 1 { "degree" } else { "degrees" },
                path.join(" -> "),
                record.explored_count(),
            )
        },
        None => format!(
            "{} -> {}: not connected\n  explored: {} nodes",
            record.from,
            record.to,
            record.explored_count(),
        ),
    }
}

/// Renders recent searches as a table, newest first.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render_history(records: &[Arc<SearchRecord>], format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        let summaries: Vec<_> = records.iter().map(|r| r.summary()).collect();
        return to_json(&summaries);
    }

    if records.is_empty() {
        return Ok("No searches yet.".to_string());
    }

    let mut out = String::from("Recent searches\n===============\n");
    for record in records {
        let hops = record
            .hop_count()
            .map_or_else(|| "-".to_string(), |h| h.to_string());
        let _ = writeln!(
            out,
            "  {:<12} {:<12} hops {:>3}  explored {:>4}  {}",
            record.from.as_str(),
            record.to.as_str(),
            hops,
            record.explored_count(),
            record.timestamp.format("%H:%M:%S"),
        );
    }
    Ok(out.trim_end().to_string())
}

/// Renders the most frequent path members.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render_rankings(entries: &[RankingEntry], format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return to_json(entries);
    }

    if entries.is_empty() {
        return Ok("No rankings yet.".to_string());
    }

    let mut out = String::from("Most connected\n==============\n");
    for (rank, entry) in entries.iter().enumerate() {
        let _ = writeln!(out, "  {:>2}. {:<12} {}", rank + 1, entry.node.as_str(), entry.count);
    }
    Ok(out.trim_end().to_string())
}

/// Renders graph statistics.
#[must_use]
pub fn render_stats(stats: &GraphStats) -> String {
    format!(
        "Graph\n=====\n  People:      {}\n  Connections: {}\n  Isolated:    {}\n  Max degree:  {}",
        stats.node_count, stats.edge_count, stats.isolated_nodes, stats.max_degree
    )
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| Error::OperationFailed {
        operation: "render_json".to_string(),
        cause: e.to_string(),
    })
}
