//! Batch query input.
//!
//! One `from,to` CSV record per line. Fields may be quoted, so names that
//! contain commas work: `"Smith, John",Alice`. Blank lines and lines
//! starting with `#` are skipped, and whitespace around each field is
//! trimmed.

use crate::{Error, Result};

/// One query read from batch input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchQuery {
    /// 1-based source line number.
    pub line: usize,
    /// `from` argument.
    pub from: String,
    /// `to` argument.
    pub to: String,
}

/// Parses batch input into queries.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] naming the first line that is not exactly
/// two CSV fields.
pub fn parse_batch(input: &str) -> Result<Vec<BatchQuery>> {
    let mut builder = csv::ReaderBuilder::new();
    builder.has_headers(false).trim(csv::Trim::All);

    input
        .lines()
        .enumerate()
        .filter(|(_, raw)| {
            let trimmed = raw.trim_start();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        })
        .map(|(index, raw)| parse_line(&builder, index + 1, raw))
        .collect()
}

// Records are read line by line so error messages and batch correlation ids
// carry the real source line.
fn parse_line(builder: &csv::ReaderBuilder, line: usize, raw: &str) -> Result<BatchQuery> {
    let malformed = || {
        Error::InvalidInput(format!(
            "batch line {line}: expected 'from,to', got '{}'",
            raw.trim()
        ))
    };

    let mut record = csv::StringRecord::new();
    let read = builder
        .from_reader(raw.as_bytes())
        .read_record(&mut record)
        .map_err(|e| Error::InvalidInput(format!("batch line {line}: {e}")))?;
    if !read {
        return Err(malformed());
    }

    match (record.get(0), record.get(1), record.len()) {
        (Some(from), Some(to), 2) => Ok(BatchQuery {
            line,
            from: from.to_string(),
            to: to.to_string(),
        }),
        _ => Err(malformed()),
    }
}
