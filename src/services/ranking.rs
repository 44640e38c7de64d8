//! Path-membership rankings.
//!
//! Counts, per person, how many committed searches had that person on the
//! resulting path. Endpoints count; explored-only nodes do not.

use crate::models::{NodeId, RankingEntry, SearchRecord};
use crate::{Error, Result};
use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock, RwLockWriteGuard};

/// Thread-safe path-membership counter.
#[derive(Debug, Default)]
pub struct RankingTracker {
    counts: RwLock<HashMap<NodeId, u64>>,
}

impl RankingTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a tracker from committed records.
    #[must_use]
    pub fn from_history<'a>(records: impl IntoIterator<Item = &'a SearchRecord>) -> Self {
        let mut counts = HashMap::new();
        for record in records {
            tally(&mut counts, &record.path);
        }
        Self {
            counts: RwLock::new(counts),
        }
    }

    /// Counts one search's path. An empty path changes nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned.
    pub fn record(&self, path: &[NodeId]) -> Result<()> {
        if path.is_empty() {
            return Ok(());
        }
        self.writer()?.record(path);
        Ok(())
    }

    /// Locks the counts for a commit that must not fail halfway.
    pub(crate) fn writer(&self) -> Result<RankingWriter<'_>> {
        self.counts
            .write()
            .map(|counts| RankingWriter { counts })
            .map_err(|_| Error::lock_poisoned("record_ranking"))
    }

    /// Returns up to `n` entries, highest count first, ties by id ascending.
    #[must_use]
    pub fn top(&self, n: usize) -> Vec<RankingEntry> {
        let counts = self.counts.read().unwrap_or_else(PoisonError::into_inner);
        let mut entries: Vec<RankingEntry> = counts
            .iter()
            .map(|(node, &count)| RankingEntry::new(node.clone(), count))
            .collect();
        drop(counts);

        entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.node.cmp(&b.node)));
        entries.truncate(n);
        entries
    }

    /// Returns the count for one person, zero if never on a path.
    #[must_use]
    pub fn count(&self, node: &str) -> u64 {
        self.counts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(node)
            .copied()
            .unwrap_or(0)
    }

    /// Returns the number of distinct people ever on a path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if nothing has been counted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Exclusive access to a [`RankingTracker`].
pub(crate) struct RankingWriter<'a> {
    counts: RwLockWriteGuard<'a, HashMap<NodeId, u64>>,
}

impl RankingWriter<'_> {
    /// Counts one search's path.
    pub(crate) fn record(&mut self, path: &[NodeId]) {
        tally(&mut self.counts, path);
    }
}

fn tally(counts: &mut HashMap<NodeId, u64>, path: &[NodeId]) {
    // A path never repeats a node, but count each person once regardless.
    let unique: HashSet<&NodeId> = path.iter().collect();
    for node in unique {
        *counts.entry(node.clone()).or_insert(0) += 1;
    }
}

#[cfg(test)]
impl RankingTracker {
    /// Poisons the counts lock, as a panic mid-update would.
    pub(crate) fn poison(&self) {
        let interrupted = std::thread::scope(|scope| {
            scope
                .spawn(|| -> u64 {
                    let _counts = self.counts.write();
                    panic!("ranking update interrupted");
                })
                .join()
        });
        assert!(interrupted.is_err());
    }
}
