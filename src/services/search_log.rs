//! Bounded, newest-first search history.

use crate::models::SearchRecord;
use crate::{Error, Result};
use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};

/// Default number of records retained.
pub const DEFAULT_HISTORY_CAPACITY: NonZeroUsize = match NonZeroUsize::new(50) {
    Some(capacity) => capacity,
    None => NonZeroUsize::MIN,
};

/// Fixed-capacity log of committed searches.
///
/// Appending beyond capacity evicts the oldest record.
#[derive(Debug)]
pub struct SearchLog {
    records: RwLock<VecDeque<Arc<SearchRecord>>>,
    capacity: NonZeroUsize,
}

impl Default for SearchLog {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl SearchLog {
    /// Creates an empty log holding at most `capacity` records.
    #[must_use]
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            records: RwLock::new(VecDeque::with_capacity(capacity.get())),
            capacity,
        }
    }

    /// Adds a record as the newest entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned.
    pub fn append(&self, record: Arc<SearchRecord>) -> Result<()> {
        self.writer()?.push(record);
        Ok(())
    }

    /// Locks the log for a commit that must not fail halfway.
    pub(crate) fn writer(&self) -> Result<HistoryWriter<'_>> {
        let records = self
            .records
            .write()
            .map_err(|_| Error::lock_poisoned("append_history"))?;
        Ok(HistoryWriter {
            records,
            capacity: self.capacity,
        })
    }

    /// Returns up to `n` records, newest first.
    #[must_use]
    pub fn recent(&self, n: usize) -> Vec<Arc<SearchRecord>> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .take(n)
            .cloned()
            .collect()
    }

    /// Returns the number of retained records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if no record has been appended.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the maximum number of retained records.
    #[must_use]
    pub const fn capacity(&self) -> NonZeroUsize {
        self.capacity
    }
}

/// Exclusive access to a [`SearchLog`].
pub(crate) struct HistoryWriter<'a> {
    records: RwLockWriteGuard<'a, VecDeque<Arc<SearchRecord>>>,
    capacity: NonZeroUsize,
}

impl HistoryWriter<'_> {
    /// Adds `record` as the newest entry, evicting the oldest past capacity.
    pub(crate) fn push(&mut self, record: Arc<SearchRecord>) {
        self.records.push_front(record);
        self.records.truncate(self.capacity.get());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NodeId;

    fn record(to: &str) -> Arc<SearchRecord> {
        Arc::new(SearchRecord::new(
            NodeId::new("A"),
            NodeId::new(to),
            Vec::new(),
            Vec::new(),
        ))
    }

    fn capacity(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn test_recent_is_newest_first() {
        let log = SearchLog::new(capacity(5));
        for to in ["B", "C", "D"] {
            log.append(record(to)).unwrap();
        }
        let recent = log.recent(2);
        let targets: Vec<&str> = recent.iter().map(|r| r.to.as_str()).collect();
        assert_eq!(targets, vec!["D", "C"]);
    }

    #[test]
    fn test_oldest_record_evicted_at_capacity() {
        let log = SearchLog::new(capacity(2));
        for to in ["B", "C", "D"] {
            log.append(record(to)).unwrap();
        }
        assert_eq!(log.len(), 2);
        let targets: Vec<String> = log.recent(10).iter().map(|r| r.to.to_string()).collect();
        assert_eq!(targets, vec!["D".to_string(), "C".to_string()]);
    }

    #[test]
    fn test_capacity_of_one() {
        let log = SearchLog::new(NonZeroUsize::MIN);
        log.append(record("B")).unwrap();
        log.append(record("C")).unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log.recent(5)[0].to, "C");
    }

    #[test]
    fn test_default_capacity() {
        let log = SearchLog::default();
        assert!(log.is_empty());
        assert_eq!(log.capacity().get(), 50);
    }
}
