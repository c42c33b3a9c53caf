//! Fixed-capacity FIFO of past turns

use std::collections::VecDeque;

use serde::Serialize;

/// One completed turn: the submitted artifact and the directive it received
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    /// Opaque artifact reference (typically a data URI)
    pub artifact: String,
    /// Suggestion returned for this artifact; empty when it was ready
    pub directive: String,
}

impl HistoryEntry {
    /// Create a new history entry
    #[must_use]
    pub fn new(artifact: impl Into<String>, directive: impl Into<String>) -> Self {
        Self {
            artifact: artifact.into(),
            directive: directive.into(),
        }
    }
}

/// Insertion-ordered history that drops its oldest entry when full
///
/// Order is temporal, not recency of access: reading never reorders.
#[derive(Debug, Clone)]
pub struct BoundedHistory {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl BoundedHistory {
    /// Create an empty history holding at most `capacity` entries
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an entry, then trim from the front until within capacity.
    ///
    /// Returns the evicted entry, if any.
    pub fn push(&mut self, entry: HistoryEntry) -> Option<HistoryEntry> {
        self.entries.push_back(entry);
        let mut evicted = None;
        while self.entries.len() > self.capacity {
            evicted = self.entries.pop_front();
        }
        evicted
    }

    /// Number of stored entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entries are stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries retained
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterate oldest first
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// Copy the entries out, oldest first
    #[must_use]
    pub fn to_vec(&self) -> Vec<HistoryEntry> {
        self.entries.iter().cloned().collect()
    }
}
