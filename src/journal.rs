//! In-memory record of the requests the simulator has served.
//!
//! Unbounded by default; a limit keeps only the most recent entries.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

/// Handler name recorded for requests no handler claimed.
pub const UNCLAIMED: &str = "unclaimed";

/// One served request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalEntry {
    /// Arrival order, starting at 0.
    pub seq: usize,
    pub method: String,
    /// Path including the query string.
    pub uri: String,
    /// Name of the claiming handler, or [`UNCLAIMED`].
    pub handler: &'static str,
    pub status: u16,
}

#[derive(Debug, Default)]
struct Inner {
    entries: VecDeque<JournalEntry>,
    next_seq: usize,
}

/// Append-only request journal shared by all requests.
///
/// Without a limit it grows for the life of the process. With one, the
/// oldest entries are evicted; sequence numbers keep counting.
#[derive(Debug, Default)]
pub struct Journal {
    inner: Mutex<Inner>,
    limit: Option<usize>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Journal holding at most `limit` entries, when given.
    pub fn with_limit(limit: Option<usize>) -> Self {
        Self {
            inner: Mutex::default(),
            limit,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Appends an entry and assigns its sequence number.
    pub fn record(&self, method: &str, uri: &str, handler: &'static str, status: u16) {
        let mut inner = self.lock();
        let seq = inner.next_seq;
        inner.next_seq += 1;
        if let Some(limit) = self.limit {
            while inner.entries.len() >= limit.max(1) {
                inner.entries.pop_front();
            }
        }
        inner.entries.push_back(JournalEntry {
            seq,
            method: method.to_string(),
            uri: uri.to_string(),
            handler,
            status,
        });
    }

    /// Copy of the retained entries in arrival order.
    pub fn entries(&self) -> Vec<JournalEntry> {
        self.lock().entries.iter().cloned().collect()
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of requests recorded since start, evicted ones included.
    pub fn total(&self) -> usize {
        self.lock().next_seq
    }
}
