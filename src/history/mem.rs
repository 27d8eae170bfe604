//! In-memory history. All entries are lost on process exit.

use std::collections::VecDeque;
use std::sync::Mutex;

use super::{DEFAULT_HISTORY_LIMIT, HistoryEntry, HistoryStore};
use crate::error::HistoryResult;

#[derive(Debug)]
struct Inner {
    /// Most recent first.
    entries: VecDeque<HistoryEntry>,
    next_id: u64,
}

/// History kept in a mutex-guarded deque.
#[derive(Debug)]
pub struct MemoryHistoryStore {
    inner: Mutex<Inner>,
    limit: usize,
}

impl MemoryHistoryStore {
    pub fn new(limit: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: VecDeque::new(),
                next_id: 1,
            }),
            limit,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for MemoryHistoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn load(&self) -> HistoryResult<Vec<HistoryEntry>> {
        Ok(self.lock().entries.iter().cloned().collect())
    }

    fn save(&self, mut entry: HistoryEntry) -> HistoryResult<HistoryEntry> {
        let mut inner = self.lock();
        entry.id = inner.next_id;
        inner.next_id += 1;
        inner.entries.push_front(entry.clone());
        inner.entries.truncate(self.limit);
        Ok(entry)
    }

    fn clear(&self) -> HistoryResult<()> {
        self.lock().entries.clear();
        Ok(())
    }
}
