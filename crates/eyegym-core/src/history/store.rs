//! History Store port and its key-value implementation.

use std::sync::Arc;

use tracing::warn;

use super::TrainingHistoryEntry;
use crate::error::StoreError;
use crate::storage::KvStore;

pub const HISTORY_KEY: &str = "training_history";
pub const DEFAULT_MAX_ENTRIES: usize = 100;

/// Ordered log of training attempts, newest first.
pub trait HistoryStore: Send + Sync {
    /// Read the whole log. Missing or corrupt data reads as empty.
    fn read(&self) -> Vec<TrainingHistoryEntry>;

    /// Prepend `entry`, keeping at most `cap` entries.
    fn append(&self, entry: TrainingHistoryEntry, cap: usize) -> Result<(), StoreError>;

    fn clear(&self) -> Result<(), StoreError>;
}

impl<H: HistoryStore + ?Sized> HistoryStore for Arc<H> {
    fn read(&self) -> Vec<TrainingHistoryEntry> {
        (**self).read()
    }

    fn append(&self, entry: TrainingHistoryEntry, cap: usize) -> Result<(), StoreError> {
        (**self).append(entry, cap)
    }

    fn clear(&self) -> Result<(), StoreError> {
        (**self).clear()
    }
}

/// [`HistoryStore`] persisting the log as one JSON array under
/// [`HISTORY_KEY`].
pub struct KvHistoryStore<S> {
    kv: S,
}

impl<S: KvStore> KvHistoryStore<S> {
    pub fn new(kv: S) -> Self {
        Self { kv }
    }

    pub fn kv(&self) -> &S {
        &self.kv
    }

    /// Read without absorbing errors.
    pub fn try_read(&self) -> Result<Vec<TrainingHistoryEntry>, StoreError> {
        let Some(raw) = self.kv.get(HISTORY_KEY)? else {
            return Ok(Vec::new());
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&raw).map_err(|e| StoreError::Corruption {
            key: HISTORY_KEY.into(),
            message: e.to_string(),
        })
    }
}

impl<S: KvStore> HistoryStore for KvHistoryStore<S> {
    fn read(&self) -> Vec<TrainingHistoryEntry> {
        match self.try_read() {
            Ok(log) => log,
            Err(e) => {
                warn!(error = %e, "treating training history as empty");
                Vec::new()
            }
        }
    }

    /// A corrupt log is replaced. Any other read failure aborts the append
    /// so the stored log is never overwritten with a partial one.
    fn append(&self, entry: TrainingHistoryEntry, cap: usize) -> Result<(), StoreError> {
        let existing = match self.try_read() {
            Ok(log) => log,
            Err(e @ StoreError::Corruption { .. }) => {
                warn!(error = %e, "replacing corrupt training history");
                Vec::new()
            }
            Err(e) => return Err(e),
        };
        let mut log = Vec::with_capacity(existing.len().min(cap) + 1);
        log.push(entry);
        log.extend(existing);
        log.truncate(cap);
        let json = serde_json::to_string(&log).map_err(|e| StoreError::Unavailable(e.to_string()))?;
        self.kv.set(HISTORY_KEY, &json)
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.kv.remove(HISTORY_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::TrainingStatus;
    use crate::storage::MemoryStore;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Memory store whose reads can be switched off.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore,
        fail_reads: AtomicBool,
    }

    impl KvStore for FlakyStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            if self.fail_reads.load(Ordering::SeqCst) {
                return Err(StoreError::Unavailable("disk gone".into()));
            }
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), StoreError> {
            self.inner.remove(key)
        }
    }

    fn entry(id: &str) -> TrainingHistoryEntry {
        TrainingHistoryEntry {
            id: id.into(),
            started_at: 1_000,
            ended_at: 2_000,
            duration_sec: 1,
            total_exercises: 2,
            completed_exercises: 2,
            status: TrainingStatus::Completed,
        }
    }

    #[test]
    fn empty_store_reads_empty() {
        let store = KvHistoryStore::new(MemoryStore::new());
        assert!(store.read().is_empty());
    }

    #[test]
    fn newest_entry_first() {
        let store = KvHistoryStore::new(MemoryStore::new());
        store.append(entry("first"), 10).unwrap();
        store.append(entry("second"), 10).unwrap();
        let log = store.read();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].id, "second");
        assert_eq!(log[1].id, "first");
    }

    #[test]
    fn append_trims_oldest_beyond_cap() {
        let store = KvHistoryStore::new(MemoryStore::new());
        for i in 0..5 {
            store.append(entry(&i.to_string()), 3).unwrap();
        }
        let ids: Vec<_> = store.read().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["4", "3", "2"]);
    }

    #[test]
    fn corrupt_blob_reads_empty_and_is_replaced_on_append() {
        let kv = MemoryStore::new();
        kv.set(HISTORY_KEY, "{not json").unwrap();
        let store = KvHistoryStore::new(kv);
        assert!(matches!(store.try_read(), Err(StoreError::Corruption { .. })));
        assert!(store.read().is_empty());

        store.append(entry("fresh"), 100).unwrap();
        assert_eq!(store.read().len(), 1);
    }

    #[test]
    fn failed_read_aborts_append_and_keeps_log() {
        let store = KvHistoryStore::new(FlakyStore::default());
        for i in 0..5 {
            store.append(entry(&i.to_string()), 100).unwrap();
        }

        store.kv().fail_reads.store(true, Ordering::SeqCst);
        assert!(matches!(
            store.append(entry("lost"), 100),
            Err(StoreError::Unavailable(_))
        ));

        store.kv().fail_reads.store(false, Ordering::SeqCst);
        let ids: Vec<_> = store.read().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["4", "3", "2", "1", "0"]);
    }

    #[test]
    fn non_array_blob_is_corrupt() {
        let kv = MemoryStore::new();
        kv.set(HISTORY_KEY, r#"{"id":"x"}"#).unwrap();
        let store = KvHistoryStore::new(kv);
        assert!(store.read().is_empty());
    }

    #[test]
    fn clear_removes_log() {
        let store = KvHistoryStore::new(MemoryStore::new());
        store.append(entry("a"), 10).unwrap();
        store.clear().unwrap();
        assert!(store.read().is_empty());
        assert!(store.clear().is_ok());
    }
}
