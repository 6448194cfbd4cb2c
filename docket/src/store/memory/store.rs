use crate::common::Value;
use crate::errors::{DocketError, DocketResult, ErrorKind};
use crate::store::{
    CommitResult, KvCheck, KvEntry, KvKey, KvMutation, KvStoreProvider, Versionstamp,
};
use crossbeam_skiplist::SkipMap;
use parking_lot::Mutex;
use std::collections::Bound::{Excluded, Unbounded};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// In-memory versioned key-value substrate backed by a concurrent skip list.
///
/// # Characteristics
/// - **Ordered**: entries are kept in [KvKey] order, so prefix scans are range scans
/// - **Versioned**: every committed key carries the [Versionstamp] of its commit
/// - **Atomic**: commits are serialized by an internal mutex; checks and mutations of
///   one commit are evaluated and applied under the same lock
/// - **Concurrent reads**: point reads and scans never take the commit lock
/// - **Instrumented**: counts entries handed out by `get` and `scan`, see
///   [InMemoryKv::entries_read]
///
/// Cloning is cheap; every clone shares the same data.
///
/// # Usage
/// ```text
/// let kv = InMemoryKv::new();
/// let db = Docket::builder().store(KvStore::new(kv.clone())).open()?;
/// ```
#[derive(Clone, Default)]
pub struct InMemoryKv {
    inner: Arc<InMemoryKvInner>,
}

impl InMemoryKv {
    pub fn new() -> Self {
        InMemoryKv::default()
    }

    /// Number of entries returned by `get` and `scan` since creation or the last
    /// [InMemoryKv::reset_stats].
    pub fn entries_read(&self) -> u64 {
        self.inner.entries_read.load(Ordering::Relaxed)
    }

    /// Number of successful commits.
    pub fn commit_count(&self) -> u64 {
        self.inner.commits.load(Ordering::Relaxed)
    }

    /// Number of commits rejected because a check failed.
    pub fn conflict_count(&self) -> u64 {
        self.inner.conflicts.load(Ordering::Relaxed)
    }

    pub fn reset_stats(&self) {
        self.inner.entries_read.store(0, Ordering::Relaxed);
        self.inner.commits.store(0, Ordering::Relaxed);
        self.inner.conflicts.store(0, Ordering::Relaxed);
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.inner.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }

    /// Copies every stored entry, in key order, without touching the statistics.
    pub fn snapshot(&self) -> Vec<KvEntry> {
        self.inner
            .entries
            .iter()
            .map(|entry| {
                let (value, versionstamp) = entry.value();
                KvEntry {
                    key: entry.key().clone(),
                    value: value.clone(),
                    versionstamp: *versionstamp,
                }
            })
            .collect()
    }
}

impl KvStoreProvider for InMemoryKv {
    fn get(&self, key: &KvKey) -> DocketResult<Option<KvEntry>> {
        self.inner.get(key)
    }

    fn scan(
        &self,
        prefix: &KvKey,
        start_after: Option<&KvKey>,
        limit: usize,
    ) -> DocketResult<Vec<KvEntry>> {
        self.inner.scan(prefix, start_after, limit)
    }

    fn commit(&self, checks: Vec<KvCheck>, mutations: Vec<KvMutation>) -> DocketResult<CommitResult> {
        self.inner.commit(checks, mutations)
    }

    fn close(&self) -> DocketResult<()> {
        self.inner.closed.store(true, Ordering::Relaxed);
        Ok(())
    }

    fn is_closed(&self) -> DocketResult<bool> {
        Ok(self.inner.closed.load(Ordering::Relaxed))
    }
}

#[derive(Default)]
struct InMemoryKvInner {
    entries: SkipMap<KvKey, (Value, Versionstamp)>,
    commit_lock: Mutex<()>,
    version: AtomicU64,
    closed: AtomicBool,
    entries_read: AtomicU64,
    commits: AtomicU64,
    conflicts: AtomicU64,
}

impl InMemoryKvInner {
    fn check_opened(&self) -> DocketResult<()> {
        if self.closed.load(Ordering::Relaxed) {
            log::error!("In-memory store is closed");
            return Err(DocketError::new(
                "In-memory store is closed",
                ErrorKind::BackendError,
            ));
        }
        Ok(())
    }

    fn get(&self, key: &KvKey) -> DocketResult<Option<KvEntry>> {
        self.check_opened()?;
        Ok(self.entries.get(key).map(|entry| {
            self.entries_read.fetch_add(1, Ordering::Relaxed);
            let (value, versionstamp) = entry.value();
            KvEntry {
                key: entry.key().clone(),
                value: value.clone(),
                versionstamp: *versionstamp,
            }
        }))
    }

    fn scan(
        &self,
        prefix: &KvKey,
        start_after: Option<&KvKey>,
        limit: usize,
    ) -> DocketResult<Vec<KvEntry>> {
        self.check_opened()?;

        // the prefix itself sorts before all of its extensions
        let start = start_after.unwrap_or(prefix).clone();
        let page: Vec<KvEntry> = self
            .entries
            .range((Excluded(start), Unbounded))
            .take_while(|entry| entry.key().has_prefix(prefix))
            .take(limit)
            .map(|entry| {
                let (value, versionstamp) = entry.value();
                KvEntry {
                    key: entry.key().clone(),
                    value: value.clone(),
                    versionstamp: *versionstamp,
                }
            })
            .collect();

        self.entries_read
            .fetch_add(page.len() as u64, Ordering::Relaxed);
        Ok(page)
    }

    fn commit(&self, checks: Vec<KvCheck>, mutations: Vec<KvMutation>) -> DocketResult<CommitResult> {
        self.check_opened()?;
        let _guard = self.commit_lock.lock();

        for check in &checks {
            let current = self.entries.get(&check.key).map(|entry| entry.value().1);
            if current != check.versionstamp {
                log::debug!(
                    "Check failed on {}: expected {:?}, found {:?}",
                    check.key,
                    check.versionstamp,
                    current
                );
                self.conflicts.fetch_add(1, Ordering::Relaxed);
                return Ok(CommitResult::Conflict);
            }
        }

        let versionstamp = Versionstamp::new(self.version.fetch_add(1, Ordering::SeqCst) + 1);
        for mutation in mutations {
            match mutation {
                KvMutation::Set(key, value) => {
                    self.entries.insert(key, (value, versionstamp));
                }
                KvMutation::Delete(key) => {
                    self.entries.remove(&key);
                }
            }
        }

        self.commits.fetch_add(1, Ordering::Relaxed);
        Ok(CommitResult::Committed(versionstamp))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv_key;
    use crate::store::KvStore;

    fn commit_set(store: &KvStore, key: KvKey, value: Value) -> CommitResult {
        let mut op = store.atomic();
        op.set(key, value);
        op.commit().unwrap()
    }

    #[test]
    fn get_returns_value_and_versionstamp() {
        let kv = InMemoryKv::new();
        let store = KvStore::new(kv.clone());
        let result = commit_set(&store, kv_key!["c", "_id", "a"], Value::from(1));
        let entry = store.get(&kv_key!["c", "_id", "a"]).unwrap().unwrap();
        assert_eq!(entry.value, Value::from(1));
        assert_eq!(result, CommitResult::Committed(entry.versionstamp));
        assert!(store.get(&kv_key!["c", "_id", "b"]).unwrap().is_none());
    }

    #[test]
    fn versionstamps_increase_per_commit() {
        let kv = InMemoryKv::new();
        let store = KvStore::new(kv);
        commit_set(&store, kv_key!["k"], Value::from(1));
        let first = store.get(&kv_key!["k"]).unwrap().unwrap().versionstamp;
        commit_set(&store, kv_key!["k"], Value::from(2));
        let second = store.get(&kv_key!["k"]).unwrap().unwrap().versionstamp;
        assert!(second > first);
    }

    #[test]
    fn absent_check_fails_when_key_exists() {
        let kv = InMemoryKv::new();
        let store = KvStore::new(kv.clone());
        commit_set(&store, kv_key!["k"], Value::from(1));

        let mut op = store.atomic();
        op.check(kv_key!["k"], None).set(kv_key!["k"], Value::from(2));
        assert_eq!(op.commit().unwrap(), CommitResult::Conflict);
        assert_eq!(store.get(&kv_key!["k"]).unwrap().unwrap().value, Value::from(1));
        assert_eq!(kv.conflict_count(), 1);
    }

    #[test]
    fn failed_check_applies_nothing() {
        let kv = InMemoryKv::new();
        let store = KvStore::new(kv.clone());
        commit_set(&store, kv_key!["a"], Value::from(1));
        let stale = store.get(&kv_key!["a"]).unwrap().unwrap().versionstamp;
        commit_set(&store, kv_key!["a"], Value::from(2));

        let mut op = store.atomic();
        op.check(kv_key!["a"], Some(stale))
            .set(kv_key!["b"], Value::from(1))
            .delete(kv_key!["a"]);
        assert_eq!(op.commit().unwrap(), CommitResult::Conflict);
        assert!(store.get(&kv_key!["b"]).unwrap().is_none());
        assert!(store.get(&kv_key!["a"]).unwrap().is_some());
    }

    #[test]
    fn scan_respects_prefix_start_and_limit() {
        let kv = InMemoryKv::new();
        let store = KvStore::new(kv.clone());
        let mut op = store.atomic();
        for id in ["a", "b", "c", "d"] {
            op.set(kv_key!["c", "_id", id], Value::from(id));
        }
        op.set(kv_key!["c", "email", "x", "a"], Value::Null);
        op.set(kv_key!["b", "_id", "z"], Value::Null);
        op.commit().unwrap();

        let prefix = kv_key!["c", "_id"];
        let page = kv.scan(&prefix, None, 10).unwrap();
        assert_eq!(page.len(), 4);

        let page = kv.scan(&prefix, Some(&kv_key!["c", "_id", "b"]), 1).unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].key, kv_key!["c", "_id", "c"]);
    }

    #[test]
    fn entries_read_counts_returned_entries() {
        let kv = InMemoryKv::new();
        let store = KvStore::new(kv.clone());
        commit_set(&store, kv_key!["c", "_id", "a"], Value::Null);
        commit_set(&store, kv_key!["c", "_id", "b"], Value::Null);
        kv.reset_stats();

        kv.scan(&kv_key!["c", "_id"], None, 1).unwrap();
        assert_eq!(kv.entries_read(), 1);
        store.get(&kv_key!["c", "_id", "a"]).unwrap();
        store.get(&kv_key!["c", "_id", "missing"]).unwrap();
        assert_eq!(kv.entries_read(), 2);
    }

    #[test]
    fn closed_store_rejects_operations() {
        let kv = InMemoryKv::new();
        let store = KvStore::new(kv.clone());
        store.close().unwrap();
        assert!(store.is_closed().unwrap());
        let err = store.get(&kv_key!["k"]).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::BackendError);
        assert!(store.atomic().commit().is_err());
    }

    #[test]
    fn snapshot_and_len() {
        let kv = InMemoryKv::new();
        let store = KvStore::new(kv.clone());
        assert!(kv.is_empty());
        commit_set(&store, kv_key!["a"], Value::from(1));
        commit_set(&store, kv_key!["b"], Value::from(2));
        assert_eq!(kv.len(), 2);
        let keys: Vec<KvKey> = kv.snapshot().into_iter().map(|e| e.key).collect();
        assert_eq!(keys, vec![kv_key!["a"], kv_key!["b"]]);
        assert_eq!(kv.entries_read(), 0);
    }
}
