// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Transaction engine: serialized validate-and-commit per store.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::storage::{Store, StoreLockTable};

use super::error::TxnError;
use super::guard::{LenientDelete, VersionGuard};
use super::transaction::Transaction;

/// Result of a standalone delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The key was removed in a transaction that produced `global_version`.
    Deleted { global_version: i64 },
    /// The key did not exist; nothing changed.
    Absent,
    /// The key exists at `actual`, not at the requested version; nothing changed.
    VersionMismatch { actual: i64 },
}

/// Applies transactions to a [`Store`].
///
/// Each mutation of a store runs validate, apply and global-version advance
/// under one acquisition of that store's write lock. Reads go straight to the
/// store and never take the lock.
pub struct TransactionEngine<S: Store> {
    store: Arc<S>,
    guard: VersionGuard,
    locks: StoreLockTable,
}

impl<S: Store> TransactionEngine<S> {
    /// Creates a new transaction engine.
    pub fn new(store: Arc<S>, guard: VersionGuard) -> Self {
        Self {
            store,
            guard,
            locks: StoreLockTable::new(),
        }
    }

    /// Returns the underlying store.
    #[inline]
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Returns the version guard.
    #[inline]
    pub fn guard(&self) -> &VersionGuard {
        &self.guard
    }

    /// Applies `txn` atomically and returns the new global version.
    ///
    /// Either every item is applied and the global version advances by one, or
    /// nothing changes and an error is returned.
    #[instrument(level = "debug", skip(self, txn), fields(items = txn.item_count()))]
    pub fn put(&self, store_id: &str, txn: &Transaction) -> Result<i64, TxnError> {
        self.guard.check_request(store_id, txn)?;

        let _lock = self.locks.lock(store_id);
        let plan = self
            .guard
            .resolve(self.store.as_ref(), store_id, txn)
            .map_err(|e| {
                if e.is_conflict() {
                    debug!(error = %e, "Transaction rejected");
                }
                e
            })?;

        let global_version = self.store.commit(store_id, plan)?;
        debug!(global_version, "Transaction committed");
        Ok(global_version)
    }

    /// Removes a key if it exists at `version` (or at any version if `version` is -1).
    ///
    /// Idempotent: a missing key or a version mismatch is a successful no-op
    /// that leaves the store unchanged. Versions below -1 never match.
    #[instrument(level = "debug", skip(self))]
    pub fn delete(
        &self,
        store_id: &str,
        key: &str,
        version: i64,
    ) -> Result<DeleteOutcome, TxnError> {
        self.guard.check_store_id(store_id)?;
        self.guard.check_key(key)?;

        let _lock = self.locks.lock(store_id);
        match self
            .guard
            .resolve_lenient_delete(self.store.as_ref(), store_id, key, version)?
        {
            LenientDelete::Remove(plan) => {
                let global_version = self.store.commit(store_id, plan)?;
                debug!(global_version, "Key deleted");
                Ok(DeleteOutcome::Deleted { global_version })
            }
            LenientDelete::Absent => {
                debug!("Delete of absent key is a no-op");
                Ok(DeleteOutcome::Absent)
            }
            LenientDelete::VersionMismatch { actual } => {
                debug!(actual, "Delete with mismatched version is a no-op");
                Ok(DeleteOutcome::VersionMismatch { actual })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, RocksStore, Value};
    use crate::txn::{DeleteItem, WriteItem};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;
    use tempfile::TempDir;

    fn create_test_engine() -> TransactionEngine<MemoryStore> {
        TransactionEngine::new(Arc::new(MemoryStore::new()), VersionGuard::default())
    }

    fn version_of<S: Store>(engine: &TransactionEngine<S>, key: &str) -> Option<i64> {
        engine
            .store()
            .get("s", key)
            .unwrap()
            .map(|versioned| versioned.version)
    }

    /// Full observable state of store "s".
    pub(super) fn state_of<S: Store>(engine: &TransactionEngine<S>) -> (i64, Vec<(String, i64, Value)>) {
        let snapshot = engine.store().snapshot("s").unwrap();
        let items = snapshot
            .keys
            .iter()
            .map(|key| {
                let versioned = engine.store().get("s", key).unwrap().unwrap();
                (key.clone(), versioned.version, versioned.value)
            })
            .collect();
        (snapshot.global_version, items)
    }

    #[test]
    fn test_global_version_scenario() {
        let engine = create_test_engine();

        let first = Transaction::new()
            .with_expected_global_version(0)
            .write(WriteItem::new("k1", 0, "A"));
        assert_eq!(engine.put("s", &first).unwrap(), 1);
        assert_eq!(version_of(&engine, "k1"), Some(0));

        let stale = Transaction::new()
            .with_expected_global_version(0)
            .write(WriteItem::new("k1", 0, "B"));
        assert!(engine.put("s", &stale).unwrap_err().is_conflict());

        let fresh = Transaction::new()
            .with_expected_global_version(1)
            .write(WriteItem::new("k1", 0, "B"));
        assert_eq!(engine.put("s", &fresh).unwrap(), 2);

        let read = engine.store().get("s", "k1").unwrap().unwrap();
        assert_eq!(read.version, 1);
        assert_eq!(read.value, Value::from("B"));
    }

    #[test]
    fn test_unconditional_write_scenario() {
        let engine = create_test_engine();

        let txn = Transaction::new().write(WriteItem::unconditional("k2", "X"));
        engine.put("s", &txn).unwrap();
        assert_eq!(version_of(&engine, "k2"), Some(1));

        let stale = Transaction::new().write(WriteItem::new("k2", 0, "Y"));
        assert!(engine.put("s", &stale).unwrap_err().is_conflict());

        let good = Transaction::new().write(WriteItem::new("k2", 1, "Y"));
        engine.put("s", &good).unwrap();
        assert_eq!(version_of(&engine, "k2"), Some(2));
    }

    #[test]
    fn test_unconditional_write_resets_version() {
        let engine = create_test_engine();
        for expected in 0..4 {
            let txn = Transaction::new().write(WriteItem::new("k", expected, "v"));
            engine.put("s", &txn).unwrap();
        }
        // create at 0, then 1, 2, 3
        assert_eq!(version_of(&engine, "k"), Some(3));

        let txn = Transaction::new().write(WriteItem::unconditional("k", "v"));
        engine.put("s", &txn).unwrap();
        assert_eq!(version_of(&engine, "k"), Some(1));
    }

    #[test]
    fn test_global_version_advances_once_per_transaction() {
        let engine = create_test_engine();

        let txn = Transaction::new()
            .write(WriteItem::new("a", 0, "1"))
            .write(WriteItem::new("b", 0, "2"))
            .write(WriteItem::new("c", 0, "3"));
        assert_eq!(engine.put("s", &txn).unwrap(), 1);

        assert_eq!(engine.put("s", &Transaction::new()).unwrap(), 2);
    }

    #[test]
    fn test_failed_item_leaves_store_unchanged() {
        let engine = create_test_engine();
        let seed = Transaction::new()
            .write(WriteItem::new("a", 0, "1"))
            .write(WriteItem::new("b", 0, "2"));
        engine.put("s", &seed).unwrap();
        let before = state_of(&engine);

        let txn = Transaction::new()
            .write(WriteItem::new("a", 0, "changed"))
            .delete(DeleteItem::unconditional("b"))
            .write(WriteItem::new("c", 0, "new"))
            .delete(DeleteItem::new("missing", 0));
        assert!(engine.put("s", &txn).unwrap_err().is_conflict());

        assert_eq!(state_of(&engine), before);
    }

    #[test]
    fn test_duplicate_keys_leave_store_unchanged() {
        let engine = create_test_engine();
        engine
            .put("s", &Transaction::new().write(WriteItem::new("a", 0, "1")))
            .unwrap();
        let before = state_of(&engine);

        let txn = Transaction::new()
            .write(WriteItem::new("a", 0, "2"))
            .delete(DeleteItem::new("a", 0));
        assert!(engine.put("s", &txn).unwrap_err().is_invalid_request());

        assert_eq!(state_of(&engine), before);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let engine = create_test_engine();
        engine
            .put("s", &Transaction::new().write(WriteItem::new("k", 0, "v")))
            .unwrap();

        assert_eq!(
            engine.delete("s", "k", 0).unwrap(),
            DeleteOutcome::Deleted { global_version: 2 }
        );
        let after_first = state_of(&engine);

        assert_eq!(engine.delete("s", "k", 0).unwrap(), DeleteOutcome::Absent);
        assert_eq!(engine.delete("s", "k", 7).unwrap(), DeleteOutcome::Absent);
        assert_eq!(state_of(&engine), after_first);
    }

    #[test]
    fn test_delete_with_wrong_version_is_noop() {
        let engine = create_test_engine();
        engine
            .put("s", &Transaction::new().write(WriteItem::unconditional("k", "v")))
            .unwrap();
        let before = state_of(&engine);

        assert_eq!(
            engine.delete("s", "k", 5).unwrap(),
            DeleteOutcome::VersionMismatch { actual: 1 }
        );
        assert_eq!(state_of(&engine), before);

        assert!(matches!(
            engine.delete("s", "k", -1).unwrap(),
            DeleteOutcome::Deleted { .. }
        ));
        assert_eq!(version_of(&engine, "k"), None);
    }

    #[test]
    fn test_delete_with_malformed_version_is_noop() {
        let engine = create_test_engine();
        engine
            .put("s", &Transaction::new().write(WriteItem::new("k", 0, "v")))
            .unwrap();
        let before = state_of(&engine);

        assert_eq!(
            engine.delete("s", "k", -5).unwrap(),
            DeleteOutcome::VersionMismatch { actual: 0 }
        );
        assert_eq!(engine.delete("s", "gone", -5).unwrap(), DeleteOutcome::Absent);
        assert_eq!(state_of(&engine), before);
    }

    #[test]
    fn test_deleted_key_restarts_versioning() {
        let engine = create_test_engine();
        engine
            .put("s", &Transaction::new().write(WriteItem::new("k", 0, "v")))
            .unwrap();
        engine
            .put("s", &Transaction::new().write(WriteItem::new("k", 0, "v")))
            .unwrap();
        engine
            .put("s", &Transaction::new().delete(DeleteItem::new("k", 1)))
            .unwrap();

        engine
            .put("s", &Transaction::new().write(WriteItem::new("k", 0, "again")))
            .unwrap();
        assert_eq!(version_of(&engine, "k"), Some(0));
    }

    #[test]
    fn test_concurrent_conflicting_writers_single_winner() {
        let engine = Arc::new(create_test_engine());
        engine
            .put("s", &Transaction::new().write(WriteItem::new("k", 0, "seed")))
            .unwrap();

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let engine = Arc::clone(&engine);
                thread::spawn(move || {
                    let txn = Transaction::new().write(WriteItem::new(
                        "k",
                        0,
                        format!("writer-{i}").as_str(),
                    ));
                    engine.put("s", &txn)
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let winners = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(winners, 1);
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(TxnError::is_conflict));

        assert_eq!(version_of(&engine, "k"), Some(1));
        assert_eq!(engine.store().global_version("s").unwrap(), 2);
    }

    #[test]
    fn test_concurrent_writers_to_distinct_stores() {
        let engine = Arc::new(create_test_engine());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let engine = Arc::clone(&engine);
                thread::spawn(move || {
                    let store_id = format!("store-{i}");
                    for n in 0..50 {
                        let txn = Transaction::new()
                            .with_expected_global_version(n)
                            .write(WriteItem::unconditional("k", "v"));
                        engine.put(&store_id, &txn).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        for i in 0..8 {
            let store_id = format!("store-{i}");
            assert_eq!(engine.store().global_version(&store_id).unwrap(), 50);
        }
    }

    /// Rewrites `a` and `b` together while a reader checks that `b` is never
    /// older than an `a` it has already seen.
    fn assert_no_partial_commits<S: Store + 'static>(engine: TransactionEngine<S>) {
        let engine = Arc::new(engine);
        let seed = Transaction::new()
            .write(WriteItem::new("a", 0, "0"))
            .write(WriteItem::new("b", 0, "0"));
        engine.put("s", &seed).unwrap();

        let done = Arc::new(AtomicBool::new(false));
        let reader = {
            let engine = Arc::clone(&engine);
            let done = Arc::clone(&done);
            thread::spawn(move || loop {
                let finished = done.load(Ordering::Acquire);
                let a = version_of(&engine, "a").unwrap();
                let b = version_of(&engine, "b").unwrap();
                assert!(b >= a, "read b at {b} after a at {a}");
                if finished {
                    break;
                }
            })
        };

        for version in 0..2000 {
            let txn = Transaction::new()
                .write(WriteItem::new("a", version, "next"))
                .write(WriteItem::new("b", version, "next"));
            engine.put("s", &txn).unwrap();
        }
        done.store(true, Ordering::Release);

        reader.join().unwrap();
        assert_eq!(version_of(&engine, "a"), Some(2000));
        assert_eq!(version_of(&engine, "b"), Some(2000));
    }

    #[test]
    fn test_reader_never_sees_partial_commit_memory() {
        assert_no_partial_commits(create_test_engine());
    }

    #[test]
    fn test_reader_never_sees_partial_commit_rocks() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(RocksStore::open(dir.path()).unwrap());
        assert_no_partial_commits(TransactionEngine::new(store, VersionGuard::default()));
    }

    #[test]
    fn test_rocks_backed_engine() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(RocksStore::open(dir.path()).unwrap());
        let engine = TransactionEngine::new(store, VersionGuard::default());

        let txn = Transaction::new()
            .with_expected_global_version(0)
            .write(WriteItem::new("a", 0, "1"))
            .write(WriteItem::unconditional("b", "2"));
        assert_eq!(engine.put("s", &txn).unwrap(), 1);

        let txn = Transaction::new()
            .write(WriteItem::new("a", 0, "3"))
            .delete(DeleteItem::new("b", 0));
        assert!(engine.put("s", &txn).unwrap_err().is_conflict());
        assert_eq!(version_of(&engine, "a"), Some(0));
        assert_eq!(version_of(&engine, "b"), Some(1));

        assert_eq!(
            engine.delete("s", "b", 1).unwrap(),
            DeleteOutcome::Deleted { global_version: 2 }
        );
    }
}
