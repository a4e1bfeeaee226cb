// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! RocksDB-backed store implementation.

use std::path::Path;

use rocksdb::{
    DBWithThreadMode, Direction, IteratorMode, MultiThreaded, Options, WriteBatch, WriteOptions,
};
use tracing::info;

use super::key::{
    decode_global_version, decode_item_key, decode_item_value, decode_item_version,
    encode_global_version, encode_global_version_key, encode_item_key, encode_item_value,
    item_key_prefix, item_key_successor,
};
use super::{
    CommitPlan, KeyVersion, Store, StoreLockTable, StoreSnapshot, StorageError, VersionedValue,
    INITIAL_GLOBAL_VERSION,
};

/// Durability mode for commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DurabilityMode {
    /// Writes are synced to WAL but not fsynced to disk.
    /// Durable against process crashes but not power failures.
    #[default]
    WalOnly,
    /// Writes are fsynced to disk on every commit.
    /// Durable against power failures but slower.
    FsyncEveryWrite,
}

/// RocksDB-backed store.
///
/// A commit is a single `WriteBatch` holding every item mutation and the new
/// global-version record, so it is applied atomically or not at all.
pub struct RocksStore {
    db: DBWithThreadMode<MultiThreaded>,
    write_opts: WriteOptions,
    commit_locks: StoreLockTable,
}

impl RocksStore {
    /// Opens or creates a RocksDB database at the given path.
    ///
    /// Uses `DurabilityMode::WalOnly` by default (fast, durable against process crash).
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        Self::open_with_durability(path, DurabilityMode::default())
    }

    /// Opens or creates a RocksDB database with specified durability mode.
    pub fn open_with_durability(
        path: &Path,
        durability: DurabilityMode,
    ) -> Result<Self, StorageError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);

        opts.set_write_buffer_size(64 * 1024 * 1024); // 64MB
        opts.set_max_write_buffer_number(4);
        opts.set_target_file_size_base(64 * 1024 * 1024);
        opts.set_level_compaction_dynamic_level_bytes(true);

        // Bloom filters for point lookups
        let mut block_opts = rocksdb::BlockBasedOptions::default();
        block_opts.set_bloom_filter(10.0, false);
        opts.set_block_based_table_factory(&block_opts);

        Self::open_with_options(path, opts, durability)
    }

    /// Opens a database with custom RocksDB options.
    pub fn open_with_options(
        path: &Path,
        opts: Options,
        durability: DurabilityMode,
    ) -> Result<Self, StorageError> {
        let db = DBWithThreadMode::open(&opts, path)?;

        let mut write_opts = WriteOptions::default();
        write_opts.set_sync(durability == DurabilityMode::FsyncEveryWrite);

        info!(path = %path.display(), ?durability, "Opened RocksDB store");

        Ok(Self {
            db,
            write_opts,
            commit_locks: StoreLockTable::new(),
        })
    }

    /// Forces a flush of memtables to disk.
    pub fn sync(&self) -> Result<(), StorageError> {
        self.db.flush()?;
        Ok(())
    }

    fn read_global_version(&self, store_id: &str) -> Result<i64, StorageError> {
        match self.db.get(encode_global_version_key(store_id))? {
            Some(bytes) => decode_global_version(&bytes),
            None => Ok(INITIAL_GLOBAL_VERSION),
        }
    }
}

impl Store for RocksStore {
    fn get(&self, store_id: &str, key: &str) -> Result<Option<VersionedValue>, StorageError> {
        self.db
            .get(encode_item_key(store_id, key))?
            .map(|bytes| decode_item_value(&bytes))
            .transpose()
    }

    fn global_version(&self, store_id: &str) -> Result<i64, StorageError> {
        self.read_global_version(store_id)
    }

    fn snapshot(&self, store_id: &str) -> Result<StoreSnapshot, StorageError> {
        let snapshot = self.db.snapshot();

        let global_version = match snapshot.get(encode_global_version_key(store_id))? {
            Some(bytes) => decode_global_version(&bytes)?,
            None => INITIAL_GLOBAL_VERSION,
        };

        let prefix = item_key_prefix(store_id, "");
        let mut keys = Vec::new();
        for item in snapshot.iterator(IteratorMode::From(&prefix, Direction::Forward)) {
            let (encoded_key, _) = item?;
            if !encoded_key.starts_with(&prefix) {
                break;
            }
            keys.push(decode_item_key(&encoded_key)?.to_string());
        }

        Ok(StoreSnapshot {
            global_version,
            keys,
        })
    }

    fn scan_key_versions(
        &self,
        store_id: &str,
        prefix: &str,
        start_after: Option<&str>,
        limit: usize,
    ) -> Result<Vec<KeyVersion>, StorageError> {
        let range_prefix = item_key_prefix(store_id, prefix);
        let start = match start_after {
            Some(after) if after >= prefix => item_key_successor(store_id, after),
            _ => range_prefix.clone(),
        };

        let mut results = Vec::with_capacity(limit.min(1000));
        let iter = self
            .db
            .iterator(IteratorMode::From(&start, Direction::Forward));

        for item in iter {
            if results.len() >= limit {
                break;
            }

            let (encoded_key, value) = item?;
            if !encoded_key.starts_with(&range_prefix) {
                break;
            }

            results.push(KeyVersion {
                key: decode_item_key(&encoded_key)?.to_string(),
                version: decode_item_version(&value)?,
            });
        }

        Ok(results)
    }

    fn commit(&self, store_id: &str, plan: CommitPlan) -> Result<i64, StorageError> {
        plan.validate_sizes()?;

        // Guards the read-check-write of the global version record.
        let _guard = self.commit_locks.lock(store_id);

        let current = self.read_global_version(store_id)?;
        if current != plan.base_global_version() {
            return Err(StorageError::Conflict {
                store_id: store_id.to_string(),
                expected: plan.base_global_version(),
                actual: current,
            });
        }

        let next = current + 1;
        let mut batch = WriteBatch::default();
        for key in plan.removals() {
            batch.delete(encode_item_key(store_id, key));
        }
        for (key, versioned) in plan.puts() {
            batch.put(
                encode_item_key(store_id, key),
                encode_item_value(versioned.version, &versioned.value),
            );
        }
        batch.put(
            encode_global_version_key(store_id),
            encode_global_version(next),
        );

        self.db.write_opt(batch, &self.write_opts)?;
        Ok(next)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::storage::Value;
    use proptest::prelude::*;
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn scan_returns_sorted_prefix_matches(
            keys in prop::collection::btree_set("[a-c]{1,4}", 1..30),
            prefix in "[a-c]{0,2}",
        ) {
            let dir = TempDir::new().unwrap();
            let store = RocksStore::open(dir.path()).unwrap();

            let mut plan = CommitPlan::new(0);
            for key in &keys {
                plan.put(key.clone(), 0, Value::from("v"));
            }
            store.commit("s", plan).unwrap();

            let scanned: Vec<String> = store
                .scan_key_versions("s", &prefix, None, usize::MAX)
                .unwrap()
                .into_iter()
                .map(|kv| kv.key)
                .collect();
            let expected: Vec<String> = keys
                .iter()
                .filter(|key| key.starts_with(&prefix))
                .cloned()
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect();

            prop_assert_eq!(scanned, expected);
        }
    }
}
