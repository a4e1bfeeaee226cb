// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Per-store write locks.
//!
//! Mutations of one store are serialized by a mutex dedicated to that store, so
//! commits to different stores never wait on each other. The table is sharded
//! to keep lookups of unrelated stores from contending on a single map.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use parking_lot::{ArcMutexGuard, Mutex, RawMutex};

const NUM_SHARDS: usize = 64;

/// Shard size above which idle entries are dropped on the next acquisition.
const PRUNE_THRESHOLD: usize = 1024;

/// Exclusive write access to one store, released on drop.
pub type StoreWriteGuard = ArcMutexGuard<RawMutex, ()>;

/// A shard of the lock table.
struct LockShard {
    locks: HashMap<String, Arc<Mutex<()>>>,
}

impl LockShard {
    fn new() -> Self {
        Self {
            locks: HashMap::new(),
        }
    }

    /// Drops mutexes nobody holds or waits on.
    fn prune_idle(&mut self) {
        self.locks.retain(|_, lock| Arc::strong_count(lock) > 1);
    }
}

/// Table of per-store mutexes.
pub struct StoreLockTable {
    shards: [Mutex<LockShard>; NUM_SHARDS],
}

impl StoreLockTable {
    /// Creates an empty lock table.
    pub fn new() -> Self {
        Self {
            shards: std::array::from_fn(|_| Mutex::new(LockShard::new())),
        }
    }

    /// Computes the shard index for a store.
    #[inline]
    fn shard_index(&self, store_id: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        store_id.hash(&mut hasher);
        hasher.finish() as usize % NUM_SHARDS
    }

    /// Blocks until this caller is the only writer of `store_id`.
    ///
    /// The shard lock is released before waiting on the store mutex, so a long
    /// commit in one store never stalls lookups for another.
    pub fn lock(&self, store_id: &str) -> StoreWriteGuard {
        let lock = {
            let mut shard = self.shards[self.shard_index(store_id)].lock();
            if shard.locks.len() >= PRUNE_THRESHOLD {
                shard.prune_idle();
            }
            match shard.locks.get(store_id) {
                Some(lock) => Arc::clone(lock),
                None => {
                    let lock = Arc::new(Mutex::new(()));
                    shard.locks.insert(store_id.to_string(), Arc::clone(&lock));
                    lock
                }
            }
        };
        lock.lock_arc()
    }

    /// Returns true if some caller currently holds the lock of `store_id`.
    #[cfg(test)]
    pub fn is_locked(&self, store_id: &str) -> bool {
        let shard = self.shards[self.shard_index(store_id)].lock();
        shard
            .locks
            .get(store_id)
            .map(|lock| lock.is_locked())
            .unwrap_or(false)
    }

    /// Returns the number of stores with a live mutex entry.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.shards.iter().map(|shard| shard.lock().locks.len()).sum()
    }

    /// Returns true if no store has a live mutex entry.
    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for StoreLockTable {
    fn default() -> Self {
        Self::new()
    }
}
