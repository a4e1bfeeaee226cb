// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! In-memory store implementation.

use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use std::sync::Arc;

use parking_lot::RwLock;

use super::{
    CommitPlan, KeyVersion, Store, StoreSnapshot, StorageError, VersionedValue,
    INITIAL_GLOBAL_VERSION,
};

/// State of one store.
#[derive(Debug, Default)]
struct StoreState {
    global_version: i64,
    items: BTreeMap<String, VersionedValue>,
}

/// Non-durable store backed by ordered maps.
///
/// Each store sits behind its own `RwLock`; a commit holds the write lock for
/// the whole apply, so readers see either none or all of a plan.
#[derive(Default)]
pub struct MemoryStore {
    stores: RwLock<HashMap<String, Arc<RwLock<StoreState>>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn existing(&self, store_id: &str) -> Option<Arc<RwLock<StoreState>>> {
        self.stores.read().get(store_id).cloned()
    }

    fn get_or_create(&self, store_id: &str) -> Arc<RwLock<StoreState>> {
        if let Some(state) = self.existing(store_id) {
            return state;
        }
        let mut stores = self.stores.write();
        Arc::clone(stores.entry(store_id.to_string()).or_default())
    }
}

impl Store for MemoryStore {
    fn get(&self, store_id: &str, key: &str) -> Result<Option<VersionedValue>, StorageError> {
        Ok(self
            .existing(store_id)
            .and_then(|state| state.read().items.get(key).cloned()))
    }

    fn global_version(&self, store_id: &str) -> Result<i64, StorageError> {
        Ok(self
            .existing(store_id)
            .map(|state| state.read().global_version)
            .unwrap_or(INITIAL_GLOBAL_VERSION))
    }

    fn snapshot(&self, store_id: &str) -> Result<StoreSnapshot, StorageError> {
        let Some(state) = self.existing(store_id) else {
            return Ok(StoreSnapshot::default());
        };
        let state = state.read();
        Ok(StoreSnapshot {
            global_version: state.global_version,
            keys: state.items.keys().cloned().collect(),
        })
    }

    fn scan_key_versions(
        &self,
        store_id: &str,
        prefix: &str,
        start_after: Option<&str>,
        limit: usize,
    ) -> Result<Vec<KeyVersion>, StorageError> {
        let Some(state) = self.existing(store_id) else {
            return Ok(Vec::new());
        };
        let state = state.read();

        let lower = match start_after {
            Some(after) if after >= prefix => Bound::Excluded(after),
            _ => Bound::Included(prefix),
        };

        Ok(state
            .items
            .range::<str, _>((lower, Bound::Unbounded))
            .take_while(|(key, _)| key.starts_with(prefix))
            .take(limit)
            .map(|(key, versioned)| KeyVersion {
                key: key.clone(),
                version: versioned.version,
            })
            .collect())
    }

    fn commit(&self, store_id: &str, plan: CommitPlan) -> Result<i64, StorageError> {
        plan.validate_sizes()?;

        let state = self.get_or_create(store_id);
        let mut state = state.write();

        if state.global_version != plan.base_global_version() {
            return Err(StorageError::Conflict {
                store_id: store_id.to_string(),
                expected: plan.base_global_version(),
                actual: state.global_version,
            });
        }

        for key in plan.removals() {
            state.items.remove(key);
        }
        for (key, versioned) in plan.puts() {
            state.items.insert(key.clone(), versioned.clone());
        }
        state.global_version += 1;

        Ok(state.global_version)
    }
}
