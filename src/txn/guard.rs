// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Optimistic-concurrency precondition checks.
//!
//! Validation happens in two phases:
//!
//! 1. [`VersionGuard::check_request`] inspects only the request: field shape,
//!    size limits and key uniqueness. It never touches the store.
//! 2. [`VersionGuard::resolve`] checks every version precondition against the
//!    store and turns the request into a [`CommitPlan`]. Callers must hold the
//!    store's write lock so the state it observed cannot change before commit.

use std::collections::HashSet;

use crate::config::VssConfig;
use crate::storage::{CommitPlan, Store};

use super::error::TxnError;
use super::transaction::{
    DeleteItem, Transaction, WriteItem, BASELINE_VERSION, INITIAL_KEY_VERSION, UNCONDITIONAL,
};

/// Outcome of resolving a standalone delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LenientDelete {
    /// The key exists and matches; the plan removes it.
    Remove(CommitPlan),
    /// The key does not exist.
    Absent,
    /// The key exists at a different version.
    VersionMismatch { actual: i64 },
}

/// Validates transactions against request limits and store state.
#[derive(Debug, Clone)]
pub struct VersionGuard {
    max_items_per_put: usize,
    max_key_size: usize,
    max_value_size: usize,
}

impl VersionGuard {
    /// Creates a guard with explicit limits.
    pub fn new(max_items_per_put: usize, max_key_size: usize, max_value_size: usize) -> Self {
        Self {
            max_items_per_put,
            max_key_size,
            max_value_size,
        }
    }

    /// Creates a guard using the limits of `config`.
    pub fn from_config(config: &VssConfig) -> Self {
        Self::new(
            config.max_items_per_put,
            config.max_key_size,
            config.max_value_size,
        )
    }

    /// Rejects an empty store id.
    pub fn check_store_id(&self, store_id: &str) -> Result<(), TxnError> {
        if store_id.is_empty() {
            return Err(TxnError::InvalidRequest(
                "store_id must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Rejects an empty or oversized key.
    pub fn check_key(&self, key: &str) -> Result<(), TxnError> {
        if key.is_empty() {
            return Err(TxnError::InvalidRequest("key must not be empty".to_string()));
        }
        if key.len() > self.max_key_size {
            return Err(TxnError::InvalidRequest(format!(
                "key of {} bytes exceeds limit of {}",
                key.len(),
                self.max_key_size
            )));
        }
        Ok(())
    }

    /// Rejects versions below [`UNCONDITIONAL`].
    pub fn check_expected_version(&self, key: &str, version: i64) -> Result<(), TxnError> {
        if version < UNCONDITIONAL {
            return Err(TxnError::InvalidRequest(format!(
                "version {version} for key {key:?} is below {UNCONDITIONAL}"
            )));
        }
        Ok(())
    }

    /// Checks the request shape without reading the store.
    ///
    /// A key appearing twice across writes and deletes is an invalid request,
    /// not a conflict.
    pub fn check_request(&self, store_id: &str, txn: &Transaction) -> Result<(), TxnError> {
        self.check_store_id(store_id)?;

        if txn.item_count() > self.max_items_per_put {
            return Err(TxnError::InvalidRequest(format!(
                "{} items exceed limit of {}",
                txn.item_count(),
                self.max_items_per_put
            )));
        }
        if let Some(global_version) = txn.expected_global_version() {
            if global_version < 0 {
                return Err(TxnError::InvalidRequest(format!(
                    "global_version must not be negative, got {global_version}"
                )));
            }
        }

        let mut seen = HashSet::with_capacity(txn.item_count());
        for item in txn.writes() {
            self.check_key(&item.key)?;
            self.check_expected_version(&item.key, item.expected_version)?;
            if item.value.len() > self.max_value_size {
                return Err(TxnError::InvalidRequest(format!(
                    "value of {} bytes for key {:?} exceeds limit of {}",
                    item.value.len(),
                    item.key,
                    self.max_value_size
                )));
            }
            if !seen.insert(item.key.as_str()) {
                return Err(duplicate_key(&item.key));
            }
        }
        for item in txn.deletes() {
            self.check_key(&item.key)?;
            self.check_expected_version(&item.key, item.expected_version)?;
            if !seen.insert(item.key.as_str()) {
                return Err(duplicate_key(&item.key));
            }
        }
        Ok(())
    }

    /// Checks every version precondition and builds the commit plan.
    ///
    /// Nothing is written; on error the store is untouched. The caller must
    /// hold the store's write lock until the plan is committed.
    pub fn resolve<S: Store + ?Sized>(
        &self,
        store: &S,
        store_id: &str,
        txn: &Transaction,
    ) -> Result<CommitPlan, TxnError> {
        let current_global = store.global_version(store_id)?;
        if let Some(expected) = txn.expected_global_version() {
            if expected != current_global {
                return Err(TxnError::GlobalVersionMismatch {
                    expected,
                    actual: current_global,
                });
            }
        }

        let mut plan = CommitPlan::new(current_global);
        for item in txn.writes() {
            let version = self.resolve_write(store, store_id, item)?;
            plan.put(item.key.clone(), version, item.value.clone());
        }
        for item in txn.deletes() {
            if self.resolve_batched_delete(store, store_id, item)? {
                plan.remove(item.key.clone());
            }
        }
        Ok(plan)
    }

    /// Returns the version a write stores if its precondition holds.
    fn resolve_write<S: Store + ?Sized>(
        &self,
        store: &S,
        store_id: &str,
        item: &WriteItem,
    ) -> Result<i64, TxnError> {
        if item.is_unconditional() {
            return Ok(BASELINE_VERSION);
        }

        let current = store.get(store_id, &item.key)?;
        match current {
            Some(current) if current.version == item.expected_version => {
                current.version.checked_add(1).ok_or_else(|| {
                    TxnError::InvalidRequest(format!("version of key {:?} overflows", item.key))
                })
            }
            None if item.expected_version == INITIAL_KEY_VERSION => Ok(INITIAL_KEY_VERSION),
            other => Err(TxnError::KeyVersionMismatch {
                key: item.key.clone(),
                expected: item.expected_version,
                actual: other.map(|current| current.version),
            }),
        }
    }

    /// Strict delete check for deletes batched inside a put.
    ///
    /// Returns whether the key has to be removed. A conditional delete of a
    /// missing key is a conflict.
    fn resolve_batched_delete<S: Store + ?Sized>(
        &self,
        store: &S,
        store_id: &str,
        item: &DeleteItem,
    ) -> Result<bool, TxnError> {
        let current = store.get(store_id, &item.key)?;
        match current {
            Some(_) if item.is_unconditional() => Ok(true),
            None if item.is_unconditional() => Ok(false),
            Some(current) if current.version == item.expected_version => Ok(true),
            Some(current) => Err(TxnError::KeyVersionMismatch {
                key: item.key.clone(),
                expected: item.expected_version,
                actual: Some(current.version),
            }),
            None => Err(TxnError::MissingKey {
                key: item.key.clone(),
            }),
        }
    }

    /// Lenient delete check for standalone deletes.
    ///
    /// Never fails on a missing key or a version mismatch; those are reported
    /// as outcomes that commit nothing.
    pub fn resolve_lenient_delete<S: Store + ?Sized>(
        &self,
        store: &S,
        store_id: &str,
        key: &str,
        version: i64,
    ) -> Result<LenientDelete, TxnError> {
        let Some(current) = store.get(store_id, key)? else {
            return Ok(LenientDelete::Absent);
        };
        if version != UNCONDITIONAL && version != current.version {
            return Ok(LenientDelete::VersionMismatch {
                actual: current.version,
            });
        }

        let mut plan = CommitPlan::new(store.global_version(store_id)?);
        plan.remove(key.to_string());
        Ok(LenientDelete::Remove(plan))
    }
}

impl Default for VersionGuard {
    fn default() -> Self {
        Self::from_config(&VssConfig::default())
    }
}

fn duplicate_key(key: &str) -> TxnError {
    TxnError::InvalidRequest(format!("key {key:?} appears more than once in the request"))
}
