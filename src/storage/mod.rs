// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Durable per-store state.
//!
//! A store holds a global version and a mapping from key to
//! [`VersionedValue`]. The [`Store`] trait is the only way to touch that
//! state; mutation happens exclusively through [`Store::commit`], which
//! applies a resolved [`CommitPlan`] and advances the global version by one in
//! a single atomic step.
//!
//! Two backends are provided:
//!
//! - [`MemoryStore`]: ordered maps behind per-store `RwLock`s, for tests and
//!   ephemeral deployments.
//! - [`RocksStore`]: RocksDB with one `WriteBatch` per commit.
//!
//! # Example
//!
//! ```no_run
//! use vssdb::storage::{CommitPlan, RocksStore, Store, Value};
//! use std::path::Path;
//!
//! let store = RocksStore::open(Path::new("/tmp/vss")).unwrap();
//!
//! let mut plan = CommitPlan::new(store.global_version("tenant").unwrap());
//! plan.put("key".to_string(), 0, Value::from("value"));
//! let global_version = store.commit("tenant", plan).unwrap();
//!
//! let current = store.get("tenant", "key").unwrap();
//! println!("global version {global_version}, key = {:?}", current);
//! ```

mod error;
mod key;
mod lock;
mod memory;
mod rocks;
mod store;

pub use error::StorageError;
pub use key::{
    decode_item_key, decode_item_value, encode_global_version_key, encode_item_key,
    item_key_prefix,
};
pub use lock::{StoreLockTable, StoreWriteGuard};
pub use memory::MemoryStore;
pub use rocks::{DurabilityMode, RocksStore};
pub use store::{
    CommitPlan, KeyVersion, Store, StoreSnapshot, Value, VersionedValue, INITIAL_GLOBAL_VERSION,
    MAX_KEY_SIZE, MAX_VALUE_SIZE,
};
