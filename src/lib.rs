// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! vssdb: a versioned key-value storage engine with optimistic concurrency
//!
//! Clients own isolated stores identified by a `store_id`. Every key carries a
//! version and every store carries a global version; writes are accepted only
//! when the versions the client presents match what is stored. This lets
//! clients that keep critical state remotely detect and reject stale or
//! concurrent updates.
//!
//! The crate is layered bottom-up:
//!
//! - [`storage`]: the [`Store`] trait with in-memory and RocksDB backends
//! - [`txn`]: version checks and atomic multi-key transactions
//! - [`listing`]: paginated, weakly consistent key listings
//! - [`api`]: the request/response surface and its error codes

pub mod api;
pub mod config;
pub mod listing;
pub mod storage;
pub mod txn;

pub use api::{ErrorCode, KeyValue, KvStore, VssError, VssService};
pub use config::{ConfigError, VssConfig};
pub use listing::{KeyVersionPage, ListingError, Paginator};
pub use storage::{
    KeyVersion, MemoryStore, RocksStore, StorageError, Store, Value, VersionedValue,
};
pub use txn::{
    DeleteItem, DeleteOutcome, Transaction, TransactionEngine, TxnError, VersionGuard, WriteItem,
};
