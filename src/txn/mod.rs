// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Optimistic multi-key transactions.
//!
//! This module provides the version guard and the transaction engine:
//!
//! - [`VersionGuard`] checks a [`Transaction`]'s preconditions (expected
//!   global version, expected per-key versions, key uniqueness) and resolves it
//!   into a [`CommitPlan`](crate::storage::CommitPlan).
//! - [`TransactionEngine`] runs guard and commit for a store as one unit under
//!   that store's write lock, so no concurrent proposal can pass validation
//!   against state that is about to change.
//!
//! # Versioning rules
//!
//! - A conditional write (`expected_version >= 0`) needs the key at exactly that
//!   version and stores `expected_version + 1`. Expected version 0 on a missing
//!   key creates it at version 0.
//! - An unconditional write (`expected_version == -1`) always applies and
//!   stores version 1.
//! - A delete batched in a transaction is strict: a conditional delete of a
//!   missing or mismatched key fails the whole transaction.
//! - A standalone delete ([`TransactionEngine::delete`]) is lenient: a missing
//!   or mismatched key is a no-op.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use vssdb::storage::MemoryStore;
//! use vssdb::txn::{DeleteItem, Transaction, TransactionEngine, VersionGuard, WriteItem};
//!
//! let engine = TransactionEngine::new(Arc::new(MemoryStore::new()), VersionGuard::default());
//!
//! let txn = Transaction::new()
//!     .with_expected_global_version(0)
//!     .write(WriteItem::new("balance", 0, "100"))
//!     .delete(DeleteItem::unconditional("pending"));
//!
//! match engine.put("tenant", &txn) {
//!     Ok(global_version) => println!("committed at {global_version}"),
//!     Err(e) if e.is_conflict() => println!("re-read and retry: {e}"),
//!     Err(e) => println!("failed: {e}"),
//! }
//! ```

mod engine;
mod error;
mod guard;
mod transaction;

pub use engine::{DeleteOutcome, TransactionEngine};
pub use error::TxnError;
pub use guard::{LenientDelete, VersionGuard};
pub use transaction::{
    DeleteItem, Transaction, WriteItem, BASELINE_VERSION, INITIAL_KEY_VERSION, UNCONDITIONAL,
};
