// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Transaction proposal types.

use crate::storage::Value;

/// Expected version that disables the precondition of an item.
pub const UNCONDITIONAL: i64 = -1;

/// Version stored by an unconditional write, whatever the previous version was.
pub const BASELINE_VERSION: i64 = 1;

/// Version stored by a conditional write that creates a key.
pub const INITIAL_KEY_VERSION: i64 = 0;

/// A write to apply within a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteItem {
    pub key: String,
    /// Version the key must currently have, or [`UNCONDITIONAL`].
    pub expected_version: i64,
    pub value: Value,
}

impl WriteItem {
    /// Creates a write conditioned on `expected_version`.
    pub fn new(key: impl Into<String>, expected_version: i64, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            expected_version,
            value: value.into(),
        }
    }

    /// Creates a write without a version precondition.
    pub fn unconditional(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(key, UNCONDITIONAL, value)
    }

    #[inline]
    pub fn is_unconditional(&self) -> bool {
        self.expected_version == UNCONDITIONAL
    }
}

/// A delete to apply within a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteItem {
    pub key: String,
    /// Version the key must currently have, or [`UNCONDITIONAL`].
    pub expected_version: i64,
}

impl DeleteItem {
    pub fn new(key: impl Into<String>, expected_version: i64) -> Self {
        Self {
            key: key.into(),
            expected_version,
        }
    }

    pub fn unconditional(key: impl Into<String>) -> Self {
        Self::new(key, UNCONDITIONAL)
    }

    #[inline]
    pub fn is_unconditional(&self) -> bool {
        self.expected_version == UNCONDITIONAL
    }
}

/// A proposed all-or-nothing mutation of one store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transaction {
    /// Global version the store must be at for the transaction to apply.
    pub(crate) expected_global_version: Option<i64>,
    pub(crate) writes: Vec<WriteItem>,
    pub(crate) deletes: Vec<DeleteItem>,
}

impl Transaction {
    /// Creates an empty transaction with no global version precondition.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires the store to be at exactly `global_version`.
    pub fn with_expected_global_version(mut self, global_version: i64) -> Self {
        self.expected_global_version = Some(global_version);
        self
    }

    /// Adds a write item.
    pub fn write(mut self, item: WriteItem) -> Self {
        self.writes.push(item);
        self
    }

    /// Adds a delete item.
    pub fn delete(mut self, item: DeleteItem) -> Self {
        self.deletes.push(item);
        self
    }

    /// Builds a transaction from its raw parts.
    pub fn from_parts(
        expected_global_version: Option<i64>,
        writes: Vec<WriteItem>,
        deletes: Vec<DeleteItem>,
    ) -> Self {
        Self {
            expected_global_version,
            writes,
            deletes,
        }
    }

    #[inline]
    pub fn expected_global_version(&self) -> Option<i64> {
        self.expected_global_version
    }

    #[inline]
    pub fn writes(&self) -> &[WriteItem] {
        &self.writes
    }

    #[inline]
    pub fn deletes(&self) -> &[DeleteItem] {
        &self.deletes
    }

    /// Returns the number of write and delete items.
    #[inline]
    pub fn item_count(&self) -> usize {
        self.writes.len() + self.deletes.len()
    }
}
