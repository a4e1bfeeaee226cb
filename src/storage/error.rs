// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Storage error types.

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("key too large: {size} > {max}")]
    KeyTooLarge { size: usize, max: usize },

    #[error("value too large: {size} > {max}")]
    ValueTooLarge { size: usize, max: usize },

    #[error("stale commit for store {store_id:?}: planned against global version {expected}, store is at {actual}")]
    Conflict {
        store_id: String,
        expected: i64,
        actual: i64,
    },

    #[error("storage corruption: {0}")]
    Corruption(String),

    #[error("rocksdb error: {0}")]
    RocksDb(#[from] rocksdb::Error),

    #[error("invalid key encoding: {0}")]
    InvalidKeyEncoding(String),
}
