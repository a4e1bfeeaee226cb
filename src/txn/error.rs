// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Transaction error types.

use crate::storage::StorageError;

/// Errors that can occur when validating or committing a transaction.
#[derive(Debug, thiserror::Error)]
pub enum TxnError {
    /// The request is malformed; retrying it unchanged fails again.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("global version mismatch: expected {expected}, store is at {actual}")]
    GlobalVersionMismatch { expected: i64, actual: i64 },

    #[error("version mismatch for key {key:?}: expected {expected}, found {actual:?}")]
    KeyVersionMismatch {
        key: String,
        expected: i64,
        actual: Option<i64>,
    },

    #[error("key {key:?} does not exist")]
    MissingKey { key: String },

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl TxnError {
    /// Returns true if the caller should re-read versions and retry.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            TxnError::GlobalVersionMismatch { .. }
                | TxnError::KeyVersionMismatch { .. }
                | TxnError::MissingKey { .. }
                | TxnError::Storage(StorageError::Conflict { .. })
        )
    }

    /// Returns true if the request itself is invalid.
    pub fn is_invalid_request(&self) -> bool {
        matches!(
            self,
            TxnError::InvalidRequest(_)
                | TxnError::Storage(StorageError::KeyTooLarge { .. })
                | TxnError::Storage(StorageError::ValueTooLarge { .. })
        )
    }
}
