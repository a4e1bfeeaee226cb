// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Error codes surfaced to clients.

use std::fmt;

use crate::listing::ListingError;
use crate::storage::StorageError;
use crate::txn::TxnError;

/// Machine-readable error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// A version precondition failed; re-read and retry.
    Conflict,
    /// The request is malformed; fix it before retrying.
    InvalidRequest,
    /// The storage layer failed; retry with backoff.
    InternalServer,
    /// Get of a key that does not exist.
    NoSuchKey,
    /// Raised by the authentication layer, never by the engine.
    Auth,
}

impl ErrorCode {
    /// Returns the wire name of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Conflict => "CONFLICT_EXCEPTION",
            ErrorCode::InvalidRequest => "INVALID_REQUEST_EXCEPTION",
            ErrorCode::InternalServer => "INTERNAL_SERVER_EXCEPTION",
            ErrorCode::NoSuchKey => "NO_SUCH_KEY_EXCEPTION",
            ErrorCode::Auth => "AUTH_EXCEPTION",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error returned by a storage operation: a code plus a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code}: {message}")]
pub struct VssError {
    code: ErrorCode,
    message: String,
}

impl VssError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalServer, message)
    }

    pub fn no_such_key(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NoSuchKey, message)
    }

    #[inline]
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<StorageError> for VssError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Conflict { .. } => Self::conflict(err.to_string()),
            StorageError::KeyTooLarge { .. } | StorageError::ValueTooLarge { .. } => {
                Self::invalid_request(err.to_string())
            }
            StorageError::Corruption(_)
            | StorageError::RocksDb(_)
            | StorageError::InvalidKeyEncoding(_) => Self::internal(err.to_string()),
        }
    }
}

impl From<TxnError> for VssError {
    fn from(err: TxnError) -> Self {
        match err {
            TxnError::Storage(storage) => storage.into(),
            TxnError::InvalidRequest(_) => Self::invalid_request(err.to_string()),
            TxnError::GlobalVersionMismatch { .. }
            | TxnError::KeyVersionMismatch { .. }
            | TxnError::MissingKey { .. } => Self::conflict(err.to_string()),
        }
    }
}

impl From<ListingError> for VssError {
    fn from(err: ListingError) -> Self {
        match err {
            ListingError::Storage(storage) => storage.into(),
            ListingError::EmptyStoreId
            | ListingError::InvalidPageSize(_)
            | ListingError::InvalidToken(_)
            | ListingError::TokenStoreMismatch { .. } => Self::invalid_request(err.to_string()),
        }
    }
}
