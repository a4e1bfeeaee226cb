// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Listing error types.

use crate::storage::StorageError;

/// Errors that can occur while serving a listing page.
#[derive(Debug, thiserror::Error)]
pub enum ListingError {
    #[error("store_id must not be empty")]
    EmptyStoreId,

    #[error("page_size must be positive, got {0}")]
    InvalidPageSize(i32),

    #[error("invalid page token: {0}")]
    InvalidToken(String),

    #[error("page token belongs to store {token_store:?}, not {store_id:?}")]
    TokenStoreMismatch {
        store_id: String,
        token_store: String,
    },

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}
