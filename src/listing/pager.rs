// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Paginated key-version listings.

use tracing::{debug, instrument};

use crate::config::VssConfig;
use crate::storage::{KeyVersion, Store};

use super::cursor::ListingCursor;
use super::error::ListingError;

/// One page of a listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyVersionPage {
    /// Keys in ascending order with their versions.
    pub key_versions: Vec<KeyVersion>,
    /// Token for the next page; `None` when the listing is finished.
    pub next_page_token: Option<String>,
    /// Global version of the store, present on the first page only.
    pub global_version: Option<i64>,
}

/// Serves listing pages from a [`Store`].
#[derive(Debug, Clone)]
pub struct Paginator {
    default_page_size: i32,
    max_page_size: i32,
}

impl Paginator {
    pub fn new(default_page_size: i32, max_page_size: i32) -> Self {
        Self {
            default_page_size,
            max_page_size,
        }
    }

    pub fn from_config(config: &VssConfig) -> Self {
        Self::new(config.default_page_size, config.max_page_size)
    }

    /// Returns the page size actually served for a requested size.
    pub fn effective_page_size(&self, requested: Option<i32>) -> Result<usize, ListingError> {
        let size = match requested {
            None => self.default_page_size,
            Some(size) if size <= 0 => return Err(ListingError::InvalidPageSize(size)),
            Some(size) => size,
        };
        Ok(size.min(self.max_page_size).max(1) as usize)
    }

    /// Serves one page of keys starting with `key_prefix`.
    ///
    /// Without a token this is the first page: the store's global version is
    /// read before any key and returned with the page. The global version is a
    /// lower bound; keys on this or later pages may reflect newer commits.
    /// Pages are not a frozen snapshot of the store.
    ///
    /// A full page always carries a token, so the page after it may be empty.
    /// Callers stop when no token is returned.
    #[instrument(level = "debug", skip(self, store, page_token), fields(first_page = page_token.is_none()))]
    pub fn list<S: Store + ?Sized>(
        &self,
        store: &S,
        store_id: &str,
        key_prefix: Option<&str>,
        page_size: Option<i32>,
        page_token: Option<&str>,
    ) -> Result<KeyVersionPage, ListingError> {
        if store_id.is_empty() {
            return Err(ListingError::EmptyStoreId);
        }
        let limit = self.effective_page_size(page_size)?;
        let prefix = key_prefix.unwrap_or("");

        let (start_after, snapshot_global_version, global_version) =
            match page_token.filter(|token| !token.is_empty()) {
                Some(token) => {
                    let cursor = ListingCursor::decode(token)?;
                    if cursor.store_id != store_id {
                        return Err(ListingError::TokenStoreMismatch {
                            store_id: store_id.to_string(),
                            token_store: cursor.store_id,
                        });
                    }
                    (
                        Some(cursor.last_returned_key),
                        cursor.snapshot_global_version,
                        None,
                    )
                }
                None => {
                    // Must happen before any key is read.
                    let global_version = store.global_version(store_id)?;
                    (None, global_version, Some(global_version))
                }
            };

        let key_versions =
            store.scan_key_versions(store_id, prefix, start_after.as_deref(), limit)?;

        let next_page_token = if key_versions.len() == limit {
            key_versions.last().map(|last| {
                ListingCursor::new(store_id, last.key.clone(), snapshot_global_version).encode()
            })
        } else {
            None
        };

        debug!(
            returned = key_versions.len(),
            has_more = next_page_token.is_some(),
            "Served listing page"
        );

        Ok(KeyVersionPage {
            key_versions,
            next_page_token,
            global_version,
        })
    }
}

impl Default for Paginator {
    fn default() -> Self {
        Self::from_config(&VssConfig::default())
    }
}
