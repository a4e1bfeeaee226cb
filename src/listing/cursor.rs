// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Listing continuation cursors.
//!
//! A cursor is serialized as URL-safe base64 (no padding) of
//! `[id_len:u32 BE][store_id][snapshot_global_version:i64 BE][last_key]`.
//! Clients treat the string as opaque.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use super::error::ListingError;

/// Position of a paginated listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingCursor {
    /// Store the listing belongs to.
    pub store_id: String,
    /// Last key returned; the next page starts strictly after it.
    pub last_returned_key: String,
    /// Global version reported on the first page of the listing.
    pub snapshot_global_version: i64,
}

impl ListingCursor {
    pub fn new(
        store_id: impl Into<String>,
        last_returned_key: impl Into<String>,
        snapshot_global_version: i64,
    ) -> Self {
        Self {
            store_id: store_id.into(),
            last_returned_key: last_returned_key.into(),
            snapshot_global_version,
        }
    }

    /// Serializes the cursor into an opaque page token.
    pub fn encode(&self) -> String {
        let id = self.store_id.as_bytes();
        let key = self.last_returned_key.as_bytes();

        let mut raw = Vec::with_capacity(4 + id.len() + 8 + key.len());
        raw.extend_from_slice(&(id.len() as u32).to_be_bytes());
        raw.extend_from_slice(id);
        raw.extend_from_slice(&self.snapshot_global_version.to_be_bytes());
        raw.extend_from_slice(key);

        URL_SAFE_NO_PAD.encode(raw)
    }

    /// Parses a page token produced by [`ListingCursor::encode`].
    pub fn decode(token: &str) -> Result<Self, ListingError> {
        let raw = URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|e| ListingError::InvalidToken(format!("not base64: {e}")))?;

        let id_len = raw
            .get(..4)
            .and_then(|bytes| <[u8; 4]>::try_from(bytes).ok())
            .map(|bytes| u32::from_be_bytes(bytes) as usize)
            .ok_or_else(|| ListingError::InvalidToken("truncated header".to_string()))?;

        let version_start = 4usize
            .checked_add(id_len)
            .filter(|&start| start <= raw.len())
            .ok_or_else(|| ListingError::InvalidToken("truncated store id".to_string()))?;
        let key_start = version_start + 8;
        let version_bytes: [u8; 8] = raw
            .get(version_start..key_start)
            .and_then(|bytes| bytes.try_into().ok())
            .ok_or_else(|| ListingError::InvalidToken("truncated version".to_string()))?;

        let store_id = std::str::from_utf8(&raw[4..version_start])
            .map_err(|_| ListingError::InvalidToken("store id is not utf-8".to_string()))?;
        let last_returned_key = std::str::from_utf8(&raw[key_start..])
            .map_err(|_| ListingError::InvalidToken("key is not utf-8".to_string()))?;

        Ok(Self {
            store_id: store_id.to_string(),
            last_returned_key: last_returned_key.to_string(),
            snapshot_global_version: i64::from_be_bytes(version_bytes),
        })
    }
}
