// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Request and response types of the four storage operations.

use crate::storage::KeyVersion;
use crate::txn::{DeleteItem, WriteItem};

/// A key with its version and value.
///
/// In a put, `version` is the expected current version (`-1` for an
/// unconditional write). In responses it is the stored version. Listings leave
/// `value` empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyValue {
    pub key: String,
    pub version: i64,
    pub value: Vec<u8>,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, version: i64, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            version,
            value: value.into(),
        }
    }
}

impl From<KeyValue> for WriteItem {
    fn from(kv: KeyValue) -> Self {
        WriteItem::new(kv.key, kv.version, kv.value)
    }
}

impl From<KeyValue> for DeleteItem {
    fn from(kv: KeyValue) -> Self {
        DeleteItem::new(kv.key, kv.version)
    }
}

impl From<KeyVersion> for KeyValue {
    fn from(kv: KeyVersion) -> Self {
        Self {
            key: kv.key,
            version: kv.version,
            value: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetObjectRequest {
    pub store_id: String,
    pub key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetObjectResponse {
    pub value: KeyValue,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutObjectRequest {
    pub store_id: String,
    /// If set, the store must currently be at exactly this global version.
    pub global_version: Option<i64>,
    /// Items to write; each `version` is the expected current version.
    pub transaction_items: Vec<KeyValue>,
    /// Items to delete; each `version` is the expected current version.
    pub delete_items: Vec<KeyValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutObjectResponse {
    /// Global version of the store after this put.
    pub global_version: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteObjectRequest {
    pub store_id: String,
    /// Key and version to delete; the value is ignored.
    pub key_value: Option<KeyValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteObjectResponse {}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListKeyVersionsRequest {
    pub store_id: String,
    pub key_prefix: Option<String>,
    pub page_size: Option<i32>,
    pub page_token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListKeyVersionsResponse {
    pub key_versions: Vec<KeyValue>,
    /// Absent exactly when there are no more pages.
    pub next_page_token: Option<String>,
    /// Present on the first page only.
    pub global_version: Option<i64>,
}
