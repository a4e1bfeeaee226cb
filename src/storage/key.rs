// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! On-disk key and record encoding.
//!
//! Every record of a store shares the store prefix `[id_len:u32 BE][store_id]`,
//! followed by a one-byte tag:
//!
//! - `0x00`: the store's global version, value `[global_version:i64 BE]`
//! - `0x01` + key bytes: an item, value `[version:i64 BE][value bytes]`
//!
//! Length-prefixing the store id keeps stores disjoint, and items of one store
//! sort by key under RocksDB's default byte-order comparator.

use super::{StorageError, Value, VersionedValue};

/// Tag of the global-version record.
pub const GLOBAL_VERSION_TAG: u8 = 0x00;

/// Tag of item records.
pub const ITEM_TAG: u8 = 0x01;

const VERSION_LEN: usize = 8;

/// Returns the prefix shared by every record of a store.
#[inline]
pub fn store_prefix(store_id: &str) -> Vec<u8> {
    let id = store_id.as_bytes();
    let mut prefix = Vec::with_capacity(4 + id.len() + 1);
    prefix.extend_from_slice(&(id.len() as u32).to_be_bytes());
    prefix.extend_from_slice(id);
    prefix
}

/// Encodes the key of a store's global-version record.
#[inline]
pub fn encode_global_version_key(store_id: &str) -> Vec<u8> {
    let mut encoded = store_prefix(store_id);
    encoded.push(GLOBAL_VERSION_TAG);
    encoded
}

/// Encodes the key of an item record.
#[inline]
pub fn encode_item_key(store_id: &str, key: &str) -> Vec<u8> {
    let mut encoded = store_prefix(store_id);
    encoded.reserve(1 + key.len());
    encoded.push(ITEM_TAG);
    encoded.extend_from_slice(key.as_bytes());
    encoded
}

/// Returns the prefix of all item records whose key starts with `key_prefix`.
#[inline]
pub fn item_key_prefix(store_id: &str, key_prefix: &str) -> Vec<u8> {
    encode_item_key(store_id, key_prefix)
}

/// Returns the smallest encoded item key strictly greater than `key`.
#[inline]
pub fn item_key_successor(store_id: &str, key: &str) -> Vec<u8> {
    let mut encoded = encode_item_key(store_id, key);
    encoded.push(0x00);
    encoded
}

/// Extracts the user key from an encoded item key.
pub fn decode_item_key(encoded: &[u8]) -> Result<&str, StorageError> {
    if encoded.len() < 4 {
        return Err(StorageError::InvalidKeyEncoding(
            "key too short for length prefix".to_string(),
        ));
    }

    let id_len = u32::from_be_bytes([encoded[0], encoded[1], encoded[2], encoded[3]]) as usize;
    let tag_offset = 4 + id_len;

    match encoded.get(tag_offset) {
        Some(&ITEM_TAG) => {}
        Some(tag) => {
            return Err(StorageError::InvalidKeyEncoding(format!(
                "expected item tag, found {tag:#04x}"
            )))
        }
        None => {
            return Err(StorageError::InvalidKeyEncoding(
                "key too short for record tag".to_string(),
            ))
        }
    }

    std::str::from_utf8(&encoded[tag_offset + 1..])
        .map_err(|e| StorageError::InvalidKeyEncoding(format!("item key is not utf-8: {e}")))
}

/// Encodes an item record value.
#[inline]
pub fn encode_item_value(version: i64, value: &Value) -> Vec<u8> {
    let mut encoded = Vec::with_capacity(VERSION_LEN + value.len());
    encoded.extend_from_slice(&version.to_be_bytes());
    encoded.extend_from_slice(value.as_bytes());
    encoded
}

/// Decodes only the version of an item record value.
#[inline]
pub fn decode_item_version(encoded: &[u8]) -> Result<i64, StorageError> {
    let header: [u8; VERSION_LEN] = encoded
        .get(..VERSION_LEN)
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or_else(|| {
            StorageError::Corruption(format!(
                "item record of {} bytes has no version header",
                encoded.len()
            ))
        })?;
    Ok(i64::from_be_bytes(header))
}

/// Decodes an item record value.
pub fn decode_item_value(encoded: &[u8]) -> Result<VersionedValue, StorageError> {
    let version = decode_item_version(encoded)?;
    Ok(VersionedValue::new(
        version,
        Value::new(encoded[VERSION_LEN..].to_vec()),
    ))
}

/// Encodes a global-version record value.
#[inline]
pub fn encode_global_version(global_version: i64) -> [u8; VERSION_LEN] {
    global_version.to_be_bytes()
}

/// Decodes a global-version record value.
pub fn decode_global_version(encoded: &[u8]) -> Result<i64, StorageError> {
    let bytes: [u8; VERSION_LEN] = encoded.try_into().map_err(|_| {
        StorageError::Corruption(format!(
            "global version record has {} bytes, expected {VERSION_LEN}",
            encoded.len()
        ))
    })?;
    Ok(i64::from_be_bytes(bytes))
}
