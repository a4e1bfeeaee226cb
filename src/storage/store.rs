// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Store types and trait definitions.

use super::error::StorageError;

/// Maximum key size in bytes.
pub const MAX_KEY_SIZE: usize = 8 * 1024; // 8KB

/// Maximum value size in bytes.
pub const MAX_VALUE_SIZE: usize = 64 * 1024 * 1024; // 64MB

/// Global version of a store that has never been written.
pub const INITIAL_GLOBAL_VERSION: i64 = 0;

/// An opaque value stored against a key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Value(pub Vec<u8>);

impl Value {
    /// Creates a new value from bytes.
    #[inline]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Returns the value bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consumes the value, returning the bytes.
    #[inline]
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Returns the length of the value.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the value is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&[u8]> for Value {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

impl AsRef<[u8]> for Value {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// The current value of a key together with its version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedValue {
    pub version: i64,
    pub value: Value,
}

impl VersionedValue {
    pub fn new(version: i64, value: Value) -> Self {
        Self { version, value }
    }
}

/// A key and its version, without the value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyVersion {
    pub key: String,
    pub version: i64,
}

/// Point-in-time view of a store: its global version and every live key in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreSnapshot {
    pub global_version: i64,
    pub keys: Vec<String>,
}

/// A fully resolved set of mutations for a single store.
///
/// Every put carries the final version to persist, so applying a plan involves
/// no further decisions. `base_global_version` is the global version the plan
/// was validated against; the store refuses the plan if it has moved on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitPlan {
    base_global_version: i64,
    puts: Vec<(String, VersionedValue)>,
    removals: Vec<String>,
}

impl CommitPlan {
    /// Creates an empty plan validated against `base_global_version`.
    pub fn new(base_global_version: i64) -> Self {
        Self {
            base_global_version,
            puts: Vec::new(),
            removals: Vec::new(),
        }
    }

    /// Stages a write of `value` at exactly `version`.
    pub fn put(&mut self, key: String, version: i64, value: Value) {
        self.puts.push((key, VersionedValue::new(version, value)));
    }

    /// Stages removal of a key.
    ///
    /// This is the single removal primitive shared by batched and standalone deletes.
    pub fn remove(&mut self, key: String) {
        self.removals.push(key);
    }

    #[inline]
    pub fn base_global_version(&self) -> i64 {
        self.base_global_version
    }

    #[inline]
    pub fn puts(&self) -> &[(String, VersionedValue)] {
        &self.puts
    }

    #[inline]
    pub fn removals(&self) -> &[String] {
        &self.removals
    }

    /// Returns the number of staged mutations.
    #[inline]
    pub fn len(&self) -> usize {
        self.puts.len() + self.removals.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.puts.is_empty() && self.removals.is_empty()
    }

    /// Checks size limits for every staged put.
    pub fn validate_sizes(&self) -> Result<(), StorageError> {
        for (key, versioned) in &self.puts {
            validate_key(key)?;
            validate_value(&versioned.value)?;
        }
        for key in &self.removals {
            validate_key(key)?;
        }
        Ok(())
    }
}

/// Validates key size.
pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    if key.len() > MAX_KEY_SIZE {
        return Err(StorageError::KeyTooLarge {
            size: key.len(),
            max: MAX_KEY_SIZE,
        });
    }
    Ok(())
}

/// Validates value size.
pub(crate) fn validate_value(value: &Value) -> Result<(), StorageError> {
    if value.len() > MAX_VALUE_SIZE {
        return Err(StorageError::ValueTooLarge {
            size: value.len(),
            max: MAX_VALUE_SIZE,
        });
    }
    Ok(())
}

/// The durable per-store state owner.
///
/// Two read paths are exposed on purpose:
/// - [`Store::get`] is strongly consistent: it always reflects the most recent
///   committed plan touching the key and never a partially applied one.
/// - [`Store::scan_key_versions`] serves listings and is only consistent
///   within a single call; consecutive calls may observe different commits.
///
/// All mutation goes through [`Store::commit`], which applies a whole plan and
/// advances the global version by exactly one, atomically.
pub trait Store: Send + Sync {
    /// Reads the current value and version of a key.
    fn get(&self, store_id: &str, key: &str) -> Result<Option<VersionedValue>, StorageError>;

    /// Returns the current global version of a store (0 if never written).
    fn global_version(&self, store_id: &str) -> Result<i64, StorageError>;

    /// Returns the global version and the ordered list of keys as of one instant.
    fn snapshot(&self, store_id: &str) -> Result<StoreSnapshot, StorageError>;

    /// Returns up to `limit` keys starting with `prefix` and strictly greater
    /// than `start_after`, in ascending byte order.
    fn scan_key_versions(
        &self,
        store_id: &str,
        prefix: &str,
        start_after: Option<&str>,
        limit: usize,
    ) -> Result<Vec<KeyVersion>, StorageError>;

    /// Atomically applies a plan and increments the global version.
    ///
    /// Returns the new global version, or [`StorageError::Conflict`] if the
    /// store's global version no longer equals the plan's base version.
    fn commit(&self, store_id: &str, plan: CommitPlan) -> Result<i64, StorageError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_from_bytes() {
        let value = Value::from(b"world".as_slice());
        assert_eq!(value.as_bytes(), b"world");
        assert_eq!(value.len(), 5);
    }

    #[test]
    fn test_commit_plan_staging() {
        let mut plan = CommitPlan::new(3);
        assert!(plan.is_empty());

        plan.put("a".to_string(), 1, Value::from("x"));
        plan.remove("b".to_string());

        assert_eq!(plan.base_global_version(), 3);
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.puts()[0].1.version, 1);
        assert_eq!(plan.removals(), &["b".to_string()]);
    }

    #[test]
    fn test_commit_plan_rejects_oversized_key() {
        let mut plan = CommitPlan::new(0);
        plan.put("k".repeat(MAX_KEY_SIZE + 1), 0, Value::from("v"));

        assert!(matches!(
            plan.validate_sizes(),
            Err(StorageError::KeyTooLarge { .. })
        ));
    }
}
