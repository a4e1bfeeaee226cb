// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Engine configuration.

use std::path::PathBuf;

use crate::storage::{DurabilityMode, StorageError, MAX_KEY_SIZE, MAX_VALUE_SIZE};

/// Largest page a listing ever returns.
pub const DEFAULT_MAX_PAGE_SIZE: i32 = 100;

/// Largest number of write and delete items in a single put.
pub const DEFAULT_MAX_ITEMS_PER_PUT: usize = 1000;

/// Errors raised while building an engine from configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("no data directory configured")]
    MissingDataDir,

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Configuration for a VSS engine.
#[derive(Debug, Clone)]
pub struct VssConfig {
    /// Upper bound on page size, applied regardless of what the client asks for.
    pub max_page_size: i32,
    /// Page size used when the client does not send one.
    pub default_page_size: i32,
    /// Maximum number of write plus delete items in one put.
    pub max_items_per_put: usize,
    /// Maximum key length in bytes.
    pub max_key_size: usize,
    /// Maximum value length in bytes.
    pub max_value_size: usize,
    /// Durability of RocksDB commits.
    pub durability: DurabilityMode,
    /// RocksDB directory (required by the RocksDB backend).
    pub data_dir: Option<PathBuf>,
}

impl Default for VssConfig {
    fn default() -> Self {
        Self {
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
            default_page_size: DEFAULT_MAX_PAGE_SIZE,
            max_items_per_put: DEFAULT_MAX_ITEMS_PER_PUT,
            max_key_size: MAX_KEY_SIZE,
            max_value_size: MAX_VALUE_SIZE,
            durability: DurabilityMode::default(),
            data_dir: None,
        }
    }
}

impl VssConfig {
    /// Creates a configuration with default limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum page size.
    pub fn with_max_page_size(mut self, size: i32) -> Self {
        self.max_page_size = size;
        self
    }

    /// Sets the page size used when none is requested.
    pub fn with_default_page_size(mut self, size: i32) -> Self {
        self.default_page_size = size;
        self
    }

    /// Sets the maximum number of items per put.
    pub fn with_max_items_per_put(mut self, count: usize) -> Self {
        self.max_items_per_put = count;
        self
    }

    /// Sets the maximum key length.
    pub fn with_max_key_size(mut self, size: usize) -> Self {
        self.max_key_size = size;
        self
    }

    /// Sets the maximum value length.
    pub fn with_max_value_size(mut self, size: usize) -> Self {
        self.max_value_size = size;
        self
    }

    /// Sets the commit durability mode.
    pub fn with_durability(mut self, durability: DurabilityMode) -> Self {
        self.durability = durability;
        self
    }

    /// Sets the RocksDB data directory.
    pub fn with_data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(path.into());
        self
    }

    /// Checks that the limits are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_page_size < 1 {
            return Err(ConfigError::Invalid(format!(
                "max_page_size must be positive, got {}",
                self.max_page_size
            )));
        }
        if self.default_page_size < 1 || self.default_page_size > self.max_page_size {
            return Err(ConfigError::Invalid(format!(
                "default_page_size must be in 1..={}, got {}",
                self.max_page_size, self.default_page_size
            )));
        }
        if self.max_items_per_put == 0 {
            return Err(ConfigError::Invalid(
                "max_items_per_put must be positive".to_string(),
            ));
        }
        if self.max_key_size == 0 || self.max_key_size > MAX_KEY_SIZE {
            return Err(ConfigError::Invalid(format!(
                "max_key_size must be in 1..={MAX_KEY_SIZE}, got {}",
                self.max_key_size
            )));
        }
        if self.max_value_size > MAX_VALUE_SIZE {
            return Err(ConfigError::Invalid(format!(
                "max_value_size must be at most {MAX_VALUE_SIZE}, got {}",
                self.max_value_size
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        VssConfig::default().validate().unwrap();
    }

    #[test]
    fn test_builder() {
        let config = VssConfig::new()
            .with_max_page_size(10)
            .with_default_page_size(5)
            .with_max_items_per_put(3)
            .with_durability(DurabilityMode::FsyncEveryWrite)
            .with_data_dir("/tmp/vss");

        assert_eq!(config.max_page_size, 10);
        assert_eq!(config.default_page_size, 5);
        assert_eq!(config.max_items_per_put, 3);
        assert_eq!(config.durability, DurabilityMode::FsyncEveryWrite);
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/vss")));
        config.validate().unwrap();
    }

    #[test]
    fn test_default_page_size_above_max() {
        let config = VssConfig::new().with_max_page_size(10);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_key_limit_above_storage_limit() {
        let config = VssConfig::new().with_max_key_size(MAX_KEY_SIZE + 1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_items_per_put() {
        let config = VssConfig::new().with_max_items_per_put(0);
        assert!(config.validate().is_err());
    }
}
