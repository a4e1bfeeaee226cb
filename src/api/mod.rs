// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! The storage operations exposed to clients.
//!
//! [`KvStore`] mirrors the four wire operations (get, put, delete, list) and
//! their error codes. Transport, authentication and routing of a caller to a
//! `store_id` happen outside this crate.
//!
//! # Example
//!
//! ```no_run
//! use vssdb::api::{GetObjectRequest, KeyValue, KvStore, PutObjectRequest, VssService};
//! use vssdb::config::VssConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let service = VssService::in_memory(VssConfig::default())?;
//!
//! service
//!     .put_object(PutObjectRequest {
//!         store_id: "tenant".to_string(),
//!         global_version: Some(0),
//!         transaction_items: vec![KeyValue::new("channel", 0, b"state".to_vec())],
//!         delete_items: vec![],
//!     })
//!     .await?;
//!
//! let response = service
//!     .get_object(GetObjectRequest {
//!         store_id: "tenant".to_string(),
//!         key: "channel".to_string(),
//!     })
//!     .await?;
//! println!("version {}", response.value.version);
//! # Ok(())
//! # }
//! ```

mod error;
mod service;
mod types;

pub use error::{ErrorCode, VssError};
pub use service::{open_rocks_service, VssService};
pub use types::{
    DeleteObjectRequest, DeleteObjectResponse, GetObjectRequest, GetObjectResponse, KeyValue,
    ListKeyVersionsRequest, ListKeyVersionsResponse, PutObjectRequest, PutObjectResponse,
};

use async_trait::async_trait;

/// Interface implemented by every storage backend of the service.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Returns the value and version of a key, or `NO_SUCH_KEY_EXCEPTION`.
    async fn get_object(&self, request: GetObjectRequest) -> Result<GetObjectResponse, VssError>;

    /// Applies writes and deletes atomically.
    ///
    /// Fails with `CONFLICT_EXCEPTION` on any version mismatch and with
    /// `INVALID_REQUEST_EXCEPTION` on malformed input or repeated keys.
    async fn put_object(&self, request: PutObjectRequest) -> Result<PutObjectResponse, VssError>;

    /// Deletes a key. Succeeds when the key is absent or at another version.
    async fn delete_object(
        &self,
        request: DeleteObjectRequest,
    ) -> Result<DeleteObjectResponse, VssError>;

    /// Lists keys and versions one page at a time.
    async fn list_key_versions(
        &self,
        request: ListKeyVersionsRequest,
    ) -> Result<ListKeyVersionsResponse, VssError>;
}
