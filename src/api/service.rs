// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! [`KvStore`] implementation over the transaction engine and paginator.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{instrument, warn};

use crate::config::{ConfigError, VssConfig};
use crate::listing::Paginator;
use crate::storage::{MemoryStore, RocksStore, Store, StoreSnapshot};
use crate::txn::{DeleteItem, Transaction, TransactionEngine, VersionGuard, WriteItem};

use super::error::{ErrorCode, VssError};
use super::types::{
    DeleteObjectRequest, DeleteObjectResponse, GetObjectRequest, GetObjectResponse, KeyValue,
    ListKeyVersionsRequest, ListKeyVersionsResponse, PutObjectRequest, PutObjectResponse,
};
use super::KvStore;

/// The storage service: version guard, transaction engine and paginator over one [`Store`].
pub struct VssService<S: Store> {
    engine: TransactionEngine<S>,
    paginator: Paginator,
    config: VssConfig,
}

impl<S: Store> VssService<S> {
    /// Creates a service over `store` after validating `config`.
    pub fn new(store: Arc<S>, config: VssConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            engine: TransactionEngine::new(store, VersionGuard::from_config(&config)),
            paginator: Paginator::from_config(&config),
            config,
        })
    }

    #[inline]
    pub fn engine(&self) -> &TransactionEngine<S> {
        &self.engine
    }

    #[inline]
    pub fn config(&self) -> &VssConfig {
        &self.config
    }

    /// Returns the global version and ordered keys of a store.
    pub fn snapshot(&self, store_id: &str) -> Result<StoreSnapshot, VssError> {
        self.engine.guard().check_store_id(store_id)?;
        Ok(self.engine.store().snapshot(store_id)?)
    }
}

impl VssService<MemoryStore> {
    /// Creates a service over a fresh in-memory store.
    pub fn in_memory(config: VssConfig) -> Result<Self, ConfigError> {
        Self::new(Arc::new(MemoryStore::new()), config)
    }
}

/// Opens a RocksDB-backed service in `config.data_dir`.
pub fn open_rocks_service(config: &VssConfig) -> Result<VssService<RocksStore>, ConfigError> {
    config.validate()?;
    let path = config.data_dir.as_ref().ok_or(ConfigError::MissingDataDir)?;
    let store = RocksStore::open_with_durability(path, config.durability)?;
    VssService::new(Arc::new(store), config.clone())
}

/// Logs internal failures before they leave the engine.
fn surface(err: impl Into<VssError>) -> VssError {
    let err = err.into();
    if err.code() == ErrorCode::InternalServer {
        warn!(error = %err, "Storage operation failed");
    }
    err
}

#[async_trait]
impl<S: Store + 'static> KvStore for VssService<S> {
    #[instrument(skip(self, request), fields(store_id = %request.store_id))]
    async fn get_object(&self, request: GetObjectRequest) -> Result<GetObjectResponse, VssError> {
        let guard = self.engine.guard();
        guard.check_store_id(&request.store_id).map_err(surface)?;
        guard.check_key(&request.key).map_err(surface)?;

        let current = self
            .engine
            .store()
            .get(&request.store_id, &request.key)
            .map_err(surface)?;

        match current {
            Some(versioned) => Ok(GetObjectResponse {
                value: KeyValue {
                    key: request.key,
                    version: versioned.version,
                    value: versioned.value.into_bytes(),
                },
            }),
            None => Err(VssError::no_such_key(format!(
                "key {:?} not found",
                request.key
            ))),
        }
    }

    #[instrument(skip(self, request), fields(store_id = %request.store_id))]
    async fn put_object(&self, request: PutObjectRequest) -> Result<PutObjectResponse, VssError> {
        let txn = Transaction::from_parts(
            request.global_version,
            request
                .transaction_items
                .into_iter()
                .map(WriteItem::from)
                .collect(),
            request
                .delete_items
                .into_iter()
                .map(DeleteItem::from)
                .collect(),
        );

        let global_version = self
            .engine
            .put(&request.store_id, &txn)
            .map_err(surface)?;
        Ok(PutObjectResponse { global_version })
    }

    #[instrument(skip(self, request), fields(store_id = %request.store_id))]
    async fn delete_object(
        &self,
        request: DeleteObjectRequest,
    ) -> Result<DeleteObjectResponse, VssError> {
        let key_value = request
            .key_value
            .ok_or_else(|| VssError::invalid_request("key_value is required"))?;

        self.engine
            .delete(&request.store_id, &key_value.key, key_value.version)
            .map_err(surface)?;
        Ok(DeleteObjectResponse {})
    }

    #[instrument(skip(self, request), fields(store_id = %request.store_id))]
    async fn list_key_versions(
        &self,
        request: ListKeyVersionsRequest,
    ) -> Result<ListKeyVersionsResponse, VssError> {
        let page = self
            .paginator
            .list(
                self.engine.store().as_ref(),
                &request.store_id,
                request.key_prefix.as_deref(),
                request.page_size,
                request.page_token.as_deref(),
            )
            .map_err(surface)?;

        Ok(ListKeyVersionsResponse {
            key_versions: page.key_versions.into_iter().map(KeyValue::from).collect(),
            next_page_token: page.next_page_token,
            global_version: page.global_version,
        })
    }
}
