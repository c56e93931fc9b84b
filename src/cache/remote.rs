//! Remote Cache Module
//!
//! Cache backend over a [`RemoteStore`] that remembers which keys it wrote,
//! so it can report and flush "everything this instance touched".

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::cache::{BackendConfig, Batch, CacheBackend, KeyRegistry, RemoteStore, SetMode};
use crate::error::{CacheError, Result};

// == Remote Cache ==
/// Remote-store backend with a local key registry.
#[derive(Debug)]
pub struct RemoteCache<S> {
    store: S,
    registry: KeyRegistry,
    config: RwLock<BackendConfig>,
}

impl<S: RemoteStore> RemoteCache<S> {
    // == Constructor ==
    /// Wraps `store`; writes never expire unless configured.
    pub fn new(store: S) -> Self {
        Self::with_config(store, BackendConfig::default())
    }

    pub fn with_config(store: S, config: BackendConfig) -> Self {
        Self {
            store,
            registry: KeyRegistry::new(),
            config: RwLock::new(config),
        }
    }

    /// The wrapped store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Keys this instance believes it owns, in first-write order.
    pub fn registered_keys(&self) -> Vec<String> {
        self.registry.snapshot()
    }

    fn effective_expire(&self, expire: Option<u64>) -> Option<u64> {
        self.config.read().effective_expire(expire)
    }
}

#[async_trait]
impl<S: RemoteStore> CacheBackend for RemoteCache<S> {
    // == Set ==
    async fn set(&self, key: &str, value: &str, expire: Option<u64>) -> Result<()> {
        let expire = self.effective_expire(expire);
        self.store.set(key, value, expire).await?;
        self.registry.record(key);
        debug!(key, ?expire, "remote cache set");
        Ok(())
    }

    // == Set Many ==
    /// Submits every write (and its expiry) as one atomic batch.
    ///
    /// Keys enter the registry only once the batch has been applied.
    async fn set_many(
        &self,
        values: &[(String, String)],
        expire: Option<u64>,
        mode: SetMode,
    ) -> Result<Vec<String>> {
        if values.is_empty() {
            return Ok(Vec::new());
        }

        let expire = self.effective_expire(expire);
        let mut batch = Batch::new();
        // Position of each key's SET reply in the acknowledgement list
        let mut set_slots = Vec::with_capacity(values.len());

        match (expire, mode) {
            (None, SetMode::Bulk) => {
                batch.mset(values);
            }
            (None, SetMode::PreserveType) => {
                for (key, value) in values {
                    set_slots.push((batch.len(), key));
                    batch.set(key, value);
                }
            }
            (Some(seconds), _) => {
                for (key, value) in values {
                    set_slots.push((batch.len(), key));
                    batch.set(key, value).expire(key, seconds);
                }
            }
        }

        let acks = self.store.execute_atomic(batch).await?;

        let failed: Vec<String> = set_slots
            .iter()
            .filter(|(slot, _)| !acks.get(*slot).copied().unwrap_or(false))
            .map(|(_, key)| (*key).clone())
            .collect();

        self.registry.record_all(
            values
                .iter()
                .map(|(k, _)| k.as_str())
                .filter(|k| !failed.iter().any(|f| f == k)),
        );

        if !failed.is_empty() {
            warn!(?failed, "remote cache set_many left keys unacknowledged");
        }
        debug!(count = values.len(), ?expire, "remote cache set_many");
        Ok(failed)
    }

    // == Get ==
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.store.get(key).await
    }

    // == Get Many ==
    async fn get_many(&self, keys: &[String]) -> Result<Vec<(String, Option<String>)>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let mut values = self.store.mget(keys).await?.into_iter();
        Ok(keys
            .iter()
            .map(|key| (key.clone(), values.next().flatten()))
            .collect())
    }

    // == Replace ==
    /// Only keys in the local registry can be replaced, whatever the store holds.
    async fn replace(&self, key: &str, value: &str, expire: Option<u64>) -> Result<()> {
        if !self.registry.contains(key) {
            return Err(CacheError::KeyNotFound(key.to_string()));
        }
        self.store.set(key, value, self.effective_expire(expire)).await
    }

    // == Delete ==
    async fn delete(&self, keys: &[String]) -> Result<bool> {
        if keys.is_empty() {
            return Ok(true);
        }
        let removed = self.store.delete(keys).await?;
        self.registry.remove_all(keys);
        debug!(requested = keys.len(), removed, "remote cache delete");
        Ok(true)
    }

    // == Flush All ==
    /// Deletes every tracked key; the registry is kept if the store fails.
    async fn flush_all(&self) -> Result<bool> {
        let keys = self.registry.snapshot();
        if keys.is_empty() {
            return Ok(true);
        }
        self.store.delete(&keys).await?;
        self.registry.remove_all(&keys);
        debug!(count = keys.len(), "remote cache flushed");
        Ok(true)
    }

    fn update_config(&self, update: BackendConfig) {
        self.config.write().merge(update);
    }

    fn config(&self) -> BackendConfig {
        *self.config.read()
    }

    /// Registry keys still held by the store.
    async fn snapshot(&self) -> Result<HashMap<String, String>> {
        let keys = self.registry.snapshot();
        Ok(self
            .get_many(&keys)
            .await?
            .into_iter()
            .filter_map(|(key, value)| value.map(|v| (key, v)))
            .collect())
    }

    fn backend_name(&self) -> &'static str {
        "remote"
    }
}
