//! In-Process Cache Module
//!
//! Map-backed cache with lazy expiry.
//!
//! Expired entries are not reclaimed proactively: an entry past its deadline
//! stays in memory until the next `get` of that exact key, a `delete`, a
//! `flush_all`, or a sweep (see [`crate::tasks::spawn_sweep_task`]).

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock as ConfigLock;
use tokio::sync::RwLock;
use tracing::debug;

use crate::cache::{BackendConfig, CacheBackend, CacheEntry, SetMode};
use crate::error::{CacheError, Result};

// == Memory Cache ==
/// In-process cache storage guarded by an async read/write lock.
#[derive(Debug, Default)]
pub struct MemoryCache {
    /// Key-value storage
    entries: RwLock<HashMap<String, CacheEntry>>,
    /// Defaults for writes without an explicit expiration
    config: ConfigLock<BackendConfig>,
}

impl MemoryCache {
    // == Constructor ==
    /// Creates an empty cache whose entries never expire by default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty cache with the given defaults.
    pub fn with_config(config: BackendConfig) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            config: ConfigLock::new(config),
        }
    }

    // == Purge Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub async fn purge_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired());
        before - entries.len()
    }

    // == Length ==
    /// Returns the number of physically stored entries, expired or not.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    // == Is Empty ==
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    fn write_entry(
        &self,
        entries: &mut HashMap<String, CacheEntry>,
        key: &str,
        value: &str,
        expire: Option<u64>,
    ) {
        let expire = self.config.read().effective_expire(expire);
        entries.insert(key.to_string(), CacheEntry::new(value.to_string(), expire));
    }
}

#[async_trait]
impl CacheBackend for MemoryCache {
    // == Set ==
    async fn set(&self, key: &str, value: &str, expire: Option<u64>) -> Result<()> {
        let mut entries = self.entries.write().await;
        self.write_entry(&mut entries, key, value, expire);
        debug!(key, "memory cache set");
        Ok(())
    }

    // == Set Many ==
    /// Writes every pair under one lock acquisition. Both modes behave alike.
    async fn set_many(
        &self,
        values: &[(String, String)],
        expire: Option<u64>,
        _mode: SetMode,
    ) -> Result<Vec<String>> {
        let mut entries = self.entries.write().await;
        for (key, value) in values {
            self.write_entry(&mut entries, key, value, expire);
        }
        debug!(count = values.len(), "memory cache set_many");
        Ok(Vec::new())
    }

    // == Get ==
    /// Returns the value if present and not expired.
    ///
    /// An expired entry is removed on the way out.
    async fn get(&self, key: &str) -> Result<Option<String>> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                None => return Ok(None),
                Some(entry) if !entry.is_expired() => {
                    debug!(key, ttl_ms = ?entry.ttl_remaining_ms(), "memory cache hit");
                    return Ok(Some(entry.value.clone()));
                }
                Some(_) => {}
            }
        }

        // Re-check under the write lock: another caller may have refreshed it.
        let mut entries = self.entries.write().await;
        match entries.get(key) {
            Some(entry) if entry.is_expired() => {
                entries.remove(key);
                debug!(key, "memory cache entry expired");
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    // == Get Many ==
    async fn get_many(&self, keys: &[String]) -> Result<Vec<(String, Option<String>)>> {
        let mut results = Vec::with_capacity(keys.len());
        for key in keys {
            results.push((key.clone(), self.get(key).await?));
        }
        Ok(results)
    }

    // == Replace ==
    async fn replace(&self, key: &str, value: &str, expire: Option<u64>) -> Result<()> {
        let mut entries = self.entries.write().await;
        if !entries.contains_key(key) {
            return Err(CacheError::KeyNotFound(key.to_string()));
        }
        self.write_entry(&mut entries, key, value, expire);
        Ok(())
    }

    // == Delete ==
    async fn delete(&self, keys: &[String]) -> Result<bool> {
        let mut entries = self.entries.write().await;
        for key in keys {
            entries.remove(key);
        }
        Ok(true)
    }

    // == Flush All ==
    async fn flush_all(&self) -> Result<bool> {
        self.entries.write().await.clear();
        Ok(true)
    }

    fn update_config(&self, update: BackendConfig) {
        self.config.write().merge(update);
    }

    fn config(&self) -> BackendConfig {
        *self.config.read()
    }

    /// Live entries only; expired ones are skipped but not removed.
    async fn snapshot(&self) -> Result<HashMap<String, String>> {
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .filter(|(_, entry)| !entry.is_expired())
            .map(|(key, entry)| (key.clone(), entry.value.clone()))
            .collect())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
