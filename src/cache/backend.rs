//! Cache Backend Interface
//!
//! The contract every storage strategy implements, plus the defaults that
//! apply to writes without an explicit expiration.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Shared handle to any backend.
pub type SharedBackend = Arc<dyn CacheBackend>;

// == Backend Config ==
/// Defaults applied to writes that do not carry their own expiration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Default expiration in seconds; `None` or `Some(0)` means never expire
    pub default_expire: Option<u64>,
}

impl BackendConfig {
    /// Creates a config with the given default expiration.
    pub fn with_default_expire(seconds: u64) -> Self {
        Self {
            default_expire: Some(seconds),
        }
    }

    /// Merges `update` into `self`; fields set in the update win.
    pub fn merge(&mut self, update: BackendConfig) {
        if update.default_expire.is_some() {
            self.default_expire = update.default_expire;
        }
    }

    /// Resolves the expiration for one write.
    ///
    /// Returns `None` when the write never expires.
    pub fn effective_expire(&self, expire: Option<u64>) -> Option<u64> {
        expire.or(self.default_expire).filter(|secs| *secs > 0)
    }
}

// == Set Mode ==
/// How `set_many` presents its values to the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SetMode {
    /// One SET per key, so each value keeps its own type and acknowledgement
    #[default]
    PreserveType,
    /// A single MSET when no expiration applies
    Bulk,
}

// == Cache Backend Trait ==
/// Uniform key/value cache operations.
///
/// Absence is never an error for reads and deletes: `get` returns `None` and
/// `delete` of an unknown key succeeds. Implementations propagate every
/// store failure to the caller.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Stores `value` under `key`. `expire` overrides the configured default.
    async fn set(&self, key: &str, value: &str, expire: Option<u64>) -> Result<()>;

    /// Stores all `values` in one submission.
    ///
    /// Returns the keys the store did not acknowledge, empty on success.
    async fn set_many(
        &self,
        values: &[(String, String)],
        expire: Option<u64>,
        mode: SetMode,
    ) -> Result<Vec<String>>;

    /// Reads a value. Never creates an entry for an absent key.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Reads several values, returned in input order.
    async fn get_many(&self, keys: &[String]) -> Result<Vec<(String, Option<String>)>>;

    /// Overwrites a key this instance already knows about.
    ///
    /// Fails with `KeyNotFound` otherwise.
    async fn replace(&self, key: &str, value: &str, expire: Option<u64>) -> Result<()>;

    /// Removes zero or more keys.
    async fn delete(&self, keys: &[String]) -> Result<bool>;

    /// Removes every key this instance is aware of.
    async fn flush_all(&self) -> Result<bool>;

    /// Merges new defaults into the backend config.
    fn update_config(&self, update: BackendConfig);

    /// Current defaults.
    fn config(&self) -> BackendConfig;

    /// Point-in-time view of this instance's contents.
    async fn snapshot(&self) -> Result<HashMap<String, String>>;

    /// Short name used in log lines.
    fn backend_name(&self) -> &'static str;
}
