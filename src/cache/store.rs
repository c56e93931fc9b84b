//! Remote Store Module
//!
//! The capability a remote-store backend consumes: plain reads and writes
//! plus an atomically executed batch of operations.

use async_trait::async_trait;

use crate::error::Result;

// == Store Operation ==
/// One operation inside a [`Batch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    /// Write a single value without expiry
    Set { key: String, value: String },
    /// Write several values at once without expiry
    MSet(Vec<(String, String)>),
    /// Set a key's time-to-live in seconds
    Expire { key: String, seconds: u64 },
}

// == Batch ==
/// Ordered list of operations submitted to the store in one go.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
    ops: Vec<StoreOp>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: &str, value: &str) -> &mut Self {
        self.ops.push(StoreOp::Set {
            key: key.to_string(),
            value: value.to_string(),
        });
        self
    }

    pub fn mset(&mut self, values: &[(String, String)]) -> &mut Self {
        self.ops.push(StoreOp::MSet(values.to_vec()));
        self
    }

    pub fn expire(&mut self, key: &str, seconds: u64) -> &mut Self {
        self.ops.push(StoreOp::Expire {
            key: key.to_string(),
            seconds,
        });
        self
    }

    pub fn ops(&self) -> &[StoreOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

// == Remote Store Trait ==
/// Networked key/value store reached by a remote-store backend.
///
/// Every transport failure surfaces as `CacheError::BackendUnavailable`.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Writes a value, with a time-to-live when `expire` is set.
    async fn set(&self, key: &str, value: &str, expire: Option<u64>) -> Result<()>;

    /// Writes several values without expiry.
    async fn mset(&self, values: &[(String, String)]) -> Result<()>;

    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Reads several values, one slot per key in input order.
    async fn mget(&self, keys: &[String]) -> Result<Vec<Option<String>>>;

    /// Deletes keys and returns how many existed.
    async fn delete(&self, keys: &[String]) -> Result<u64>;

    /// Sets a key's time-to-live. Returns false if the key does not exist.
    async fn expire(&self, key: &str, seconds: u64) -> Result<bool>;

    /// Applies every operation of `batch` or none of them.
    ///
    /// Returns one acknowledgement per operation, in batch order.
    async fn execute_atomic(&self, batch: Batch) -> Result<Vec<bool>>;
}
