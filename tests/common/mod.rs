//! Shared test fixtures.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;

use easycache::cache::{Batch, RemoteStore, StoreOp};
use easycache::{CacheError, Result};

/// In-memory stand-in for a Redis server.
///
/// Batches are applied under one lock, so they are all-or-nothing. Setting
/// `offline` makes every call fail like a dropped connection.
#[derive(Debug, Default)]
pub struct FakeStore {
    data: Mutex<HashMap<String, (String, Option<Instant>)>>,
    batches: Mutex<Vec<Batch>>,
    offline: AtomicBool,
    refused: Mutex<HashSet<String>>,
    pub calls: AtomicUsize,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Makes transactional SETs of `key` answer Nil, as a refused write does.
    pub fn refuse(&self, key: &str) {
        self.refused.lock().insert(key.to_string());
    }

    /// Raw write that bypasses any cache bookkeeping.
    pub fn seed(&self, key: &str, value: &str) {
        self.data
            .lock()
            .insert(key.to_string(), (value.to_string(), None));
    }

    pub fn contains(&self, key: &str) -> bool {
        self.live(key).is_some()
    }

    pub fn ttl(&self, key: &str) -> Option<Duration> {
        self.data
            .lock()
            .get(key)
            .and_then(|(_, deadline)| *deadline)
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    pub fn batches(&self) -> Vec<Batch> {
        self.batches.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.data.lock().len()
    }

    fn check(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(CacheError::BackendUnavailable(
                "connection refused".to_string(),
            ));
        }
        Ok(())
    }

    fn live(&self, key: &str) -> Option<String> {
        let mut data = self.data.lock();
        match data.get(key) {
            Some((_, Some(deadline))) if Instant::now() >= *deadline => {
                data.remove(key);
                None
            }
            Some((value, _)) => Some(value.clone()),
            None => None,
        }
    }
}

fn deadline(seconds: u64) -> Option<Instant> {
    Some(Instant::now() + Duration::from_secs(seconds))
}

#[async_trait]
impl RemoteStore for FakeStore {
    async fn set(&self, key: &str, value: &str, expire: Option<u64>) -> Result<()> {
        self.check()?;
        self.data
            .lock()
            .insert(key.to_string(), (value.to_string(), expire.and_then(deadline)));
        Ok(())
    }

    async fn mset(&self, values: &[(String, String)]) -> Result<()> {
        self.check()?;
        let mut data = self.data.lock();
        for (key, value) in values {
            data.insert(key.clone(), (value.clone(), None));
        }
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.check()?;
        Ok(self.live(key))
    }

    async fn mget(&self, keys: &[String]) -> Result<Vec<Option<String>>> {
        self.check()?;
        Ok(keys.iter().map(|k| self.live(k)).collect())
    }

    async fn delete(&self, keys: &[String]) -> Result<u64> {
        self.check()?;
        let mut data = self.data.lock();
        Ok(keys.iter().filter(|k| data.remove(*k).is_some()).count() as u64)
    }

    async fn expire(&self, key: &str, seconds: u64) -> Result<bool> {
        self.check()?;
        match self.data.lock().get_mut(key) {
            Some(entry) => {
                entry.1 = deadline(seconds);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn execute_atomic(&self, batch: Batch) -> Result<Vec<bool>> {
        self.check()?;
        let refused = self.refused.lock().clone();
        let mut data = self.data.lock();
        let mut acks = Vec::with_capacity(batch.len());
        for op in batch.ops() {
            match op {
                StoreOp::Set { key, value } => {
                    if refused.contains(key) {
                        acks.push(false);
                    } else {
                        data.insert(key.clone(), (value.clone(), None));
                        acks.push(true);
                    }
                }
                StoreOp::MSet(values) => {
                    for (key, value) in values {
                        data.insert(key.clone(), (value.clone(), None));
                    }
                    acks.push(true);
                }
                StoreOp::Expire { key, seconds } => match data.get_mut(key) {
                    Some(entry) => {
                        entry.1 = deadline(*seconds);
                        acks.push(true);
                    }
                    None => acks.push(false),
                },
            }
        }
        drop(data);
        self.batches.lock().push(batch);
        Ok(acks)
    }
}
