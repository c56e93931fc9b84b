//! Expiry Sweep Task
//!
//! Background task that periodically purges expired in-process entries.
//! Reads keep expiring lazily whether or not the sweep runs.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::MemoryCache;

/// Spawns a task that purges expired entries of `cache` every
/// `interval_secs` seconds.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during shutdown.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(MemoryCache::new());
/// let sweep = spawn_sweep_task(cache.clone(), 30);
/// // Later, during shutdown:
/// sweep.abort();
/// ```
pub fn spawn_sweep_task(cache: Arc<MemoryCache>, interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs.max(1));

    tokio::spawn(async move {
        info!(interval_secs, "starting expiry sweep task");

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.purge_expired().await;
            if removed > 0 {
                info!(removed, "expiry sweep purged entries");
            } else {
                debug!("expiry sweep found nothing to purge");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheBackend;

    #[tokio::test]
    async fn test_sweep_removes_expired_entries() {
        let cache = Arc::new(MemoryCache::new());
        cache.set("expire_soon", "value", Some(1)).await.unwrap();

        let handle = spawn_sweep_task(cache.clone(), 1);

        tokio::time::sleep(Duration::from_millis(2500)).await;

        // Purged without any read of the key
        assert_eq!(cache.len().await, 0);

        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_preserves_live_entries() {
        let cache = Arc::new(MemoryCache::new());
        cache.set("long_lived", "value", Some(3600)).await.unwrap();
        cache.set("forever", "value", None).await.unwrap();

        let handle = spawn_sweep_task(cache.clone(), 1);

        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(cache.len().await, 2);
        assert_eq!(
            cache.get("long_lived").await.unwrap(),
            Some("value".to_string())
        );

        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_can_be_aborted() {
        let cache = Arc::new(MemoryCache::new());

        let handle = spawn_sweep_task(cache, 1);
        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
