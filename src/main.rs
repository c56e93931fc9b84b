//! easycache demo
//!
//! Exercises a cache backend and the function wrapper end to end, against the
//! in-process backend or Redis depending on `CACHE_BACKEND`.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use easycache::cache::{RedisStore, SetMode};
use easycache::config::BackendKind;
use easycache::{
    spawn_sweep_task, BackendRegistry, CacheBackend, CacheDecorator, CacheError, CallArgs,
    Config, MemoryCache, RemoteCache, SharedBackend,
};

/// Demo entry point.
///
/// # Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the configured backend and make it the default
/// 4. Run the backend operations walkthrough
/// 5. Run the wrapped-function walkthrough
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "easycache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!(
        backend = ?config.backend,
        default_expire = ?config.default_expire,
        sweep_interval = ?config.sweep_interval,
        "configuration loaded"
    );

    let registry = BackendRegistry::new();
    let mut sweep = None;
    let backend: SharedBackend = match config.backend {
        BackendKind::Memory => {
            let cache = Arc::new(MemoryCache::with_config(config.backend_config()));
            if let Some(interval) = config.sweep_interval {
                sweep = Some(spawn_sweep_task(cache.clone(), interval));
            }
            let shared: SharedBackend = cache;
            shared
        }
        BackendKind::Redis => {
            let store = RedisStore::from_settings(&config.redis)
                .await
                .context("connecting to redis")?;
            info!(server = %store.server_address(), "redis store ready");
            Arc::new(RemoteCache::with_config(store, config.backend_config()))
        }
    };
    registry.set_backend(backend);

    walkthrough(registry.backend().as_ref()).await?;
    wrapped_walkthrough(&registry).await?;

    if let Some(handle) = sweep {
        handle.abort();
    }
    Ok(())
}

async fn walkthrough(cache: &dyn CacheBackend) -> anyhow::Result<()> {
    cache.set("YZ", "yz", None).await?;
    let contents = cache.snapshot().await?;
    info!(?contents, "after set");

    let values = vec![
        ("GOOGLE".to_string(), "google".to_string()),
        ("APPLE".to_string(), "apple".to_string()),
    ];
    cache.set_many(&values, None, SetMode::PreserveType).await?;
    let keys = ["GOOGLE", "APPLE", "NONE"].map(String::from);
    let values = cache.get_many(&keys).await?;
    info!(?values, "after set_many");

    cache.set("DJI", "dji", Some(2)).await?;
    let value = cache.get("DJI").await?;
    info!(?value, "before expiry");
    tokio::time::sleep(Duration::from_millis(2100)).await;
    let value = cache.get("DJI").await?;
    info!(?value, "after expiry");

    cache.delete(&["GOOGLE".to_string()]).await?;
    let contents = cache.snapshot().await?;
    info!(?contents, "after delete");

    cache.flush_all().await?;
    let contents = cache.snapshot().await?;
    info!(?contents, "after flush_all");
    Ok(())
}

async fn wrapped_walkthrough(registry: &BackendRegistry) -> anyhow::Result<()> {
    let started = std::time::Instant::now();
    let cur_time = CacheDecorator::new()
        .registry(registry)
        .caching_key("cur_time")
        .default_expire(2)
        .ignore_errors(true)
        .wrap(move |_: CallArgs| async move {
            Ok::<_, CacheError>(started.elapsed().as_millis() as u64 + 1)
        })?;

    let value: u64 = cur_time.call(CallArgs::new()).await?;
    info!(value, "initial call");
    tokio::time::sleep(Duration::from_secs(1)).await;
    let value: u64 = cur_time.call(CallArgs::new()).await?;
    info!(value, "within caching lifetime");
    tokio::time::sleep(Duration::from_secs(2)).await;
    let value: u64 = cur_time.call(CallArgs::new()).await?;
    info!(value, "new caching lifetime");
    Ok(())
}
