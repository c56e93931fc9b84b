//! Cache Module
//!
//! Backend-agnostic key/value caching with time-based expiration.
//!
//! - [`MemoryCache`]: in-process map with lazy expiry
//! - [`RemoteCache`]: any [`RemoteStore`] plus a local key registry
//! - [`RedisStore`]: the Redis implementation of [`RemoteStore`]

mod backend;
mod entry;
mod memory;
mod redis_store;
mod registry;
mod remote;
mod store;


// Re-export public types
pub use backend::{BackendConfig, CacheBackend, SetMode, SharedBackend};
pub use entry::{current_timestamp_ms, CacheEntry};
pub use memory::MemoryCache;
pub use redis_store::RedisStore;
pub use registry::KeyRegistry;
pub use remote::RemoteCache;
pub use store::{Batch, RemoteStore, StoreOp};
