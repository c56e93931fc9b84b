//! easycache - key/value caching with expiration
//!
//! Provides an in-process backend, a Redis-backed backend that tracks the keys
//! it owns, and wrappers that turn a computation into a cached one.

pub mod cache;
pub mod config;
pub mod decorator;
pub mod defaults;
pub mod error;
pub mod tasks;

pub use cache::{BackendConfig, CacheBackend, MemoryCache, RemoteCache, SetMode, SharedBackend};
pub use config::Config;
pub use decorator::{CacheDecorator, CallArgs, KeyTemplate};
pub use defaults::BackendRegistry;
pub use error::{CacheError, Result};
pub use tasks::spawn_sweep_task;
