//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for cache backends and the wrapping layer.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key is not known to this backend instance (raised by `replace`)
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    /// Transport or connection failure from the remote store
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Decorator built with a missing or conflicting option
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    /// Key pattern could not be rendered from the call arguments
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Cached value could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        CacheError::BackendUnavailable(err.to_string())
    }
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
