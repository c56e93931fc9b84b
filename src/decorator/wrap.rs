//! Function wrapping: read-through caching and invalidate-on-call.
//!
//! ```ignore
//! let cached = CacheDecorator::new()
//!     .backend(backend)
//!     .caching_key("user:{id}")
//!     .ignore_errors(true)
//!     .wrap(|args: CallArgs| async move { load_user(args).await })?;
//!
//! let user: User = cached.call(CallArgs::new().kwarg("id", 7)).await?;
//! ```

use std::fmt;
use std::future::Future;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::cache::{BackendConfig, SharedBackend};
use crate::decorator::{KeyArgs, KeyTemplate};
use crate::defaults::BackendRegistry;
use crate::error::{CacheError, Result};

// == Wrap Policy ==
/// Behaviour bound to a wrapped function.
pub enum WrapPolicy<A> {
    /// Serve from the cache, computing and storing on a miss
    Caching(KeyTemplate<A>),
    /// Delete the key, then always compute
    Invalidation(KeyTemplate<A>),
}

impl<A> WrapPolicy<A> {
    pub fn template(&self) -> &KeyTemplate<A> {
        match self {
            WrapPolicy::Caching(t) | WrapPolicy::Invalidation(t) => t,
        }
    }
}

impl<A> Clone for WrapPolicy<A> {
    fn clone(&self) -> Self {
        match self {
            WrapPolicy::Caching(t) => WrapPolicy::Caching(t.clone()),
            WrapPolicy::Invalidation(t) => WrapPolicy::Invalidation(t.clone()),
        }
    }
}

impl<A> fmt::Debug for WrapPolicy<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WrapPolicy::Caching(t) => f.debug_tuple("Caching").field(t).finish(),
            WrapPolicy::Invalidation(t) => f.debug_tuple("Invalidation").field(t).finish(),
        }
    }
}

// == Cache Decorator ==
/// Builder for a [`CachedFn`].
///
/// Exactly one of `caching_key` and `expiry_key` must be supplied. Without an
/// explicit backend, the default backend of the injected registry (or of
/// [`BackendRegistry::global`]) is used.
pub struct CacheDecorator<A> {
    backend: Option<SharedBackend>,
    caching_key: Option<KeyTemplate<A>>,
    expiry_key: Option<KeyTemplate<A>>,
    ignore_errors: bool,
    default_expire: Option<u64>,
}

impl<A: KeyArgs> CacheDecorator<A> {
    pub fn new() -> Self {
        Self {
            backend: None,
            caching_key: None,
            expiry_key: None,
            ignore_errors: false,
            default_expire: None,
        }
    }

    /// Binds an explicit backend.
    pub fn backend(mut self, backend: SharedBackend) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Binds the default backend of `registry`.
    pub fn registry(mut self, registry: &BackendRegistry) -> Self {
        self.backend = Some(registry.backend());
        self
    }

    /// Read-through caching under this key.
    pub fn caching_key(mut self, key: impl Into<KeyTemplate<A>>) -> Self {
        self.caching_key = Some(key.into());
        self
    }

    /// Invalidate this key on every call.
    pub fn expiry_key(mut self, key: impl Into<KeyTemplate<A>>) -> Self {
        self.expiry_key = Some(key.into());
        self
    }

    /// Swallow cache failures (logged as warnings) instead of returning them.
    pub fn ignore_errors(mut self, ignore: bool) -> Self {
        self.ignore_errors = ignore;
        self
    }

    /// Sets the bound backend's default expiration when wrapping.
    ///
    /// This updates the backend itself, so every user of a shared backend
    /// sees the new default.
    pub fn default_expire(mut self, seconds: u64) -> Self {
        self.default_expire = Some(seconds);
        self
    }

    // == Wrap ==
    /// Builds the wrapped function.
    ///
    /// Fails with `InvalidOptions` unless exactly one key was supplied.
    pub fn wrap<F>(self, func: F) -> Result<CachedFn<A, F>> {
        let policy = match (self.caching_key, self.expiry_key) {
            (Some(key), None) => WrapPolicy::Caching(key),
            (None, Some(key)) => WrapPolicy::Invalidation(key),
            (Some(_), Some(_)) => {
                return Err(CacheError::InvalidOptions(
                    "caching_key and expiry_key are mutually exclusive".to_string(),
                ))
            }
            (None, None) => {
                return Err(CacheError::InvalidOptions(
                    "expecting one of caching_key, expiry_key".to_string(),
                ))
            }
        };

        let backend = self
            .backend
            .unwrap_or_else(|| BackendRegistry::global().backend());

        if let Some(seconds) = self.default_expire {
            backend.update_config(BackendConfig::with_default_expire(seconds));
        }

        Ok(CachedFn {
            backend,
            policy,
            ignore_errors: self.ignore_errors,
            func,
        })
    }
}

impl<A: KeyArgs> Default for CacheDecorator<A> {
    fn default() -> Self {
        Self::new()
    }
}

// == Cached Fn ==
/// A computation bound to a backend and a [`WrapPolicy`].
///
/// Concurrent calls that miss on the same key may all compute and store.
pub struct CachedFn<A, F> {
    backend: SharedBackend,
    policy: WrapPolicy<A>,
    ignore_errors: bool,
    func: F,
}

impl<A, F> CachedFn<A, F> {
    pub fn policy(&self) -> &WrapPolicy<A> {
        &self.policy
    }

    pub fn backend(&self) -> &SharedBackend {
        &self.backend
    }
}

impl<A: KeyArgs, F> CachedFn<A, F> {
    // == Call ==
    /// Runs one call under the bound policy.
    ///
    /// The computation's own errors are returned unchanged. Cache failures
    /// are returned as `E::from(CacheError)` unless errors are ignored.
    pub async fn call<Fut, T, E>(&self, args: A) -> std::result::Result<T, E>
    where
        F: Fn(A) -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        T: Serialize + DeserializeOwned,
        E: From<CacheError>,
    {
        let key = match self.policy.template().resolve(&args) {
            Ok(key) => Some(key),
            Err(err) => {
                self.cache_failure::<E>(err)?;
                None
            }
        };

        match (&self.policy, key) {
            (WrapPolicy::Caching(_), Some(key)) => {
                match self.lookup::<T>(&key).await {
                    Ok(Some(value)) => {
                        debug!(key = %key, "cache hit");
                        return Ok(value);
                    }
                    Ok(None) => debug!(key = %key, "cache miss"),
                    Err(err) => self.cache_failure::<E>(err)?,
                }

                let result = (self.func)(args).await?;
                if let Err(err) = self.store(&key, &result).await {
                    self.cache_failure::<E>(err)?;
                }
                Ok(result)
            }
            (WrapPolicy::Invalidation(_), Some(key)) => {
                if let Err(err) = self.backend.delete(&[key.clone()]).await {
                    self.cache_failure::<E>(err)?;
                } else {
                    debug!(key = %key, "cache key invalidated");
                }
                (self.func)(args).await
            }
            (_, None) => (self.func)(args).await,
        }
    }

    async fn lookup<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(raw) = self.backend.get(key).await? else {
            return Ok(None);
        };
        let value: Value = serde_json::from_str(&raw)?;
        if is_empty_value(&value) {
            return Ok(None);
        }
        Ok(Some(serde_json::from_value(value)?))
    }

    async fn store<T: Serialize>(&self, key: &str, result: &T) -> Result<()> {
        let encoded = serde_json::to_string(result)?;
        self.backend.set(key, &encoded, None).await
    }

    fn cache_failure<E: From<CacheError>>(&self, err: CacheError) -> std::result::Result<(), E> {
        if self.ignore_errors {
            warn!(
                backend = self.backend.backend_name(),
                error = %err,
                "cache unavailable, calling through"
            );
            Ok(())
        } else {
            Err(E::from(err))
        }
    }
}

impl<A, F> fmt::Debug for CachedFn<A, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedFn")
            .field("backend", &self.backend.backend_name())
            .field("policy", &self.policy)
            .field("ignore_errors", &self.ignore_errors)
            .finish()
    }
}

/// Values never served from the cache: they are recomputed on every call.
fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}
