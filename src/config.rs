//! Configuration Module
//!
//! Backend construction parameters, loaded from environment variables or
//! from a flat key/value section of a configuration file.

use std::collections::HashMap;
use std::env;

use serde::{Deserialize, Serialize};

use crate::cache::BackendConfig;

/// Which backend the application should build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackendKind {
    Memory,
    Redis,
}

impl BackendKind {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" | "dict" => Some(BackendKind::Memory),
            "redis" => Some(BackendKind::Redis),
            _ => None,
        }
    }
}

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Backend to construct
    pub backend: BackendKind,
    /// Default expiration in seconds for writes without one; None = never
    pub default_expire: Option<u64>,
    /// Redis connection parameters, used when `backend` is Redis
    pub redis: RedisSettings,
    /// Interval in seconds for the in-process sweep task; None = lazy expiry only
    pub sweep_interval: Option<u64>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_BACKEND` - `memory` or `redis` (default: memory)
    /// - `CACHE_DEFAULT_EXPIRE` - Default expiration in seconds (default: none)
    /// - `CACHE_SWEEP_INTERVAL` - Sweep interval in seconds (default: none)
    /// - `REDIS_URL`, `REDIS_HOST`, `REDIS_PORT`, `REDIS_PASSWORD`, `REDIS_DB`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let redis_defaults = RedisSettings::default();

        Self {
            backend: env::var("CACHE_BACKEND")
                .ok()
                .and_then(|v| BackendKind::parse(&v))
                .unwrap_or(defaults.backend),
            default_expire: parse_env("CACHE_DEFAULT_EXPIRE"),
            sweep_interval: parse_env("CACHE_SWEEP_INTERVAL").filter(|secs| *secs > 0),
            redis: RedisSettings {
                url: env::var("REDIS_URL").ok().filter(|v| !v.is_empty()),
                host: env::var("REDIS_HOST").unwrap_or(redis_defaults.host),
                port: parse_env("REDIS_PORT").unwrap_or(redis_defaults.port),
                password: env::var("REDIS_PASSWORD").ok().filter(|v| !v.is_empty()),
                db: parse_env("REDIS_DB").unwrap_or(redis_defaults.db),
                default_expire: None,
            },
        }
    }

    /// Defaults to hand to the backend constructor.
    pub fn backend_config(&self) -> BackendConfig {
        BackendConfig {
            default_expire: self.default_expire,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendKind::Memory,
            default_expire: None,
            redis: RedisSettings::default(),
            sweep_interval: None,
        }
    }
}

// == Redis Settings ==
/// Connection parameters for a Redis store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedisSettings {
    /// Full URL; takes precedence over host/port/password/db
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
    pub db: i64,
    /// Default expiration for the backend built on this store
    pub default_expire: Option<u64>,
}

impl RedisSettings {
    /// Builds settings from one configuration section.
    ///
    /// Recognised options: `url`, `host`, `port`, `password`, `db`, `dexp`.
    /// Unparseable numbers fall back to defaults and other options are ignored.
    pub fn from_section(section: &HashMap<String, String>) -> Self {
        let defaults = Self::default();
        let get = |name: &str| {
            section
                .get(name)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
        };

        Self {
            url: get("url").map(str::to_string),
            host: get("host").map(str::to_string).unwrap_or(defaults.host),
            port: get("port").and_then(|v| v.parse().ok()).unwrap_or(defaults.port),
            password: get("password").map(str::to_string),
            db: get("db").and_then(|v| v.parse().ok()).unwrap_or(defaults.db),
            default_expire: get("dexp").and_then(|v| v.parse().ok()),
        }
    }

    /// URL handed to the Redis client.
    pub fn connection_url(&self) -> String {
        if let Some(url) = &self.url {
            return url.clone();
        }
        match &self.password {
            Some(password) => format!(
                "redis://:{}@{}:{}/{}",
                password, self.host, self.port, self.db
            ),
            None => format!("redis://{}:{}/{}", self.host, self.port, self.db),
        }
    }
}

impl Default for RedisSettings {
    fn default() -> Self {
        Self {
            url: None,
            host: "127.0.0.1".to_string(),
            port: 6379,
            password: None,
            db: 0,
            default_expire: None,
        }
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}
