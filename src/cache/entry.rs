//! Cache Entry Module
//!
//! Defines the structure for individual in-process entries with expiry support.

use chrono::Utc;

// == Cache Entry ==
/// A stored value and its optional absolute expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// The stored value
    pub value: String,
    /// Expiration timestamp (Unix milliseconds), None = never expires
    pub expires_at: Option<i64>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry expiring `expire_seconds` from now.
    ///
    /// `None` and `Some(0)` both mean the entry never expires.
    pub fn new(value: String, expire_seconds: Option<u64>) -> Self {
        let expires_at = match expire_seconds {
            Some(secs) if secs > 0 => {
                let secs = i64::try_from(secs).unwrap_or(i64::MAX);
                Some(current_timestamp_ms().saturating_add(secs.saturating_mul(1000)))
            }
            _ => None,
        };

        Self { value, expires_at }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired only once the current time is strictly past
    /// `expires_at`.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_timestamp_ms())
    }

    pub(crate) fn is_expired_at(&self, now_ms: i64) -> bool {
        matches!(self.expires_at, Some(expires) if now_ms > expires)
    }

    // == Time To Live ==
    /// Returns remaining lifetime in milliseconds, or None if no expiration is set.
    pub fn ttl_remaining_ms(&self) -> Option<u64> {
        self.expires_at
            .map(|expires| (expires - current_timestamp_ms()).max(0) as u64)
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> i64 {
    Utc::now().timestamp_millis()
}
