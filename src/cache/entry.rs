//! Cache Entry Module
//!
//! A stored payload and its optional expiry deadline.

use std::time::{SystemTime, UNIX_EPOCH};

// == Cache Entry ==
/// A single value held by the in-process cache.
///
/// Counters are stored as entries without a deadline; cached lookups always
/// carry one.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Serialized payload, or the decimal text of a counter
    pub value: String,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    pub expires_at: Option<u64>,
}

impl CacheEntry {
    // == Constructors ==
    /// Creates an entry that expires `ttl_secs` seconds from now.
    ///
    /// Deadlines past the end of the clock are pinned to `u64::MAX`.
    pub fn expiring(value: String, ttl_secs: u64) -> Self {
        let deadline = current_timestamp_ms().saturating_add(ttl_secs.saturating_mul(1000));
        Self {
            value,
            expires_at: Some(deadline),
        }
    }

    // == Is Expired ==
    /// An entry is expired once the current time reaches its deadline.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_timestamp_ms())
    }

    pub fn is_expired_at(&self, now_ms: u64) -> bool {
        matches!(self.expires_at, Some(deadline) if now_ms >= deadline)
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
