//! In-Process Cache Module
//!
//! HashMap-backed key-value store with TTL expiration and counters.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::cache::entry::current_timestamp_ms;
use crate::cache::{CacheBackend, CacheEntry};
use crate::error::CacheError;

// == Memory Cache ==
/// Key-value store living inside the process.
///
/// Expired entries are invisible to readers as soon as their deadline
/// passes; `cleanup_expired` reclaims their memory.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryCache {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub async fn cleanup_expired(&self) -> usize {
        let now = current_timestamp_ms();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired_at(now));
        before - entries.len()
    }

    // == Length ==
    /// Number of stored entries, including expired ones not yet swept.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

fn parse_counter(key: &str, value: &str) -> Result<i64, CacheError> {
    value.parse().map_err(|_| {
        CacheError::Unavailable(format!("value at '{}' is not an integer", key))
    })
}

#[async_trait]
impl CacheBackend for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.value.clone()))
    }

    async fn set(&self, key: &str, value: String, ttl_secs: u64) -> Result<(), CacheError> {
        if ttl_secs == 0 {
            return Err(CacheError::InvalidTtl(ttl_secs));
        }

        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), CacheEntry::expiring(value, ttl_secs));
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> Result<u64, CacheError> {
        let now = current_timestamp_ms();
        let mut entries = self.entries.write().await;

        let removed = keys
            .iter()
            .filter_map(|key| entries.remove(key))
            .filter(|entry| !entry.is_expired_at(now))
            .count();
        Ok(removed as u64)
    }

    async fn incr(&self, key: &str) -> Result<i64, CacheError> {
        let mut entries = self.entries.write().await;

        // An increment keeps whatever deadline the key already had.
        let (current, expires_at) = match entries.get(key).filter(|entry| !entry.is_expired()) {
            Some(entry) => (parse_counter(key, &entry.value)?, entry.expires_at),
            None => (0, None),
        };
        let next = current + 1;

        entries.insert(
            key.to_string(),
            CacheEntry {
                value: next.to_string(),
                expires_at,
            },
        );
        Ok(next)
    }

    async fn counter(&self, key: &str) -> Result<i64, CacheError> {
        match self.get(key).await? {
            Some(value) => parse_counter(key, &value),
            None => Ok(0),
        }
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, CacheError> {
        let now = current_timestamp_ms();
        let entries = self.entries.read().await;

        let mut keys: Vec<String> = entries
            .iter()
            .filter(|(key, entry)| key.starts_with(prefix) && !entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        Ok(keys)
    }

    async fn ping(&self) -> Result<(), CacheError> {
        Ok(())
    }
}
