//! Cache Backend Module
//!
//! The contract the caching layer expects from a key-value store, and a
//! bounded handle that every caller goes through.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::CacheError;

// == Cache Backend ==
/// Key-value store with native expiry and atomic counters.
///
/// Implementations must be safe to share between tasks; every consistency
/// guarantee of the caching layer relies on these calls being atomic.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Returns the payload stored under `key`, if present and not expired.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Stores `value` under `key`, expiring after `ttl_secs` seconds.
    async fn set(&self, key: &str, value: String, ttl_secs: u64) -> Result<(), CacheError>;

    /// Removes every listed key in a single atomic step.
    /// Returns how many keys existed.
    async fn delete(&self, keys: &[String]) -> Result<u64, CacheError>;

    /// Atomically increments the counter at `key`, starting from 0.
    async fn incr(&self, key: &str) -> Result<i64, CacheError>;

    /// Reads the counter at `key`; an absent counter reads as 0.
    async fn counter(&self, key: &str) -> Result<i64, CacheError>;

    /// Lists every key starting with `prefix`.
    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, CacheError>;

    async fn ping(&self) -> Result<(), CacheError>;
}

// == Cache Handle ==
/// Shared, cloneable access to a cache backend with a per-call timeout.
#[derive(Clone)]
pub struct CacheHandle {
    backend: Arc<dyn CacheBackend>,
    timeout: Duration,
}

impl std::fmt::Debug for CacheHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheHandle")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl CacheHandle {
    pub fn new(backend: Arc<dyn CacheBackend>, timeout: Duration) -> Self {
        Self { backend, timeout }
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.bounded(self.backend.get(key)).await
    }

    pub async fn set(&self, key: &str, value: String, ttl_secs: u64) -> Result<(), CacheError> {
        self.bounded(self.backend.set(key, value, ttl_secs)).await
    }

    pub async fn delete(&self, keys: &[String]) -> Result<u64, CacheError> {
        if keys.is_empty() {
            return Ok(0);
        }
        self.bounded(self.backend.delete(keys)).await
    }

    pub async fn incr(&self, key: &str) -> Result<i64, CacheError> {
        self.bounded(self.backend.incr(key)).await
    }

    pub async fn counter(&self, key: &str) -> Result<i64, CacheError> {
        self.bounded(self.backend.counter(key)).await
    }

    pub async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, CacheError> {
        self.bounded(self.backend.keys_with_prefix(prefix)).await
    }

    pub async fn ping(&self) -> Result<(), CacheError> {
        self.bounded(self.backend.ping()).await
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, CacheError>>,
    ) -> Result<T, CacheError> {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| CacheError::Timeout)?
    }
}
