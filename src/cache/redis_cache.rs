//! Redis Cache Module
//!
//! `CacheBackend` over a Redis server using a shared multiplexed connection.

use std::fmt::Debug;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client};
use tokio::sync::RwLock;

use crate::cache::CacheBackend;
use crate::error::CacheError;

// == Redis Cache ==
/// Redis-backed cache store.
///
/// The connection is opened on first use and reused afterwards, so the
/// server can start while Redis is still down; calls fail with
/// `CacheError::Unavailable` until it comes up.
pub struct RedisCache {
    url: String,
    client: Client,
    connection: RwLock<Option<MultiplexedConnection>>,
}

impl Debug for RedisCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let connection_status = match self.connection.try_read() {
            Ok(conn) if conn.is_some() => "connected",
            Ok(_) => "no_connection",
            Err(_) => "lock_error",
        };

        f.debug_struct("RedisCache")
            .field("url", &self.url)
            .field("connected", &connection_status)
            .finish()
    }
}

impl RedisCache {
    /// Validates the URL; does not connect.
    pub fn open(redis_url: &str) -> Result<Self, CacheError> {
        let client = Client::open(redis_url)?;

        Ok(Self {
            url: redis_url.to_string(),
            client,
            connection: RwLock::new(None),
        })
    }

    /// Get or create the shared connection.
    async fn connection(&self) -> Result<MultiplexedConnection, CacheError> {
        if let Some(conn) = self.connection.read().await.as_ref() {
            return Ok(conn.clone());
        }

        let mut slot = self.connection.write().await;
        if let Some(conn) = slot.as_ref() {
            return Ok(conn.clone());
        }

        let conn = self.client.get_multiplexed_async_connection().await?;
        *slot = Some(conn.clone());
        Ok(conn)
    }
}

#[async_trait]
impl CacheBackend for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.connection().await?;
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: String, ttl_secs: u64) -> Result<(), CacheError> {
        if ttl_secs == 0 {
            return Err(CacheError::InvalidTtl(ttl_secs));
        }

        let mut conn = self.connection().await?;
        let _: () = conn.set_ex(key, value, ttl_secs).await?;
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> Result<u64, CacheError> {
        let mut conn = self.connection().await?;
        let deleted: u64 = conn.del(keys.to_vec()).await?;
        Ok(deleted)
    }

    async fn incr(&self, key: &str) -> Result<i64, CacheError> {
        let mut conn = self.connection().await?;
        let value: i64 = conn.incr(key, 1i64).await?;
        Ok(value)
    }

    async fn counter(&self, key: &str) -> Result<i64, CacheError> {
        let mut conn = self.connection().await?;
        let value: Option<i64> = conn.get(key).await?;
        Ok(value.unwrap_or(0))
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, CacheError> {
        let pattern = format!("{}*", escape_glob(prefix));
        let mut conn = self.connection().await?;
        let keys: Vec<String> = conn.keys(pattern).await?;
        Ok(keys)
    }

    async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

/// Escapes glob metacharacters so a prefix matches literally in `KEYS`.
fn escape_glob(prefix: &str) -> String {
    let mut escaped = String::with_capacity(prefix.len());
    for ch in prefix.chars() {
        if matches!(ch, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
