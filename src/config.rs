//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::repository::CachePolicy;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Redis connection string; the in-process cache is used when absent
    pub redis_url: Option<String>,
    /// Key prefix for every cache entry derived from the entity collection
    pub namespace: String,
    /// Document store collection holding the entities
    pub collection: String,
    /// Field matched by free-text search and required on create
    pub search_field: String,
    /// TTL in seconds for single-entity lookups
    pub entity_ttl: u64,
    /// TTL in seconds for list lookups
    pub list_ttl: u64,
    /// TTL in seconds for search lookups
    pub search_ttl: u64,
    /// Maximum number of records returned by a search
    pub search_limit: usize,
    /// List limit whose cache entry is invalidated on writes
    pub default_list_limit: usize,
    /// Timeout applied to every document store call
    pub store_timeout_ms: u64,
    /// Timeout applied to every cache store call
    pub cache_timeout_ms: u64,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 5000)
    /// - `REDIS_URL` - Redis connection string (default: unset)
    /// - `CACHE_NAMESPACE` - Cache key namespace (default: product)
    /// - `COLLECTION` - Document collection (default: products)
    /// - `SEARCH_FIELD` - Searched field (default: nombre)
    /// - `ENTITY_TTL` / `LIST_TTL` / `SEARCH_TTL` - TTLs in seconds (3600 / 300 / 60)
    /// - `SEARCH_LIMIT` - Search result cap (default: 50)
    /// - `DEFAULT_LIST_LIMIT` - Default list size (default: 100)
    /// - `STORE_TIMEOUT_MS` / `CACHE_TIMEOUT_MS` - Call timeouts (2000 / 500)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 1)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            server_port: parse_var("SERVER_PORT", defaults.server_port),
            redis_url: env::var("REDIS_URL").ok().filter(|url| !url.is_empty()),
            namespace: env::var("CACHE_NAMESPACE").unwrap_or(defaults.namespace),
            collection: env::var("COLLECTION").unwrap_or(defaults.collection),
            search_field: env::var("SEARCH_FIELD").unwrap_or(defaults.search_field),
            entity_ttl: parse_var("ENTITY_TTL", defaults.entity_ttl),
            list_ttl: parse_var("LIST_TTL", defaults.list_ttl),
            search_ttl: parse_var("SEARCH_TTL", defaults.search_ttl),
            search_limit: parse_var("SEARCH_LIMIT", defaults.search_limit),
            default_list_limit: parse_var("DEFAULT_LIST_LIMIT", defaults.default_list_limit),
            store_timeout_ms: parse_var("STORE_TIMEOUT_MS", defaults.store_timeout_ms),
            cache_timeout_ms: parse_var("CACHE_TIMEOUT_MS", defaults.cache_timeout_ms),
            cleanup_interval: parse_var("CLEANUP_INTERVAL", defaults.cleanup_interval),
        }
    }

    /// Repository caching parameters derived from this configuration.
    pub fn cache_policy(&self) -> CachePolicy {
        CachePolicy {
            entity_ttl: self.entity_ttl,
            list_ttl: self.list_ttl,
            search_ttl: self.search_ttl,
            search_limit: self.search_limit,
            default_list_limit: self.default_list_limit,
            search_field: self.search_field.clone(),
        }
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    pub fn cache_timeout(&self) -> Duration {
        Duration::from_millis(self.cache_timeout_ms)
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 5000,
            redis_url: None,
            namespace: "product".to_string(),
            collection: "products".to_string(),
            search_field: "nombre".to_string(),
            entity_ttl: 3600,
            list_ttl: 300,
            search_ttl: 60,
            search_limit: 50,
            default_list_limit: 100,
            store_timeout_ms: 2000,
            cache_timeout_ms: 500,
            cleanup_interval: 1,
        }
    }
}
