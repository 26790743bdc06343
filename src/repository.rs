//! Cache-Aside Repository
//!
//! Read-through lookups and invalidate-on-write for one entity collection.
//!
//! Every read follows the same path: derive a key, try the cache, and on a
//! miss load from the document store and populate the cache with a TTL.
//! Writes go to the document store first and then delete the affected keys
//! before returning. Cache failures never fail a call; store failures always
//! do.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::keys::normalize_query;
use crate::cache::{CacheHandle, CacheStats, KeySpace};
use crate::error::{CacheError, StoreError};
use crate::models::{Entity, FieldValue, Fields, CREATED_AT, UPDATED_AT};
use crate::store::{DocumentStore, Filter};

// == Cache Policy ==
/// TTLs and bounds applied by the repository.
#[derive(Debug, Clone, PartialEq)]
pub struct CachePolicy {
    /// Single-entity lookups, seconds
    pub entity_ttl: u64,
    /// List lookups, seconds; lists go stale faster under writes
    pub list_ttl: u64,
    /// Search lookups, seconds
    pub search_ttl: u64,
    /// Maximum records returned by a search
    pub search_limit: usize,
    /// List limit whose key is invalidated on every write
    pub default_list_limit: usize,
    /// Text field matched by search
    pub search_field: String,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            entity_ttl: 3600,
            list_ttl: 300,
            search_ttl: 60,
            search_limit: 50,
            default_list_limit: 100,
            search_field: "nombre".to_string(),
        }
    }
}

// == Repository ==
#[derive(Clone)]
pub struct CacheAsideRepository {
    cache: CacheHandle,
    stats: CacheStats,
    store: Arc<dyn DocumentStore>,
    store_timeout: Duration,
    collection: String,
    keys: KeySpace,
    policy: CachePolicy,
}

impl std::fmt::Debug for CacheAsideRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheAsideRepository")
            .field("collection", &self.collection)
            .field("keys", &self.keys)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl CacheAsideRepository {
    pub fn new(
        cache: CacheHandle,
        store: Arc<dyn DocumentStore>,
        collection: impl Into<String>,
        keys: KeySpace,
    ) -> Self {
        Self {
            stats: CacheStats::new(cache.clone()),
            cache,
            store,
            store_timeout: Duration::from_secs(2),
            collection: collection.into(),
            keys,
            policy: CachePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: CachePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    pub fn keys(&self) -> &KeySpace {
        &self.keys
    }

    pub fn policy(&self) -> &CachePolicy {
        &self.policy
    }

    // == Reads ==

    /// Looks up one entity. Absent ids are not cached.
    pub async fn get(&self, id: &str) -> Result<Option<Entity>, StoreError> {
        let key = self.keys.entity(id);
        let collection = self.collection.as_str();

        self.read_through(&key, self.policy.entity_ttl, || async move {
            let record = self
                .bounded(self.store.find_by_id(collection, id))
                .await?;
            Ok::<_, StoreError>(record.map(Entity::from))
        })
        .await
    }

    /// First `limit` entities in store order.
    pub async fn list_all(&self, limit: usize) -> Result<Vec<Entity>, StoreError> {
        let key = self.keys.list(limit);
        let collection = self.collection.as_str();

        let entities = self
            .read_through(&key, self.policy.list_ttl, || async move {
                let records = self
                    .bounded(self.store.find_many(collection, &Filter::All, limit))
                    .await?;
                Ok::<_, StoreError>(Some(
                    records.into_iter().map(Entity::from).collect::<Vec<_>>(),
                ))
            })
            .await?;
        Ok(entities.unwrap_or_default())
    }

    /// Case-insensitive substring search on the configured field.
    pub async fn search(&self, query: &str) -> Result<Vec<Entity>, StoreError> {
        let key = self.keys.search(query);
        let collection = self.collection.as_str();
        let filter = Filter::contains(&self.policy.search_field, normalize_query(query));
        let limit = self.policy.search_limit;

        let entities = self
            .read_through(&key, self.policy.search_ttl, || async move {
                let records = self
                    .bounded(self.store.find_many(collection, &filter, limit))
                    .await?;
                Ok::<_, StoreError>(Some(
                    records.into_iter().map(Entity::from).collect::<Vec<_>>(),
                ))
            })
            .await?;
        Ok(entities.unwrap_or_default())
    }

    // == Writes ==

    /// Inserts a new entity stamped with `created_at`.
    ///
    /// The entity's own key is not populated; the first `get` loads it.
    pub async fn create(&self, mut fields: Fields) -> Result<Entity, StoreError> {
        fields.insert(CREATED_AT.to_string(), FieldValue::timestamp(Utc::now()));

        let id = self
            .bounded(self.store.insert_one(&self.collection, fields.clone()))
            .await?;
        let entity = Entity::new(id.to_string(), fields);

        self.invalidate(vec![self.default_list_key()]).await;
        debug!(id = %entity.id, "entity created");
        Ok(entity)
    }

    /// Merges `fields` into the entity stamped with `updated_at`, then
    /// re-reads it through the cache.
    pub async fn update(&self, id: &str, mut fields: Fields) -> Result<Option<Entity>, StoreError> {
        fields.insert(UPDATED_AT.to_string(), FieldValue::timestamp(Utc::now()));

        let matched = self
            .bounded(self.store.update_one(&self.collection, id, fields))
            .await?;

        self.invalidate(vec![self.keys.entity(id), self.default_list_key()])
            .await;

        if matched == 0 {
            return Ok(None);
        }
        self.get(id).await
    }

    /// Returns whether a record was removed.
    pub async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let deleted = self
            .bounded(self.store.delete_one(&self.collection, id))
            .await?;

        self.invalidate(vec![self.keys.entity(id), self.default_list_key()])
            .await;
        Ok(deleted > 0)
    }

    // == Maintenance ==

    /// Deletes every cache key under the namespace. Returns how many existed.
    ///
    /// Unlike the read/write paths, a cache failure here is reported.
    pub async fn flush(&self) -> Result<u64, CacheError> {
        let keys = self.cache.keys_with_prefix(&self.keys.prefix()).await?;
        let deleted = self.cache.delete(&keys).await?;
        debug!(namespace = %self.keys.namespace(), deleted, "cache flushed");
        Ok(deleted)
    }

    /// Number of live cache keys under the namespace.
    pub async fn cached_key_count(&self) -> Result<usize, CacheError> {
        Ok(self.cache.keys_with_prefix(&self.keys.prefix()).await?.len())
    }

    // == Internals ==

    fn default_list_key(&self) -> String {
        self.keys.list(self.policy.default_list_limit)
    }

    /// Cache check, then load-and-populate on a miss.
    ///
    /// `load` returning `None` means absent; absence is not cached.
    async fn read_through<T, F, Fut>(
        &self,
        key: &str,
        ttl: u64,
        load: F,
    ) -> Result<Option<T>, StoreError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<T>, StoreError>>,
    {
        if let Some(value) = read_cached(&self.cache, key).await {
            self.stats.record_hit().await;
            debug!(key, "cache hit");
            return Ok(Some(value));
        }

        self.stats.record_miss().await;
        debug!(key, "cache miss");

        let loaded = load().await?;
        if let Some(value) = &loaded {
            write_cached(&self.cache, key, value, ttl).await;
        }
        Ok(loaded)
    }

    /// Deletes keys after a write. Failures are logged; the write stands.
    async fn invalidate(&self, keys: Vec<String>) {
        match self.cache.delete(&keys).await {
            Ok(removed) => debug!(?keys, removed, "cache invalidated"),
            Err(err) => warn!(?keys, error = %err, "cache invalidation failed"),
        }
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        tokio::time::timeout(self.store_timeout, call)
            .await
            .map_err(|_| StoreError::Timeout)?
    }
}

/// Reads a raw cached payload. An unreachable cache reads as a miss.
pub(crate) async fn read_payload(cache: &CacheHandle, key: &str) -> Option<String> {
    match cache.get(key).await {
        Ok(payload) => payload,
        Err(err) => {
            warn!(key, error = %err, "cache read failed, falling back to store");
            None
        }
    }
}

/// Stores a raw payload. Failures are logged and dropped.
pub(crate) async fn write_payload(cache: &CacheHandle, key: &str, payload: String, ttl: u64) {
    match cache.set(key, payload, ttl).await {
        Ok(()) => debug!(key, ttl, "cache populated"),
        Err(err) => warn!(key, error = %err, "cache write failed"),
    }
}

/// Reads and decodes a cached value; undecodable payloads read as a miss.
async fn read_cached<T: DeserializeOwned>(cache: &CacheHandle, key: &str) -> Option<T> {
    let payload = read_payload(cache, key).await?;

    match serde_json::from_str(&payload) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(key, error = %CacheError::from(err), "discarding undecodable cache entry");
            None
        }
    }
}

async fn write_cached<T: Serialize>(cache: &CacheHandle, key: &str, value: &T, ttl: u64) {
    match serde_json::to_string(value) {
        Ok(payload) => write_payload(cache, key, payload, ttl).await,
        Err(err) => warn!(key, error = %CacheError::from(err), "value not cached"),
    }
}
