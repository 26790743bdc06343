//! Failing store doubles shared by unit tests.

use async_trait::async_trait;

use crate::cache::CacheBackend;
use crate::error::{CacheError, StoreError};
use crate::models::Fields;
use crate::store::{DocumentStore, Filter, Record, RecordId};

/// Cache backend whose every call fails as if the server were down.
pub struct DownCache;

fn cache_down<T>() -> Result<T, CacheError> {
    Err(CacheError::Unavailable("connection refused".to_string()))
}

#[async_trait]
impl CacheBackend for DownCache {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        cache_down()
    }
    async fn set(&self, _key: &str, _value: String, _ttl: u64) -> Result<(), CacheError> {
        cache_down()
    }
    async fn delete(&self, _keys: &[String]) -> Result<u64, CacheError> {
        cache_down()
    }
    async fn incr(&self, _key: &str) -> Result<i64, CacheError> {
        cache_down()
    }
    async fn counter(&self, _key: &str) -> Result<i64, CacheError> {
        cache_down()
    }
    async fn keys_with_prefix(&self, _prefix: &str) -> Result<Vec<String>, CacheError> {
        cache_down()
    }
    async fn ping(&self) -> Result<(), CacheError> {
        cache_down()
    }
}

/// Document store whose every call fails.
pub struct DownStore;

fn store_down<T>() -> Result<T, StoreError> {
    Err(StoreError::Unavailable("connection refused".to_string()))
}

#[async_trait]
impl DocumentStore for DownStore {
    async fn find_by_id(&self, _c: &str, _id: &str) -> Result<Option<Record>, StoreError> {
        store_down()
    }
    async fn find_many(
        &self,
        _c: &str,
        _filter: &Filter,
        _limit: usize,
    ) -> Result<Vec<Record>, StoreError> {
        store_down()
    }
    async fn insert_one(&self, _c: &str, _fields: Fields) -> Result<RecordId, StoreError> {
        store_down()
    }
    async fn update_one(&self, _c: &str, _id: &str, _fields: Fields) -> Result<u64, StoreError> {
        store_down()
    }
    async fn delete_one(&self, _c: &str, _id: &str) -> Result<u64, StoreError> {
        store_down()
    }
    async fn ping(&self) -> Result<(), StoreError> {
        store_down()
    }
}
