//! In-process document store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::models::{strip_reserved, Fields};
use crate::store::{DocumentStore, Filter, Record, RecordId};

/// Collections of records kept in insertion order.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<String, Vec<Record>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, Vec::len)
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Record>, StoreError> {
        let Some(id) = RecordId::parse(id) else {
            return Ok(None);
        };

        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|records| records.iter().find(|r| r.id == id))
            .cloned())
    }

    async fn find_many(
        &self,
        collection: &str,
        filter: &Filter,
        limit: usize,
    ) -> Result<Vec<Record>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| filter.matches(r))
                    .take(limit)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn insert_one(&self, collection: &str, fields: Fields) -> Result<RecordId, StoreError> {
        let id = RecordId::generate();
        let record = Record {
            id,
            fields: strip_reserved(fields),
        };

        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .push(record);
        Ok(id)
    }

    async fn update_one(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<u64, StoreError> {
        let Some(id) = RecordId::parse(id) else {
            return Ok(0);
        };

        let mut collections = self.collections.write().await;
        let record = collections
            .get_mut(collection)
            .and_then(|records| records.iter_mut().find(|r| r.id == id));

        match record {
            Some(record) => {
                record.fields.extend(strip_reserved(fields));
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_one(&self, collection: &str, id: &str) -> Result<u64, StoreError> {
        let Some(id) = RecordId::parse(id) else {
            return Ok(0);
        };

        let mut collections = self.collections.write().await;
        let Some(records) = collections.get_mut(collection) else {
            return Ok(0);
        };

        let before = records.len();
        records.retain(|r| r.id != id);
        Ok((before - records.len()) as u64)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FieldValue;

    const PRODUCTS: &str = "products";

    fn named(name: &str) -> Fields {
        let mut fields = Fields::new();
        fields.insert("nombre".into(), name.into());
        fields
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let store = MemoryDocumentStore::new();

        let id = store.insert_one(PRODUCTS, named("Café")).await.unwrap();
        let record = store
            .find_by_id(PRODUCTS, &id.to_string())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(record.id, id);
        assert_eq!(record.fields, named("Café"));
    }

    #[tokio::test]
    async fn test_find_unknown_or_malformed_id() {
        let store = MemoryDocumentStore::new();
        store.insert_one(PRODUCTS, named("Café")).await.unwrap();

        let unknown = RecordId::generate().to_string();
        assert!(store.find_by_id(PRODUCTS, &unknown).await.unwrap().is_none());
        assert!(store.find_by_id(PRODUCTS, "nope").await.unwrap().is_none());
        assert!(store.find_by_id("other", &unknown).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_many_respects_order_filter_and_limit() {
        let store = MemoryDocumentStore::new();
        for name in ["Café molido", "Té", "Café en grano", "Cafetera"] {
            store.insert_one(PRODUCTS, named(name)).await.unwrap();
        }

        let all = store.find_many(PRODUCTS, &Filter::All, 10).await.unwrap();
        assert_eq!(all.len(), 4);

        let coffee = store
            .find_many(PRODUCTS, &Filter::contains("nombre", "café"), 10)
            .await
            .unwrap();
        let names: Vec<_> = coffee
            .iter()
            .map(|r| r.fields["nombre"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Café molido", "Café en grano"]);

        let capped = store.find_many(PRODUCTS, &Filter::All, 2).await.unwrap();
        assert_eq!(capped.len(), 2);
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let store = MemoryDocumentStore::new();
        let mut fields = named("Café");
        fields.insert("precio".into(), 10i64.into());
        let id = store.insert_one(PRODUCTS, fields).await.unwrap().to_string();

        let mut patch = Fields::new();
        patch.insert("precio".into(), 12i64.into());
        patch.insert("id".into(), "forged".into());
        assert_eq!(store.update_one(PRODUCTS, &id, patch).await.unwrap(), 1);

        let record = store.find_by_id(PRODUCTS, &id).await.unwrap().unwrap();
        assert_eq!(record.fields["precio"], FieldValue::from(12i64));
        assert_eq!(record.fields["nombre"], FieldValue::from("Café"));
        assert!(!record.fields.contains_key("id"));
    }

    #[tokio::test]
    async fn test_update_missing_matches_nothing() {
        let store = MemoryDocumentStore::new();
        let unknown = RecordId::generate().to_string();

        assert_eq!(
            store.update_one(PRODUCTS, &unknown, named("x")).await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_delete_one() {
        let store = MemoryDocumentStore::new();
        let id = store.insert_one(PRODUCTS, named("Café")).await.unwrap().to_string();

        assert_eq!(store.delete_one(PRODUCTS, &id).await.unwrap(), 1);
        assert_eq!(store.delete_one(PRODUCTS, &id).await.unwrap(), 0);
        assert_eq!(store.count(PRODUCTS).await, 0);
    }
}
