//! Document Store Module
//!
//! The authoritative store behind the cache. Everything the caching layer
//! needs from it is captured by `DocumentStore`.

mod memory;

use std::fmt;

use async_trait::async_trait;
use uuid::Uuid;

use crate::cache::keys::normalize_query;
use crate::error::StoreError;
use crate::models::{FieldValue, Fields};

pub use memory::MemoryDocumentStore;

// == Record Id ==
/// Store-native identifier, assigned on insert and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordId(Uuid);

impl RecordId {
    pub fn generate() -> Self {
        RecordId(Uuid::new_v4())
    }

    /// Parses the string form produced by `Display`; None for anything else.
    ///
    /// Other spellings of the same uuid (hyphenated, uppercase, braced) are
    /// rejected so an entity has exactly one id string and one cache key.
    pub fn parse(id: &str) -> Option<Self> {
        Uuid::try_parse(id)
            .ok()
            .map(RecordId)
            .filter(|parsed| parsed.to_string() == id)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

// == Record ==
/// A stored document with its native id.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: RecordId,
    pub fields: Fields,
}

// == Filter ==
/// Selection criteria for `find_many`.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    All,
    /// Substring match on a text field, ignoring case and runs of whitespace
    Contains { field: String, needle: String },
}

impl Filter {
    pub fn contains(field: impl Into<String>, needle: impl Into<String>) -> Self {
        Filter::Contains {
            field: field.into(),
            needle: needle.into(),
        }
    }

    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Filter::All => true,
            Filter::Contains { field, needle } => record
                .fields
                .get(field)
                .and_then(FieldValue::as_str)
                .map(|text| normalize_query(text).contains(&normalize_query(needle)))
                .unwrap_or(false),
        }
    }
}

// == Document Store ==
/// Collection-oriented document store.
///
/// Ids passed in are strings as callers know them; an id that is not a
/// valid store id simply matches nothing.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Record>, StoreError>;

    /// Matching records in insertion order, at most `limit` of them.
    async fn find_many(
        &self,
        collection: &str,
        filter: &Filter,
        limit: usize,
    ) -> Result<Vec<Record>, StoreError>;

    /// Inserts a new record and returns the id the store assigned.
    async fn insert_one(&self, collection: &str, fields: Fields) -> Result<RecordId, StoreError>;

    /// Merges `fields` into the record. Returns the number of records matched.
    async fn update_one(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<u64, StoreError>;

    /// Returns the number of records deleted.
    async fn delete_one(&self, collection: &str, id: &str) -> Result<u64, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}
