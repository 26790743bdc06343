//! Entity model
//!
//! Schemaless records: an id plus an ordered map of field values.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::store::Record;

/// Field stamped when an entity is created.
pub const CREATED_AT: &str = "created_at";
/// Field stamped on every update.
pub const UPDATED_AT: &str = "updated_at";

/// Field names that only the store may assign.
const RESERVED_FIELDS: [&str; 2] = ["id", "_id"];

/// Field name to value, ordered by name.
pub type Fields = BTreeMap<String, FieldValue>;

// == Field Value ==
/// A single field of a schemaless record.
///
/// Serializes as plain JSON. Timestamps are carried as ISO-8601 text so a
/// cached copy decodes to exactly the value the store returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    List(Vec<FieldValue>),
    Map(BTreeMap<String, FieldValue>),
}

impl FieldValue {
    pub fn timestamp(at: DateTime<Utc>) -> Self {
        FieldValue::Text(at.to_rfc3339_opts(SecondsFormat::Micros, true))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        self.as_str()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|at| at.with_timezone(&Utc))
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

/// Drops fields a caller is not allowed to set.
pub fn strip_reserved(mut fields: Fields) -> Fields {
    for name in RESERVED_FIELDS {
        fields.remove(name);
    }
    fields
}

// == Entity ==
/// A record as seen by callers: store-native ids are always rendered as
/// strings under `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    #[serde(flatten)]
    pub fields: Fields,
}

impl Entity {
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields: strip_reserved(fields),
        }
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.get(CREATED_AT).and_then(FieldValue::as_timestamp)
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.get(UPDATED_AT).and_then(FieldValue::as_timestamp)
    }
}

impl From<Record> for Entity {
    fn from(record: Record) -> Self {
        Entity::new(record.id.to_string(), record.fields)
    }
}
