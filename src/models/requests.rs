//! Request DTOs for the HTTP API
//!
//! Query strings of the list and search endpoints. Create and update bodies
//! are plain JSON objects decoded straight into `Fields`.

use serde::Deserialize;

use crate::models::{FieldValue, Fields};

/// Query string of `GET /api/products`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    /// Maximum number of records; the configured default when absent
    #[serde(default)]
    pub limit: Option<usize>,
}

impl ListQuery {
    /// Returns the requested limit, or `default` when absent.
    ///
    /// A limit of 0 is rejected rather than read as "no limit".
    pub fn resolve(&self, default: usize) -> Result<usize, String> {
        match self.limit {
            Some(0) => Err("Query parameter 'limit' must be at least 1".to_string()),
            Some(limit) => Ok(limit),
            None => Ok(default),
        }
    }
}

/// Query string of `GET /api/products/search`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: Option<String>,
}

impl SearchQuery {
    /// Returns the query text, or an error message if it is missing or blank.
    pub fn validate(&self) -> Result<&str, String> {
        match self.q.as_deref().map(str::trim) {
            Some(q) if !q.is_empty() => Ok(q),
            _ => Err("Query parameter 'q' is required".to_string()),
        }
    }
}

/// Validates a create body: `required` must be present and not null.
pub fn validate_create(fields: &Fields, required: &str) -> Option<String> {
    match fields.get(required) {
        Some(value) if *value != FieldValue::Null => None,
        _ => Some(format!("Field '{}' is required", required)),
    }
}

/// Validates an update body: at least one field must be given.
pub fn validate_update(fields: &Fields) -> Option<String> {
    if fields.is_empty() {
        return Some("Update requires at least one field".to_string());
    }
    None
}
