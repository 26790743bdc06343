//! Data models for the cache layer and its HTTP surface
//!
//! `entity` holds the schemaless records served through the cache; the
//! request/response DTOs serialize HTTP bodies.

pub mod entity;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use entity::{strip_reserved, Entity, FieldValue, Fields, CREATED_AT, UPDATED_AT};
pub use requests::{ListQuery, SearchQuery};
pub use responses::{ApiResponse, HealthResponse, StatsResponse};
