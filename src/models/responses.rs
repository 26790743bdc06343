//! Response DTOs for the HTTP API
//!
//! Every endpoint answers with the same envelope:
//! `{"success": true, "data": ..., "count"?: n, "message"?: "..."}`.

use serde::Serialize;

use crate::cache::StatsSnapshot;

/// Success envelope shared by all endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Envelope carrying a payload
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            message: None,
            query: None,
            count: None,
            data: Some(data),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }
}

impl<T> ApiResponse<Vec<T>> {
    /// Envelope carrying a list and its length
    pub fn list(items: Vec<T>) -> Self {
        let count = items.len();
        let mut response = Self::data(items);
        response.count = Some(count);
        response
    }
}

impl ApiResponse<()> {
    /// Envelope carrying only a message
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            query: None,
            count: None,
            data: None,
        }
    }
}

/// Payload of `GET /api/stats`
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub snapshot: StatsSnapshot,
    /// Number of live cache keys under the entity namespace
    pub cached_keys: usize,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// "healthy" when both stores answer, "unhealthy" otherwise
    pub status: String,
    pub cache: String,
    pub store: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    pub fn new(cache_ok: bool, store_ok: bool) -> Self {
        let label = |ok: bool| if ok { "ok" } else { "error" }.to_string();
        Self {
            status: if cache_ok && store_ok {
                "healthy"
            } else {
                "unhealthy"
            }
            .to_string(),
            cache: label(cache_ok),
            store: label(store_ok),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}
