//! API Handlers
//!
//! HTTP request handlers for the product endpoints and cache maintenance.
//! Handlers only translate between HTTP and the repository; every caching
//! decision is made below them.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::cache::{CacheBackend, CacheHandle, KeySpace};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::requests::{validate_create, validate_update};
use crate::models::{
    ApiResponse, Entity, Fields, HealthResponse, ListQuery, SearchQuery, StatsResponse,
};
use crate::repository::CacheAsideRepository;
use crate::store::DocumentStore;

/// Application state shared across all handlers.
///
/// Both store connections are shared, not locked: every consistency
/// guarantee comes from the stores' own atomic operations.
#[derive(Clone)]
pub struct AppState {
    pub repository: CacheAsideRepository,
    pub cache: CacheHandle,
    pub store: Arc<dyn DocumentStore>,
}

impl AppState {
    /// Wires the repository over the given stores using `config`.
    pub fn new(
        cache: Arc<dyn CacheBackend>,
        store: Arc<dyn DocumentStore>,
        config: &Config,
    ) -> Self {
        let cache = CacheHandle::new(cache, config.cache_timeout());
        let repository = CacheAsideRepository::new(
            cache.clone(),
            store.clone(),
            config.collection.clone(),
            KeySpace::new(config.namespace.clone()),
        )
        .with_policy(config.cache_policy())
        .with_store_timeout(config.store_timeout());

        Self {
            repository,
            cache,
            store,
        }
    }
}

fn not_found() -> Error {
    Error::NotFound("Product not found".to_string())
}

/// Handler for GET /api/products
pub async fn list_handler(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<Entity>>>> {
    let limit = query
        .resolve(state.repository.policy().default_list_limit)
        .map_err(Error::InvalidRequest)?;
    let products = state.repository.list_all(limit).await?;

    Ok(Json(ApiResponse::list(products)))
}

/// Handler for GET /api/products/:id
pub async fn get_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Entity>>> {
    let product = state.repository.get(&id).await?.ok_or_else(not_found)?;

    Ok(Json(ApiResponse::data(product)))
}

/// Handler for POST /api/products
pub async fn create_handler(
    State(state): State<AppState>,
    body: std::result::Result<Json<Fields>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Entity>>)> {
    let Json(fields) = body?;
    let required = &state.repository.policy().search_field;
    if let Some(error_msg) = validate_create(&fields, required) {
        return Err(Error::InvalidRequest(error_msg));
    }

    let product = state.repository.create(fields).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::data(product).with_message("Product created")),
    ))
}

/// Handler for PUT /api/products/:id
pub async fn update_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: std::result::Result<Json<Fields>, JsonRejection>,
) -> Result<Json<ApiResponse<Entity>>> {
    let Json(fields) = body?;
    if let Some(error_msg) = validate_update(&fields) {
        return Err(Error::InvalidRequest(error_msg));
    }

    let product = state
        .repository
        .update(&id, fields)
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(
        ApiResponse::data(product).with_message("Product updated"),
    ))
}

/// Handler for DELETE /api/products/:id
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>> {
    if !state.repository.delete(&id).await? {
        return Err(not_found());
    }

    Ok(Json(ApiResponse::message("Product deleted")))
}

/// Handler for GET /api/products/search?q=
pub async fn search_handler(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiResponse<Vec<Entity>>>> {
    let q = query.validate().map_err(Error::InvalidRequest)?;
    let products = state.repository.search(q).await?;

    Ok(Json(ApiResponse::list(products).with_query(q)))
}

/// Handler for GET /api/stats
pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<ApiResponse<StatsResponse>>> {
    let snapshot = state.repository.stats().snapshot().await?;
    let cached_keys = state.repository.cached_key_count().await?;

    Ok(Json(ApiResponse::data(StatsResponse {
        snapshot,
        cached_keys,
    })))
}

/// Handler for POST /api/stats/reset
pub async fn reset_stats_handler(State(state): State<AppState>) -> Result<Json<ApiResponse<()>>> {
    state.repository.stats().reset().await?;

    Ok(Json(ApiResponse::message("Statistics reset")))
}

/// Handler for POST /api/cache/clear
pub async fn clear_cache_handler(State(state): State<AppState>) -> Result<Json<ApiResponse<()>>> {
    let deleted = state.repository.flush().await?;

    Ok(Json(ApiResponse::message(format!(
        "Cache cleared ({} keys deleted)",
        deleted
    ))))
}

/// Handler for GET /health
///
/// Answers 503 when either store fails to respond.
pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (cache, store) = tokio::join!(state.cache.ping(), state.store.ping());
    let health = HealthResponse::new(cache.is_ok(), store.is_ok());

    let status = if health.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(health))
}
