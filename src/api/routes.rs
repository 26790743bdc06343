//! API Routes
//!
//! Configures the Axum router with all endpoints.

use std::time::Instant;

use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    clear_cache_handler, create_handler, delete_handler, get_handler, health_handler,
    list_handler, reset_stats_handler, search_handler, stats_handler, update_handler, AppState,
};

pub const RESPONSE_TIME_HEADER: &str = "x-response-time";

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /api/products` - List products (`?limit=`)
/// - `POST /api/products` - Create a product
/// - `GET /api/products/search` - Search products by name (`?q=`)
/// - `GET /api/products/:id` - Get a product
/// - `PUT /api/products/:id` - Update a product
/// - `DELETE /api/products/:id` - Delete a product
/// - `GET /api/stats` - Cache statistics
/// - `POST /api/stats/reset` - Reset cache statistics
/// - `POST /api/cache/clear` - Delete all product cache entries
/// - `GET /health` - Health check of both stores
///
/// # Middleware
/// - Response time: `X-Response-Time` header in milliseconds
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/products", get(list_handler).post(create_handler))
        .route("/api/products/search", get(search_handler))
        .route(
            "/api/products/:id",
            get(get_handler).put(update_handler).delete(delete_handler),
        )
        .route("/api/stats", get(stats_handler))
        .route("/api/stats/reset", post(reset_stats_handler))
        .route("/api/cache/clear", post(clear_cache_handler))
        .route("/health", get(health_handler))
        .layer(middleware::from_fn(response_time))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Stamps every response with the time spent producing it.
async fn response_time(request: Request, next: Next) -> Response {
    let started = Instant::now();
    let mut response = next.run(request).await;

    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
    if let Ok(value) = HeaderValue::from_str(&format!("{:.2}ms", elapsed_ms)) {
        response.headers_mut().insert(RESPONSE_TIME_HEADER, value);
    }
    response
}
