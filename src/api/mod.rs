//! API Module
//!
//! HTTP handlers and routing over the cache-aside repository.
//!
//! # Endpoints
//! - `/api/products` - CRUD and search over cached products
//! - `/api/stats` - Hit/miss statistics and reset
//! - `/api/cache/clear` - Flush the product namespace
//! - `/health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
