//! Docucache - a read-through cache in front of a document store
//!
//! Lookups go to the key-value cache first and fall back to the document
//! store on a miss; writes hit the store and then invalidate the affected
//! cache keys. Hits and misses are counted in the cache store itself.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod memo;
pub mod models;
pub mod repository;
pub mod store;
pub mod tasks;

#[cfg(test)]
mod testing;

pub use api::AppState;
pub use config::Config;
pub use memo::{MemoValue, Memoized, Memoizer};
pub use repository::{CacheAsideRepository, CachePolicy};
pub use tasks::spawn_cleanup_task;
