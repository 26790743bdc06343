//! Cache Module
//!
//! Key-value cache stores, key derivation and hit/miss accounting.

mod backend;
mod entry;
pub mod keys;
mod memory;
mod redis_cache;
mod stats;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use backend::{CacheBackend, CacheHandle};
pub use entry::CacheEntry;
pub use keys::{CallArgs, KeySpace};
pub use memory::MemoryCache;
pub use redis_cache::RedisCache;
pub use stats::{CacheStats, StatsSnapshot, HITS_KEY, MISSES_KEY};
