//! Cache Statistics Module
//!
//! Hit/miss accounting kept as durable counters in the cache store itself,
//! so every process sharing the store reports the same numbers.

use serde::Serialize;
use tracing::warn;

use crate::cache::CacheHandle;
use crate::error::CacheError;

pub const HITS_KEY: &str = "stats:cache:hits";
pub const MISSES_KEY: &str = "stats:cache:misses";

// == Stats Snapshot ==
/// Point-in-time view of the counters.
///
/// The two counters are read one after the other, so a snapshot taken
/// under load may mix values from slightly different instants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub total: u64,
    /// Percentage of hits, rounded to two decimals; 0 when nothing was counted
    pub hit_ratio: f64,
}

impl StatsSnapshot {
    pub fn new(hits: u64, misses: u64) -> Self {
        let total = hits + misses;
        let hit_ratio = if total == 0 {
            0.0
        } else {
            (hits as f64 / total as f64 * 100.0 * 100.0).round() / 100.0
        };

        Self {
            hits,
            misses,
            total,
            hit_ratio,
        }
    }
}

// == Cache Stats ==
/// Records hits and misses for cache-aside reads.
#[derive(Debug, Clone)]
pub struct CacheStats {
    cache: CacheHandle,
}

impl CacheStats {
    pub fn new(cache: CacheHandle) -> Self {
        Self { cache }
    }

    // == Record Hit ==
    /// Best-effort: a failed increment is logged and dropped.
    pub async fn record_hit(&self) {
        if let Err(err) = self.cache.incr(HITS_KEY).await {
            warn!(error = %err, "failed to record cache hit");
        }
    }

    // == Record Miss ==
    /// Best-effort: a failed increment is logged and dropped.
    pub async fn record_miss(&self) {
        if let Err(err) = self.cache.incr(MISSES_KEY).await {
            warn!(error = %err, "failed to record cache miss");
        }
    }

    // == Snapshot ==
    pub async fn snapshot(&self) -> Result<StatsSnapshot, CacheError> {
        let hits = self.cache.counter(HITS_KEY).await?.max(0) as u64;
        let misses = self.cache.counter(MISSES_KEY).await?.max(0) as u64;
        Ok(StatsSnapshot::new(hits, misses))
    }

    // == Reset ==
    /// Clears both counters with a single delete.
    pub async fn reset(&self) -> Result<(), CacheError> {
        self.cache
            .delete(&[HITS_KEY.to_string(), MISSES_KEY.to_string()])
            .await?;
        Ok(())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheBackend, MemoryCache};
    use std::sync::Arc;
    use std::time::Duration;

    fn stats_over_memory() -> CacheStats {
        let backend: Arc<dyn CacheBackend> = Arc::new(MemoryCache::new());
        CacheStats::new(CacheHandle::new(backend, Duration::from_secs(1)))
    }

    #[test]
    fn test_hit_ratio_no_requests() {
        let snapshot = StatsSnapshot::new(0, 0);
        assert_eq!(snapshot.total, 0);
        assert_eq!(snapshot.hit_ratio, 0.0);
    }

    #[test]
    fn test_hit_ratio_three_to_one() {
        let snapshot = StatsSnapshot::new(3, 1);
        assert_eq!(snapshot.total, 4);
        assert_eq!(snapshot.hit_ratio, 75.0);
    }

    #[test]
    fn test_hit_ratio_rounded_to_two_decimals() {
        assert_eq!(StatsSnapshot::new(1, 2).hit_ratio, 33.33);
        assert_eq!(StatsSnapshot::new(2, 1).hit_ratio, 66.67);
    }

    #[tokio::test]
    async fn test_record_and_snapshot() {
        let stats = stats_over_memory();

        stats.record_hit().await;
        stats.record_hit().await;
        stats.record_hit().await;
        stats.record_miss().await;

        let snapshot = stats.snapshot().await.unwrap();
        assert_eq!(snapshot.hits, 3);
        assert_eq!(snapshot.misses, 1);
        assert_eq!(snapshot.hit_ratio, 75.0);
    }

    #[tokio::test]
    async fn test_reset_clears_both_counters() {
        let stats = stats_over_memory();

        stats.record_hit().await;
        stats.record_miss().await;
        stats.reset().await.unwrap();

        assert_eq!(stats.snapshot().await.unwrap(), StatsSnapshot::new(0, 0));
    }

    #[tokio::test]
    async fn test_concurrent_recording_loses_nothing() {
        let stats = stats_over_memory();

        let tasks: Vec<_> = (0..40)
            .map(|i| {
                let stats = stats.clone();
                tokio::spawn(async move {
                    if i % 4 == 0 {
                        stats.record_miss().await;
                    } else {
                        stats.record_hit().await;
                    }
                })
            })
            .collect();

        for task in tasks {
            task.await.unwrap();
        }

        let snapshot = stats.snapshot().await.unwrap();
        assert_eq!(snapshot.hits, 30);
        assert_eq!(snapshot.misses, 10);
        assert_eq!(snapshot.hit_ratio, 75.0);
    }
}
