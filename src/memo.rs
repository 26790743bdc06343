//! Generic Memoization
//!
//! Applies the cache-aside pattern to any async function, keyed by the
//! function name and its rendered arguments.
//!
//! Results are cached as JSON. A result serde cannot encode (a map with
//! non-string keys, for instance) is cached as its `Debug` text instead, and
//! later hits hand that text back as `MemoValue::Rendered`.
//!
//! ```ignore
//! let memo = Memoizer::new(cache, "cache", 300);
//! let price = memo
//!     .call("price_of", &CallArgs::new().arg(&sku), || fetch_price(&sku))
//!     .await?
//!     .and_then(MemoValue::value);
//!
//! let find = memo.wrap("find_products", |args: CallArgs| async move {
//!     catalog.find(args.keyword("category")).await
//! });
//! let hits = find.call(CallArgs::new().kwarg("category", "coffee")).await?;
//! ```

use std::fmt::Debug;
use std::future::Future;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::{CacheHandle, CacheStats, CallArgs};
use crate::repository::{read_payload, write_payload};

// == Memo Value ==
/// A memoized result.
#[derive(Debug, Clone, PartialEq)]
pub enum MemoValue<T> {
    /// The result itself, freshly computed or decoded from the cache
    Value(T),
    /// String form cached for a result that could not be encoded structurally
    Rendered(String),
}

impl<T> MemoValue<T> {
    pub fn value(self) -> Option<T> {
        match self {
            MemoValue::Value(value) => Some(value),
            MemoValue::Rendered(_) => None,
        }
    }

    pub fn rendered(&self) -> Option<&str> {
        match self {
            MemoValue::Value(_) => None,
            MemoValue::Rendered(text) => Some(text),
        }
    }
}

/// JSON for the value, or a JSON string holding its `Debug` text.
fn encode<T: Serialize + Debug>(key: &str, value: &T) -> String {
    match serde_json::to_string(value) {
        Ok(payload) => payload,
        Err(err) => {
            debug!(key, error = %err, "caching string form of unencodable result");
            serde_json::Value::String(format!("{:?}", value)).to_string()
        }
    }
}

fn decode<T: DeserializeOwned>(key: &str, payload: &str) -> Option<MemoValue<T>> {
    if let Ok(value) = serde_json::from_str(payload) {
        return Some(MemoValue::Value(value));
    }

    match serde_json::from_str::<String>(payload) {
        Ok(text) => Some(MemoValue::Rendered(text)),
        Err(err) => {
            warn!(key, error = %err, "discarding undecodable cache entry");
            None
        }
    }
}

// == Memoizer ==
/// Shared configuration for memoized calls: cache, key prefix and TTL.
#[derive(Debug, Clone)]
pub struct Memoizer {
    cache: CacheHandle,
    stats: CacheStats,
    prefix: String,
    ttl: u64,
}

impl Memoizer {
    pub fn new(cache: CacheHandle, prefix: impl Into<String>, ttl: u64) -> Self {
        Self {
            stats: CacheStats::new(cache.clone()),
            cache,
            prefix: prefix.into(),
            ttl,
        }
    }

    pub fn with_ttl(mut self, ttl: u64) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn key(&self, function: &str, args: &CallArgs) -> String {
        args.cache_key(&self.prefix, function)
    }

    /// Returns the cached result of `function(args)`, or runs `compute`.
    ///
    /// `compute` is not invoked on a hit. A `None` result is returned but
    /// not cached; errors from `compute` pass through untouched. A computed
    /// result is always returned as `MemoValue::Value`.
    pub async fn call<T, E, F, Fut>(
        &self,
        function: &str,
        args: &CallArgs,
        compute: F,
    ) -> Result<Option<MemoValue<T>>, E>
    where
        T: Serialize + DeserializeOwned + Debug,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<T>, E>>,
    {
        let key = self.key(function, args);

        let cached = match read_payload(&self.cache, &key).await {
            Some(payload) => decode(&key, &payload),
            None => None,
        };
        if let Some(value) = cached {
            self.stats.record_hit().await;
            debug!(key, "memoized hit");
            return Ok(Some(value));
        }

        self.stats.record_miss().await;
        debug!(key, "memoized miss");

        let result = compute().await?;
        if let Some(value) = &result {
            write_payload(&self.cache, &key, encode(&key, value), self.ttl).await;
        }
        Ok(result.map(MemoValue::Value))
    }

    /// Binds `function` to a name, returning a memoized callable.
    pub fn wrap<F>(&self, name: impl Into<String>, function: F) -> Memoized<F> {
        Memoized {
            memo: self.clone(),
            name: name.into(),
            function,
        }
    }
}

// == Memoized ==
/// A function bound to a `Memoizer` under a fixed name.
#[derive(Debug, Clone)]
pub struct Memoized<F> {
    memo: Memoizer,
    name: String,
    function: F,
}

impl<F> Memoized<F> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn call<T, E, Fut>(&self, args: CallArgs) -> Result<Option<MemoValue<T>>, E>
    where
        T: Serialize + DeserializeOwned + Debug,
        F: Fn(CallArgs) -> Fut,
        Fut: Future<Output = Result<Option<T>, E>>,
    {
        let compute_args = args.clone();
        self.memo
            .call(&self.name, &args, || (self.function)(compute_args))
            .await
    }
}
