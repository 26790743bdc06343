//! Cache Key Module
//!
//! Deterministic mapping from a logical lookup to a cache key string.
//! Equal lookups must always produce byte-identical keys; lookups of a
//! different shape must never share one.

use std::collections::BTreeMap;
use std::fmt::Display;

// == Key Space ==
/// Key derivation for one entity collection.
///
/// - entity by id: `<namespace>:<id>`
/// - bounded list: `<namespace>:all:<limit>`
/// - search: `<namespace>:search:<normalized query>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySpace {
    namespace: String,
}

impl KeySpace {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Prefix shared by every key of this namespace, used by flush.
    pub fn prefix(&self) -> String {
        format!("{}:", self.namespace)
    }

    pub fn entity(&self, id: &str) -> String {
        format!("{}:{}", self.namespace, escape_segment(id))
    }

    pub fn list(&self, limit: usize) -> String {
        format!("{}:all:{}", self.namespace, limit)
    }

    pub fn search(&self, query: &str) -> String {
        format!("{}:search:{}", self.namespace, normalize_query(query))
    }
}

/// Escapes `%` and `:` so an id is always exactly one key segment.
///
/// Store-assigned ids contain neither character and pass through unchanged.
fn escape_segment(segment: &str) -> String {
    if !segment.contains(['%', ':']) {
        return segment.to_string();
    }
    segment.replace('%', "%25").replace(':', "%3A")
}

/// Trims, collapses runs of whitespace to one space, and lowercases.
///
/// Search matching is case-insensitive, so queries differing only in case
/// or spacing share a cache entry.
pub fn normalize_query(query: &str) -> String {
    query
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

// == Call Args ==
/// Arguments of a memoized call, rendered for key derivation.
///
/// Positional arguments keep their order; keyword arguments are kept
/// sorted by name so call sites may pass them in any order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallArgs {
    positional: Vec<String>,
    keyword: BTreeMap<String, String>,
}

impl CallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a positional argument.
    pub fn arg(mut self, value: impl Display) -> Self {
        self.positional.push(value.to_string());
        self
    }

    /// Sets a keyword argument, replacing an earlier one of the same name.
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Display) -> Self {
        self.keyword.insert(name.into(), value.to_string());
        self
    }

    pub fn positional(&self) -> &[String] {
        &self.positional
    }

    pub fn keyword(&self, name: &str) -> Option<&str> {
        self.keyword.get(name).map(String::as_str)
    }

    /// `<prefix>:<function>:<a_b_c>:<k1=v1_k2=v2>`, trailing separators stripped.
    pub fn cache_key(&self, prefix: &str, function: &str) -> String {
        let positional = self.positional.join("_");
        let keyword = self
            .keyword
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("_");

        let key = format!("{}:{}:{}:{}", prefix, function, positional, keyword);
        key.trim_end_matches(':').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_key() {
        let keys = KeySpace::new("product");
        assert_eq!(keys.entity("65a1f0"), "product:65a1f0");
    }

    #[test]
    fn test_list_key() {
        let keys = KeySpace::new("product");
        assert_eq!(keys.list(100), "product:all:100");
    }

    #[test]
    fn test_search_key_normalized() {
        let keys = KeySpace::new("product");
        assert_eq!(keys.search("  Café   Latte "), "product:search:café latte");
        assert_eq!(keys.search("cafe"), keys.search("CAFE"));
    }

    #[test]
    fn test_entity_id_cannot_alias_other_shapes() {
        let keys = KeySpace::new("product");

        assert_ne!(keys.entity("all:100"), keys.list(100));
        assert_ne!(keys.entity("search:cafe"), keys.search("cafe"));
        assert_eq!(keys.entity("a:b%c"), "product:a%3Ab%25c");
    }

    #[test]
    fn test_prefix_covers_all_shapes() {
        let keys = KeySpace::new("product");
        let prefix = keys.prefix();

        assert!(keys.entity("1").starts_with(&prefix));
        assert!(keys.list(5).starts_with(&prefix));
        assert!(keys.search("x").starts_with(&prefix));
    }

    #[test]
    fn test_call_key_positional_and_keyword() {
        let args = CallArgs::new().arg(42).arg("red").kwarg("limit", 10);
        assert_eq!(
            args.cache_key("cache", "find_products"),
            "cache:find_products:42_red:limit=10"
        );
    }

    #[test]
    fn test_call_key_keyword_order_independent() {
        let a = CallArgs::new().kwarg("b", 2).kwarg("a", 1);
        let b = CallArgs::new().kwarg("a", 1).kwarg("b", 2);

        assert_eq!(a.cache_key("cache", "f"), "cache:f::a=1_b=2");
        assert_eq!(a.cache_key("cache", "f"), b.cache_key("cache", "f"));
    }

    #[test]
    fn test_call_key_strips_trailing_separators() {
        assert_eq!(CallArgs::new().arg(7).cache_key("cache", "f"), "cache:f:7");
        assert_eq!(CallArgs::new().cache_key("cache", "f"), "cache:f");
    }

    #[test]
    fn test_kwarg_replaces_same_name() {
        let args = CallArgs::new().kwarg("limit", 5).kwarg("limit", 10);
        assert_eq!(args.keyword("limit"), Some("10"));
    }
}
