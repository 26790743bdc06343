//! Property-Based Tests for the caching layer
//!
//! Uses proptest to check key derivation and hit/miss accounting, and that
//! reads through the repository always agree with the document store.

use proptest::prelude::*;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{CacheBackend, CacheHandle, CacheStats, CallArgs, KeySpace, MemoryCache};
use crate::models::{Entity, FieldValue, Fields};
use crate::repository::CacheAsideRepository;
use crate::store::{DocumentStore, Filter, MemoryDocumentStore};

// == Strategies ==
fn namespace_strategy() -> impl Strategy<Value = String> {
    "[a-z]{1,12}"
}

fn id_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9:%_-]{1,32}"
}

fn kwargs_strategy() -> impl Strategy<Value = Vec<(String, i64)>> {
    prop::collection::btree_map("[a-z]{1,8}", any::<i64>(), 0..6)
        .prop_map(|map| map.into_iter().collect())
}

fn handle(cache: Arc<MemoryCache>) -> CacheHandle {
    let backend: Arc<dyn CacheBackend> = cache;
    CacheHandle::new(backend, Duration::from_secs(1))
}

/// Repository operations exercised against a shared pool of ids
#[derive(Debug, Clone)]
enum RepoOp {
    Create(String),
    Get(usize),
    Update(usize, String),
    Delete(usize),
    List,
}

fn repo_op_strategy() -> impl Strategy<Value = RepoOp> {
    prop_oneof![
        "[a-z]{1,8}".prop_map(RepoOp::Create),
        (0usize..8).prop_map(RepoOp::Get),
        ((0usize..8), "[a-z]{1,8}").prop_map(|(i, name)| RepoOp::Update(i, name)),
        (0usize..8).prop_map(RepoOp::Delete),
        Just(RepoOp::List),
    ]
}

fn named(name: &str) -> Fields {
    let mut fields = Fields::new();
    fields.insert("nombre".into(), name.into());
    fields
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Equal lookups derive byte-identical keys.
    #[test]
    fn prop_key_derivation_is_deterministic(ns in namespace_strategy(), id in id_strategy(), limit in 0usize..1000) {
        let a = KeySpace::new(ns.clone());
        let b = KeySpace::new(ns);

        prop_assert_eq!(a.entity(&id), b.entity(&id));
        prop_assert_eq!(a.list(limit), b.list(limit));
        prop_assert_eq!(a.search(&id), b.search(&id));
    }

    // An entity key is never mistaken for a list or search key, and
    // distinct ids never share a key.
    #[test]
    fn prop_entity_keys_do_not_collide(id in id_strategy(), other in id_strategy(), limit in 0usize..1000) {
        let keys = KeySpace::new("product");

        prop_assert_ne!(keys.entity(&id), keys.list(limit));
        prop_assert!(!keys.entity(&id).starts_with("product:search:"));
        if id != other {
            prop_assert_ne!(keys.entity(&id), keys.entity(&other));
        }
    }

    // Keyword arguments may be supplied in any order.
    #[test]
    fn prop_keyword_order_does_not_change_key(
        positional in prop::collection::vec("[a-z0-9]{1,6}", 0..4),
        kwargs in kwargs_strategy(),
    ) {
        let build = |pairs: &[(String, i64)]| {
            let mut args = CallArgs::new();
            for p in &positional {
                args = args.arg(p);
            }
            for (k, v) in pairs {
                args = args.kwarg(k.clone(), v);
            }
            args.cache_key("cache", "f")
        };

        let mut reversed = kwargs.clone();
        reversed.reverse();
        prop_assert_eq!(build(&kwargs), build(&reversed));
    }

    // Counters reflect exactly the recorded events and never go negative.
    #[test]
    fn prop_statistics_accuracy(events in prop::collection::vec(any::<bool>(), 0..60)) {
        let stats = CacheStats::new(handle(Arc::new(MemoryCache::new())));
        let expected_hits = events.iter().filter(|hit| **hit).count() as u64;
        let expected_misses = events.len() as u64 - expected_hits;

        let snapshot = tokio_test::block_on(async {
            for hit in &events {
                if *hit {
                    stats.record_hit().await;
                } else {
                    stats.record_miss().await;
                }
            }
            stats.snapshot().await.unwrap()
        });

        prop_assert_eq!(snapshot.hits, expected_hits);
        prop_assert_eq!(snapshot.misses, expected_misses);
        prop_assert_eq!(snapshot.total, events.len() as u64);
        prop_assert!(snapshot.hit_ratio >= 0.0 && snapshot.hit_ratio <= 100.0);
    }

    // Whatever the interleaving of writes, a read through the cache returns
    // what the document store holds at that moment.
    #[test]
    fn prop_reads_agree_with_store(ops in prop::collection::vec(repo_op_strategy(), 1..40)) {
        let store = Arc::new(MemoryDocumentStore::new());
        let repo = CacheAsideRepository::new(
            handle(Arc::new(MemoryCache::new())),
            store.clone(),
            "products",
            KeySpace::new("product"),
        );

        tokio_test::block_on(async {
            let mut ids: Vec<String> = Vec::new();

            for op in ops {
                match op {
                    RepoOp::Create(name) => {
                        let created = repo.create(named(&name)).await.unwrap();
                        ids.push(created.id);
                    }
                    RepoOp::Update(i, name) if !ids.is_empty() => {
                        let id = &ids[i % ids.len()];
                        let updated = repo.update(id, named(&name)).await.unwrap();
                        if let Some(entity) = updated {
                            let expected = FieldValue::from(name.as_str());
                            assert_eq!(entity.get("nombre"), Some(&expected));
                        }
                    }
                    RepoOp::Delete(i) if !ids.is_empty() => {
                        let id = ids[i % ids.len()].clone();
                        repo.delete(&id).await.unwrap();
                    }
                    RepoOp::Get(i) if !ids.is_empty() => {
                        let id = &ids[i % ids.len()];
                        let cached = repo.get(id).await.unwrap();
                        let stored = store.find_by_id("products", id).await.unwrap();
                        assert_eq!(cached, stored.map(Entity::from));
                    }
                    RepoOp::List => {
                        let listed = repo.list_all(100).await.unwrap();
                        let stored = store.find_many("products", &Filter::All, 100).await.unwrap();
                        assert_eq!(listed.len(), stored.len());
                    }
                    _ => {}
                }
            }
        });
    }
}
