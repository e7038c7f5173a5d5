//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the cache's behavioural properties over random
//! operation sequences, on a manual clock.

use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{cache_key, CachePolicy, FetchOptions, MemoryCache, SharedCache};
use crate::platform::ManualClock;

// == Test Configuration ==
const TEST_MAX_SIZE: usize = 100;

fn new_store(max_size: usize) -> (MemoryCache<String>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(1_000_000));
    (MemoryCache::with_clock(max_size, clock.clone()), clock)
}

fn policy(ttl_ms: u64) -> CachePolicy {
    CachePolicy::new(Duration::from_millis(ttl_ms))
}

// == Strategies ==
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-z0-9:_]{1,24}"
}

fn value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{1,64}"
}

fn tag_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("products".to_string()),
        Just("categories".to_string()),
        Just("media".to_string()),
    ]
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: String },
    Get { key: String },
    Advance { ms: u64 },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (key_strategy(), value_strategy()).prop_map(|(key, value)| CacheOp::Set { key, value }),
        key_strategy().prop_map(|key| CacheOp::Get { key }),
        (0u64..2_000).prop_map(|ms| CacheOp::Advance { ms }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // A key that was never set is absent.
    #[test]
    fn prop_unset_key_is_absent(keys in prop::collection::vec(key_strategy(), 0..20), missing in key_strategy()) {
        prop_assume!(!keys.contains(&missing));
        let (mut store, _) = new_store(TEST_MAX_SIZE);

        for key in keys {
            store.set(key, "v".to_string(), &policy(60_000));
        }

        prop_assert!(store.get(&missing).is_none());
    }

    // Immediately after set, get returns the stored value.
    #[test]
    fn prop_set_then_get(key in key_strategy(), value in value_strategy(), ttl in 1u64..100_000) {
        let (mut store, _) = new_store(TEST_MAX_SIZE);

        store.set(key.clone(), value.clone(), &policy(ttl));

        prop_assert_eq!(store.get(&key), Some(value));
    }

    // Past its TTL an entry is absent, and stays absent on repeated reads.
    #[test]
    fn prop_expired_entry_is_absent(
        key in key_strategy(),
        value in value_strategy(),
        ttl in 0u64..100_000,
        overshoot in 1u64..100_000,
    ) {
        let (mut store, clock) = new_store(TEST_MAX_SIZE);

        store.set(key.clone(), value, &policy(ttl));
        clock.advance(Duration::from_millis(ttl + overshoot));

        prop_assert!(store.get(&key).is_none());
        prop_assert!(store.get(&key).is_none());
        prop_assert!(!store.contains_key(&key));
    }

    // Inserting max_size + 1 distinct keys evicts exactly the first key.
    #[test]
    fn prop_oldest_inserted_evicted_first(keys in prop::collection::hash_set(key_strategy(), 2..40)) {
        let keys: Vec<String> = keys.into_iter().collect();
        let capacity = keys.len() - 1;
        let (mut store, _) = new_store(capacity);

        for key in &keys {
            store.set(key.clone(), format!("value_{}", key), &policy(60_000));
        }

        prop_assert_eq!(store.len(), capacity);
        prop_assert!(!store.contains_key(&keys[0]), "First key should have been evicted");
        for key in &keys[1..] {
            prop_assert!(store.contains_key(key), "Key '{}' should survive", key);
        }
    }

    // Size never exceeds max_size, whatever the operation sequence.
    #[test]
    fn prop_capacity_enforcement(ops in prop::collection::vec(cache_op_strategy(), 1..200)) {
        let max_size = 20;
        let (mut store, clock) = new_store(max_size);

        for op in ops {
            match op {
                CacheOp::Set { key, value } => store.set(key, value, &policy(1_000)),
                CacheOp::Get { key } => { store.get(&key); }
                CacheOp::Advance { ms } => clock.advance(Duration::from_millis(ms)),
            }
            prop_assert!(store.len() <= max_size, "Cache size {} exceeds max {}", store.len(), max_size);
        }
    }

    // Hits and misses are counted exactly.
    #[test]
    fn prop_statistics_accuracy(ops in prop::collection::vec(cache_op_strategy(), 1..50)) {
        let (mut store, clock) = new_store(TEST_MAX_SIZE);
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;

        for op in ops {
            match op {
                CacheOp::Set { key, value } => store.set(key, value, &policy(1_000)),
                CacheOp::Get { key } => match store.get(&key) {
                    Some(_) => expected_hits += 1,
                    None => expected_misses += 1,
                },
                CacheOp::Advance { ms } => clock.advance(Duration::from_millis(ms)),
            }
        }

        let stats = store.stats();
        prop_assert_eq!(stats.hits, expected_hits);
        prop_assert_eq!(stats.misses, expected_misses);
        prop_assert_eq!(stats.total_entries, store.len());
    }

    // Tag invalidation removes exactly the tagged entries.
    #[test]
    fn prop_invalidate_by_tag(entries in prop::collection::hash_map(key_strategy(), prop::option::of(tag_strategy()), 1..40)) {
        let (mut store, _) = new_store(TEST_MAX_SIZE);

        for (key, tag) in &entries {
            let policy = match tag {
                Some(tag) => policy(60_000).with_tags([tag.clone()]),
                None => policy(60_000),
            };
            store.set(key.clone(), "v".to_string(), &policy);
        }

        let tagged: HashSet<&String> = entries
            .iter()
            .filter(|(_, tag)| tag.as_deref() == Some("products"))
            .map(|(key, _)| key)
            .collect();

        let removed = store.invalidate(Some(&["products"][..]));

        prop_assert_eq!(removed, tagged.len());
        for key in entries.keys() {
            prop_assert_eq!(store.contains_key(key), !tagged.contains(key));
        }

        store.invalidate(None);
        prop_assert!(store.is_empty());
    }

    // Parameter order never changes the key.
    #[test]
    fn prop_cache_key_order_independent(params in prop::collection::btree_map("[a-z]{1,8}", "[a-z0-9]{0,8}", 0..8)) {
        let forward: Vec<(String, String)> = params.clone().into_iter().collect();
        let mut backward = forward.clone();
        backward.reverse();

        prop_assert_eq!(cache_key("products", forward), cache_key("products", backward));
    }

    // A failing fetcher is answered from a still-valid cached value.
    #[test]
    fn prop_with_cache_stale_fallback(key in key_strategy(), value in value_strategy()) {
        let (store, _) = new_store(TEST_MAX_SIZE);
        let cache = SharedCache::new(store);

        let result = tokio_test::block_on(async {
            cache.set(key.clone(), value.clone(), &policy(60_000)).await;
            cache
                .with_cache(&key, || async { Err::<String, _>("down") }, &policy(60_000), FetchOptions::refresh())
                .await
        });

        prop_assert_eq!(result, Ok(value));
    }
}
