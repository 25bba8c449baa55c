// ==============================================
// END-TO-END POLICY SCENARIOS (integration)
// ==============================================
//
// Short operation scripts with fully determined outcomes, one module per
// policy, driven only through the public API.

mod lru_scenarios {
    use evictkit::policy::lru::LruCache;
    use evictkit::traits::CoreCache;

    #[test]
    fn get_rescues_key_from_eviction() {
        let mut cache = LruCache::new(2);
        cache.insert(1, "a");
        cache.insert(2, "b");
        assert_eq!(cache.get(&1), Some(&"a"));

        cache.insert(3, "c");
        assert_eq!(cache.get(&2), None);
        assert_eq!(cache.get(&3), Some(&"c"));
        assert_eq!(cache.get(&1), Some(&"a"));
    }

    #[test]
    fn overflow_without_reads_drops_first_insert() {
        let capacity = 8;
        let mut cache = LruCache::new(capacity);
        for key in 0..=capacity {
            cache.insert(key, key * 2);
        }
        assert!(!cache.contains(&0));
        for key in 1..=capacity {
            assert!(cache.contains(&key), "key {} should survive", key);
        }
    }

    #[test]
    fn zero_capacity_always_misses() {
        let mut cache = LruCache::new(0);
        for key in 0..10 {
            cache.insert(key, key);
            assert_eq!(cache.get(&key), None);
        }
        assert_eq!(cache.len(), 0);
    }
}

mod lfu_scenarios {
    use evictkit::policy::lfu::LfuCache;
    use evictkit::traits::CoreCache;

    #[test]
    fn globally_least_frequent_is_evicted() {
        let mut cache = LfuCache::new(3);
        cache.insert("hot", 1);
        cache.insert("warm", 2);
        cache.insert("cold", 3);
        for _ in 0..5 {
            cache.get(&"hot");
        }
        cache.get(&"warm");
        cache.get(&"warm");

        cache.insert("new", 4);
        assert!(!cache.contains(&"cold"));
        assert!(cache.contains(&"hot"));
        assert!(cache.contains(&"warm"));
    }

    #[test]
    fn ties_evict_least_recently_accessed() {
        let mut cache = LfuCache::new(3);
        cache.insert(1, ());
        cache.insert(2, ());
        cache.insert(3, ());
        cache.get(&1);
        cache.get(&2);
        cache.get(&3);
        // all at frequency 2; key 1 was touched longest ago
        cache.insert(4, ());
        assert!(!cache.contains(&1));
        assert!(cache.contains(&2));
    }

    #[test]
    fn update_counts_as_access() {
        let mut cache = LfuCache::new(2);
        cache.insert("a", 1);
        cache.insert("b", 2);
        assert_eq!(cache.insert("a", 10), Some(1));
        assert_eq!(cache.frequency(&"a"), Some(2));

        cache.insert("c", 3);
        assert!(!cache.contains(&"b"));
        assert_eq!(cache.peek(&"a"), Some(&10));
    }

    #[test]
    fn rescale_changes_the_victim() {
        // Without aging "a" (count 3) outranks "b" (count 2) and "b" would
        // go. Halving flattens both to 1, after which recency decides and
        // the older "a" goes instead.
        let mut plain = LfuCache::new(2);
        let mut aged = LfuCache::with_aging(2, 2);
        for cache in [&mut plain, &mut aged] {
            cache.insert("a", ());
            cache.get(&"a");
            cache.insert("b", ());
            cache.get(&"a");
            cache.get(&"b");
            cache.insert("c", ());
        }
        assert!(plain.contains(&"a"));
        assert!(!plain.contains(&"b"));
        assert!(!aged.contains(&"a"));
        assert!(aged.contains(&"b"));
    }
}

mod lru_k_scenarios {
    use evictkit::policy::lru_k::LrukCache;
    use evictkit::traits::CoreCache;

    #[test]
    fn promotion_and_main_eviction() {
        let mut cache = LrukCache::new(1, 10, 2);
        cache.insert(1, "a");
        assert_eq!(cache.get(&1), Some(&"a"));

        cache.insert(2, "b");
        assert_eq!(cache.get(&2), Some(&"b"));
        assert!(!cache.contains(&1));

        assert_eq!(cache.get(&1), None);
    }

    #[test]
    fn put_plus_reads_reaching_k_promotes() {
        let k = 4;
        let mut cache = LrukCache::new(4, 16, k);
        cache.insert("key", 42);
        // the put is the first of k accesses
        for _ in 0..k - 2 {
            assert_eq!(cache.get(&"key"), None);
            assert!(!cache.contains(&"key"));
        }
        assert_eq!(cache.get(&"key"), Some(&42));
        assert!(cache.contains(&"key"));
        assert_eq!(cache.history_hits(&"key"), None);
    }

    #[test]
    fn reads_alone_never_promote() {
        let mut cache: LrukCache<u32, u32> = LrukCache::new(4, 16, 2);
        for _ in 0..50 {
            assert_eq!(cache.get(&7), None);
        }
        assert!(!cache.contains(&7));
        assert!(cache.history_hits(&7).unwrap_or(0) > 0);
    }

    #[test]
    fn promoted_value_is_latest_put() {
        let mut cache = LrukCache::new(2, 8, 3);
        cache.insert("k", 1);
        cache.insert("k", 2);
        assert_eq!(cache.get(&"k"), Some(&2));
    }
}

mod arc_scenarios {
    use evictkit::policy::arc::ArcCache;
    use evictkit::traits::CoreCache;

    #[test]
    fn frequent_keys_survive_a_scan() {
        let mut cache = ArcCache::new(4);
        for key in [1, 2] {
            cache.insert(key, key);
            cache.get(&key);
        }
        for key in 100..120 {
            cache.insert(key, key);
        }
        assert!(cache.contains(&1));
        assert!(cache.contains(&2));
        assert!(cache.len() <= 4);
    }

    #[test]
    fn recency_ghost_hits_raise_p_until_frequency_ghost_hit() {
        let mut cache = ArcCache::new(4);
        for key in [1, 2] {
            cache.insert(key, key);
            cache.get(&key);
        }
        cache.insert(3, 3);
        cache.insert(4, 4);
        cache.insert(5, 5);

        let mut trajectory = vec![cache.p_value()];
        cache.insert(3, 3);
        trajectory.push(cache.p_value());
        cache.insert(4, 4);
        trajectory.push(cache.p_value());
        assert!(trajectory.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(trajectory, vec![0, 1, 2]);

        cache.insert(1, 1);
        assert_eq!(cache.p_value(), 1);
        assert!(cache.check_invariants().is_ok());
    }
}

#[cfg(feature = "concurrency")]
mod sharded_scenarios {
    use evictkit::concurrent::ShardedCache;
    use evictkit::policy::lru::LruCache;
    use evictkit::traits::CachePolicy;

    #[test]
    fn five_over_two_splits_three_two() {
        let cache: ShardedCache<LruCache<u64, u64>> =
            ShardedCache::try_new(5, 2, LruCache::new).unwrap();
        assert_eq!(cache.shard_capacities(), vec![3, 2]);
        assert_eq!(cache.capacity(), 5);
    }

    #[test]
    fn capacities_sum_for_any_split() {
        for capacity in 0..40 {
            for shards in 1..9 {
                let cache: ShardedCache<LruCache<u64, u64>> =
                    ShardedCache::try_new(capacity, shards, LruCache::new).unwrap();
                assert_eq!(cache.shard_capacities().iter().sum::<usize>(), capacity);
            }
        }
    }

    #[test]
    fn routing_is_stable() {
        let cache: ShardedCache<LruCache<String, u64>> =
            ShardedCache::try_new(64, 8, LruCache::new).unwrap();
        for i in 0..100 {
            let key = format!("user:{}", i);
            let first = cache.shard_for_key(&key);
            for _ in 0..5 {
                assert_eq!(cache.shard_for_key(&key), first);
            }
        }
        cache.put("x".to_string(), 1);
        assert_eq!(cache.get(&"x".to_string()), Some(1));
    }
}
