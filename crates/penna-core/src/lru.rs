// this_file: crates/penna-core/src/lru.rs

//! Generic bounded map with access-order eviction.
//!
//! All operations serialize on a single mutex; contention is addressed by
//! sharding at the next level up, not here. Access order is tracked with a
//! monotonic tick per entry, sorted only when eviction actually runs; the
//! sharded caches use an intrusive list instead (see `shard`).

use parking_lot::Mutex;
use std::collections::HashMap;
use std::hash::Hash;

struct LruEntry<V> {
    value: V,
    tick: u64,
}

struct LruInner<K, V> {
    map: HashMap<K, LruEntry<V>>,
    tick: u64,
}

impl<K: Hash + Eq, V> LruInner<K, V> {
    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }
}

/// Mutex-serialized LRU cache.
///
/// `capacity` is soft: insertion may briefly exceed it, after which the
/// oldest entries are evicted down to 75% of capacity so that repeated
/// inserts on the boundary do not churn one entry at a time. A capacity of
/// 0 means unbounded.
pub struct LruCache<K, V> {
    inner: Mutex<LruInner<K, V>>,
    capacity: usize,
}

impl<K: Hash + Eq + Clone, V: Clone> LruCache<K, V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(LruInner {
                map: HashMap::new(),
                tick: 0,
            }),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up `key`, promoting it to most-recently-used on a hit.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut inner = self.inner.lock();
        let tick = inner.next_tick();
        if let Some(entry) = inner.map.get_mut(key) {
            entry.tick = tick;
            Some(entry.value.clone())
        } else {
            None
        }
    }

    /// Insert or overwrite, evicting past the refill band on overflow.
    pub fn set(&self, key: K, value: V) {
        let mut inner = self.inner.lock();
        let tick = inner.next_tick();
        inner.map.insert(key, LruEntry { value, tick });
        Self::evict_overflow(&mut inner, self.capacity);
    }

    /// Return the cached value for `key`, or invoke `create` exactly once
    /// and cache its result.
    ///
    /// The creator runs under the cache lock: concurrent callers for the
    /// same key observe a single invocation, and the contract requires the
    /// creator to be fast for the same reason.
    pub fn get_or_create(&self, key: K, create: impl FnOnce() -> V) -> V {
        let mut inner = self.inner.lock();
        let tick = inner.next_tick();
        if let Some(entry) = inner.map.get_mut(&key) {
            entry.tick = tick;
            return entry.value.clone();
        }
        let value = create();
        inner.map.insert(
            key,
            LruEntry {
                value: value.clone(),
                tick,
            },
        );
        Self::evict_overflow(&mut inner, self.capacity);
        value
    }

    /// Drop all entries and reset the access counter.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.map.clear();
        inner.tick = 0;
    }

    fn evict_overflow(inner: &mut LruInner<K, V>, capacity: usize) {
        if capacity == 0 || inner.map.len() <= capacity {
            return;
        }
        // Refill band: drop to 75% of capacity so the next few inserts are
        // free of eviction work.
        let target = (capacity * 3) / 4;
        let excess = inner.map.len() - target;
        let mut order: Vec<(u64, K)> = inner
            .map
            .iter()
            .map(|(k, e)| (e.tick, k.clone()))
            .collect();
        order.sort_unstable_by_key(|(tick, _)| *tick);
        for (_, key) in order.into_iter().take(excess) {
            inner.map.remove(&key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_get_set_roundtrip() {
        let cache: LruCache<u32, String> = LruCache::new(8);
        assert_eq!(cache.get(&1), None);
        cache.set(1, "one".to_string());
        assert_eq!(cache.get(&1), Some("one".to_string()));
        cache.set(1, "uno".to_string());
        assert_eq!(cache.get(&1), Some("uno".to_string()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_eviction_hits_refill_band() {
        let cache: LruCache<u32, u32> = LruCache::new(8);
        for i in 0..9 {
            cache.set(i, i);
        }
        // Overflow at 9 entries drops to 75% of 8 = 6.
        assert_eq!(cache.len(), 6);
        // The oldest three are gone, the newest survive.
        assert_eq!(cache.get(&0), None);
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.get(&2), None);
        assert_eq!(cache.get(&8), Some(8));
    }

    #[test]
    fn test_get_promotes() {
        let cache: LruCache<u32, u32> = LruCache::new(4);
        for i in 0..4 {
            cache.set(i, i);
        }
        // Touch 0 so it is the most recent, then overflow.
        assert_eq!(cache.get(&0), Some(0));
        cache.set(4, 4);
        // Down to 3 entries; 0 was promoted and must survive.
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.get(&0), Some(0));
        assert_eq!(cache.get(&1), None);
    }

    #[test]
    fn test_zero_capacity_is_unbounded() {
        let cache: LruCache<u32, u32> = LruCache::new(0);
        for i in 0..1000 {
            cache.set(i, i);
        }
        assert_eq!(cache.len(), 1000);
        assert_eq!(cache.get(&0), Some(0));
    }

    #[test]
    fn test_get_or_create_single_invocation() {
        let cache: LruCache<u32, u32> = LruCache::new(8);
        let calls = Arc::new(AtomicUsize::new(0));

        let c = Arc::clone(&calls);
        let v = cache.get_or_create(7, move || {
            c.fetch_add(1, Ordering::SeqCst);
            42
        });
        assert_eq!(v, 42);

        let c = Arc::clone(&calls);
        let v = cache.get_or_create(7, move || {
            c.fetch_add(1, Ordering::SeqCst);
            99
        });
        assert_eq!(v, 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_get_or_create_under_contention() {
        let cache: Arc<LruCache<u32, u32>> = Arc::new(LruCache::new(8));
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = Arc::clone(&cache);
            let calls = Arc::clone(&calls);
            handles.push(std::thread::spawn(move || {
                cache.get_or_create(1, || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    11
                })
            }));
        }
        for h in handles {
            assert_eq!(h.join().ok(), Some(11));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_clear_resets_counter() {
        let cache: LruCache<u32, u32> = LruCache::new(4);
        cache.set(1, 1);
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.inner.lock().tick, 0);
    }
}
