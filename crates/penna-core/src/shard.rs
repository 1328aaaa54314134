// this_file: crates/penna-core/src/shard.rs

//! Sharded LRU engine shared by the outline and shaping caches.
//!
//! Keys are spread over a power-of-two number of shards by hash; each shard
//! owns a reader/writer lock over a hash map plus an intrusive doubly-linked
//! LRU list backed by a slab, giving O(1) promotion and eviction. A global
//! frame counter drives `maintain()`, which sweeps entries that have not
//! been touched within the frame lifetime even when the cache is nowhere
//! near capacity.

use crate::stats::{CacheCounters, CacheStats};
use parking_lot::RwLock;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

/// Default shard count. Must stay a power of two: shard selection is
/// `hash & (count - 1)`.
pub const DEFAULT_SHARD_COUNT: usize = 16;

/// Default number of frames an entry may sit untouched before `maintain()`
/// retires it.
pub const DEFAULT_FRAME_LIFETIME: u64 = 60;

const NIL: usize = usize::MAX;

struct Node<K, V> {
    key: K,
    value: V,
    prev: usize,
    next: usize,
    last_access_frame: u64,
}

struct ShardInner<K, V> {
    map: HashMap<K, usize>,
    slab: Vec<Option<Node<K, V>>>,
    free: Vec<usize>,
    /// Most-recently-used node.
    head: usize,
    /// Least-recently-used node.
    tail: usize,
}

impl<K: Hash + Eq + Clone, V> ShardInner<K, V> {
    fn new() -> Self {
        Self {
            map: HashMap::new(),
            slab: Vec::new(),
            free: Vec::new(),
            head: NIL,
            tail: NIL,
        }
    }

    fn node(&self, idx: usize) -> &Node<K, V> {
        // Indices in the map always point at live slab entries.
        match &self.slab[idx] {
            Some(node) => node,
            None => unreachable!("dangling LRU slab index"),
        }
    }

    fn node_mut(&mut self, idx: usize) -> &mut Node<K, V> {
        match &mut self.slab[idx] {
            Some(node) => node,
            None => unreachable!("dangling LRU slab index"),
        }
    }

    fn detach(&mut self, idx: usize) {
        let (prev, next) = {
            let n = self.node(idx);
            (n.prev, n.next)
        };
        if prev != NIL {
            self.node_mut(prev).next = next;
        } else {
            self.head = next;
        }
        if next != NIL {
            self.node_mut(next).prev = prev;
        } else {
            self.tail = prev;
        }
    }

    fn push_front(&mut self, idx: usize) {
        let old_head = self.head;
        {
            let n = self.node_mut(idx);
            n.prev = NIL;
            n.next = old_head;
        }
        if old_head != NIL {
            self.node_mut(old_head).prev = idx;
        } else {
            self.tail = idx;
        }
        self.head = idx;
    }

    fn promote(&mut self, idx: usize, frame: u64) {
        if self.head != idx {
            self.detach(idx);
            self.push_front(idx);
        }
        self.node_mut(idx).last_access_frame = frame;
    }

    /// Insert or overwrite. Returns true when the key was not present.
    fn insert(&mut self, key: K, value: V, frame: u64) -> bool {
        if let Some(&idx) = self.map.get(&key) {
            self.node_mut(idx).value = value;
            self.promote(idx, frame);
            return false;
        }
        let node = Node {
            key: key.clone(),
            value,
            prev: NIL,
            next: NIL,
            last_access_frame: frame,
        };
        let idx = match self.free.pop() {
            Some(idx) => {
                self.slab[idx] = Some(node);
                idx
            }
            None => {
                self.slab.push(Some(node));
                self.slab.len() - 1
            }
        };
        self.push_front(idx);
        self.map.insert(key, idx);
        true
    }

    fn remove_idx(&mut self, idx: usize) {
        self.detach(idx);
        if let Some(node) = self.slab[idx].take() {
            self.map.remove(&node.key);
        }
        self.free.push(idx);
    }

    fn remove_key(&mut self, key: &K) -> bool {
        if let Some(&idx) = self.map.get(key) {
            self.remove_idx(idx);
            true
        } else {
            false
        }
    }

    /// Evict from the tail until at most `capacity` entries remain.
    fn evict_to(&mut self, capacity: usize) -> u64 {
        if capacity == 0 {
            return 0; // unbounded
        }
        let mut evicted = 0;
        while self.map.len() > capacity && self.tail != NIL {
            self.remove_idx(self.tail);
            evicted += 1;
        }
        evicted
    }

    /// Retire entries untouched since before `min_frame`, walking from the
    /// tail. Access frames are monotone along the list, so the walk stops
    /// at the first fresh entry.
    fn sweep_older_than(&mut self, min_frame: u64) -> u64 {
        let mut evicted = 0;
        while self.tail != NIL && self.node(self.tail).last_access_frame < min_frame {
            self.remove_idx(self.tail);
            evicted += 1;
        }
        evicted
    }

    fn clear(&mut self) {
        self.map.clear();
        self.slab.clear();
        self.free.clear();
        self.head = NIL;
        self.tail = NIL;
    }
}

/// Sharded, frame-lifetime-bounded LRU cache.
///
/// Total capacity is split evenly across shards; `len() <= capacity` holds
/// per shard, not globally against a shared budget, so a pathological key
/// distribution can under-use some shards. Values are cloned out on hits;
/// callers store `Arc`ed payloads.
pub struct ShardedCache<K, V> {
    shards: Box<[RwLock<ShardInner<K, V>>]>,
    shard_mask: u64,
    per_shard_capacity: usize,
    frame: AtomicU64,
    frame_lifetime: u64,
    counters: CacheCounters,
}

impl<K: Hash + Eq + Clone, V: Clone> ShardedCache<K, V> {
    /// `total_capacity` 0 means unbounded. `shard_count` must be a power of
    /// two. `frame_lifetime` is the `maintain()` TTL in frames.
    pub fn new(total_capacity: usize, shard_count: usize, frame_lifetime: u64) -> Self {
        assert!(
            shard_count.is_power_of_two(),
            "shard count must be a power of two"
        );
        let per_shard_capacity = if total_capacity == 0 {
            0
        } else {
            (total_capacity / shard_count).max(1)
        };
        let shards = (0..shard_count)
            .map(|_| RwLock::new(ShardInner::new()))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Self {
            shards,
            shard_mask: (shard_count - 1) as u64,
            per_shard_capacity,
            frame: AtomicU64::new(0),
            frame_lifetime,
            counters: CacheCounters::new(),
        }
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    pub fn per_shard_capacity(&self) -> usize {
        self.per_shard_capacity
    }

    fn hash_key(key: &K) -> u64 {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        hasher.finish()
    }

    fn shard(&self, key: &K) -> &RwLock<ShardInner<K, V>> {
        &self.shards[(Self::hash_key(key) & self.shard_mask) as usize]
    }

    fn current_frame(&self) -> u64 {
        self.frame.load(Ordering::Relaxed)
    }

    /// Look up `key`. A hit promotes the entry to most-recently-used within
    /// its shard; the existence probe runs under the read lock so misses
    /// never contend with writers.
    pub fn get(&self, key: &K) -> Option<V> {
        let shard = self.shard(key);
        {
            let inner = shard.read();
            if !inner.map.contains_key(key) {
                self.counters.record_miss();
                return None;
            }
        }
        let frame = self.current_frame();
        let mut inner = shard.write();
        // Re-check: the entry may have been evicted between locks.
        if let Some(&idx) = inner.map.get(key) {
            inner.promote(idx, frame);
            self.counters.record_hit();
            Some(inner.node(idx).value.clone())
        } else {
            self.counters.record_miss();
            None
        }
    }

    /// Insert or overwrite, then evict from the shard tail until the shard
    /// is within its per-shard capacity.
    pub fn set(&self, key: K, value: V) {
        let frame = self.current_frame();
        let shard = self.shard(&key);
        let mut inner = shard.write();
        inner.insert(key, value, frame);
        self.counters.record_insertion();
        let evicted = inner.evict_to(self.per_shard_capacity);
        self.counters.record_evictions(evicted);
    }

    /// Return the cached value or create and cache it.
    ///
    /// Double-checked read→write upgrade: the creator runs under the shard
    /// write lock and is invoked at most once per (shard, key) concurrent
    /// miss window. Keep creators fast; every other key in the shard waits
    /// on them.
    pub fn get_or_create(&self, key: K, create: impl FnOnce() -> V) -> V {
        if let Some(value) = self.get(&key) {
            return value;
        }
        let frame = self.current_frame();
        let shard = self.shard(&key);
        let mut inner = shard.write();
        if let Some(&idx) = inner.map.get(&key) {
            // Lost the race: another caller committed first.
            inner.promote(idx, frame);
            self.counters.record_hit();
            return inner.node(idx).value.clone();
        }
        let value = create();
        inner.insert(key, value.clone(), frame);
        self.counters.record_insertion();
        let evicted = inner.evict_to(self.per_shard_capacity);
        self.counters.record_evictions(evicted);
        value
    }

    /// Like [`get_or_create`](Self::get_or_create) but the creator may
    /// decline; `None` results are not cached.
    pub fn get_or_try_create(&self, key: K, create: impl FnOnce() -> Option<V>) -> Option<V> {
        if let Some(value) = self.get(&key) {
            return Some(value);
        }
        let frame = self.current_frame();
        let shard = self.shard(&key);
        let mut inner = shard.write();
        if let Some(&idx) = inner.map.get(&key) {
            inner.promote(idx, frame);
            self.counters.record_hit();
            return Some(inner.node(idx).value.clone());
        }
        let value = create()?;
        inner.insert(key, value.clone(), frame);
        self.counters.record_insertion();
        let evicted = inner.evict_to(self.per_shard_capacity);
        self.counters.record_evictions(evicted);
        Some(value)
    }

    /// Advance the frame counter and retire entries untouched for more than
    /// the frame lifetime. Expected to be called once per rendered frame.
    pub fn maintain(&self) {
        let current = self.frame.fetch_add(1, Ordering::Relaxed) + 1;
        let min_frame = current.saturating_sub(self.frame_lifetime);
        let mut evicted = 0;
        for shard in self.shards.iter() {
            evicted += shard.write().sweep_older_than(min_frame);
        }
        self.counters.record_evictions(evicted);
        if evicted > 0 {
            log::debug!("cache maintain: frame {current}, swept {evicted} cold entries");
        }
    }

    /// Remove a single entry. Returns whether it was present.
    pub fn delete(&self, key: &K) -> bool {
        self.shard(key).write().remove_key(key)
    }

    /// Remove every entry whose key matches `pred`. Used when a font source
    /// closes and its id must not linger in any cache.
    pub fn evict_matching(&self, pred: impl Fn(&K) -> bool) -> u64 {
        let mut evicted = 0;
        for shard in self.shards.iter() {
            let mut inner = shard.write();
            let doomed: Vec<K> = inner.map.keys().filter(|k| pred(*k)).cloned().collect();
            for key in &doomed {
                inner.remove_key(key);
            }
            evicted += doomed.len() as u64;
        }
        self.counters.record_evictions(evicted);
        evicted
    }

    /// Drop all entries and reset statistics. The frame counter keeps
    /// running; TTL ages are relative, not absolute.
    pub fn clear(&self) {
        for shard in self.shards.iter() {
            shard.write().clear();
        }
        self.counters.reset();
    }

    pub fn len(&self) -> usize {
        self.shards.iter().map(|s| s.read().map.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot()
    }
}
