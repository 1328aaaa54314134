// this_file: crates/penna-core/src/shaping_cache.rs

//! Sharded cache for shaped runs.
//!
//! The key hashes the text with FNV-1a; collisions are tolerated because
//! the full key additionally carries font identity, the size bit pattern,
//! direction, and the feature hash.

use crate::shard::{ShardedCache, DEFAULT_FRAME_LIFETIME, DEFAULT_SHARD_COUNT};
use crate::stats::CacheStats;
use crate::types::{Direction, ShapedRun};
use std::sync::Arc;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// FNV-1a over a byte slice.
pub fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Hash of the shaped text, FNV-1a over its UTF-8 bytes.
pub fn text_hash(text: &str) -> u64 {
    fnv1a(text.as_bytes())
}

/// Order-independent hash of an OpenType feature set.
///
/// Each feature's (tag, value) pair hashes independently and the results
/// XOR-fold, so `{liga:1, kern:1}` and `{kern:1, liga:1}` agree.
pub fn hash_features(features: &[(String, u32)]) -> u64 {
    let mut acc = 0u64;
    for (tag, value) in features {
        let mut h = fnv1a(tag.as_bytes());
        for &b in &value.to_le_bytes() {
            h ^= b as u64;
            h = h.wrapping_mul(FNV_PRIME);
        }
        acc ^= h;
    }
    acc
}

/// Key identifying one shaping result.
///
/// `size_bits` is the raw IEEE-754 pattern of the point size: two sizes
/// compare equal only when their bit patterns do, with no float tolerance
/// (so +0.0/-0.0 and NaN payloads are distinct keys, by construction never
/// equal to each other).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapingCacheKey {
    pub text_hash: u64,
    pub font_id: u64,
    pub size_bits: u32,
    pub direction: Direction,
    pub features_hash: u64,
}

impl ShapingCacheKey {
    pub fn new(
        text: &str,
        font_id: u64,
        size: f32,
        direction: Direction,
        features: &[(String, u32)],
    ) -> Self {
        Self {
            text_hash: text_hash(text),
            font_id,
            size_bits: size.to_bits(),
            direction,
            features_hash: hash_features(features),
        }
    }
}

/// Default total capacity across all shards.
pub const DEFAULT_SHAPING_CAPACITY: usize = 1024;

/// 16-way sharded, frame-lifetime-bounded shaping cache.
pub struct ShapingCache {
    inner: ShardedCache<ShapingCacheKey, Arc<ShapedRun>>,
}

impl ShapingCache {
    pub fn new(total_capacity: usize) -> Self {
        Self::with_config(total_capacity, DEFAULT_SHARD_COUNT, DEFAULT_FRAME_LIFETIME)
    }

    pub fn with_config(total_capacity: usize, shard_count: usize, frame_lifetime: u64) -> Self {
        Self {
            inner: ShardedCache::new(total_capacity, shard_count, frame_lifetime),
        }
    }

    pub fn get(&self, key: &ShapingCacheKey) -> Option<Arc<ShapedRun>> {
        self.inner.get(key)
    }

    pub fn set(&self, key: ShapingCacheKey, run: Arc<ShapedRun>) {
        self.inner.set(key, run);
    }

    /// Cached run for `key`, or `shape` invoked at most once per concurrent
    /// miss window.
    pub fn get_or_create(
        &self,
        key: ShapingCacheKey,
        shape: impl FnOnce() -> Arc<ShapedRun>,
    ) -> Arc<ShapedRun> {
        self.inner.get_or_create(key, shape)
    }

    pub fn maintain(&self) {
        self.inner.maintain();
    }

    pub fn delete(&self, key: &ShapingCacheKey) -> bool {
        self.inner.delete(key)
    }

    /// Drop every entry belonging to a closed font source.
    pub fn evict_font(&self, font_id: u64) -> u64 {
        self.inner.evict_matching(|k| k.font_id == font_id)
    }

    pub fn clear(&self) {
        self.inner.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.stats()
    }
}

impl Default for ShapingCache {
    fn default() -> Self {
        Self::new(DEFAULT_SHAPING_CAPACITY)
    }
}
