// this_file: crates/penna-core/src/outline_cache.rs

//! Sharded cache for extracted glyph outlines.

use crate::outline::GlyphOutline;
use crate::shard::{ShardedCache, DEFAULT_FRAME_LIFETIME, DEFAULT_SHARD_COUNT};
use crate::stats::CacheStats;
use crate::types::{GlyphId, Hinting};
use std::sync::Arc;

/// Key identifying one cached outline.
///
/// Equality is bit-exact: `size` is the integral point size, and `font_id`
/// is the owning source's identity (the sub-pixel wrapper packs quantized
/// offsets into its high bits, see `subpixel`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutlineCacheKey {
    pub font_id: u64,
    pub glyph_id: GlyphId,
    pub size: i16,
    pub hinting: Hinting,
}

impl OutlineCacheKey {
    pub fn new(font_id: u64, glyph_id: GlyphId, size: i16, hinting: Hinting) -> Self {
        Self {
            font_id,
            glyph_id,
            size,
            hinting,
        }
    }

    /// Key for a fractional point size, rounded to the nearest integral
    /// size the cache keys on.
    pub fn for_size(font_id: u64, glyph_id: GlyphId, size: f32, hinting: Hinting) -> Self {
        Self::new(font_id, glyph_id, size.round() as i16, hinting)
    }
}

/// Default total capacity across all shards.
pub const DEFAULT_OUTLINE_CAPACITY: usize = 2048;

/// 16-way sharded, frame-lifetime-bounded outline cache.
pub struct OutlineCache {
    inner: ShardedCache<OutlineCacheKey, Arc<GlyphOutline>>,
}

impl OutlineCache {
    pub fn new(total_capacity: usize) -> Self {
        Self::with_config(total_capacity, DEFAULT_SHARD_COUNT, DEFAULT_FRAME_LIFETIME)
    }

    pub fn with_config(total_capacity: usize, shard_count: usize, frame_lifetime: u64) -> Self {
        Self {
            inner: ShardedCache::new(total_capacity, shard_count, frame_lifetime),
        }
    }

    pub fn get(&self, key: &OutlineCacheKey) -> Option<Arc<GlyphOutline>> {
        self.inner.get(key)
    }

    /// Insert or overwrite. A `None` value is a no-op, mirroring extraction
    /// paths that produced nothing for the glyph.
    pub fn set(&self, key: OutlineCacheKey, value: Option<Arc<GlyphOutline>>) {
        if let Some(outline) = value {
            self.inner.set(key, outline);
        }
    }

    /// Cached outline for `key`, or `create` invoked at most once per
    /// concurrent miss; creators returning `None` (extraction failure) are
    /// not cached and the miss stays a miss.
    pub fn get_or_create(
        &self,
        key: OutlineCacheKey,
        create: impl FnOnce() -> Option<Arc<GlyphOutline>>,
    ) -> Option<Arc<GlyphOutline>> {
        self.inner.get_or_try_create(key, create)
    }

    /// Advance the frame counter and sweep cold entries.
    pub fn maintain(&self) {
        self.inner.maintain();
    }

    pub fn delete(&self, key: &OutlineCacheKey) -> bool {
        self.inner.delete(key)
    }

    /// Drop every entry belonging to a closed font source.
    pub fn evict_font(&self, font_id: u64) -> u64 {
        // Sub-pixel variants of the same source share the low font-id bits.
        self.inner
            .evict_matching(|k| k.font_id & crate::subpixel::FONT_ID_MASK == font_id)
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

impl Default for OutlineCache {
    fn default() -> Self {
        Self::new(DEFAULT_OUTLINE_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::GlyphOutline;

    fn outline(gid: GlyphId) -> Arc<GlyphOutline> {
        Arc::new(GlyphOutline::empty(gid, 10.0))
    }

    #[test]
    fn test_key_equality_is_bit_exact() {
        let a = OutlineCacheKey::new(1, 2, 14, Hinting::None);
        let b = OutlineCacheKey::new(1, 2, 14, Hinting::None);
        let c = OutlineCacheKey::new(1, 2, 14, Hinting::Full);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_for_size_rounds() {
        let k = OutlineCacheKey::for_size(1, 2, 13.6, Hinting::None);
        assert_eq!(k.size, 14);
    }

    #[test]
    fn test_set_none_is_noop() {
        let cache = OutlineCache::new(16);
        cache.set(OutlineCacheKey::new(1, 1, 12, Hinting::None), None);
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_get_or_create_failure_not_cached() {
        let cache = OutlineCache::new(16);
        let key = OutlineCacheKey::new(1, 1, 12, Hinting::None);
        assert!(cache.get_or_create(key, || None).is_none());
        assert_eq!(cache.len(), 0);

        let got = cache.get_or_create(key, || Some(outline(1)));
        assert!(got.is_some());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_evict_font() {
        let cache = OutlineCache::new(256);
        for gid in 0..4 {
            cache.set(
                OutlineCacheKey::new(1, gid, 12, Hinting::None),
                Some(outline(gid)),
            );
            cache.set(
                OutlineCacheKey::new(2, gid, 12, Hinting::None),
                Some(outline(gid)),
            );
        }
        assert_eq!(cache.evict_font(1), 4);
        assert_eq!(cache.len(), 4);
        assert!(cache
            .get(&OutlineCacheKey::new(1, 0, 12, Hinting::None))
            .is_none());
        assert!(cache
            .get(&OutlineCacheKey::new(2, 0, 12, Hinting::None))
            .is_some());
    }
}
