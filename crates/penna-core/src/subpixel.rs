// this_file: crates/penna-core/src/subpixel.rs

//! Sub-pixel positioning wrapper over the outline cache.
//!
//! Fractional pen positions quantize to one of `mode` steps per enabled
//! axis; each step is a distinct cache entry, so the wrapper multiplies the
//! underlying capacity by the step product to keep the per-glyph working
//! set constant.

use crate::outline::GlyphOutline;
use crate::outline_cache::{OutlineCache, OutlineCacheKey};
use crate::stats::CacheStats;
use crate::types::{Point, SubpixelMode};
use std::sync::Arc;

/// Low bits of `font_id` that carry the source identity; the quantized
/// offsets live above this mask.
pub const FONT_ID_MASK: u64 = (1 << 56) - 1;

const SUB_X_SHIFT: u32 = 60;
const SUB_Y_SHIFT: u32 = 56;

/// Which axes quantize, and how finely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubpixelConfig {
    pub mode: SubpixelMode,
    pub horizontal: bool,
    pub vertical: bool,
}

impl Default for SubpixelConfig {
    /// Horizontal-only quantization at four steps: the common setting for
    /// latin body text.
    fn default() -> Self {
        Self {
            mode: SubpixelMode::Four,
            horizontal: true,
            vertical: false,
        }
    }
}

impl SubpixelConfig {
    /// How many distinct entries one glyph can occupy.
    pub fn capacity_multiplier(&self) -> usize {
        let steps = self.mode.steps() as usize;
        let h = if self.horizontal { steps } else { 1 };
        let v = if self.vertical { steps } else { 1 };
        h * v
    }
}

/// Split a position into its integral pixel and quantized sub-pixel step.
///
/// For an enabled mode, `0 <= sub < steps` always holds and integral
/// positions map to step 0. With the mode off, the position rounds to the
/// nearest pixel and the step is 0.
pub fn quantize(pos: f32, mode: SubpixelMode) -> (i32, u8) {
    match mode {
        SubpixelMode::Off => (pos.round() as i32, 0),
        _ => {
            let steps = mode.steps() as i32;
            let base = pos.floor();
            let frac = pos - base;
            let sub = ((frac * steps as f32).floor() as i32).clamp(0, steps - 1);
            (base as i32, sub as u8)
        }
    }
}

/// Quantized placement for one glyph instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuantizedPosition {
    /// Integral pixel position the cached outline is placed at.
    pub x: i32,
    pub y: i32,
    /// Quantization steps, `0..steps` per enabled axis.
    pub sub_x: u8,
    pub sub_y: u8,
}

impl QuantizedPosition {
    /// Fractional offsets (`0 <= d < 1`) the rasterizer shifts the outline
    /// by before rendering.
    pub fn offsets(&self, mode: SubpixelMode) -> (f32, f32) {
        let steps = mode.steps() as f32;
        (self.sub_x as f32 / steps, self.sub_y as f32 / steps)
    }
}

/// Outline cache with sub-pixel-aware keys.
pub struct SubpixelOutlineCache {
    cache: OutlineCache,
    config: SubpixelConfig,
}

impl SubpixelOutlineCache {
    /// `base_capacity` is the per-working-set budget before quantization;
    /// the wrapped cache is scaled by the step product on construction.
    pub fn new(base_capacity: usize, config: SubpixelConfig) -> Self {
        let scaled = base_capacity * config.capacity_multiplier();
        Self {
            cache: OutlineCache::new(scaled),
            config,
        }
    }

    pub fn config(&self) -> SubpixelConfig {
        self.config
    }

    /// Quantize a pen position according to the configured axes.
    pub fn quantize_position(&self, pos: Point) -> QuantizedPosition {
        let (x, sub_x) = if self.config.horizontal {
            quantize(pos.x, self.config.mode)
        } else {
            quantize(pos.x, SubpixelMode::Off)
        };
        let (y, sub_y) = if self.config.vertical {
            quantize(pos.y, self.config.mode)
        } else {
            quantize(pos.y, SubpixelMode::Off)
        };
        QuantizedPosition { x, y, sub_x, sub_y }
    }

    /// The delegated cache key: quantized steps pack into the high bits of
    /// the font id, so each (sub_x, sub_y) pair of the same glyph is its
    /// own entry.
    pub fn subpixel_key(key: OutlineCacheKey, q: QuantizedPosition) -> OutlineCacheKey {
        let font_id = (key.font_id & FONT_ID_MASK)
            | ((q.sub_x as u64) << SUB_X_SHIFT)
            | ((q.sub_y as u64) << SUB_Y_SHIFT);
        OutlineCacheKey { font_id, ..key }
    }

    /// Look up the outline for `key` at `pos`, creating it on a miss.
    ///
    /// The creator receives the fractional offsets (`0 <= d < 1`) so the
    /// rasterizer renders the outline shifted accordingly; `None` results
    /// are not cached. The quantized integral position is returned with the
    /// outline for placement.
    pub fn get_or_create(
        &self,
        key: OutlineCacheKey,
        pos: Point,
        create: impl FnOnce(f32, f32) -> Option<Arc<GlyphOutline>>,
    ) -> Option<(Arc<GlyphOutline>, QuantizedPosition)> {
        let q = self.quantize_position(pos);
        let (dx, dy) = q.offsets(self.config.mode);
        let outline = self
            .cache
            .get_or_create(Self::subpixel_key(key, q), || create(dx, dy))?;
        Some((outline, q))
    }

    pub fn maintain(&self) {
        self.cache.maintain();
    }

    pub fn evict_font(&self, font_id: u64) -> u64 {
        self.cache.evict_font(font_id & FONT_ID_MASK)
    }

    pub fn clear(&self) {
        self.cache.clear();
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Hinting;

    #[test]
    fn test_quantize_mode_four() {
        assert_eq!(quantize(10.00, SubpixelMode::Four), (10, 0));
        assert_eq!(quantize(10.25, SubpixelMode::Four), (10, 1));
        assert_eq!(quantize(10.50, SubpixelMode::Four), (10, 2));
        assert_eq!(quantize(10.99, SubpixelMode::Four), (10, 3));
        assert_eq!(quantize(-0.25, SubpixelMode::Four), (-1, 3));
    }

    #[test]
    fn test_quantize_off_rounds() {
        assert_eq!(quantize(10.4, SubpixelMode::Off), (10, 0));
        assert_eq!(quantize(10.6, SubpixelMode::Off), (11, 0));
    }

    #[test]
    fn test_quantize_integers_map_to_step_zero() {
        for mode in [SubpixelMode::Four, SubpixelMode::Ten] {
            for i in -5..=5 {
                assert_eq!(quantize(i as f32, mode), (i, 0));
            }
        }
    }

    #[test]
    fn test_quantize_sub_in_range() {
        for mode in [SubpixelMode::Four, SubpixelMode::Ten] {
            let steps = mode.steps() as u8;
            let mut pos = -3.0f32;
            while pos < 3.0 {
                let (_, sub) = quantize(pos, mode);
                assert!(sub < steps, "sub {sub} out of range at {pos}");
                pos += 0.013;
            }
        }
    }

    #[test]
    fn test_capacity_multiplier() {
        let both = SubpixelConfig {
            mode: SubpixelMode::Four,
            horizontal: true,
            vertical: true,
        };
        assert_eq!(both.capacity_multiplier(), 16);

        let horizontal = SubpixelConfig::default();
        assert_eq!(horizontal.capacity_multiplier(), 4);

        let off = SubpixelConfig {
            mode: SubpixelMode::Off,
            horizontal: true,
            vertical: true,
        };
        assert_eq!(off.capacity_multiplier(), 1);
    }

    #[test]
    fn test_subpixel_key_separates_steps() {
        let base = OutlineCacheKey::new(42, 7, 12, Hinting::None);
        let q0 = QuantizedPosition {
            x: 0,
            y: 0,
            sub_x: 0,
            sub_y: 0,
        };
        let q1 = QuantizedPosition { sub_x: 1, ..q0 };
        let k0 = SubpixelOutlineCache::subpixel_key(base, q0);
        let k1 = SubpixelOutlineCache::subpixel_key(base, q1);
        assert_ne!(k0, k1);
        assert_eq!(k0.font_id & FONT_ID_MASK, 42);
        assert_eq!(k1.font_id & FONT_ID_MASK, 42);
    }

    #[test]
    fn test_get_or_create_passes_offsets() {
        let cache = SubpixelOutlineCache::new(64, SubpixelConfig::default());
        let key = OutlineCacheKey::new(1, 7, 12, Hinting::None);

        let (outline, q) = cache
            .get_or_create(key, Point::new(10.5, 3.0), |dx, dy| {
                assert!((dx - 0.5).abs() < 1e-6);
                assert_eq!(dy, 0.0);
                Some(Arc::new(GlyphOutline::empty(7, 6.0)))
            })
            .unwrap();
        assert_eq!(outline.glyph_id, 7);
        assert_eq!((q.x, q.y), (10, 3));
        assert_eq!((q.sub_x, q.sub_y), (2, 0));

        // Same quantized slot hits the cache; different slot re-creates.
        let hit = cache.get_or_create(key, Point::new(10.6, 3.0), |_, _| None);
        assert!(hit.is_some());
        assert_eq!(cache.len(), 1);

        let miss = cache.get_or_create(key, Point::new(10.1, 3.0), |_, _| {
            Some(Arc::new(GlyphOutline::empty(7, 6.0)))
        });
        assert!(miss.is_some());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_evict_font_covers_all_steps() {
        let cache = SubpixelOutlineCache::new(64, SubpixelConfig::default());
        let key = OutlineCacheKey::new(5, 1, 12, Hinting::None);
        for step in 0..4 {
            let pos = Point::new(step as f32 * 0.25, 0.0);
            let created =
                cache.get_or_create(key, pos, |_, _| Some(Arc::new(GlyphOutline::empty(1, 6.0))));
            assert!(created.is_some());
        }
        assert_eq!(cache.len(), 4);
        assert_eq!(cache.evict_font(5), 4);
        assert!(cache.is_empty());
    }
}
