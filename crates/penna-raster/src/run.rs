// this_file: crates/penna-raster/src/run.rs

//! Glyph run building: collect glyph instances, look their outlines up in
//! the outline cache, and emit draw commands for the rasterizer.
//!
//! Coordinate convention at this boundary: cached outlines are Y-up font
//! space, draw commands are Y-down screen space. The composed transform is
//! `user × translate(position) × scale(1, -1)`, so the Y-flip happens in
//! glyph space before positioning.

use penna_core::outline::GlyphOutline;
use penna_core::outline_cache::{OutlineCache, OutlineCacheKey};
use penna_core::types::{GlyphId, Hinting, Point, Transform};
use parking_lot::Mutex;
use std::sync::Arc;

/// One glyph to draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphInstance {
    pub font_id: u64,
    pub glyph_id: GlyphId,
    /// Pen position in screen space.
    pub position: Point,
    pub size: f32,
}

/// A positioned outline ready for rasterization.
#[derive(Debug, Clone)]
pub struct DrawCommand {
    pub outline: Arc<GlyphOutline>,
    pub transform: Transform,
    pub instance: GlyphInstance,
}

/// Collects glyph instances and resolves them into draw commands.
#[derive(Debug)]
pub struct RunBuilder {
    instances: Vec<GlyphInstance>,
    hinting: Hinting,
    user_transform: Transform,
}

impl Default for RunBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RunBuilder {
    pub fn new() -> Self {
        Self {
            instances: Vec::new(),
            hinting: Hinting::None,
            user_transform: Transform::IDENTITY,
        }
    }

    /// Transform applied on top of per-glyph placement.
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.user_transform = transform;
        self
    }

    pub fn with_hinting(mut self, hinting: Hinting) -> Self {
        self.hinting = hinting;
        self
    }

    pub fn push(&mut self, instance: GlyphInstance) {
        self.instances.push(instance);
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Drop collected state so a pooled builder starts fresh.
    pub fn clear(&mut self) {
        self.instances.clear();
        self.hinting = Hinting::None;
        self.user_transform = Transform::IDENTITY;
    }

    /// Resolve every instance into a draw command.
    ///
    /// Outlines come from `cache`, with `create` invoked on misses; glyphs
    /// whose outline cannot be produced, and empty outlines (spaces), are
    /// omitted rather than failing the run.
    pub fn build(
        &self,
        cache: &OutlineCache,
        mut create: impl FnMut(&GlyphInstance) -> Option<Arc<GlyphOutline>>,
    ) -> Vec<DrawCommand> {
        let mut commands = Vec::with_capacity(self.instances.len());
        for instance in &self.instances {
            let key = OutlineCacheKey::for_size(
                instance.font_id,
                instance.glyph_id,
                instance.size,
                self.hinting,
            );
            let Some(outline) = cache.get_or_create(key, || create(instance)) else {
                continue;
            };
            if outline.is_empty() {
                continue; // spaces draw nothing
            }
            let transform = self
                .user_transform
                .mul(&Transform::translate(instance.position.x, instance.position.y))
                .mul(&Transform::scale(1.0, -1.0));
            commands.push(DrawCommand {
                outline,
                transform,
                instance: *instance,
            });
        }
        log::trace!(
            "run builder: {} instances into {} draw commands",
            self.instances.len(),
            commands.len()
        );
        commands
    }
}

/// Free-list pool of run builders.
///
/// Builders are cleared on release, so acquire always hands out a fresh
/// one without reallocating its instance buffer.
#[derive(Debug, Default)]
pub struct RunBuilderPool {
    free: Mutex<Vec<RunBuilder>>,
}

impl RunBuilderPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire(&self) -> RunBuilder {
        self.free.lock().pop().unwrap_or_default()
    }

    pub fn release(&self, mut builder: RunBuilder) {
        builder.clear();
        self.free.lock().push(builder);
    }

    pub fn idle(&self) -> usize {
        self.free.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use penna_core::outline::Segment;

    fn boxy_outline(glyph_id: GlyphId, advance: f32) -> Arc<GlyphOutline> {
        let segments = vec![
            Segment::move_to(Point::new(0.0, 0.0)),
            Segment::line_to(Point::new(advance, 0.0)),
            Segment::line_to(Point::new(advance, 10.0)),
            Segment::line_to(Point::new(0.0, 10.0)),
        ];
        let bounds = GlyphOutline::compute_bounds(&segments);
        Arc::new(GlyphOutline {
            glyph_id,
            kind: penna_core::outline::GlyphKind::Outline,
            segments,
            bounds,
            advance,
            lsb: 0.0,
        })
    }

    fn instance(glyph_id: GlyphId, x: f32, y: f32) -> GlyphInstance {
        GlyphInstance {
            font_id: 1,
            glyph_id,
            position: Point::new(x, y),
            size: 16.0,
        }
    }

    #[test]
    fn test_build_composes_transform() {
        let cache = OutlineCache::new(64);
        let mut builder = RunBuilder::new();
        builder.push(instance(5, 10.0, 20.0));

        let commands = builder.build(&cache, |i| Some(boxy_outline(i.glyph_id, 8.0)));
        assert_eq!(commands.len(), 1);

        // A point at (1, 1) in Y-up glyph space lands at (11, 19): the
        // Y-flip applies before the translation.
        let p = commands[0].transform.apply(Point::new(1.0, 1.0));
        assert_eq!(p, Point::new(11.0, 19.0));
    }

    #[test]
    fn test_user_transform_applies_last() {
        let cache = OutlineCache::new(64);
        let mut builder = RunBuilder::new().with_transform(Transform::scale(2.0, 2.0));
        builder.push(instance(5, 10.0, 0.0));

        let commands = builder.build(&cache, |i| Some(boxy_outline(i.glyph_id, 8.0)));
        let p = commands[0].transform.apply(Point::new(1.0, 0.0));
        // translate(10, 0) then user scale ×2 => (22, 0).
        assert_eq!(p, Point::new(22.0, 0.0));
    }

    #[test]
    fn test_empty_outlines_omitted() {
        let cache = OutlineCache::new(64);
        let mut builder = RunBuilder::new();
        builder.push(instance(32, 0.0, 0.0)); // space
        builder.push(instance(5, 8.0, 0.0));

        let commands = builder.build(&cache, |i| {
            if i.glyph_id == 32 {
                Some(Arc::new(GlyphOutline::empty(32, 8.0)))
            } else {
                Some(boxy_outline(i.glyph_id, 8.0))
            }
        });
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].instance.glyph_id, 5);
    }

    #[test]
    fn test_failed_extraction_omitted() {
        let cache = OutlineCache::new(64);
        let mut builder = RunBuilder::new();
        builder.push(instance(5, 0.0, 0.0));
        let commands = builder.build(&cache, |_| None);
        assert!(commands.is_empty());
    }

    #[test]
    fn test_cache_hit_skips_creator() {
        let cache = OutlineCache::new(64);
        let mut builder = RunBuilder::new();
        builder.push(instance(5, 0.0, 0.0));
        builder.push(instance(5, 8.0, 0.0)); // same glyph twice

        let mut calls = 0;
        let commands = builder.build(&cache, |i| {
            calls += 1;
            Some(boxy_outline(i.glyph_id, 8.0))
        });
        assert_eq!(commands.len(), 2);
        assert_eq!(calls, 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_pool_clears_on_release() {
        let pool = RunBuilderPool::new();
        let mut builder = pool.acquire();
        builder.push(instance(5, 0.0, 0.0));
        assert_eq!(builder.len(), 1);

        pool.release(builder);
        assert_eq!(pool.idle(), 1);

        let builder = pool.acquire();
        assert!(builder.is_empty());
        assert_eq!(pool.idle(), 0);
    }
}
