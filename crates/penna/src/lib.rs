// this_file: crates/penna/src/lib.rs

//! Penna - Text rendering core for 2-D graphics engines
//!
//! Penna turns a Unicode string and a font into positioned, anti-aliased
//! pixel coverage:
//!
//! 1. **Parse** font bytes into a [`FontSource`] and derive [`Face`]s
//! 2. **Shape** text into [`ShapedRun`]s through a pluggable [`Shaper`]
//! 3. **Lay out** paragraphs into lines with wrapping and alignment
//! 4. **Rasterize** via the outline caches and the analytic filler
//!
//! Services are constructor-injected; [`Context`] bundles the caches and
//! the replaceable shaper slot, and a lazily-initialized process default
//! keeps simple call sites terse:
//!
//! ```no_run
//! # fn font_bytes() -> Vec<u8> { Vec::new() }
//! let source = penna::FontSource::parse(&penna::SfntParser::new(), &font_bytes())?;
//! let face = penna::Face::source(source, 16.0);
//! let run = penna::shape("Hello, world", &face);
//! assert!(run.advance >= 0.0);
//! # Ok::<(), penna::PennaError>(())
//! ```

use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::OnceLock;

pub use penna_core::{
    hash_features, quantize, text_hash, Alignment, CacheStats, ColorTables, Direction, FillRule,
    FontParser, GlyphFlags, GlyphId, GlyphKind, GlyphOutline, Hinting, LruCache, OutlineCache,
    OutlineCacheKey, ParsedFont, PennaError, Point, PresenceMap, QuantizedPosition, Rect, Result,
    ScaledMetrics, Segment, SegmentKind, ShapeOptions, ShapedGlyph, ShapedRun, Shaper,
    ShapingCache, ShapingCacheKey, SubpixelConfig, SubpixelMode, SubpixelOutlineCache, Transform,
    WrapMode,
};
pub use penna_font::{
    BasicShaper, Face, FontSource, GlyphIter, SfntFont, SfntParser, SourceFace, UnicodeRange,
};
pub use penna_layout::{
    compute_breaks, normalize_newlines, BreakClass, BreakOpportunity, BreakTable, Layout,
    LayoutEngine, LayoutOptions, Line, LineRun,
};
pub use penna_raster::{
    AlphaRun, DrawCommand, EdgeBuilder, EdgeList, Filler, GlyphInstance, RunBuilder,
    RunBuilderPool, DEFAULT_AA_SHIFT,
};

use penna_core::shaping_cache::DEFAULT_SHAPING_CAPACITY;

/// Base outline capacity before the sub-pixel multiplier.
const DEFAULT_OUTLINE_BASE_CAPACITY: usize = 512;

/// The pipeline's shared services: outline and shaping caches plus the
/// replaceable shaper slot.
///
/// Installing a shaper is race-free but does not synchronize callers
/// already inside a `shape` call; they finish on the shaper they started
/// with.
pub struct Context {
    outlines: SubpixelOutlineCache,
    shaping: ShapingCache,
    shaper: RwLock<Arc<dyn Shaper>>,
}

impl Context {
    /// Default capacities, sub-pixel config, and the built-in shaper.
    pub fn new() -> Self {
        Self::with_config(
            DEFAULT_OUTLINE_BASE_CAPACITY,
            DEFAULT_SHAPING_CAPACITY,
            SubpixelConfig::default(),
        )
    }

    pub fn with_config(
        outline_capacity: usize,
        shaping_capacity: usize,
        subpixel: SubpixelConfig,
    ) -> Self {
        Self {
            outlines: SubpixelOutlineCache::new(outline_capacity, subpixel),
            shaping: ShapingCache::new(shaping_capacity),
            shaper: RwLock::new(Arc::new(BasicShaper::new())),
        }
    }

    /// The currently installed shaper.
    pub fn shaper(&self) -> Arc<dyn Shaper> {
        Arc::clone(&self.shaper.read())
    }

    /// Atomically replace the process shaper. In-flight shaping calls keep
    /// the shaper they started with.
    pub fn set_shaper(&self, shaper: Arc<dyn Shaper>) {
        log::debug!("installing shaper '{}'", shaper.name());
        *self.shaper.write() = shaper;
    }

    pub fn outlines(&self) -> &SubpixelOutlineCache {
        &self.outlines
    }

    pub fn shaping(&self) -> &ShapingCache {
        &self.shaping
    }

    /// Shape `text` with `face`, consulting the shaping cache.
    ///
    /// Source faces go through the installed shaper with a cache entry
    /// keyed by (text, font, size, direction, features); composed faces
    /// (multi, filtered) produce glyphs through their own resolution and
    /// bypass the cache, since their glyph choice is not a pure function
    /// of one font.
    pub fn shape(&self, text: &str, face: &Face) -> Arc<ShapedRun> {
        let options = face.shape_options();
        match face {
            Face::Source(_) => {
                let Some(source) = face.source_ref().filter(|s| !s.is_closed()) else {
                    return Arc::new(ShapedRun::empty(0, options.size, options.direction));
                };
                let key = ShapingCacheKey::new(
                    text,
                    source.id(),
                    options.size,
                    options.direction,
                    &options.features,
                );
                let shaper = self.shaper();
                self.shaping.get_or_create(key, || {
                    Arc::new(shaper.shape(text, source.font(), source.id(), &options))
                })
            }
            _ => {
                let metrics = face.metrics();
                let glyphs: Vec<ShapedGlyph> = face.glyphs(text).collect();
                let advance = glyphs.iter().map(|g| g.x_advance).sum();
                Arc::new(ShapedRun {
                    glyphs,
                    advance,
                    ascent: metrics.ascent,
                    descent: metrics.descent,
                    direction: options.direction,
                    font_id: face.source_ref().map(|s| s.id()).unwrap_or(0),
                    size: options.size,
                })
            }
        }
    }

    /// Lay out `text` using the installed shaper.
    pub fn layout(&self, text: &str, face: &Face, options: &LayoutOptions) -> Layout {
        LayoutEngine::new(self.shaper()).layout(text, face, options)
    }

    /// Per-frame cache upkeep: advances frame counters and sweeps cold
    /// entries from both caches.
    pub fn maintain(&self) {
        self.outlines.maintain();
        self.shaping.maintain();
    }

    /// Close a font source and drop every cache entry keyed by it.
    pub fn close_source(&self, source: &FontSource) {
        source.close();
        let outlines = self.outlines.evict_font(source.id());
        let shaped = self.shaping.evict_font(source.id());
        log::debug!(
            "closed font {}: evicted {outlines} outlines, {shaped} shaped runs",
            source.id()
        );
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

static DEFAULT_CONTEXT: OnceLock<Context> = OnceLock::new();

/// The lazily-initialized process-default context.
pub fn default_context() -> &'static Context {
    DEFAULT_CONTEXT.get_or_init(Context::new)
}

/// Shape `text` with `face` using the process-default context.
pub fn shape(text: &str, face: &Face) -> Arc<ShapedRun> {
    default_context().shape(text, face)
}

/// Install a shaper on the process-default context.
pub fn set_shaper(shaper: Arc<dyn Shaper>) {
    default_context().set_shaper(shaper);
}

/// Lay out text with the process-default context.
pub fn layout(text: &str, face: &Face, options: &LayoutOptions) -> Layout {
    default_context().layout(text, face, options)
}

/// Per-frame upkeep of the process-default caches.
pub fn maintain_caches() {
    default_context().maintain();
}

/// Close a source and purge it from the process-default caches.
pub fn close_source(source: &FontSource) {
    default_context().close_source(source);
}
