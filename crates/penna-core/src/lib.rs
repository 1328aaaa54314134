// this_file: crates/penna-core/src/lib.rs

//! Penna Core - Types, caches, and trait definitions
//!
//! This crate provides the shared substrate of the Penna text rendering
//! pipeline:
//!
//! - **Caching fabric** - a generic mutex-serialized LRU ([`lru`]), the
//!   16-way sharded LRU engine ([`shard`]), the typed outline and shaping
//!   caches ([`outline_cache`], [`shaping_cache`]), the sub-pixel wrapper
//!   ([`subpixel`]), and the `has_glyph` presence map ([`presence`])
//! - **Data model** - configuration enums, geometry, shaped runs
//!   ([`types`]) and the glyph-outline model ([`outline`])
//! - **Seams** - the parser and shaper capabilities ([`traits`])
//!
//! Higher crates supply behavior: `penna-font` implements the parser and
//! faces, `penna-layout` the wrap pipeline, `penna-raster` the analytic
//! filler, and `penna` the process-default façade.

pub mod error;
pub mod lru;
pub mod outline;
pub mod outline_cache;
pub mod presence;
pub mod shard;
pub mod shaping_cache;
pub mod stats;
pub mod subpixel;
pub mod traits;
pub mod types;

pub use error::{PennaError, Result};
pub use lru::LruCache;
pub use outline::{GlyphKind, GlyphOutline, Segment, SegmentKind};
pub use outline_cache::{OutlineCache, OutlineCacheKey};
pub use presence::PresenceMap;
pub use shaping_cache::{hash_features, text_hash, ShapingCache, ShapingCacheKey};
pub use stats::CacheStats;
pub use subpixel::{quantize, QuantizedPosition, SubpixelConfig, SubpixelOutlineCache};
pub use traits::{ColorTables, FontParser, ParsedFont, ShapeOptions, Shaper};
pub use types::{
    Alignment, Direction, FillRule, GlyphFlags, GlyphId, Hinting, Point, Rect, ScaledMetrics,
    ShapedGlyph, ShapedRun, SubpixelMode, Transform, WrapMode,
};
