// this_file: crates/penna-core/src/traits.rs

//! Core trait definitions for Penna
//!
//! These traits are the seams between the core and its collaborators:
//!
//! - [`FontParser`] / [`ParsedFont`] - the parsing capability the core
//!   consumes; SFNT table decoding itself lives behind it
//! - [`Shaper`] - text shaping (character to positioned-glyph conversion)

use crate::error::Result;
use crate::outline::GlyphOutline;
use crate::types::{Direction, GlyphId, Rect, ScaledMetrics, ShapedRun};
use std::sync::Arc;

/// Presence of color-glyph tables in a parsed font.
///
/// Consumed by the emoji path outside the core; reported here because the
/// parser façade owns table access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColorTables {
    pub cbdt: bool,
    pub sbix: bool,
    pub colr: bool,
    pub svg: bool,
}

impl ColorTables {
    pub fn has_any(&self) -> bool {
        self.cbdt || self.sbix || self.colr || self.svg
    }
}

/// Font parsing backend
pub trait FontParser: Send + Sync {
    /// Name of this parser for debugging and logging
    fn name(&self) -> &'static str;

    /// Parse font bytes into a queryable font.
    ///
    /// Empty or truncated input fails with
    /// [`PennaError::EmptyFontData`](crate::PennaError::EmptyFontData);
    /// other failures surface the parser's own message verbatim.
    fn parse(&self, data: &[u8]) -> Result<Arc<dyn ParsedFont>>;
}

/// Read-only view over a parsed font.
///
/// Implementations are immutable after construction and safe to query from
/// multiple threads.
pub trait ParsedFont: Send + Sync {
    /// Family name, e.g. "Noto Sans".
    fn family_name(&self) -> String;

    /// Full name including style, e.g. "Noto Sans Bold".
    fn full_name(&self) -> String;

    fn num_glyphs(&self) -> u16;

    /// Design units per em, used to scale font units to points.
    fn units_per_em(&self) -> u16;

    /// Map a character to its glyph index; `None` when unmapped.
    fn glyph_index(&self, ch: char) -> Option<GlyphId>;

    /// Horizontal advance at `ppem` pixels per em.
    fn glyph_advance(&self, glyph: GlyphId, ppem: f32) -> Option<f32>;

    /// Tight glyph bounds at `ppem`, in Y-up space.
    fn glyph_bounds(&self, glyph: GlyphId, ppem: f32) -> Option<Rect>;

    /// Font-wide vertical metrics scaled to `ppem`.
    fn metrics(&self, ppem: f32) -> ScaledMetrics;

    /// Extract the glyph outline scaled to `ppem`.
    ///
    /// Glyphs with no contours (spaces) yield `Ok(Some)` with an empty
    /// segment list; glyphs the backend cannot produce yield `Ok(None)` and
    /// are treated as "no contribution" downstream.
    fn outline(&self, glyph: GlyphId, ppem: f32) -> Result<Option<GlyphOutline>>;

    /// The raw font bytes, for backends (HarfBuzz) that re-parse.
    fn data(&self) -> &[u8];

    /// Color-glyph table presence.
    fn color_tables(&self) -> ColorTables {
        ColorTables::default()
    }
}

/// Shaping parameters
#[derive(Debug, Clone)]
pub struct ShapeOptions {
    pub size: f32,
    pub direction: Direction,
    pub language: Option<String>,
    pub features: Vec<(String, u32)>,
    pub letter_spacing: f32,
}

impl Default for ShapeOptions {
    fn default() -> Self {
        Self {
            size: 16.0,
            direction: Direction::LeftToRight,
            language: None,
            features: Vec::new(),
            letter_spacing: 0.0,
        }
    }
}

/// Text shaping backend
///
/// Unshapable input is not an error: shapers return an empty run and the
/// layout engine treats it as a zero-width, zero-glyph paragraph.
pub trait Shaper: Send + Sync {
    /// Name of this shaping backend
    fn name(&self) -> &'static str;

    /// Shape text into positioned glyphs.
    ///
    /// `font_id` is the owning source's identity, carried into the run for
    /// cache keying.
    fn shape(
        &self,
        text: &str,
        font: &Arc<dyn ParsedFont>,
        font_id: u64,
        options: &ShapeOptions,
    ) -> ShapedRun;
}
