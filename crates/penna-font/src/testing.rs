// this_file: crates/penna-font/src/testing.rs

//! Deterministic in-memory font for tests.
//!
//! Real font files would make unit tests depend on fixture bytes and
//! platform font paths; `FixedFont` gives every crate in the workspace a
//! font whose metrics are chosen, not discovered. Advances are specified as
//! em fractions so they scale with ppem exactly like a real font.

use penna_core::error::Result;
use penna_core::outline::{GlyphOutline, Segment};
use penna_core::traits::ParsedFont;
use penna_core::types::{GlyphId, Point, Rect, ScaledMetrics};
use std::collections::{HashMap, HashSet};

/// A synthetic font with configurable per-character advances.
///
/// Glyph ids are the character's code point (BMP only), so id and character
/// convert both ways without bookkeeping.
#[derive(Debug, Clone)]
pub struct FixedFont {
    /// Per-character advance in em fractions; falls back to
    /// `default_advance`.
    pub advances: HashMap<char, f32>,
    pub default_advance: f32,
    /// Characters the font claims to have no glyph for.
    pub missing: HashSet<char>,
}

impl Default for FixedFont {
    fn default() -> Self {
        Self {
            advances: HashMap::new(),
            default_advance: 0.5,
            missing: HashSet::new(),
        }
    }
}

impl FixedFont {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the advance of `ch` to `em` em fractions.
    pub fn with_advance(mut self, ch: char, em: f32) -> Self {
        self.advances.insert(ch, em);
        self
    }

    /// Declare `ch` unmapped.
    pub fn without(mut self, ch: char) -> Self {
        self.missing.insert(ch);
        self
    }

    fn advance_em(&self, ch: char) -> f32 {
        self.advances.get(&ch).copied().unwrap_or(self.default_advance)
    }

    fn char_of(glyph: GlyphId) -> Option<char> {
        char::from_u32(glyph as u32)
    }
}

impl ParsedFont for FixedFont {
    fn family_name(&self) -> String {
        "Fixed Test".to_string()
    }

    fn full_name(&self) -> String {
        "Fixed Test Regular".to_string()
    }

    fn num_glyphs(&self) -> u16 {
        u16::MAX
    }

    fn units_per_em(&self) -> u16 {
        1000
    }

    fn glyph_index(&self, ch: char) -> Option<GlyphId> {
        if self.missing.contains(&ch) {
            return None;
        }
        u16::try_from(ch as u32).ok()
    }

    fn glyph_advance(&self, glyph: GlyphId, ppem: f32) -> Option<f32> {
        let ch = Self::char_of(glyph)?;
        Some(self.advance_em(ch) * ppem)
    }

    fn glyph_bounds(&self, glyph: GlyphId, ppem: f32) -> Option<Rect> {
        let ch = Self::char_of(glyph)?;
        if ch.is_whitespace() {
            return Some(Rect::ZERO);
        }
        Some(Rect::new(0.0, 0.0, self.advance_em(ch) * ppem, 0.7 * ppem))
    }

    fn metrics(&self, ppem: f32) -> ScaledMetrics {
        ScaledMetrics {
            ascent: 0.8 * ppem,
            descent: -0.2 * ppem,
            line_gap: 0.0,
            x_height: 0.5 * ppem,
            cap_height: 0.7 * ppem,
        }
    }

    fn outline(&self, glyph: GlyphId, ppem: f32) -> Result<Option<GlyphOutline>> {
        let Some(ch) = Self::char_of(glyph) else {
            return Ok(None);
        };
        let advance = self.advance_em(ch) * ppem;
        if ch.is_whitespace() {
            return Ok(Some(GlyphOutline::empty(glyph, advance)));
        }
        // A filled advance-box: enough geometry for raster tests.
        let w = advance;
        let h = 0.7 * ppem;
        let segments = vec![
            Segment::move_to(Point::new(0.0, 0.0)),
            Segment::line_to(Point::new(w, 0.0)),
            Segment::line_to(Point::new(w, h)),
            Segment::line_to(Point::new(0.0, h)),
            Segment::line_to(Point::new(0.0, 0.0)),
        ];
        let bounds = GlyphOutline::compute_bounds(&segments);
        Ok(Some(GlyphOutline {
            glyph_id: glyph,
            kind: penna_core::outline::GlyphKind::Outline,
            segments,
            bounds,
            advance,
            lsb: 0.0,
        }))
    }

    fn data(&self) -> &[u8] {
        &[]
    }
}
