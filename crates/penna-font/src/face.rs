// this_file: crates/penna-font/src/face.rs

//! Faces: size-instantiated views over font sources.
//!
//! `Face` is a closed sum over three variants. A *source face* is the
//! primitive; a *multi face* is an ordered fallback chain; a *filtered
//! face* restricts another face to a set of Unicode ranges. The capability
//! set (metrics, advance, has_glyph, glyph iteration) lives on the enum so
//! the core controls construction and every variant upholds the same
//! invariants.

use crate::source::FontSource;
use penna_core::error::{PennaError, Result};
use penna_core::presence::PresenceMap;
use penna_core::traits::ShapeOptions;
use penna_core::types::{Direction, GlyphFlags, GlyphId, Hinting, ScaledMetrics, ShapedGlyph};
use std::str::CharIndices;
use std::sync::Arc;

/// An inclusive range of Unicode code points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnicodeRange {
    pub start: u32,
    pub end: u32,
}

impl UnicodeRange {
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, ch: char) -> bool {
        let code = ch as u32;
        code >= self.start && code <= self.end
    }
}

/// The primitive face: one source at one size.
#[derive(Clone)]
pub struct SourceFace {
    source: Arc<FontSource>,
    size: f32,
    direction: Direction,
    hinting: Hinting,
    language: Option<String>,
    /// Shared `has_glyph` memoization; clones of this face reuse it.
    presence: Arc<PresenceMap>,
}

impl SourceFace {
    pub fn new(source: Arc<FontSource>, size: f32) -> Self {
        Self {
            source,
            size,
            direction: Direction::LeftToRight,
            hinting: Hinting::None,
            language: None,
            presence: Arc::new(PresenceMap::new()),
        }
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_hinting(mut self, hinting: Hinting) -> Self {
        self.hinting = hinting;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn source(&self) -> &Arc<FontSource> {
        &self.source
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    fn has_glyph(&self, ch: char) -> bool {
        if self.source.is_closed() {
            return false;
        }
        let (has, checked) = self.presence.get(ch);
        if checked {
            return has;
        }
        let has = self.source.glyph_index(ch).is_some();
        self.presence.set(ch, has);
        has
    }

    fn glyph_advance(&self, glyph: GlyphId) -> f32 {
        self.source.glyph_advance(glyph, self.size).unwrap_or(0.0)
    }
}

/// An ordered fallback chain; every member shares one direction.
#[derive(Clone)]
pub struct MultiFace {
    faces: Vec<Face>,
    direction: Direction,
}

/// A face restricted to a set of Unicode ranges.
#[derive(Clone)]
pub struct FilteredFace {
    inner: Box<Face>,
    ranges: Vec<UnicodeRange>,
}

impl FilteredFace {
    /// Empty range set means pass-through.
    fn allows(&self, ch: char) -> bool {
        self.ranges.is_empty() || self.ranges.iter().any(|r| r.contains(ch))
    }
}

/// A size-instantiated view over one or more font sources.
#[derive(Clone)]
pub enum Face {
    Source(SourceFace),
    Multi(MultiFace),
    Filtered(FilteredFace),
}

impl Face {
    /// The primitive face over a single source.
    pub fn source(source: Arc<FontSource>, size: f32) -> Face {
        Face::Source(SourceFace::new(source, size))
    }

    /// Compose an ordered fallback chain. Every face must agree on
    /// direction; the first disagreement fails construction.
    pub fn multi(faces: Vec<Face>) -> Result<Face> {
        let direction = faces
            .first()
            .map(|f| f.direction())
            .unwrap_or(Direction::LeftToRight);
        for (index, face) in faces.iter().enumerate() {
            if face.direction() != direction {
                return Err(PennaError::DirectionMismatch {
                    index,
                    got: face.direction(),
                    expected: direction,
                });
            }
        }
        Ok(Face::Multi(MultiFace { faces, direction }))
    }

    /// Restrict `inner` to `ranges`. An empty range set passes everything
    /// through.
    pub fn filtered(inner: Face, ranges: Vec<UnicodeRange>) -> Face {
        Face::Filtered(FilteredFace {
            inner: Box::new(inner),
            ranges,
        })
    }

    pub fn size(&self) -> f32 {
        match self {
            Face::Source(f) => f.size,
            Face::Multi(f) => f.faces.first().map(|f| f.size()).unwrap_or(0.0),
            Face::Filtered(f) => f.inner.size(),
        }
    }

    pub fn direction(&self) -> Direction {
        match self {
            Face::Source(f) => f.direction,
            Face::Multi(f) => f.direction,
            Face::Filtered(f) => f.inner.direction(),
        }
    }

    pub fn hinting(&self) -> Hinting {
        match self {
            Face::Source(f) => f.hinting,
            Face::Multi(f) => f.faces.first().map(|f| f.hinting()).unwrap_or_default(),
            Face::Filtered(f) => f.inner.hinting(),
        }
    }

    pub fn language(&self) -> Option<&str> {
        match self {
            Face::Source(f) => f.language.as_deref(),
            Face::Multi(f) => f.faces.first().and_then(|f| f.language()),
            Face::Filtered(f) => f.inner.language(),
        }
    }

    /// The primary source: the face's own for a source face, the first
    /// member's for a multi face.
    pub fn source_ref(&self) -> Option<&Arc<FontSource>> {
        match self {
            Face::Source(f) => Some(&f.source),
            Face::Multi(f) => f.faces.first().and_then(|f| f.source_ref()),
            Face::Filtered(f) => f.inner.source_ref(),
        }
    }

    pub fn metrics(&self) -> ScaledMetrics {
        match self {
            Face::Source(f) => f.source.metrics(f.size),
            Face::Multi(f) => f
                .faces
                .first()
                .map(|f| f.metrics())
                .unwrap_or_default(),
            Face::Filtered(f) => f.inner.metrics(),
        }
    }

    /// Whether this face can produce a glyph for `ch`. Source faces
    /// memoize the font's answer.
    pub fn has_glyph(&self, ch: char) -> bool {
        match self {
            Face::Source(f) => f.has_glyph(ch),
            Face::Multi(f) => f.faces.iter().any(|f| f.has_glyph(ch)),
            Face::Filtered(f) => f.allows(ch) && f.inner.has_glyph(ch),
        }
    }

    /// Pick the source face and glyph id serving `ch`.
    ///
    /// Multi faces take the first member reporting the glyph present, and
    /// fall back to the first member (notdef) so no character silently
    /// drops. Filtered faces yield nothing for filtered characters.
    fn resolve(&self, ch: char) -> Option<(&SourceFace, GlyphId)> {
        match self {
            Face::Source(f) => {
                if f.source.is_closed() {
                    return None;
                }
                Some((f, f.source.glyph_index(ch).unwrap_or(0)))
            }
            Face::Multi(f) => {
                for face in &f.faces {
                    if face.has_glyph(ch) {
                        return face.resolve(ch);
                    }
                }
                f.faces.first().and_then(|f| f.resolve(ch))
            }
            Face::Filtered(f) => {
                if f.allows(ch) {
                    f.inner.resolve(ch)
                } else {
                    None
                }
            }
        }
    }

    /// Total advance of `text` at this face's size. Filtered characters
    /// contribute nothing.
    pub fn advance(&self, text: &str) -> f32 {
        self.glyphs(text).map(|g| g.x_advance).sum()
    }

    /// Lazily iterate simple positioned glyphs for `text`.
    ///
    /// The iterator is finite and not restartable; clone the face (cheap)
    /// to iterate again.
    pub fn glyphs<'a>(&'a self, text: &'a str) -> GlyphIter<'a> {
        GlyphIter {
            face: self,
            chars: text.char_indices(),
            pen_x: 0.0,
        }
    }

    /// Append `text`'s glyphs to `dst`, continuing from a zero pen.
    pub fn append_glyphs(&self, dst: &mut Vec<ShapedGlyph>, text: &str) {
        dst.extend(self.glyphs(text));
    }

    /// Shaping parameters matching this face, for handing to a [`Shaper`]
    /// (crate `penna-core`).
    pub fn shape_options(&self) -> ShapeOptions {
        ShapeOptions {
            size: self.size(),
            direction: self.direction(),
            language: self.language().map(|s| s.to_string()),
            features: Vec::new(),
            letter_spacing: 0.0,
        }
    }
}

impl std::fmt::Debug for Face {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Face::Source(face) => f
                .debug_struct("SourceFace")
                .field("source", &face.source.id())
                .field("size", &face.size)
                .field("direction", &face.direction)
                .finish(),
            Face::Multi(face) => f
                .debug_struct("MultiFace")
                .field("faces", &face.faces.len())
                .field("direction", &face.direction)
                .finish(),
            Face::Filtered(face) => f
                .debug_struct("FilteredFace")
                .field("ranges", &face.ranges.len())
                .finish(),
        }
    }
}

/// Lazy glyph sequence over a face; see [`Face::glyphs`].
pub struct GlyphIter<'a> {
    face: &'a Face,
    chars: CharIndices<'a>,
    pen_x: f32,
}

impl Iterator for GlyphIter<'_> {
    type Item = ShapedGlyph;

    fn next(&mut self) -> Option<ShapedGlyph> {
        loop {
            let (offset, ch) = self.chars.next()?;
            let Some((source_face, glyph)) = self.face.resolve(ch) else {
                // Filtered out: no glyph, no advance.
                continue;
            };
            let advance = source_face.glyph_advance(glyph);
            let shaped = ShapedGlyph {
                id: glyph,
                x: self.pen_x,
                y: 0.0,
                x_advance: advance,
                y_advance: 0.0,
                cluster: offset as u32,
                flags: GlyphFlags::CLUSTER_START | GlyphFlags::SAFE_TO_BREAK,
            };
            self.pen_x += advance;
            return Some(shaped);
        }
    }
}
