// this_file: crates/penna-font/src/source.rs

//! Font sources: the process-shared owner of a parsed font.
//!
//! A source is heavyweight and identity-keyed: every cache in the pipeline
//! keys on its `id`, so a source must never be duplicated by value. The
//! type is deliberately not `Clone`; faces and callers share it through
//! `Arc<FontSource>`.

use penna_core::error::Result;
use penna_core::traits::{FontParser, ParsedFont};
use penna_core::types::{GlyphId, Rect, ScaledMetrics};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Process-wide id allocator. Ids stay within the low 56 bits so the
/// sub-pixel cache can pack quantization steps above them.
static NEXT_FONT_ID: AtomicU64 = AtomicU64::new(1);

/// A parsed font with process-unique identity and explicit close.
pub struct FontSource {
    id: u64,
    font: Arc<dyn ParsedFont>,
    closed: AtomicBool,
}

impl FontSource {
    /// Parse `data` with `parser` and wrap the result in a fresh source.
    pub fn parse(parser: &dyn FontParser, data: &[u8]) -> Result<Arc<FontSource>> {
        let font = parser.parse(data)?;
        log::debug!(
            "parsed font '{}' ({} glyphs) via {} parser",
            font.family_name(),
            font.num_glyphs(),
            parser.name()
        );
        Ok(Self::from_parsed(font))
    }

    /// Wrap an already-parsed font.
    pub fn from_parsed(font: Arc<dyn ParsedFont>) -> Arc<FontSource> {
        Arc::new(FontSource {
            id: NEXT_FONT_ID.fetch_add(1, Ordering::Relaxed),
            font,
            closed: AtomicBool::new(false),
        })
    }

    /// Cache identity of this source.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The underlying parsed font.
    pub fn font(&self) -> &Arc<dyn ParsedFont> {
        &self.font
    }

    /// Mark the source closed. Derived faces become inert (no glyphs, zero
    /// metrics); caches are authorized to drop entries keyed by this
    /// source's id, which the façade's `close_source` performs.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
        log::debug!("font source {} closed", self.id);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    // Read-only queries, all no-ops after close.

    pub fn family_name(&self) -> String {
        if self.is_closed() {
            return String::new();
        }
        self.font.family_name()
    }

    pub fn full_name(&self) -> String {
        if self.is_closed() {
            return String::new();
        }
        self.font.full_name()
    }

    pub fn num_glyphs(&self) -> u16 {
        if self.is_closed() {
            return 0;
        }
        self.font.num_glyphs()
    }

    pub fn units_per_em(&self) -> u16 {
        if self.is_closed() {
            return 0;
        }
        self.font.units_per_em()
    }

    pub fn glyph_index(&self, ch: char) -> Option<GlyphId> {
        if self.is_closed() {
            return None;
        }
        self.font.glyph_index(ch)
    }

    pub fn glyph_advance(&self, glyph: GlyphId, ppem: f32) -> Option<f32> {
        if self.is_closed() {
            return None;
        }
        self.font.glyph_advance(glyph, ppem)
    }

    pub fn glyph_bounds(&self, glyph: GlyphId, ppem: f32) -> Option<Rect> {
        if self.is_closed() {
            return None;
        }
        self.font.glyph_bounds(glyph, ppem)
    }

    pub fn metrics(&self, ppem: f32) -> ScaledMetrics {
        if self.is_closed() {
            return ScaledMetrics::default();
        }
        self.font.metrics(ppem)
    }
}

impl std::fmt::Debug for FontSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontSource")
            .field("id", &self.id)
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FixedFont;

    #[test]
    fn test_ids_are_unique() {
        let a = FontSource::from_parsed(Arc::new(FixedFont::default()));
        let b = FontSource::from_parsed(Arc::new(FixedFont::default()));
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_close_makes_source_inert() {
        let src = FontSource::from_parsed(Arc::new(FixedFont::default()));
        assert!(src.glyph_index('A').is_some());
        assert!(src.num_glyphs() > 0);

        src.close();
        assert!(src.is_closed());
        assert_eq!(src.glyph_index('A'), None);
        assert_eq!(src.num_glyphs(), 0);
        assert_eq!(src.units_per_em(), 0);
        assert_eq!(src.metrics(16.0), ScaledMetrics::default());
    }

    #[test]
    fn test_concurrent_queries() {
        let src = FontSource::from_parsed(Arc::new(FixedFont::default()));
        let mut handles = Vec::new();
        for _ in 0..4 {
            let src = Arc::clone(&src);
            handles.push(std::thread::spawn(move || {
                for _ in 0..100 {
                    let _ = src.glyph_index('A');
                    let _ = src.metrics(12.0);
                }
            }));
        }
        for h in handles {
            h.join().ok();
        }
    }
}
