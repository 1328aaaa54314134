// this_file: crates/penna-font/src/parser.rs

//! Default SFNT parser built on skrifa and read-fonts.
//!
//! The parsed font owns its bytes and rebuilds the zero-copy `FontRef` view
//! per query; view construction only re-reads the table directory, which is
//! cheap next to the metric and outline work behind it.

use crate::extract::extract_outline;
use penna_core::error::{PennaError, Result};
use penna_core::outline::GlyphOutline;
use penna_core::traits::{ColorTables, FontParser, ParsedFont};
use penna_core::types::{GlyphId, Rect, ScaledMetrics};
use read_fonts::types::Tag;
use read_fonts::TableProvider;
use skrifa::instance::{LocationRef, Size};
use skrifa::string::StringId;
use skrifa::{FontRef, GlyphId as SkrifaGlyphId, MetadataProvider};
use std::sync::Arc;

/// Shortest possible SFNT: the 12-byte table directory header.
const SFNT_HEADER_LEN: usize = 12;

/// The default parser for the common SFNT container (TTF/OTF).
#[derive(Debug, Default)]
pub struct SfntParser;

impl SfntParser {
    pub fn new() -> Self {
        Self
    }
}

impl FontParser for SfntParser {
    fn name(&self) -> &'static str {
        "sfnt"
    }

    fn parse(&self, data: &[u8]) -> Result<Arc<dyn ParsedFont>> {
        if data.len() < SFNT_HEADER_LEN {
            return Err(PennaError::EmptyFontData);
        }
        let font = SfntFont::parse(data.to_vec())?;
        Ok(Arc::new(font))
    }
}

/// A parsed SFNT font: owned bytes plus metadata captured at parse time.
pub struct SfntFont {
    data: Vec<u8>,
    family_name: String,
    full_name: String,
    num_glyphs: u16,
    units_per_em: u16,
    color_tables: ColorTables,
}

impl SfntFont {
    fn parse(data: Vec<u8>) -> Result<Self> {
        let font = FontRef::new(&data).map_err(|e| PennaError::Parse(e.to_string()))?;

        let metrics = font.metrics(Size::unscaled(), LocationRef::default());
        let family_name = localized(&font, StringId::FAMILY_NAME);
        let full_name = localized(&font, StringId::FULL_NAME);
        let color_tables = ColorTables {
            cbdt: font.table_data(Tag::new(b"CBDT")).is_some(),
            sbix: font.table_data(Tag::new(b"sbix")).is_some(),
            colr: font.table_data(Tag::new(b"COLR")).is_some(),
            svg: font.table_data(Tag::new(b"SVG ")).is_some(),
        };
        let num_glyphs = font
            .maxp()
            .map(|maxp| maxp.num_glyphs())
            .map_err(|e| PennaError::Parse(e.to_string()))?;

        Ok(Self {
            data,
            family_name,
            full_name,
            num_glyphs,
            units_per_em: metrics.units_per_em,
            color_tables,
        })
    }

    /// Rebuild the zero-copy view. The bytes already parsed once, so this
    /// only fails if memory was corrupted; treat failure as "no font".
    fn font(&self) -> Option<FontRef<'_>> {
        FontRef::new(&self.data).ok()
    }
}

fn localized(font: &FontRef<'_>, id: StringId) -> String {
    font.localized_strings(id)
        .english_or_first()
        .map(|s| s.chars().collect())
        .unwrap_or_default()
}

impl ParsedFont for SfntFont {
    fn family_name(&self) -> String {
        self.family_name.clone()
    }

    fn full_name(&self) -> String {
        self.full_name.clone()
    }

    fn num_glyphs(&self) -> u16 {
        self.num_glyphs
    }

    fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    fn glyph_index(&self, ch: char) -> Option<GlyphId> {
        let font = self.font()?;
        let gid = font.charmap().map(ch)?;
        u16::try_from(gid.to_u32()).ok()
    }

    fn glyph_advance(&self, glyph: GlyphId, ppem: f32) -> Option<f32> {
        let font = self.font()?;
        font.glyph_metrics(Size::new(ppem), LocationRef::default())
            .advance_width(SkrifaGlyphId::new(glyph as u32))
    }

    fn glyph_bounds(&self, glyph: GlyphId, ppem: f32) -> Option<Rect> {
        let font = self.font()?;
        let bb = font
            .glyph_metrics(Size::new(ppem), LocationRef::default())
            .bounds(SkrifaGlyphId::new(glyph as u32))?;
        Some(Rect::new(bb.x_min, bb.y_min, bb.x_max, bb.y_max))
    }

    fn metrics(&self, ppem: f32) -> ScaledMetrics {
        let Some(font) = self.font() else {
            return ScaledMetrics::default();
        };
        let m = font.metrics(Size::new(ppem), LocationRef::default());
        ScaledMetrics {
            ascent: m.ascent,
            descent: m.descent,
            line_gap: m.leading,
            x_height: m.x_height.unwrap_or(0.0),
            cap_height: m.cap_height.unwrap_or(0.0),
        }
    }

    fn outline(&self, glyph: GlyphId, ppem: f32) -> Result<Option<GlyphOutline>> {
        let Some(font) = self.font() else {
            return Ok(None);
        };
        if font.outline_glyphs().get(SkrifaGlyphId::new(glyph as u32)).is_none() {
            // No glyf/CFF entry for this id. A color-only font is a type
            // the outline path cannot serve at all.
            if self.color_tables.has_any() {
                return Err(PennaError::UnsupportedFontType(format!(
                    "glyph {glyph} has no outline; font carries only color tables"
                )));
            }
            return Ok(None);
        }
        Ok(extract_outline(&font, glyph, ppem))
    }

    fn data(&self) -> &[u8] {
        &self.data
    }

    fn color_tables(&self) -> ColorTables {
        self.color_tables
    }
}
