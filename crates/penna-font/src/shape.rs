// this_file: crates/penna-font/src/shape.rs

//! Built-in metrics-only shaper.
//!
//! One glyph per scalar value: no ligatures, no kerning, no script shaping.
//! Advances come straight from the font's horizontal metrics and clusters
//! are byte offsets. This is the default shaper; the HarfBuzz backend
//! (`penna-shape-hb`) replaces it when complex-script support is needed.

use penna_core::traits::{ParsedFont, ShapeOptions, Shaper};
use penna_core::types::{GlyphFlags, ShapedGlyph, ShapedRun};
use std::sync::Arc;

/// The default, metrics-only shaper.
#[derive(Debug, Default)]
pub struct BasicShaper;

impl BasicShaper {
    pub fn new() -> Self {
        Self
    }
}

impl Shaper for BasicShaper {
    fn name(&self) -> &'static str {
        "basic"
    }

    fn shape(
        &self,
        text: &str,
        font: &Arc<dyn ParsedFont>,
        font_id: u64,
        options: &ShapeOptions,
    ) -> ShapedRun {
        log::debug!("basic shaper: {} chars at {}pt", text.chars().count(), options.size);

        let metrics = font.metrics(options.size);
        let mut glyphs = Vec::new();
        let mut pen_x = 0.0f32;

        for (cluster, ch) in text.char_indices() {
            // Unmapped characters fall back to .notdef (glyph 0).
            let glyph = font.glyph_index(ch).unwrap_or(0);
            let advance =
                font.glyph_advance(glyph, options.size).unwrap_or(0.0) + options.letter_spacing;

            glyphs.push(ShapedGlyph {
                id: glyph,
                x: pen_x,
                y: 0.0,
                x_advance: advance,
                y_advance: 0.0,
                cluster: cluster as u32,
                // Every scalar is its own cluster; any boundary is safe.
                flags: GlyphFlags::CLUSTER_START | GlyphFlags::SAFE_TO_BREAK,
            });

            pen_x += advance;
        }

        ShapedRun {
            glyphs,
            advance: pen_x,
            ascent: metrics.ascent,
            descent: metrics.descent,
            direction: options.direction,
            font_id,
            size: options.size,
        }
    }
}
