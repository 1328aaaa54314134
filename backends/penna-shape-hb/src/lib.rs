// this_file: backends/penna-shape-hb/src/lib.rs

//! HarfBuzz shaping backend for Penna
//!
//! Full OpenType shaping: ligatures, kerning, contextual alternates, RTL
//! and complex scripts. Opt-in; install it over the built-in shaper with
//! `penna::set_shaper`.
//!
//! Concurrency: HarfBuzz faces are parsed once per font source and cached
//! under a reader/writer lock (read-only after construction); the scratch
//! shaping buffers are pooled because a buffer is not reentrant.

use harfbuzz_rs::{
    Blob, Direction as HbDirection, Face, Feature, Font as HbFont, Language, Shared, Tag,
    UnicodeBuffer,
};
use parking_lot::{Mutex, RwLock};
use penna_core::traits::{ParsedFont, ShapeOptions, Shaper};
use penna_core::types::{Direction, GlyphFlags, ShapedGlyph, ShapedRun};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

/// HarfBuzz positions are 26.6 fixed point at the scale we set.
const HB_SCALE: f32 = 64.0;

/// Scratch buffers kept around between calls.
const MAX_POOLED_BUFFERS: usize = 8;

/// HarfBuzz shaping backend
pub struct ComplexShaper {
    /// Parsed HarfBuzz faces keyed by font-source id.
    faces: RwLock<HashMap<u64, Shared<Face<'static>>>>,
    /// Scratch buffer pool; shaping consumes and returns buffers.
    buffers: Mutex<Vec<UnicodeBuffer>>,
}

impl ComplexShaper {
    pub fn new() -> Self {
        Self {
            faces: RwLock::new(HashMap::new()),
            buffers: Mutex::new(Vec::new()),
        }
    }

    /// Drop the cached face for a closed font source.
    pub fn evict_font(&self, font_id: u64) {
        self.faces.write().remove(&font_id);
    }

    pub fn clear_cache(&self) {
        self.faces.write().clear();
        self.buffers.lock().clear();
    }

    fn to_hb_direction(direction: Direction) -> HbDirection {
        match direction {
            Direction::LeftToRight => HbDirection::Ltr,
            Direction::RightToLeft => HbDirection::Rtl,
            Direction::TopToBottom => HbDirection::Ttb,
            Direction::BottomToTop => HbDirection::Btt,
        }
    }

    /// Face handle for `font_id`, parsing the bytes once.
    fn face_for(&self, font_id: u64, data: &[u8]) -> Shared<Face<'static>> {
        if let Some(face) = self.faces.read().get(&font_id) {
            return face.clone();
        }
        let mut faces = self.faces.write();
        // Double check: another thread may have parsed while we waited.
        if let Some(face) = faces.get(&font_id) {
            return face.clone();
        }
        let owned: Arc<[u8]> = data.into();
        let blob = Blob::with_bytes_owned(owned, |bytes| bytes.as_ref());
        let face: Shared<Face<'static>> = Face::new(blob, 0).into();
        log::debug!("harfbuzz face parsed for font {font_id}");
        faces.insert(font_id, face.clone());
        face
    }

    fn take_buffer(&self) -> UnicodeBuffer {
        self.buffers.lock().pop().unwrap_or_else(UnicodeBuffer::new)
    }

    fn return_buffer(&self, buffer: UnicodeBuffer) {
        let mut pool = self.buffers.lock();
        if pool.len() < MAX_POOLED_BUFFERS {
            pool.push(buffer);
        }
    }

    /// Metrics-only path when no raw bytes are available to HarfBuzz.
    fn shape_fallback(
        &self,
        text: &str,
        font: &Arc<dyn ParsedFont>,
        font_id: u64,
        options: &ShapeOptions,
    ) -> ShapedRun {
        log::warn!("harfbuzz shaper: no font bytes, using metrics-only fallback");
        let metrics = font.metrics(options.size);
        let mut glyphs = Vec::new();
        let mut pen_x = 0.0f32;
        for (cluster, ch) in text.char_indices() {
            let glyph = font.glyph_index(ch).unwrap_or(0);
            let advance = font.glyph_advance(glyph, options.size).unwrap_or(0.0);
            glyphs.push(ShapedGlyph {
                id: glyph,
                x: pen_x,
                y: 0.0,
                x_advance: advance,
                y_advance: 0.0,
                cluster: cluster as u32,
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

// SAFETY: `faces` is behind an RwLock and `buffers` behind a Mutex; the
// non-Send/Sync HarfBuzz handles they guard are never accessed without
// holding the corresponding lock, so concurrent access across threads is
// sound even though the underlying FFI types don't derive Send/Sync.
unsafe impl Send for ComplexShaper {}
unsafe impl Sync for ComplexShaper {}

impl Default for ComplexShaper {
    fn default() -> Self {
        Self::new()
    }
}

fn four_char_tag(name: &str) -> Option<Tag> {
    if name.len() != 4 {
        return None;
    }
    let bytes = name.as_bytes();
    Some(Tag::new(
        bytes[0] as char,
        bytes[1] as char,
        bytes[2] as char,
        bytes[3] as char,
    ))
}

impl Shaper for ComplexShaper {
    fn name(&self) -> &'static str {
        "harfbuzz"
    }

    fn shape(
        &self,
        text: &str,
        font: &Arc<dyn ParsedFont>,
        font_id: u64,
        options: &ShapeOptions,
    ) -> ShapedRun {
        if text.is_empty() {
            return ShapedRun::empty(font_id, options.size, options.direction);
        }

        let data = font.data();
        if data.is_empty() {
            return self.shape_fallback(text, font, font_id, options);
        }

        let face = self.face_for(font_id, data);
        let mut hb_font = HbFont::new(face);
        let scale = (options.size * HB_SCALE) as i32;
        hb_font.set_scale(scale, scale);

        let mut buffer = self
            .take_buffer()
            .add_str(text)
            .set_direction(Self::to_hb_direction(options.direction));
        if let Some(ref lang) = options.language {
            if let Ok(language) = Language::from_str(lang) {
                buffer = buffer.set_language(language);
            }
        }

        let features: Vec<Feature> = options
            .features
            .iter()
            .filter_map(|(name, value)| {
                four_char_tag(name).map(|tag| Feature::new(tag, *value, 0..text.len()))
            })
            .collect();

        let output = harfbuzz_rs::shape(&hb_font, buffer, &features);

        let infos = output.get_glyph_infos();
        let positions = output.get_glyph_positions();

        let mut glyphs = Vec::with_capacity(infos.len());
        let mut pen_x = 0.0f32;
        let mut pen_y = 0.0f32;
        let mut prev_cluster = u32::MAX;
        for (info, pos) in infos.iter().zip(positions.iter()) {
            let mut flags = GlyphFlags::empty();
            if info.cluster != prev_cluster {
                flags |= GlyphFlags::CLUSTER_START | GlyphFlags::SAFE_TO_BREAK;
                prev_cluster = info.cluster;
            }
            glyphs.push(ShapedGlyph {
                // Penna glyph ids are font-local u16; HarfBuzz reports u32.
                id: u16::try_from(info.codepoint).unwrap_or(0),
                x: pen_x + pos.x_offset as f32 / HB_SCALE,
                y: pen_y + pos.y_offset as f32 / HB_SCALE,
                x_advance: pos.x_advance as f32 / HB_SCALE,
                y_advance: pos.y_advance as f32 / HB_SCALE,
                cluster: info.cluster,
                flags,
            });
            pen_x += pos.x_advance as f32 / HB_SCALE;
            pen_y += pos.y_advance as f32 / HB_SCALE;
        }

        self.return_buffer(output.clear());

        let metrics = font.metrics(options.size);
        let advance = if options.direction.is_horizontal() {
            pen_x
        } else {
            pen_y
        };
        ShapedRun {
            glyphs,
            advance,
            ascent: metrics.ascent,
            descent: metrics.descent,
            direction: options.direction,
            font_id,
            size: options.size,
        }
    }
}
