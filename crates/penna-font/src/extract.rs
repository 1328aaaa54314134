// this_file: crates/penna-font/src/extract.rs

//! Outline extraction: walking a glyph's segments through a skrifa pen into
//! the core outline model, tracking tight bounds as we go.

use penna_core::outline::{GlyphOutline, Segment};
use penna_core::types::{GlyphId, Point, Rect};
use skrifa::instance::{LocationRef, Size};
use skrifa::outline::{DrawSettings, OutlinePen};
use skrifa::{FontRef, GlyphId as SkrifaGlyphId, MetadataProvider};

/// Pen that records segments and accumulates tight bounds.
///
/// Contours are closed explicitly: a `close` with the pen away from the
/// contour start emits the closing line, so downstream edge builders never
/// see an open contour.
struct SegmentPen {
    segments: Vec<Segment>,
    bounds: Rect,
    current: Point,
    contour_start: Point,
}

impl SegmentPen {
    fn new() -> Self {
        Self {
            segments: Vec::new(),
            bounds: Rect::EMPTY,
            current: Point::ZERO,
            contour_start: Point::ZERO,
        }
    }

    fn track(&mut self, p: Point) {
        self.bounds.expand(p);
    }
}

impl OutlinePen for SegmentPen {
    fn move_to(&mut self, x: f32, y: f32) {
        let p = Point::new(x, y);
        self.segments.push(Segment::move_to(p));
        self.track(p);
        self.current = p;
        self.contour_start = p;
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let p = Point::new(x, y);
        self.segments.push(Segment::line_to(p));
        self.track(p);
        self.current = p;
    }

    fn quad_to(&mut self, cx0: f32, cy0: f32, x: f32, y: f32) {
        let ctrl = Point::new(cx0, cy0);
        let end = Point::new(x, y);
        self.segments.push(Segment::quad_to(ctrl, end));
        self.track(ctrl);
        self.track(end);
        self.current = end;
    }

    fn curve_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32) {
        let ctrl1 = Point::new(cx0, cy0);
        let ctrl2 = Point::new(cx1, cy1);
        let end = Point::new(x, y);
        self.segments.push(Segment::cubic_to(ctrl1, ctrl2, end));
        self.track(ctrl1);
        self.track(ctrl2);
        self.track(end);
        self.current = end;
    }

    fn close(&mut self) {
        if self.current != self.contour_start {
            self.segments.push(Segment::line_to(self.contour_start));
            self.current = self.contour_start;
        }
    }
}

/// Extract the outline of `glyph` at `ppem`, in Y-up pixel space.
///
/// Returns `None` when the glyph cannot be drawn (missing from the outline
/// table, or a draw error); empty glyphs such as spaces return an outline
/// with advance but no segments.
pub(crate) fn extract_outline(font: &FontRef<'_>, glyph: GlyphId, ppem: f32) -> Option<GlyphOutline> {
    let gid = SkrifaGlyphId::new(glyph as u32);
    let outline_glyph = font.outline_glyphs().get(gid)?;

    let size = Size::new(ppem);
    let location = LocationRef::default();
    let glyph_metrics = font.glyph_metrics(size, location);
    let advance = glyph_metrics.advance_width(gid).unwrap_or(0.0);
    let lsb = glyph_metrics.left_side_bearing(gid).unwrap_or(0.0);

    let mut pen = SegmentPen::new();
    let settings = DrawSettings::unhinted(size, location);
    if let Err(err) = outline_glyph.draw(settings, &mut pen) {
        log::warn!("outline draw failed for glyph {glyph}: {err:?}");
        return None;
    }

    Some(GlyphOutline {
        glyph_id: glyph,
        kind: penna_core::outline::GlyphKind::Outline,
        segments: pen.segments,
        bounds: pen.bounds,
        advance,
        lsb,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use penna_core::outline::SegmentKind;
    use skrifa::outline::OutlinePen;

    #[test]
    fn test_pen_records_segments_and_bounds() {
        let mut pen = SegmentPen::new();
        pen.move_to(0.0, 0.0);
        pen.line_to(10.0, 0.0);
        pen.quad_to(12.0, 5.0, 10.0, 10.0);
        pen.close();

        assert_eq!(pen.segments.len(), 4); // close adds the return line
        assert_eq!(pen.segments[3].kind, SegmentKind::LineTo);
        assert_eq!(pen.segments[3].points[0], Point::ZERO);
        assert_eq!(pen.bounds, Rect::new(0.0, 0.0, 12.0, 10.0));
    }

    #[test]
    fn test_pen_close_at_start_is_noop() {
        let mut pen = SegmentPen::new();
        pen.move_to(1.0, 1.0);
        pen.line_to(2.0, 2.0);
        pen.line_to(1.0, 1.0);
        pen.close();
        assert_eq!(pen.segments.len(), 3);
    }

    #[test]
    fn test_pen_cubic_tracks_all_controls() {
        let mut pen = SegmentPen::new();
        pen.move_to(0.0, 0.0);
        pen.curve_to(-3.0, 1.0, 5.0, 9.0, 2.0, 2.0);
        assert_eq!(pen.bounds, Rect::new(-3.0, 0.0, 5.0, 9.0));
    }
}
