// this_file: crates/penna-core/src/outline.rs

//! Glyph-outline model: path segments over float points, tight bounds, and
//! the affine algebra the renderer composes on top.
//!
//! Outlines live in Y-up font space scaled to pixels. The run builder in the
//! raster crate flips to Y-down screen space when it emits draw commands.

use crate::types::{GlyphId, Point, Rect, Transform};

/// Path segment opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    MoveTo,
    LineTo,
    QuadTo,
    CubicTo,
}

/// One path segment with up to three control points.
///
/// Unused trailing points are zero; [`Segment::point_count`] tells how many
/// are meaningful for the opcode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub kind: SegmentKind,
    pub points: [Point; 3],
}

impl Segment {
    pub fn move_to(p: Point) -> Self {
        Self {
            kind: SegmentKind::MoveTo,
            points: [p, Point::ZERO, Point::ZERO],
        }
    }

    pub fn line_to(p: Point) -> Self {
        Self {
            kind: SegmentKind::LineTo,
            points: [p, Point::ZERO, Point::ZERO],
        }
    }

    pub fn quad_to(ctrl: Point, end: Point) -> Self {
        Self {
            kind: SegmentKind::QuadTo,
            points: [ctrl, end, Point::ZERO],
        }
    }

    pub fn cubic_to(ctrl1: Point, ctrl2: Point, end: Point) -> Self {
        Self {
            kind: SegmentKind::CubicTo,
            points: [ctrl1, ctrl2, end],
        }
    }

    /// Number of meaningful points for this opcode.
    pub fn point_count(&self) -> usize {
        match self.kind {
            SegmentKind::MoveTo | SegmentKind::LineTo => 1,
            SegmentKind::QuadTo => 2,
            SegmentKind::CubicTo => 3,
        }
    }

    /// The on-curve end point of the segment.
    pub fn end_point(&self) -> Point {
        self.points[self.point_count() - 1]
    }
}

/// How the glyph is ultimately sourced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GlyphKind {
    #[default]
    Outline,
    Bitmap,
    Colr,
    Svg,
}

/// A glyph's vector outline plus placement metrics.
///
/// Empty outlines (spaces) are valid: no segments, but advance is kept so
/// layout still moves the pen.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphOutline {
    pub glyph_id: GlyphId,
    pub kind: GlyphKind,
    pub segments: Vec<Segment>,
    /// Tight bounds over every control point.
    pub bounds: Rect,
    pub advance: f32,
    /// Left-side bearing.
    pub lsb: f32,
}

impl GlyphOutline {
    /// An outline with no segments, e.g. for whitespace glyphs.
    pub fn empty(glyph_id: GlyphId, advance: f32) -> Self {
        Self {
            glyph_id,
            kind: GlyphKind::Outline,
            segments: Vec::new(),
            bounds: Rect::EMPTY,
            advance,
            lsb: 0.0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Tight bounds recomputed from scratch over all control points.
    pub fn compute_bounds(segments: &[Segment]) -> Rect {
        let mut bounds = Rect::EMPTY;
        for seg in segments {
            for p in &seg.points[..seg.point_count()] {
                bounds.expand(*p);
            }
        }
        bounds
    }

    /// Uniform scale about the origin. Bounds are re-derived algebraically
    /// rather than re-accumulated.
    pub fn scale(&self, k: f32) -> GlyphOutline {
        let map = |p: Point| Point::new(p.x * k, p.y * k);
        let bounds = if self.bounds.is_empty() {
            Rect::EMPTY
        } else if k >= 0.0 {
            Rect::new(
                self.bounds.x_min * k,
                self.bounds.y_min * k,
                self.bounds.x_max * k,
                self.bounds.y_max * k,
            )
        } else {
            Rect::new(
                self.bounds.x_max * k,
                self.bounds.y_max * k,
                self.bounds.x_min * k,
                self.bounds.y_min * k,
            )
        };
        GlyphOutline {
            glyph_id: self.glyph_id,
            kind: self.kind,
            segments: self.map_points(map),
            bounds,
            advance: self.advance * k,
            lsb: self.lsb * k,
        }
    }

    /// Translation. Bounds shift without re-accumulation; advance and
    /// bearing are position-independent and stay put.
    pub fn translate(&self, dx: f32, dy: f32) -> GlyphOutline {
        let map = |p: Point| Point::new(p.x + dx, p.y + dy);
        let bounds = if self.bounds.is_empty() {
            Rect::EMPTY
        } else {
            Rect::new(
                self.bounds.x_min + dx,
                self.bounds.y_min + dy,
                self.bounds.x_max + dx,
                self.bounds.y_max + dy,
            )
        };
        GlyphOutline {
            glyph_id: self.glyph_id,
            kind: self.kind,
            segments: self.map_points(map),
            bounds,
            advance: self.advance,
            lsb: self.lsb,
        }
    }

    /// General affine transform. Identity returns a plain clone; otherwise
    /// every control point is mapped and bounds are recomputed.
    pub fn transform(&self, m: &Transform) -> GlyphOutline {
        if m.is_identity() {
            return self.clone();
        }
        let segments = self.map_points(|p| m.apply(p));
        let bounds = Self::compute_bounds(&segments);
        GlyphOutline {
            glyph_id: self.glyph_id,
            kind: self.kind,
            segments,
            bounds,
            // Advance scales with the X basis vector length.
            advance: self.advance * (m.a * m.a + m.b * m.b).sqrt(),
            lsb: self.lsb * (m.a * m.a + m.b * m.b).sqrt(),
        }
    }

    fn map_points(&self, f: impl Fn(Point) -> Point) -> Vec<Segment> {
        self.segments
            .iter()
            .map(|seg| {
                let mut points = seg.points;
                for p in &mut points[..seg.point_count()] {
                    *p = f(*p);
                }
                Segment {
                    kind: seg.kind,
                    points,
                }
            })
            .collect()
    }
}
