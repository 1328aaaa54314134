// this_file: crates/penna-raster/src/edge.rs

//! Edge building for the analytic filler.
//!
//! Paths tessellate into edges sorted by their top sub-pixel scanline.
//! Lines become line edges directly; quadratics are split at their Y
//! extremum and kept as curve edges the filler steps on demand; cubics are
//! flattened to line segments during building. Horizontal pieces never
//! produce edges.
//!
//! Coordinates are Y-down pixel space: the filler walks rows of increasing
//! y. Sub-pixel Y resolution is `2^aa_shift` scanlines per pixel row.

use penna_core::outline::{GlyphOutline, SegmentKind};
use penna_core::types::{Point, Transform};

/// Default sub-pixel Y resolution: 2^3 = 8 sub-scanlines per row.
pub const DEFAULT_AA_SHIFT: u32 = 3;

/// Maximum recursion depth when flattening cubics.
const MAX_CUBIC_DEPTH: u32 = 16;

/// Flatness tolerance for cubic flattening, in pixels.
const CUBIC_TOLERANCE: f32 = 0.1;

/// A line piece oriented top-to-bottom (`y0 < y1`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct LineSeg {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl LineSeg {
    /// Slope dx/dy; the segment is never horizontal.
    pub fn dxdy(&self) -> f32 {
        (self.x1 - self.x0) / (self.y1 - self.y0)
    }

    /// X at a given y along the segment.
    pub fn x_at(&self, y: f32) -> f32 {
        self.x0 + (y - self.y0) * self.dxdy()
    }
}

/// Geometry carried by one edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum EdgeData {
    Line(LineSeg),
    /// Y-monotonic quadratic, `p0.y < p2.y`.
    Quad { p0: Point, p1: Point, p2: Point },
}

/// One edge: a y-range in sub-pixel scanlines, a winding sign, and its
/// geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Edge {
    /// First sub-scanline the edge covers (inclusive).
    pub top_sub: i32,
    /// Last sub-scanline the edge covers (exclusive).
    pub bottom_sub: i32,
    /// +1 for a downward path direction, -1 for upward.
    pub sign: f32,
    pub data: EdgeData,
}

/// The finished, Y-sorted edge set handed to the filler.
#[derive(Debug, Clone, Default)]
pub struct EdgeList {
    pub(crate) edges: Vec<Edge>,
    pub(crate) aa_shift: u32,
    pub(crate) min_sub: i32,
    pub(crate) max_sub: i32,
}

impl EdgeList {
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn aa_shift(&self) -> u32 {
        self.aa_shift
    }
}

/// Tessellates path commands into an [`EdgeList`].
#[derive(Debug)]
pub struct EdgeBuilder {
    aa_shift: u32,
    edges: Vec<Edge>,
    current: Point,
    contour_start: Point,
    in_contour: bool,
}

impl EdgeBuilder {
    pub fn new() -> Self {
        Self::with_aa_shift(DEFAULT_AA_SHIFT)
    }

    pub fn with_aa_shift(aa_shift: u32) -> Self {
        Self {
            aa_shift,
            edges: Vec::new(),
            current: Point::ZERO,
            contour_start: Point::ZERO,
            in_contour: false,
        }
    }

    fn aa_scale(&self) -> f32 {
        (1 << self.aa_shift) as f32
    }

    /// Start a new contour, implicitly closing any open one.
    pub fn move_to(&mut self, p: Point) {
        if self.in_contour {
            self.close();
        }
        self.current = p;
        self.contour_start = p;
        self.in_contour = true;
    }

    pub fn line_to(&mut self, p: Point) {
        self.add_line(self.current, p);
        self.current = p;
    }

    /// Add a quadratic; kept as curve edges after monotonic splitting.
    pub fn quad_to(&mut self, ctrl: Point, end: Point) {
        let p0 = self.current;
        // Split at the Y extremum so every edge is y-monotonic.
        let denom = p0.y - 2.0 * ctrl.y + end.y;
        let t = if denom.abs() > 1e-6 {
            (p0.y - ctrl.y) / denom
        } else {
            -1.0
        };
        if t > 1e-6 && t < 1.0 - 1e-6 {
            let (a, b) = split_quad(p0, ctrl, end, t);
            self.add_quad(a.0, a.1, a.2);
            self.add_quad(b.0, b.1, b.2);
        } else {
            self.add_quad(p0, ctrl, end);
        }
        self.current = end;
    }

    /// Add a cubic, flattened into line segments during building.
    pub fn cubic_to(&mut self, ctrl1: Point, ctrl2: Point, end: Point) {
        let p0 = self.current;
        self.flatten_cubic(p0, ctrl1, ctrl2, end, 0);
        self.current = end;
    }

    /// Close the open contour with a line back to its start.
    pub fn close(&mut self) {
        if self.in_contour && self.current != self.contour_start {
            self.add_line(self.current, self.contour_start);
        }
        self.current = self.contour_start;
        self.in_contour = false;
    }

    /// Append a glyph outline, transformed into raster space.
    pub fn append_outline(&mut self, outline: &GlyphOutline, transform: &Transform) {
        for seg in &outline.segments {
            match seg.kind {
                SegmentKind::MoveTo => self.move_to(transform.apply(seg.points[0])),
                SegmentKind::LineTo => self.line_to(transform.apply(seg.points[0])),
                SegmentKind::QuadTo => self.quad_to(
                    transform.apply(seg.points[0]),
                    transform.apply(seg.points[1]),
                ),
                SegmentKind::CubicTo => self.cubic_to(
                    transform.apply(seg.points[0]),
                    transform.apply(seg.points[1]),
                    transform.apply(seg.points[2]),
                ),
            }
        }
        if self.in_contour {
            self.close();
        }
    }

    /// Finish building: close any open contour and sort edges by their top
    /// sub-scanline.
    pub fn finish(mut self) -> EdgeList {
        if self.in_contour {
            self.close();
        }
        self.edges.sort_by_key(|e| e.top_sub);
        let min_sub = self.edges.iter().map(|e| e.top_sub).min().unwrap_or(0);
        let max_sub = self.edges.iter().map(|e| e.bottom_sub).max().unwrap_or(0);
        EdgeList {
            edges: self.edges,
            aa_shift: self.aa_shift,
            min_sub,
            max_sub,
        }
    }

    fn add_line(&mut self, a: Point, b: Point) {
        if a.y == b.y {
            return; // horizontal: no winding contribution
        }
        let (top, bottom, sign) = if a.y < b.y {
            (a, b, 1.0)
        } else {
            (b, a, -1.0)
        };
        let scale = self.aa_scale();
        self.edges.push(Edge {
            top_sub: (top.y * scale).floor() as i32,
            bottom_sub: (bottom.y * scale).ceil() as i32,
            sign,
            data: EdgeData::Line(LineSeg {
                x0: top.x,
                y0: top.y,
                x1: bottom.x,
                y1: bottom.y,
            }),
        });
    }

    /// Add a y-monotonic quadratic piece as a curve edge.
    fn add_quad(&mut self, p0: Point, p1: Point, p2: Point) {
        if p0.y == p2.y {
            return;
        }
        let (top, ctrl, bottom, sign) = if p0.y < p2.y {
            (p0, p1, p2, 1.0)
        } else {
            (p2, p1, p0, -1.0)
        };
        let scale = self.aa_scale();
        self.edges.push(Edge {
            top_sub: (top.y * scale).floor() as i32,
            bottom_sub: (bottom.y * scale).ceil() as i32,
            sign,
            data: EdgeData::Quad {
                p0: top,
                p1: ctrl,
                p2: bottom,
            },
        });
    }

    fn flatten_cubic(&mut self, p0: Point, p1: Point, p2: Point, p3: Point, depth: u32) {
        if depth >= MAX_CUBIC_DEPTH || cubic_flat_enough(p0, p1, p2, p3) {
            self.add_line(p0, p3);
            return;
        }
        // de Casteljau split at t = 0.5
        let m01 = midpoint(p0, p1);
        let m12 = midpoint(p1, p2);
        let m23 = midpoint(p2, p3);
        let m012 = midpoint(m01, m12);
        let m123 = midpoint(m12, m23);
        let mid = midpoint(m012, m123);
        self.flatten_cubic(p0, m01, m012, mid, depth + 1);
        self.flatten_cubic(mid, m123, m23, p3, depth + 1);
    }
}

impl Default for EdgeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn midpoint(a: Point, b: Point) -> Point {
    Point::new((a.x + b.x) * 0.5, (a.y + b.y) * 0.5)
}

/// Manhattan-distance flatness: control points close to the chord.
fn cubic_flat_enough(p0: Point, p1: Point, p2: Point, p3: Point) -> bool {
    let d1 = (p1.x - (2.0 * p0.x + p3.x) / 3.0).abs() + (p1.y - (2.0 * p0.y + p3.y) / 3.0).abs();
    let d2 = (p2.x - (p0.x + 2.0 * p3.x) / 3.0).abs() + (p2.y - (p0.y + 2.0 * p3.y) / 3.0).abs();
    d1 + d2 <= CUBIC_TOLERANCE
}

/// de Casteljau split of a quadratic at `t`.
fn split_quad(p0: Point, p1: Point, p2: Point, t: f32) -> ((Point, Point, Point), (Point, Point, Point)) {
    let lerp = |a: Point, b: Point| Point::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t);
    let q0 = lerp(p0, p1);
    let q1 = lerp(p1, p2);
    let mid = lerp(q0, q1);
    ((p0, q0, mid), (mid, q1, p2))
}

/// Evaluate a quadratic at `t`.
pub(crate) fn eval_quad(p0: Point, p1: Point, p2: Point, t: f32) -> Point {
    let mt = 1.0 - t;
    Point::new(
        mt * mt * p0.x + 2.0 * mt * t * p1.x + t * t * p2.x,
        mt * mt * p0.y + 2.0 * mt * t * p1.y + t * t * p2.y,
    )
}

/// Chord count for stepping a quad on demand, from its second difference.
pub(crate) fn quad_chord_count(p0: Point, p1: Point, p2: Point) -> u32 {
    let dev_x = p0.x - 2.0 * p1.x + p2.x;
    let dev_y = p0.y - 2.0 * p1.y + p2.y;
    let dev = (dev_x * dev_x + dev_y * dev_y).sqrt();
    // tolerance ~1/4 pixel: n grows with the square root of deviation
    ((dev * 2.0).sqrt().ceil() as u32).clamp(1, 64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect_edges(x0: f32, y0: f32, x1: f32, y1: f32) -> EdgeList {
        let mut b = EdgeBuilder::new();
        b.move_to(Point::new(x0, y0));
        b.line_to(Point::new(x1, y0));
        b.line_to(Point::new(x1, y1));
        b.line_to(Point::new(x0, y1));
        b.close();
        b.finish()
    }

    #[test]
    fn test_rect_produces_two_edges() {
        let edges = rect_edges(10.0, 10.0, 20.0, 20.0);
        // Horizontal top/bottom are dropped; verticals remain.
        assert_eq!(edges.len(), 2);
        let signs: Vec<f32> = edges.edges.iter().map(|e| e.sign).collect();
        assert!(signs.contains(&1.0));
        assert!(signs.contains(&-1.0));
    }

    #[test]
    fn test_edge_sub_range() {
        let edges = rect_edges(0.0, 1.0, 4.0, 3.0);
        let scale = 1 << edges.aa_shift();
        for e in &edges.edges {
            assert_eq!(e.top_sub, scale);
            assert_eq!(e.bottom_sub, 3 * scale);
        }
        assert_eq!(edges.min_sub, scale);
        assert_eq!(edges.max_sub, 3 * scale);
    }

    #[test]
    fn test_unclosed_contour_closes_on_finish() {
        let mut b = EdgeBuilder::new();
        b.move_to(Point::new(0.0, 0.0));
        b.line_to(Point::new(4.0, 0.0));
        b.line_to(Point::new(4.0, 4.0));
        // no close(), no explicit return line
        let edges = b.finish();
        // The implicit closing line (4,4)->(0,0) is diagonal: 2 edges total.
        assert_eq!(edges.len(), 2);
    }

    #[test]
    fn test_edges_sorted_by_top() {
        let mut b = EdgeBuilder::new();
        b.move_to(Point::new(0.0, 10.0));
        b.line_to(Point::new(1.0, 12.0));
        b.move_to(Point::new(0.0, 2.0));
        b.line_to(Point::new(1.0, 4.0));
        let edges = b.finish();
        let tops: Vec<i32> = edges.edges.iter().map(|e| e.top_sub).collect();
        let mut sorted = tops.clone();
        sorted.sort_unstable();
        assert_eq!(tops, sorted);
    }

    #[test]
    fn test_quad_split_at_extremum() {
        let mut b = EdgeBuilder::new();
        // A quad arcing up then down: extremum inside (0, 1).
        b.move_to(Point::new(0.0, 10.0));
        b.quad_to(Point::new(5.0, 0.0), Point::new(10.0, 10.0));
        b.close();
        let edges = b.finish();
        // Two monotonic quad pieces plus the closing line is horizontal.
        let quads = edges
            .edges
            .iter()
            .filter(|e| matches!(e.data, EdgeData::Quad { .. }))
            .count();
        assert_eq!(quads, 2);
        // Both pieces oriented top-to-bottom with opposite signs.
        for e in &edges.edges {
            if let EdgeData::Quad { p0, p2, .. } = e.data {
                assert!(p0.y < p2.y);
            }
        }
    }

    #[test]
    fn test_monotone_quad_kept_whole() {
        let mut b = EdgeBuilder::new();
        b.move_to(Point::new(0.0, 0.0));
        b.quad_to(Point::new(5.0, 5.0), Point::new(10.0, 10.0));
        b.line_to(Point::new(0.0, 10.0));
        b.close();
        let edges = b.finish();
        let quads = edges
            .edges
            .iter()
            .filter(|e| matches!(e.data, EdgeData::Quad { .. }))
            .count();
        assert_eq!(quads, 1);
    }

    #[test]
    fn test_cubic_flattens_to_lines() {
        let mut b = EdgeBuilder::new();
        b.move_to(Point::new(0.0, 0.0));
        b.cubic_to(
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        );
        b.close();
        let edges = b.finish();
        assert!(edges.len() > 2);
        assert!(edges
            .edges
            .iter()
            .all(|e| matches!(e.data, EdgeData::Line(_))));
    }

    #[test]
    fn test_eval_quad_endpoints() {
        let p0 = Point::new(1.0, 2.0);
        let p1 = Point::new(3.0, 8.0);
        let p2 = Point::new(5.0, 2.0);
        assert_eq!(eval_quad(p0, p1, p2, 0.0), p0);
        assert_eq!(eval_quad(p0, p1, p2, 1.0), p2);
        let mid = eval_quad(p0, p1, p2, 0.5);
        assert!((mid.x - 3.0).abs() < 1e-6);
        assert!((mid.y - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_lineseg_x_at() {
        let seg = LineSeg {
            x0: 0.0,
            y0: 0.0,
            x1: 10.0,
            y1: 5.0,
        };
        assert_eq!(seg.dxdy(), 2.0);
        assert_eq!(seg.x_at(2.5), 5.0);
    }

    #[test]
    fn test_append_outline_applies_transform() {
        use penna_core::outline::Segment;
        let segments = vec![
            Segment::move_to(Point::new(0.0, 0.0)),
            Segment::line_to(Point::new(1.0, 0.0)),
            Segment::line_to(Point::new(1.0, 1.0)),
            Segment::line_to(Point::new(0.0, 1.0)),
        ];
        let bounds = GlyphOutline::compute_bounds(&segments);
        let outline = GlyphOutline {
            glyph_id: 1,
            kind: penna_core::outline::GlyphKind::Outline,
            segments,
            bounds,
            advance: 1.0,
            lsb: 0.0,
        };
        let mut b = EdgeBuilder::new();
        b.append_outline(&outline, &Transform::scale(10.0, 10.0));
        let edges = b.finish();
        assert_eq!(edges.len(), 2);
        assert_eq!(edges.max_sub, 10 * (1 << edges.aa_shift()));
    }
}
