// this_file: crates/penna-raster/src/fill.rs

//! Analytic anti-aliased scanline filler.
//!
//! Walks pixel rows with an active edge table and computes exact
//! trapezoidal coverage per pixel: for each edge piece crossing a row, the
//! area between the piece and each pixel's right edge accumulates into a
//! per-pixel winding buffer, and everything right of the piece receives the
//! piece's full winding delta. Winding converts to coverage by fill rule,
//! quantizes to 8-bit alpha, and leaves the filler as run-length runs per
//! row via a cancellable callback.

use crate::edge::{eval_quad, quad_chord_count, Edge, EdgeData, EdgeList, LineSeg};
use penna_core::types::FillRule;

/// One run of equal alpha on a scanline: `len` pixels starting at `x`.
///
/// `extra` is reserved for the downstream blender and always 0 here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlphaRun {
    pub x: i32,
    pub alpha: u8,
    pub len: u32,
    pub extra: u32,
}

/// Steps a y-monotonic quadratic into successive chords on demand.
#[derive(Debug, Clone, Copy)]
struct QuadStepper {
    p0: penna_core::types::Point,
    p1: penna_core::types::Point,
    p2: penna_core::types::Point,
    chords: u32,
    next: u32,
}

impl QuadStepper {
    fn new(p0: penna_core::types::Point, p1: penna_core::types::Point, p2: penna_core::types::Point) -> Self {
        Self {
            p0,
            p1,
            p2,
            chords: quad_chord_count(p0, p1, p2),
            next: 0,
        }
    }

    fn next_chord(&mut self) -> Option<LineSeg> {
        while self.next < self.chords {
            let t0 = self.next as f32 / self.chords as f32;
            let t1 = (self.next + 1) as f32 / self.chords as f32;
            self.next += 1;
            let a = eval_quad(self.p0, self.p1, self.p2, t0);
            let b = eval_quad(self.p0, self.p1, self.p2, t1);
            // The quad is y-monotonic, so chords never run upward; flat
            // chords carry no winding and are skipped.
            if b.y > a.y {
                return Some(LineSeg {
                    x0: a.x,
                    y0: a.y,
                    x1: b.x,
                    y1: b.y,
                });
            }
        }
        None
    }
}

/// An edge resident in the active edge table.
#[derive(Debug, Clone, Copy)]
struct ActiveEdge {
    /// Current sub-segment being consumed.
    chord: LineSeg,
    stepper: Option<QuadStepper>,
    sign: f32,
    bottom_sub: i32,
    /// X at the current row's top, for the AET sort.
    x_sort: f32,
}

impl ActiveEdge {
    fn admit(edge: &Edge) -> Self {
        let (chord, stepper) = match edge.data {
            EdgeData::Line(seg) => (seg, None),
            EdgeData::Quad { p0, p1, p2 } => {
                let mut stepper = QuadStepper::new(p0, p1, p2);
                let chord = stepper.next_chord().unwrap_or(LineSeg {
                    x0: p0.x,
                    y0: p0.y,
                    x1: p2.x,
                    y1: p2.y,
                });
                (chord, Some(stepper))
            }
        };
        ActiveEdge {
            chord,
            stepper,
            sign: edge.sign,
            bottom_sub: edge.bottom_sub,
            x_sort: chord.x0,
        }
    }
}

/// The analytic filler. Owns reusable row buffers sized to its width.
pub struct Filler {
    width: usize,
    winding: Vec<f32>,
    runs: Vec<AlphaRun>,
    aet: Vec<ActiveEdge>,
}

impl Filler {
    pub fn new(width: usize) -> Self {
        Self {
            width,
            winding: vec![0.0; width],
            runs: Vec::new(),
            aet: Vec::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Clear transient state without freeing buffers.
    pub fn reset(&mut self) {
        self.winding.iter_mut().for_each(|w| *w = 0.0);
        self.runs.clear();
        self.aet.clear();
    }

    /// Fill `edges` under `rule`, delivering alpha runs per pixel row.
    ///
    /// The callback receives the pixel row and its runs; returning `false`
    /// stops the row loop (cooperative cancellation). Rows producing no
    /// coverage are skipped.
    pub fn fill(
        &mut self,
        edges: &EdgeList,
        rule: FillRule,
        mut callback: impl FnMut(i32, &[AlphaRun]) -> bool,
    ) {
        self.reset();
        if edges.is_empty() || self.width == 0 {
            return;
        }

        let aa_scale = 1i32 << edges.aa_shift;
        let mut cursor = 0usize;
        let mut y = (edges.min_sub.div_euclid(aa_scale)).max(0);

        loop {
            let y_sub = y * aa_scale;
            let y_sub_end = y_sub + aa_scale;

            // Retire edges fully above this row.
            self.aet.retain(|e| e.bottom_sub > y_sub);

            // Admit edges starting before the row ends.
            while cursor < edges.edges.len() && edges.edges[cursor].top_sub < y_sub_end {
                self.aet.push(ActiveEdge::admit(&edges.edges[cursor]));
                cursor += 1;
            }

            if self.aet.is_empty() {
                if cursor >= edges.edges.len() {
                    break;
                }
                // Skip the gap to the next contour.
                y = (edges.edges[cursor].top_sub.div_euclid(aa_scale)).max(y + 1);
                continue;
            }

            let row_top = y as f32;
            let row_bottom = (y + 1) as f32;

            // Sort by current x; coverage accumulation is order-independent
            // but downstream consumers rely on deterministic run order.
            for e in &mut self.aet {
                let yc = e.chord.y0.max(row_top).min(e.chord.y1);
                e.x_sort = e.chord.x_at(yc);
            }
            self.aet
                .sort_unstable_by(|a, b| a.x_sort.total_cmp(&b.x_sort));

            self.winding.iter_mut().for_each(|w| *w = 0.0);

            for idx in 0..self.aet.len() {
                let mut edge = self.aet[idx];
                loop {
                    let seg = edge.chord;
                    let piece_top = seg.y0.max(row_top);
                    let piece_bottom = seg.y1.min(row_bottom);
                    if piece_bottom > piece_top {
                        accumulate_piece(
                            &mut self.winding,
                            self.width,
                            &seg,
                            piece_top,
                            piece_bottom,
                            edge.sign,
                        );
                    }
                    // Curve edges advance chord by chord while the row
                    // still has room; a chord ending below the row keeps
                    // its remainder for the next row.
                    if seg.y1 <= row_bottom {
                        if let Some(stepper) = edge.stepper.as_mut() {
                            if let Some(next) = stepper.next_chord() {
                                edge.chord = next;
                                continue;
                            }
                        }
                    }
                    break;
                }
                self.aet[idx] = edge;
            }

            self.emit_runs(rule);
            if !self.runs.is_empty() && !callback(y, &self.runs) {
                return;
            }

            y += 1;
        }
    }

    /// Convert winding to coverage, quantize, and coalesce equal-alpha
    /// runs. Zero-alpha stretches produce no runs.
    fn emit_runs(&mut self, rule: FillRule) {
        self.runs.clear();
        let mut run_start = 0usize;
        let mut run_alpha = 0u8;
        for x in 0..self.width {
            let alpha = coverage_to_alpha(self.winding[x], rule);
            if alpha != run_alpha {
                if run_alpha != 0 {
                    self.runs.push(AlphaRun {
                        x: run_start as i32,
                        alpha: run_alpha,
                        len: (x - run_start) as u32,
                        extra: 0,
                    });
                }
                run_start = x;
                run_alpha = alpha;
            }
        }
        if run_alpha != 0 {
            self.runs.push(AlphaRun {
                x: run_start as i32,
                alpha: run_alpha,
                len: (self.width - run_start) as u32,
                extra: 0,
            });
        }
    }
}

fn coverage_to_alpha(winding: f32, rule: FillRule) -> u8 {
    let coverage = match rule {
        FillRule::NonZero => winding.abs().min(1.0),
        FillRule::EvenOdd => {
            let m = winding.abs() % 2.0;
            1.0 - (m - 1.0).abs()
        }
    };
    (coverage * 255.0).round() as u8
}

/// Accumulate one segment piece clipped to a pixel row.
///
/// For each pixel column the piece crosses, the covered area is the
/// trapezoid between the piece and the column's right edge; columns right
/// of the piece receive the full winding delta accumulated so far. The
/// off-canvas-left portion pre-accumulates; pieces entirely off-canvas
/// right contribute nothing.
fn accumulate_piece(
    winding: &mut [f32],
    width: usize,
    seg: &LineSeg,
    piece_top: f32,
    piece_bottom: f32,
    sign: f32,
) {
    let dxdy = seg.dxdy();
    let x_top = seg.x_at(piece_top);
    let x_bottom = seg.x_at(piece_bottom);
    let x_min = x_top.min(x_bottom);
    let x_max = x_top.max(x_bottom);

    let px_min = x_min.floor() as i64;
    let px_max = x_max.floor() as i64;
    if px_min >= width as i64 {
        return; // entirely off-screen right
    }

    let mut acc = 0.0f32;

    // Off-canvas-left portion: its full delta carries into column 0.
    if px_min < 0 {
        let d = column_overlap(seg, piece_top, piece_bottom, dxdy, f32::NEG_INFINITY, 0.0);
        acc += sign * d;
    }

    let first = px_min.max(0);
    let last = px_max.min(width as i64 - 1);
    for px in first..=last {
        let left = px as f32;
        let right = left + 1.0;
        let (lo, hi) = column_span(seg, piece_top, piece_bottom, dxdy, left, right);
        let d = (hi - lo).max(0.0);
        if d > 0.0 {
            let xa = seg.x_at(lo).clamp(left, right);
            let xb = seg.x_at(hi).clamp(left, right);
            // Trapezoid between the piece and the column's right edge:
            // ½·d·(2·right − xa − xb).
            let area = d * (right - 0.5 * (xa + xb));
            winding[px as usize] += sign * area + acc;
            acc += sign * d;
        } else {
            winding[px as usize] += acc;
        }
    }

    // Everything right of the piece gets its full delta.
    let tail = (px_max + 1).max(0);
    if tail < width as i64 {
        for w in &mut winding[tail as usize..] {
            *w += acc;
        }
    }
}

/// The piece's y-extent within the column `[left, right)`, clamped to the
/// piece.
fn column_span(
    seg: &LineSeg,
    piece_top: f32,
    piece_bottom: f32,
    dxdy: f32,
    left: f32,
    right: f32,
) -> (f32, f32) {
    if dxdy.abs() < 1e-9 {
        // Vertical: either the whole piece is in this column or none.
        if seg.x0 >= left && seg.x0 < right {
            (piece_top, piece_bottom)
        } else {
            (piece_top, piece_top)
        }
    } else {
        let y_left = seg.y0 + (left - seg.x0) / dxdy;
        let y_right = seg.y0 + (right - seg.x0) / dxdy;
        let (a, b) = if y_left < y_right {
            (y_left, y_right)
        } else {
            (y_right, y_left)
        };
        (a.max(piece_top), b.min(piece_bottom))
    }
}

/// Like [`column_span`] but returns only the overlap length; used for the
/// off-canvas-left pre-accumulation.
fn column_overlap(
    seg: &LineSeg,
    piece_top: f32,
    piece_bottom: f32,
    dxdy: f32,
    left: f32,
    right: f32,
) -> f32 {
    let (lo, hi) = column_span(seg, piece_top, piece_bottom, dxdy, left, right);
    (hi - lo).max(0.0)
}
