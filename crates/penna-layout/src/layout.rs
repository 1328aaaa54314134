// this_file: crates/penna-layout/src/layout.rs

//! Paragraph layout: shape once, break lines against a width budget, align.
//!
//! Coordinates are Y-up baseline space: a line's `y` is its baseline, the
//! first baseline sits at the first line's ascent, and later baselines grow
//! downward in increasing `y`. Glyph `x` positions are relative to the
//! layout origin after alignment.

use crate::linebreak::{compute_breaks, BreakOpportunity, BreakTable};
use penna_core::traits::{ShapeOptions, Shaper};
use penna_core::types::{Alignment, Direction, Rect, ShapedGlyph, ShapedRun, WrapMode};
use penna_font::Face;
use std::collections::HashMap;
use std::ops::Range;
use std::sync::Arc;

/// Options controlling one layout pass.
#[derive(Debug, Clone)]
pub struct LayoutOptions {
    /// Width budget; 0 disables wrapping entirely.
    pub max_width: f32,
    /// Multiplier on the natural line height.
    pub line_spacing: f32,
    pub alignment: Alignment,
    pub direction: Direction,
    pub wrap: WrapMode,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            max_width: 0.0,
            line_spacing: 1.0,
            alignment: Alignment::Left,
            direction: Direction::LeftToRight,
            wrap: WrapMode::WordChar,
        }
    }
}

/// A contiguous glyph slice within a line sharing face and direction.
#[derive(Debug, Clone, PartialEq)]
pub struct LineRun {
    pub glyph_range: Range<usize>,
    pub direction: Direction,
    pub font_id: u64,
    pub size: f32,
}

/// One laid-out line.
#[derive(Debug, Clone)]
pub struct Line {
    /// Byte range into the normalized text, excluding the terminator.
    pub range: Range<usize>,
    /// Glyphs positioned relative to the layout origin.
    pub glyphs: Vec<ShapedGlyph>,
    /// Advance width excluding trailing whitespace.
    pub width: f32,
    pub ascent: f32,
    /// Negative, following font convention.
    pub descent: f32,
    /// Baseline y position.
    pub y: f32,
    /// Whether this line ends its paragraph (last line before a hard
    /// break or the end of text). Justification skips such lines.
    pub paragraph_final: bool,
    pub runs: Vec<LineRun>,
}

impl Line {
    /// Natural height of this line.
    pub fn height(&self) -> f32 {
        self.ascent - self.descent
    }
}

/// The result of a layout pass.
#[derive(Debug, Clone)]
pub struct Layout {
    pub lines: Vec<Line>,
    pub max_width: f32,
}

impl Layout {
    /// Union extent of all lines, for sizing a destination canvas.
    pub fn extent(&self) -> Rect {
        let mut extent = Rect::EMPTY;
        for line in &self.lines {
            let x0 = line.glyphs.first().map(|g| g.x).unwrap_or(0.0);
            extent = extent.union(&Rect::new(
                x0,
                line.y - line.ascent,
                x0 + line.width,
                line.y - line.descent,
            ));
        }
        extent
    }

    pub fn glyph_count(&self) -> usize {
        self.lines.iter().map(|l| l.glyphs.len()).sum()
    }
}

/// Replace CRLF and lone CR line endings with LF.
pub fn normalize_newlines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\r' {
            if chars.peek() == Some(&'\n') {
                chars.next();
            }
            out.push('\n');
        } else {
            out.push(ch);
        }
    }
    out
}

/// The layout engine: a shaper plus a break table.
pub struct LayoutEngine {
    shaper: Arc<dyn Shaper>,
    table: BreakTable,
}

impl LayoutEngine {
    pub fn new(shaper: Arc<dyn Shaper>) -> Self {
        Self {
            shaper,
            table: BreakTable::default(),
        }
    }

    /// Swap in a custom break rule table.
    pub fn with_break_table(mut self, table: BreakTable) -> Self {
        self.table = table;
        self
    }

    /// Lay out `text` with `face` under `options`.
    ///
    /// Byte ranges in the returned lines refer to the normalized text
    /// (CRLF/CR folded to LF).
    pub fn layout(&self, text: &str, face: &Face, options: &LayoutOptions) -> Layout {
        let text = normalize_newlines(text);
        let metrics = face.metrics();
        let mut lines = Vec::new();

        // Split into paragraphs on LF, keeping byte offsets.
        let mut paragraph_start = 0usize;
        loop {
            let rest = &text[paragraph_start..];
            let (para_len, has_more) = match rest.find('\n') {
                Some(idx) => (idx, true),
                None => (rest.len(), false),
            };
            let para_range = paragraph_start..paragraph_start + para_len;
            let para_text = &text[para_range.clone()];

            if para_text.is_empty() {
                // Empty paragraphs still occupy a line of the face's height.
                lines.push(Line {
                    range: para_range.clone(),
                    glyphs: Vec::new(),
                    width: 0.0,
                    ascent: metrics.ascent,
                    descent: metrics.descent,
                    y: 0.0,
                    paragraph_final: true,
                    runs: Vec::new(),
                });
            } else {
                self.layout_paragraph(para_text, para_range.start, face, options, &mut lines);
            }

            if !has_more {
                break;
            }
            paragraph_start = para_range.end + 1;
        }

        position_lines(&mut lines, options.line_spacing);
        align_lines(&mut lines, &text, options);

        log::debug!(
            "layout: {} chars into {} lines (max_width {})",
            text.chars().count(),
            lines.len(),
            options.max_width
        );

        Layout {
            lines,
            max_width: options.max_width,
        }
    }

    /// Shape `text` through the engine's shaper, or through the face's own
    /// glyph production when the face composes sources (fallback chains and
    /// filters the shaper cannot see).
    fn shape(&self, text: &str, face: &Face, options: &LayoutOptions) -> ShapedRun {
        let mut shape_options: ShapeOptions = face.shape_options();
        shape_options.direction = options.direction;

        match face {
            Face::Source(_) => match face.source_ref() {
                Some(source) if !source.is_closed() => self.shaper.shape(
                    text,
                    source.font(),
                    source.id(),
                    &shape_options,
                ),
                _ => ShapedRun::empty(0, face.size(), options.direction),
            },
            _ => {
                let metrics = face.metrics();
                let glyphs: Vec<ShapedGlyph> = face.glyphs(text).collect();
                let advance = glyphs.iter().map(|g| g.x_advance).sum();
                ShapedRun {
                    glyphs,
                    advance,
                    ascent: metrics.ascent,
                    descent: metrics.descent,
                    direction: options.direction,
                    font_id: face.source_ref().map(|s| s.id()).unwrap_or(0),
                    size: face.size(),
                }
            }
        }
    }

    fn layout_paragraph(
        &self,
        para_text: &str,
        para_start: usize,
        face: &Face,
        options: &LayoutOptions,
        lines: &mut Vec<Line>,
    ) {
        let run = self.shape(para_text, face, options);
        if run.is_empty() {
            // Unshapable input: a zero-width, zero-glyph paragraph.
            let metrics = face.metrics();
            lines.push(Line {
                range: para_start..para_start + para_text.len(),
                glyphs: Vec::new(),
                width: 0.0,
                ascent: metrics.ascent,
                descent: metrics.descent,
                y: 0.0,
                paragraph_final: true,
                runs: Vec::new(),
            });
            return;
        }

        let breaks = compute_breaks(para_text, options.wrap, &self.table);
        let break_by_offset: HashMap<u32, BreakOpportunity> = para_text
            .char_indices()
            .zip(breaks.iter())
            .map(|((offset, _), op)| (offset as u32, *op))
            .collect();
        let breakable = |glyph: &ShapedGlyph| {
            matches!(
                break_by_offset.get(&glyph.cluster),
                Some(BreakOpportunity::Allowed) | Some(BreakOpportunity::Mandatory)
            )
        };

        let wrapping = options.max_width > 0.0 && options.wrap != WrapMode::None;
        let glyphs = &run.glyphs;
        let mut line_start = 0usize;
        let mut line_start_pen = 0.0f32;
        let mut last_break: Option<usize> = None;
        let mut i = 0usize;

        while i < glyphs.len() {
            if i > line_start && breakable(&glyphs[i]) {
                last_break = Some(i);
            }
            let end_pen = glyphs[i].x + glyphs[i].x_advance;
            if wrapping && end_pen - line_start_pen > options.max_width && i > line_start {
                // Prefer the recorded opportunity; word-char and char modes
                // fall back to breaking before the overflowing glyph.
                let break_at = match last_break {
                    Some(b) => Some(b),
                    None => match options.wrap {
                        WrapMode::WordChar | WrapMode::Char => Some(i),
                        _ => None,
                    },
                };
                if let Some(b) = break_at {
                    lines.push(make_line(
                        &run,
                        para_text,
                        para_start,
                        line_start..b,
                        line_start_pen,
                        false,
                    ));
                    line_start = b;
                    line_start_pen = glyphs[b].x;
                    last_break = None;
                    continue;
                }
            }
            i += 1;
        }

        lines.push(make_line(
            &run,
            para_text,
            para_start,
            line_start..glyphs.len(),
            line_start_pen,
            true,
        ));
    }
}

/// Build one line from a glyph range of the paragraph run.
fn make_line(
    run: &ShapedRun,
    para_text: &str,
    para_start: usize,
    glyph_range: Range<usize>,
    line_start_pen: f32,
    paragraph_final: bool,
) -> Line {
    let slice = &run.glyphs[glyph_range.clone()];

    let byte_start = slice
        .first()
        .map(|g| g.cluster as usize)
        .unwrap_or(para_text.len());
    let byte_end = run
        .glyphs
        .get(glyph_range.end)
        .map(|g| g.cluster as usize)
        .unwrap_or(para_text.len());

    let mut glyphs: Vec<ShapedGlyph> = slice.to_vec();
    for g in &mut glyphs {
        g.x -= line_start_pen;
    }

    // Trailing whitespace hangs: it stays in the byte range but does not
    // count toward the line width.
    let mut width = 0.0f32;
    for g in glyphs.iter().rev() {
        let is_ws = para_text[g.cluster as usize..]
            .chars()
            .next()
            .map(|c| c.is_whitespace())
            .unwrap_or(false);
        if !is_ws {
            width = g.x + g.x_advance;
            break;
        }
    }

    let runs = if glyphs.is_empty() {
        Vec::new()
    } else {
        vec![LineRun {
            glyph_range: 0..glyphs.len(),
            direction: run.direction,
            font_id: run.font_id,
            size: run.size,
        }]
    };

    Line {
        range: para_start + byte_start..para_start + byte_end,
        glyphs,
        width,
        ascent: run.ascent,
        descent: run.descent,
        y: 0.0,
        paragraph_final,
        runs,
    }
}

/// Assign sequential baselines: the first line sits at its ascent, each
/// following line advances by the previous line's height times the spacing
/// multiplier.
fn position_lines(lines: &mut [Line], line_spacing: f32) {
    let mut y = 0.0f32;
    for (i, line) in lines.iter_mut().enumerate() {
        if i == 0 {
            y = line.ascent;
        } else {
            y += line.height() * line_spacing;
        }
        line.y = y;
    }
}

/// Shift glyphs horizontally per the alignment rule.
fn align_lines(lines: &mut [Line], text: &str, options: &LayoutOptions) {
    if options.max_width <= 0.0 {
        return;
    }
    for line in lines.iter_mut() {
        match options.alignment {
            Alignment::Left => {}
            Alignment::Center | Alignment::Right => {
                let k = if options.alignment == Alignment::Center {
                    0.5
                } else {
                    1.0
                };
                let shift = (options.max_width - line.width) * k;
                for g in &mut line.glyphs {
                    g.x += shift;
                }
            }
            Alignment::Justify => {
                justify_line(line, text, options.max_width, line.paragraph_final);
            }
        }
    }
}

/// Best-effort inter-word expansion: distribute the slack across the gaps
/// after interior space glyphs.
fn justify_line(line: &mut Line, text: &str, max_width: f32, paragraph_final: bool) {
    if paragraph_final || line.width >= max_width || line.glyphs.is_empty() {
        return;
    }
    // Clusters are paragraph-relative; the line's byte range re-anchors
    // them into the normalized text.
    let first_cluster = line.glyphs[0].cluster as i64;
    let base = line.range.start as i64 - first_cluster;
    let char_at = |cluster: u32| -> Option<char> {
        let abs = (base + cluster as i64) as usize;
        text.get(abs..)?.chars().next()
    };

    // A gap is an interior whitespace glyph inside the measured width.
    let gap_indices: Vec<usize> = line
        .glyphs
        .iter()
        .enumerate()
        .filter(|(i, g)| {
            *i + 1 < line.glyphs.len()
                && g.x + g.x_advance <= line.width
                && char_at(g.cluster).map(|c| c.is_whitespace()).unwrap_or(false)
        })
        .map(|(i, _)| i)
        .collect();
    if gap_indices.is_empty() {
        // One word only: nothing to expand between.
        return;
    }
    let extra = (max_width - line.width) / gap_indices.len() as f32;
    let mut shift = 0.0f32;
    let mut gap_cursor = 0usize;
    for i in 0..line.glyphs.len() {
        line.glyphs[i].x += shift;
        if gap_cursor < gap_indices.len() && i == gap_indices[gap_cursor] {
            shift += extra;
            gap_cursor += 1;
        }
    }
    line.width = max_width;
}
