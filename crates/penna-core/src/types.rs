// this_file: crates/penna-core/src/types.rs

//! Core value types shared across the Penna pipeline: configuration
//! enumerations, 2-D geometry, and the shaped-glyph model.

use bitflags::bitflags;

/// A font-local glyph index.
pub type GlyphId = u16;

/// Text direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    #[default]
    LeftToRight,
    RightToLeft,
    TopToBottom,
    BottomToTop,
}

impl Direction {
    /// Whether the pen advances along the X axis.
    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::LeftToRight | Direction::RightToLeft)
    }

    /// Whether the pen advances along the Y axis.
    pub fn is_vertical(self) -> bool {
        !self.is_horizontal()
    }
}

/// Glyph-outline grid fitting mode.
///
/// Penna carries the hint mode through cache keys and faces but does not
/// implement a hinting engine; extraction is always unhinted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Hinting {
    #[default]
    None,
    Vertical,
    Full,
}

/// Line wrapping mode for the layout engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WrapMode {
    /// Prefer word boundaries; fall back to per-character breaks when a
    /// single word overflows the width budget.
    #[default]
    WordChar,
    /// Only mandatory (line feed) breaks.
    None,
    /// Word boundaries only.
    Word,
    /// Every character is a break opportunity.
    Char,
}

/// Sub-pixel positioning mode.
///
/// The numeric variants give the number of quantization steps per pixel
/// along an enabled axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SubpixelMode {
    Off,
    #[default]
    Four,
    Ten,
}

impl SubpixelMode {
    /// Quantization steps per pixel; 1 when sub-pixel positioning is off.
    pub fn steps(self) -> u32 {
        match self {
            SubpixelMode::Off => 1,
            SubpixelMode::Four => 4,
            SubpixelMode::Ten => 10,
        }
    }
}

/// Path fill rule for the analytic filler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FillRule {
    #[default]
    NonZero,
    EvenOdd,
}

/// Horizontal line alignment inside the layout width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

/// A point in 2-D space, f32 throughout the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle, min/max corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x_min: f32,
    pub y_min: f32,
    pub x_max: f32,
    pub y_max: f32,
}

impl Rect {
    /// The empty rectangle: the identity for [`Rect::union`] and
    /// [`Rect::expand`], with inverted infinite bounds.
    pub const EMPTY: Rect = Rect {
        x_min: f32::INFINITY,
        y_min: f32::INFINITY,
        x_max: f32::NEG_INFINITY,
        y_max: f32::NEG_INFINITY,
    };

    pub const ZERO: Rect = Rect {
        x_min: 0.0,
        y_min: 0.0,
        x_max: 0.0,
        y_max: 0.0,
    };

    pub const fn new(x_min: f32, y_min: f32, x_max: f32, y_max: f32) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    /// True when no point has been accumulated yet.
    pub fn is_empty(&self) -> bool {
        self.x_min > self.x_max || self.y_min > self.y_max
    }

    pub fn width(&self) -> f32 {
        if self.is_empty() {
            0.0
        } else {
            self.x_max - self.x_min
        }
    }

    pub fn height(&self) -> f32 {
        if self.is_empty() {
            0.0
        } else {
            self.y_max - self.y_min
        }
    }

    /// Grow to include `p`.
    pub fn expand(&mut self, p: Point) {
        self.x_min = self.x_min.min(p.x);
        self.y_min = self.y_min.min(p.y);
        self.x_max = self.x_max.max(p.x);
        self.y_max = self.y_max.max(p.y);
    }

    /// Smallest rectangle containing both operands.
    pub fn union(&self, other: &Rect) -> Rect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Rect {
            x_min: self.x_min.min(other.x_min),
            y_min: self.y_min.min(other.y_min),
            x_max: self.x_max.max(other.x_max),
            y_max: self.y_max.max(other.y_max),
        }
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x_min && p.x <= self.x_max && p.y >= self.y_min && p.y <= self.y_max
    }
}

/// A 2×3 affine transform.
///
/// Maps `(x, y)` to `(a·x + c·y + tx, b·x + d·y + ty)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub tx: f32,
    pub ty: f32,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    pub const fn new(a: f32, b: f32, c: f32, d: f32, tx: f32, ty: f32) -> Self {
        Self { a, b, c, d, tx, ty }
    }

    /// Uniform or anisotropic scale about the origin.
    pub const fn scale(sx: f32, sy: f32) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    pub const fn translate(tx: f32, ty: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Compose two transforms. `self.mul(rhs)` applies `rhs` FIRST:
    /// `self.mul(rhs).apply(p) == self.apply(rhs.apply(p))`.
    ///
    /// The convention is load-bearing for the glyph run builder, which
    /// composes `user × translate(position) × scale(1, -1)` so the Y-flip
    /// happens in glyph space before positioning.
    pub fn mul(&self, rhs: &Transform) -> Transform {
        Transform {
            a: self.a * rhs.a + self.c * rhs.b,
            b: self.b * rhs.a + self.d * rhs.b,
            c: self.a * rhs.c + self.c * rhs.d,
            d: self.b * rhs.c + self.d * rhs.d,
            tx: self.a * rhs.tx + self.c * rhs.ty + self.tx,
            ty: self.b * rhs.tx + self.d * rhs.ty + self.ty,
        }
    }

    pub fn apply(&self, p: Point) -> Point {
        Point {
            x: self.a * p.x + self.c * p.y + self.tx,
            y: self.b * p.x + self.d * p.y + self.ty,
        }
    }
}

bitflags! {
    /// Per-glyph flags emitted by shapers.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct GlyphFlags: u8 {
        /// First glyph of a ligature substitution.
        const LIGATURE_START = 1 << 0;
        /// Combining mark positioned relative to a base glyph.
        const COMBINING_MARK = 1 << 1;
        /// The run may be split before this glyph without reshaping.
        const SAFE_TO_BREAK = 1 << 2;
        /// First glyph of its cluster.
        const CLUSTER_START = 1 << 3;
    }
}

/// One positioned glyph produced by shaping.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapedGlyph {
    pub id: GlyphId,
    /// Pen position, relative to the run origin.
    pub x: f32,
    pub y: f32,
    pub x_advance: f32,
    pub y_advance: f32,
    /// Byte offset into the source text this glyph maps back to.
    pub cluster: u32,
    pub flags: GlyphFlags,
}

/// An ordered sequence of shaped glyphs with run-level metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapedRun {
    pub glyphs: Vec<ShapedGlyph>,
    /// Total advance along the run direction.
    pub advance: f32,
    pub ascent: f32,
    /// Negative, following font convention.
    pub descent: f32,
    pub direction: Direction,
    pub font_id: u64,
    pub size: f32,
}

impl ShapedRun {
    /// An empty run: what shapers return for unshapable input.
    pub fn empty(font_id: u64, size: f32, direction: Direction) -> Self {
        Self {
            glyphs: Vec::new(),
            advance: 0.0,
            ascent: 0.0,
            descent: 0.0,
            direction,
            font_id,
            size,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

/// Font-wide metrics scaled to a pixel-per-em size.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScaledMetrics {
    pub ascent: f32,
    /// Negative, following font convention.
    pub descent: f32,
    pub line_gap: f32,
    pub x_height: f32,
    pub cap_height: f32,
}

impl ScaledMetrics {
    /// Default distance between consecutive baselines.
    pub fn line_height(&self) -> f32 {
        self.ascent - self.descent + self.line_gap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_axes() {
        assert!(Direction::LeftToRight.is_horizontal());
        assert!(Direction::RightToLeft.is_horizontal());
        assert!(Direction::TopToBottom.is_vertical());
        assert!(Direction::BottomToTop.is_vertical());
    }

    #[test]
    fn test_rect_empty_union() {
        let r = Rect::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(Rect::EMPTY.union(&r), r);
        assert_eq!(r.union(&Rect::EMPTY), r);
        assert_eq!(Rect::EMPTY.width(), 0.0);
    }

    #[test]
    fn test_rect_expand() {
        let mut r = Rect::EMPTY;
        r.expand(Point::new(1.0, 5.0));
        r.expand(Point::new(-2.0, 3.0));
        assert_eq!(r, Rect::new(-2.0, 3.0, 1.0, 5.0));
    }

    #[test]
    fn test_transform_mul_applies_rhs_first() {
        let translate = Transform::translate(10.0, 0.0);
        let scale = Transform::scale(2.0, 2.0);

        // translate.mul(scale): scale first, then translate
        let m = translate.mul(&scale);
        let p = m.apply(Point::new(1.0, 1.0));
        assert_eq!(p, Point::new(12.0, 2.0));

        // scale.mul(translate): translate first, then scale
        let m = scale.mul(&translate);
        let p = m.apply(Point::new(1.0, 1.0));
        assert_eq!(p, Point::new(22.0, 2.0));
    }

    #[test]
    fn test_transform_identity() {
        let m = Transform::IDENTITY;
        assert!(m.is_identity());
        let p = Point::new(3.5, -2.0);
        assert_eq!(m.apply(p), p);
    }

    #[test]
    fn test_subpixel_steps() {
        assert_eq!(SubpixelMode::Off.steps(), 1);
        assert_eq!(SubpixelMode::Four.steps(), 4);
        assert_eq!(SubpixelMode::Ten.steps(), 10);
    }

    #[test]
    fn test_line_height() {
        let m = ScaledMetrics {
            ascent: 12.0,
            descent: -3.0,
            line_gap: 1.0,
            x_height: 6.0,
            cap_height: 9.0,
        };
        assert_eq!(m.line_height(), 16.0);
    }
}
