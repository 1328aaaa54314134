// this_file: crates/penna-raster/src/lib.rs

//! Penna Raster - Analytic anti-aliased filling and glyph run building
//!
//! The filler converts tessellated edges into exact per-pixel trapezoidal
//! coverage, delivered as run-length alpha per scanline; the run builder
//! positions cached outlines into draw commands for a downstream blender.
//!
//! # Coordinate convention
//!
//! The filler and edge builder work in Y-down pixel space (rows of
//! increasing y). Glyph outlines arrive in Y-up font space; the run
//! builder's composed transform (`user × translate × scale(1, -1)`)
//! performs the flip, and [`EdgeBuilder::append_outline`] applies whatever
//! transform it is given verbatim.

pub mod edge;
pub mod fill;
pub mod run;

pub use edge::{EdgeBuilder, EdgeList, DEFAULT_AA_SHIFT};
pub use fill::{AlphaRun, Filler};
pub use run::{DrawCommand, GlyphInstance, RunBuilder, RunBuilderPool};
