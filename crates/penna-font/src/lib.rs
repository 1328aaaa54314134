// this_file: crates/penna-font/src/lib.rs

//! Penna Font - Sources, faces, and the default SFNT parser
//!
//! This crate turns raw font bytes into the queryable objects the rest of
//! the pipeline consumes:
//!
//! - [`SfntParser`] - the default [`FontParser`](penna_core::FontParser)
//!   over skrifa/read-fonts
//! - [`FontSource`] - the non-clonable, identity-keyed owner of a parsed
//!   font
//! - [`Face`] - size-instantiated views: source, multi (fallback chain),
//!   and filtered (Unicode-range) variants
//! - [`BasicShaper`] - the metrics-only default shaper
//!
//! Outlines extracted here live in Y-up font space scaled to pixels; the
//! raster crate flips to screen orientation when emitting draw commands.

mod extract;
pub mod face;
pub mod parser;
pub mod shape;
pub mod source;
pub mod testing;

pub use face::{Face, FilteredFace, GlyphIter, MultiFace, SourceFace, UnicodeRange};
pub use parser::{SfntFont, SfntParser};
pub use shape::BasicShaper;
pub use source::FontSource;
