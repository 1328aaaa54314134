// this_file: crates/penna-layout/src/lib.rs

//! Penna Layout - Line breaking and paragraph layout
//!
//! Turns text plus a face into positioned lines: paragraphs split on
//! normalized line feeds, each paragraph shaped once, then broken against
//! a width budget using the pragmatic line-break classifier, and finally
//! aligned.
//!
//! The classifier implements a deliberate subset of UAX#14 (see
//! [`linebreak`]); the rule data is pluggable via
//! [`BreakTable`](linebreak::BreakTable).

pub mod layout;
pub mod linebreak;

pub use layout::{normalize_newlines, Layout, LayoutEngine, LayoutOptions, Line, LineRun};
pub use linebreak::{compute_breaks, BreakClass, BreakOpportunity, BreakTable};
