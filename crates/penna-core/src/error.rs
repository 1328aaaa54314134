// this_file: crates/penna-core/src/error.rs

//! Error types for Penna

use crate::types::Direction;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PennaError>;

/// Main error type for the Penna core
#[derive(Debug, Error)]
pub enum PennaError {
    /// Font bytes were empty or too short to contain an SFNT header.
    #[error("empty or truncated font data")]
    EmptyFontData,

    /// A glyph exists but the backend cannot produce the requested form
    /// (e.g. a pure color glyph where an outline is required).
    #[error("unsupported font type: {0}")]
    UnsupportedFontType(String),

    /// Faces composed into a multi-face disagree on text direction.
    #[error("direction mismatch at face {index}: got {got:?}, expected {expected:?}")]
    DirectionMismatch {
        index: usize,
        got: Direction,
        expected: Direction,
    },

    /// Parser-defined parse failure, surfaced verbatim.
    #[error("font parse failed: {0}")]
    Parse(String),
}
