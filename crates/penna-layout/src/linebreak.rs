// this_file: crates/penna-layout/src/linebreak.rs

//! Pragmatic line-break classification.
//!
//! A deliberately small subset of UAX#14: seven classes and a handful of
//! pair rules cover latin word wrapping plus CJK conventions. Published
//! implementations disagree on the finer CJK details, so the rule data is a
//! pluggable [`BreakTable`] rather than hard-coded ranges; the default
//! table implements the rules below.
//!
//! For each character the classifier reports whether a line may break
//! *before* it:
//!
//! - never before the first character or before close brackets; never
//!   after open brackets
//! - always allowed after a zero-width space
//! - word modes: after spaces, after (not before) hyphens, and on both
//!   sides of ideographs
//! - char mode: everywhere the bracket rules permit
//! - no-wrap mode: only after a line feed

use penna_core::types::WrapMode;

/// Line-break class of a single character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakClass {
    Other,
    Space,
    ZeroWidthSpace,
    OpenBracket,
    CloseBracket,
    Hyphen,
    Ideographic,
}

/// Break opportunity before a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakOpportunity {
    No,
    Allowed,
    /// A hard break: the preceding character was a line feed.
    Mandatory,
}

/// The classification data driving [`compute_breaks`].
#[derive(Debug, Clone)]
pub struct BreakTable {
    pub spaces: Vec<char>,
    pub zero_width: Vec<char>,
    pub open_brackets: Vec<char>,
    pub close_brackets: Vec<char>,
    pub hyphens: Vec<char>,
    /// Inclusive code-point ranges treated as ideographic.
    pub ideographic_ranges: Vec<(u32, u32)>,
}

impl Default for BreakTable {
    fn default() -> Self {
        Self {
            spaces: vec![' ', '\t'],
            zero_width: vec!['\u{200B}'],
            open_brackets: vec!['(', '[', '{', '\u{3008}', '\u{300A}', '\u{300C}', '\u{3010}'],
            close_brackets: vec![
                ')',
                ']',
                '}',
                '\u{3009}',
                '\u{300B}',
                '\u{300D}',
                '\u{3011}',
                // CJK punctuation forbids a break before it the same way.
                '\u{3001}',
                '\u{3002}',
                '\u{FF0C}',
                '\u{FF0E}',
                '\u{FF1F}',
                '\u{FF01}',
            ],
            hyphens: vec!['-', '\u{2010}'],
            ideographic_ranges: vec![
                (0x3040, 0x30FF),  // hiragana + katakana
                (0x3400, 0x4DBF),  // CJK extension A
                (0x4E00, 0x9FFF),  // CJK unified
                (0xAC00, 0xD7AF),  // hangul syllables
                (0xF900, 0xFAFF),  // CJK compatibility
            ],
        }
    }
}

impl BreakTable {
    /// Classify one character.
    pub fn classify(&self, ch: char) -> BreakClass {
        if self.spaces.contains(&ch) {
            return BreakClass::Space;
        }
        if self.zero_width.contains(&ch) {
            return BreakClass::ZeroWidthSpace;
        }
        if self.open_brackets.contains(&ch) {
            return BreakClass::OpenBracket;
        }
        if self.close_brackets.contains(&ch) {
            return BreakClass::CloseBracket;
        }
        if self.hyphens.contains(&ch) {
            return BreakClass::Hyphen;
        }
        let code = ch as u32;
        if self
            .ideographic_ranges
            .iter()
            .any(|&(start, end)| code >= start && code <= end)
        {
            return BreakClass::Ideographic;
        }
        BreakClass::Other
    }
}

/// Compute the break opportunity before every character of `text`.
///
/// The returned vector has one entry per `char`; entry `i` answers "may a
/// line break immediately before character `i`".
pub fn compute_breaks(text: &str, mode: WrapMode, table: &BreakTable) -> Vec<BreakOpportunity> {
    let chars: Vec<char> = text.chars().collect();
    let mut breaks = Vec::with_capacity(chars.len());

    for (i, &cur) in chars.iter().enumerate() {
        if i == 0 {
            breaks.push(BreakOpportunity::No);
            continue;
        }
        let prev = chars[i - 1];
        breaks.push(break_before(prev, cur, mode, table));
    }
    breaks
}

fn break_before(prev: char, cur: char, mode: WrapMode, table: &BreakTable) -> BreakOpportunity {
    if prev == '\n' {
        return BreakOpportunity::Mandatory;
    }

    let prev_class = table.classify(prev);
    let cur_class = table.classify(cur);

    // Bracket rules hold in every mode.
    if cur_class == BreakClass::CloseBracket {
        return BreakOpportunity::No;
    }
    if prev_class == BreakClass::OpenBracket {
        return BreakOpportunity::No;
    }
    if prev_class == BreakClass::ZeroWidthSpace {
        return BreakOpportunity::Allowed;
    }

    match mode {
        WrapMode::None => BreakOpportunity::No,
        WrapMode::Char => BreakOpportunity::Allowed,
        WrapMode::Word | WrapMode::WordChar => {
            if prev_class == BreakClass::Space {
                return BreakOpportunity::Allowed;
            }
            // After a hyphen, but never before one.
            if cur_class == BreakClass::Hyphen {
                return BreakOpportunity::No;
            }
            if prev_class == BreakClass::Hyphen {
                return BreakOpportunity::Allowed;
            }
            // CJK: both sides of an ideograph are opportunities.
            if prev_class == BreakClass::Ideographic || cur_class == BreakClass::Ideographic {
                return BreakOpportunity::Allowed;
            }
            BreakOpportunity::No
        }
    }
}
