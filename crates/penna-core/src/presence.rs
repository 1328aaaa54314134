// this_file: crates/penna-core/src/presence.rs

//! Memoization map for `has_glyph` queries: two bits per character
//! ({checked, has_glyph}) stored in 256-character blocks allocated on first
//! write. Characters never written report unchecked and cost no memory.

use parking_lot::Mutex;
use std::collections::HashMap;

/// 256 chars × 2 bits = 64 bytes per block.
const BLOCK_BYTES: usize = 64;

const CHECKED_BIT: u8 = 0b01;
const HAS_GLYPH_BIT: u8 = 0b10;

/// Sparse 2-bit-per-character presence map.
///
/// A single mutex serializes access; faces consult this only to skip font
/// queries, so reads are not hot once the working set is warm.
#[derive(Debug, Default)]
pub struct PresenceMap {
    blocks: Mutex<HashMap<u32, Box<[u8; BLOCK_BYTES]>>>,
}

impl PresenceMap {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(ch: char) -> (u32, usize, u32) {
        let code = ch as u32;
        let block = code >> 8;
        let within = code & 0xFF;
        let byte = (within >> 2) as usize;
        let shift = (within & 0x3) * 2;
        (block, byte, shift)
    }

    /// Returns `(has_glyph, checked)`. `checked == false` means unknown:
    /// the caller must query the font and record the answer.
    pub fn get(&self, ch: char) -> (bool, bool) {
        let (block, byte, shift) = Self::slot(ch);
        let blocks = self.blocks.lock();
        match blocks.get(&block) {
            Some(bits) => {
                let pair = (bits[byte] >> shift) & 0x3;
                (pair & HAS_GLYPH_BIT != 0, pair & CHECKED_BIT != 0)
            }
            None => (false, false),
        }
    }

    /// Record the font's answer for `ch`.
    pub fn set(&self, ch: char, has_glyph: bool) {
        let (block, byte, shift) = Self::slot(ch);
        let mut blocks = self.blocks.lock();
        let bits = blocks
            .entry(block)
            .or_insert_with(|| Box::new([0u8; BLOCK_BYTES]));
        let mut pair = CHECKED_BIT;
        if has_glyph {
            pair |= HAS_GLYPH_BIT;
        }
        bits[byte] = (bits[byte] & !(0x3 << shift)) | (pair << shift);
    }

    /// Forget everything, releasing all blocks.
    pub fn clear(&self) {
        self.blocks.lock().clear();
    }

    /// Number of allocated 256-character blocks.
    pub fn block_count(&self) -> usize {
        self.blocks.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unwritten_is_unchecked() {
        let map = PresenceMap::new();
        assert_eq!(map.get('a'), (false, false));
        assert_eq!(map.block_count(), 0);
    }

    #[test]
    fn test_set_then_get() {
        let map = PresenceMap::new();
        map.set('a', true);
        map.set('b', false);
        assert_eq!(map.get('a'), (true, true));
        assert_eq!(map.get('b'), (false, true));
        // Neighbors in the same block stay unchecked.
        assert_eq!(map.get('c'), (false, false));
    }

    #[test]
    fn test_overwrite() {
        let map = PresenceMap::new();
        map.set('x', true);
        map.set('x', false);
        assert_eq!(map.get('x'), (false, true));
        map.set('x', true);
        assert_eq!(map.get('x'), (true, true));
    }

    #[test]
    fn test_blocks_allocate_on_first_write() {
        let map = PresenceMap::new();
        map.set('a', true); // block 0
        map.set('b', true); // still block 0
        assert_eq!(map.block_count(), 1);
        map.set('\u{4E00}', true); // CJK, a different block
        assert_eq!(map.block_count(), 2);
    }

    #[test]
    fn test_block_boundaries() {
        let map = PresenceMap::new();
        // 0xFF and 0x100 straddle a block boundary.
        map.set('\u{FF}', true);
        map.set('\u{100}', false);
        assert_eq!(map.get('\u{FF}'), (true, true));
        assert_eq!(map.get('\u{100}'), (false, true));
        assert_eq!(map.block_count(), 2);
    }

    #[test]
    fn test_clear() {
        let map = PresenceMap::new();
        map.set('a', true);
        map.clear();
        assert_eq!(map.get('a'), (false, false));
        assert_eq!(map.block_count(), 0);
    }

    #[test]
    fn test_all_slots_in_block_independent() {
        let map = PresenceMap::new();
        for code in 0u32..256 {
            if let Some(ch) = char::from_u32(code) {
                map.set(ch, code % 2 == 0);
            }
        }
        for code in 0u32..256 {
            if let Some(ch) = char::from_u32(code) {
                assert_eq!(map.get(ch), (code % 2 == 0, true), "char {code:#x}");
            }
        }
        assert_eq!(map.block_count(), 1);
    }
}
