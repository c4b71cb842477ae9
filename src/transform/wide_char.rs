//! Display width classification for tab-stop arithmetic
//!
//! A character is wide (two columns) when it belongs to one of a fixed list
//! of Unicode blocks. This is deliberately not East Asian Width: halfwidth
//! katakana, for example, sit in the Halfwidth and Fullwidth Forms block and
//! count as wide here.

/// Inclusive code point ranges of the wide blocks, sorted by start
const WIDE_BLOCKS: &[(u32, u32)] = &[
    (0x1100, 0x11FF), // Hangul Jamo
    (0x2E80, 0x2EFF), // CJK Radicals Supplement
    (0x3000, 0x303F), // CJK Symbols and Punctuation
    (0x3200, 0x32FF), // Enclosed CJK Letters and Months
    (0x3300, 0x33FF), // CJK Compatibility
    (0x3400, 0x4DBF), // CJK Unified Ideographs Extension A
    (0x4E00, 0x9FFF), // CJK Unified Ideographs
    (0xAC00, 0xD7AF), // Hangul Syllables
    (0xFE30, 0xFE4F), // CJK Compatibility Forms
    (0xFF00, 0xFFEF), // Halfwidth and Fullwidth Forms
];

/// Whether `ch` occupies two display columns
#[inline]
pub fn is_wide(ch: char) -> bool {
    let cp = ch as u32;
    if cp < WIDE_BLOCKS[0].0 {
        return false;
    }
    WIDE_BLOCKS
        .iter()
        .any(|&(start, end)| (start..=end).contains(&cp))
}
