//! UTF-16 unit accounting over UTF-8 chunks

use bytecount::count as bytecount_count;

/// Number of UTF-16 code units needed to encode `text`
#[inline]
pub fn utf16_len(text: &str) -> usize {
    if text.is_ascii() {
        return text.len();
    }
    text.chars().map(char::len_utf16).sum()
}

/// Number of `\n` units in `text`
#[inline]
pub fn count_line_breaks(text: &str) -> usize {
    bytecount_count(text.as_bytes(), b'\n')
}

/// Byte offset of UTF-16 offset `units`, rounding down when `units` falls
/// inside a surrogate pair
pub fn byte_offset(text: &str, units: usize) -> usize {
    let mut seen = 0;
    for (byte, ch) in text.char_indices() {
        let next = seen + ch.len_utf16();
        if next > units {
            return byte;
        }
        seen = next;
    }
    text.len()
}

/// Byte offset of UTF-16 offset `units`, rounding up past a surrogate pair
/// it would otherwise split. Used to pick leaf boundaries.
pub fn split_offset(text: &str, units: usize) -> usize {
    let mut seen = 0;
    for (byte, ch) in text.char_indices() {
        if seen >= units {
            return byte;
        }
        seen += ch.len_utf16();
    }
    text.len()
}

/// Whether UTF-16 offset `units` lands between two characters of `text`
pub fn is_boundary(text: &str, units: usize) -> bool {
    let mut seen = 0;
    for ch in text.chars() {
        if seen >= units {
            break;
        }
        seen += ch.len_utf16();
    }
    seen == units
}
