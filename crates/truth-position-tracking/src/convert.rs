//! Grapheme/UTF-16-aware offset↔column conversion helpers, used by the
//! fault substrate when rendering ranges for hosts that expect UTF-16
//! columns (matching the teacher's editor-facing position conversions).

/// Converts a byte offset within `text` to a zero-based UTF-16 column.
/// `text` is expected to be a single line (no embedded `\n`).
pub fn byte_offset_to_utf16_column(text: &str, offset: usize) -> u32 {
    let offset = offset.min(text.len());
    let clamped = if text.is_char_boundary(offset) {
        offset
    } else {
        let mut o = offset;
        while o > 0 && !text.is_char_boundary(o) {
            o -= 1;
        }
        o
    };
    text[..clamped].encode_utf16().count() as u32
}

/// Converts a zero-based UTF-16 column within `text` back to a byte offset.
/// `text` is expected to be a single line.
pub fn utf16_column_to_byte_offset(text: &str, column: u32) -> usize {
    let mut utf16_pos = 0u32;
    for (byte_pos, ch) in text.char_indices() {
        if utf16_pos >= column {
            return byte_pos;
        }
        utf16_pos += ch.len_utf16() as u32;
    }
    text.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_roundtrip() {
        let text = "A : B";
        let col = byte_offset_to_utf16_column(text, 4);
        assert_eq!(col, 4);
        assert_eq!(utf16_column_to_byte_offset(text, col), 4);
    }

    #[test]
    fn astral_characters_count_as_two_utf16_units() {
        let text = "\u{1F600}X";
        let col = byte_offset_to_utf16_column(text, text.len());
        assert_eq!(col, 3);
    }
}
