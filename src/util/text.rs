// Char-offset text helpers
//
// Caret positions reported by hosts are char offsets. Every slice of field
// content goes through these so multi-byte text never splits a code point.

/// Number of chars in `text`.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Byte index of the char at `char_idx`, clamped to the end of `text`.
pub fn byte_offset(text: &str, char_idx: usize) -> usize {
    text.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

/// The first `char_idx` chars of `text`.
pub fn prefix_chars(text: &str, char_idx: usize) -> &str {
    &text[..byte_offset(text, char_idx)]
}

/// Everything from char `char_idx` to the end of `text`.
pub fn suffix_chars(text: &str, char_idx: usize) -> &str {
    &text[byte_offset(text, char_idx)..]
}

/// Chars `[start, end)` of `text`. Out-of-range bounds are clamped.
pub fn slice_chars(text: &str, start: usize, end: usize) -> &str {
    let from = byte_offset(text, start);
    let to = byte_offset(text, end.max(start));
    &text[from..to]
}

#[cfg(test)]
#[path = "text_test.rs"]
mod tests;
