//! Pure text wrapping helpers and dimensional constants for the InputBox.

use unicode_width::UnicodeWidthStr;

/// Border (2) + padding (2) consumed horizontally by the bordered block
pub(super) const HORIZONTAL_OVERHEAD: u16 = 4;
/// Top + bottom borders consumed vertically
pub(super) const VERTICAL_OVERHEAD: u16 = 2;
/// Maximum visible content lines before internal scrolling kicks in
pub(super) const MAX_VISIBLE_LINES: u16 = 5;
/// Offset from area edge to content (border + padding)
pub(super) const CONTENT_OFFSET: u16 = 2;

/// Build textwrap options configured for the input box inner width.
pub(super) fn wrap_options(inner_width: u16) -> textwrap::Options<'static> {
    textwrap::Options::new(inner_width as usize)
        .break_words(true)
        .word_separator(textwrap::WordSeparator::AsciiSpace)
}

/// Inner content width after subtracting border/padding overhead.
pub(super) fn inner_width(content_width: u16) -> u16 {
    content_width.saturating_sub(HORIZONTAL_OVERHEAD)
}

/// Count wrapped lines, including the empty line after a trailing newline.
pub(super) fn wrap_line_count(text: &str, width: u16) -> u16 {
    if width == 0 || text.is_empty() {
        return 1;
    }
    let lines = textwrap::wrap(text, wrap_options(width));
    let mut count = (lines.len() as u16).max(1);
    if text.ends_with('\n') && !lines.last().is_some_and(|l| l.is_empty()) {
        count += 1;
    }
    count
}

/// Wrapped (row, column) of the byte offset `pos` in `text`.
///
/// textwrap trims trailing spaces from each line, so spaces typed at the
/// end of the buffer are added back to the column by hand.
pub(super) fn cursor_row_col(text: &str, pos: usize, width: u16) -> (u16, u16) {
    if width == 0 {
        return (0, 0);
    }
    let before = &text[..pos];
    if before.is_empty() {
        return (0, 0);
    }
    if before.ends_with('\n') {
        return (wrap_line_count(before, width) - 1, 0);
    }

    let lines = textwrap::wrap(before, wrap_options(width));
    let row = (lines.len() as u16).saturating_sub(1);
    let last = lines.last().map(|l| l.width()).unwrap_or(0) as u16;

    let current_line = before.rsplit('\n').next().unwrap_or("");
    let trailing = (current_line.len() - current_line.trim_end_matches(' ').len()) as u16;
    (row, (last + trailing).min(width))
}

/// Byte offset of the character boundary before `pos`.
pub(super) fn prev_char_boundary(text: &str, pos: usize) -> usize {
    text[..pos]
        .char_indices()
        .next_back()
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Byte offset of the character boundary after `pos`.
pub(super) fn next_char_boundary(text: &str, pos: usize) -> usize {
    text[pos..]
        .char_indices()
        .nth(1)
        .map(|(i, _)| pos + i)
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_line_count() {
        assert_eq!(wrap_line_count("", 10), 1);
        assert_eq!(wrap_line_count("hello", 10), 1);
        assert_eq!(wrap_line_count("hello world", 5), 2);
        assert_eq!(wrap_line_count("a\n", 10), 2);
        assert_eq!(wrap_line_count("a\nb", 10), 2);
    }

    #[test]
    fn test_cursor_row_col() {
        assert_eq!(cursor_row_col("", 0, 10), (0, 0));
        assert_eq!(cursor_row_col("abc", 3, 10), (0, 3));
        assert_eq!(cursor_row_col("abc", 1, 10), (0, 1));
        assert_eq!(cursor_row_col("ab\n", 3, 10), (1, 0));
        assert_eq!(cursor_row_col("ab\ncd", 5, 10), (1, 2));
        // Trailing space after a word still advances the cursor
        assert_eq!(cursor_row_col("hi ", 3, 10), (0, 3));
    }

    #[test]
    fn test_cursor_wide_chars() {
        // CJK characters are two columns wide
        assert_eq!(cursor_row_col("日本", "日本".len(), 10), (0, 4));
    }

    #[test]
    fn test_char_boundaries() {
        let s = "aé🦀";
        assert_eq!(next_char_boundary(s, 0), 1);
        assert_eq!(next_char_boundary(s, 1), 3);
        assert_eq!(next_char_boundary(s, 3), 7);
        assert_eq!(prev_char_boundary(s, 7), 3);
        assert_eq!(prev_char_boundary(s, 3), 1);
        assert_eq!(prev_char_boundary(s, 0), 0);
    }
}
