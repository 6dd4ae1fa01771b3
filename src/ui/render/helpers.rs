//! Shared rendering helpers and constants.

use ratatui::style::Style;
use ratatui::text::Span;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Unified gutter: two 4-digit columns, marker and spacing.
pub const UNIFIED_GUTTER_WIDTH: usize = 12;

/// Split gutter: 4-digit line number plus a space.
pub const SPLIT_GUTTER_WIDTH: usize = 5;

/// Tab stop width for display alignment.
pub const TAB_WIDTH: usize = 4;

/// Spinner frames shown while a fetch runs.
pub const SPINNER: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// Sanitize control characters.
pub fn sanitize_char(c: char) -> char {
    match c {
        '\x00'..='\x1f' | '\x7f' => '\u{FFFD}',
        _ => c,
    }
}

/// Columns a tab advances from `col`.
pub fn tab_width_at(col: usize) -> usize {
    let rem = col % TAB_WIDTH;
    if rem == 0 {
        TAB_WIDTH
    } else {
        TAB_WIDTH - rem
    }
}

/// Display columns of a single character.
pub fn char_width(c: char) -> usize {
    c.width().unwrap_or(0)
}

/// Truncate to `max_len` display columns, ending in an ellipsis when cut.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.width() <= max_len {
        return s.to_string();
    }
    if max_len == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for ch in s.chars() {
        let w = char_width(ch);
        if used + w > max_len - 1 {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

/// Format an optional line number in a 4-wide column.
pub fn line_number(n: Option<u32>) -> String {
    n.map(|n| format!("{:>4}", n))
        .unwrap_or_else(|| "    ".to_string())
}

/// Builder for efficient span construction.
pub struct SpanBuilder {
    spans: Vec<Span<'static>>,
    pending_style: Option<Style>,
    pending_text: String,
    width: usize,
}

impl SpanBuilder {
    pub fn new() -> Self {
        Self {
            spans: Vec::new(),
            pending_style: None,
            pending_text: String::new(),
            width: 0,
        }
    }

    /// Display columns pushed so far.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn push_char(&mut self, ch: char, style: Style) {
        if self.pending_style != Some(style) {
            self.flush();
            self.pending_style = Some(style);
        }
        self.pending_text.push(ch);
        self.width += char_width(ch);
    }

    pub fn push_str(&mut self, text: &str, style: Style) {
        for ch in text.chars() {
            self.push_char(ch, style);
        }
    }

    pub fn push_spaces(&mut self, count: usize, style: Style) {
        if count == 0 {
            return;
        }
        if self.pending_style != Some(style) {
            self.flush();
            self.pending_style = Some(style);
        }
        self.pending_text.push_str(spaces(count));
        self.width += count;
    }

    fn flush(&mut self) {
        if !self.pending_text.is_empty() {
            let style = self.pending_style.unwrap_or_default();
            self.spans
                .push(Span::styled(std::mem::take(&mut self.pending_text), style));
        }
    }

    pub fn finish(mut self) -> Vec<Span<'static>> {
        self.flush();
        self.spans
    }
}

impl Default for SpanBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Maximum padding served from the static buffer.
const MAX_SPACES: usize = 256;

static SPACES: &str = concat!(
    "                                                                ", // 64
    "                                                                ", // 128
    "                                                                ", // 192
    "                                                                ", // 256
);

/// Get a slice of at most 256 spaces.
///
/// Wider requests are capped; callers pad in chunks.
#[inline]
pub fn spaces(len: usize) -> &'static str {
    &SPACES[..len.min(MAX_SPACES)]
}

/// Push `count` spaces, chunking past the static buffer.
pub fn pad(builder: &mut SpanBuilder, mut count: usize, style: Style) {
    while count > 0 {
        let chunk = count.min(MAX_SPACES);
        builder.push_spaces(chunk, style);
        count -= chunk;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_chars_are_replaced() {
        assert_eq!(sanitize_char('\x1b'), '\u{FFFD}');
        assert_eq!(sanitize_char('a'), 'a');
    }

    #[test]
    fn tabs_stop_on_multiples() {
        assert_eq!(tab_width_at(0), 4);
        assert_eq!(tab_width_at(5), 3);
    }

    #[test]
    fn truncation_adds_ellipsis() {
        assert_eq!(truncate_str("abcdef", 4), "abc…");
        assert_eq!(truncate_str("abc", 4), "abc");
        assert_eq!(truncate_str("abc", 0), "");
    }

    #[test]
    fn wide_chars_count_two_columns() {
        assert_eq!(truncate_str("日本語テキスト", 7), "日本語…");
        assert_eq!(truncate_str("日本語", 6), "日本語");

        let mut builder = SpanBuilder::new();
        builder.push_str("a日", Style::default());
        assert_eq!(builder.width(), 3);
    }

    #[test]
    fn padding_past_buffer() {
        let mut builder = SpanBuilder::new();
        pad(&mut builder, 600, Style::default());
        assert_eq!(builder.width(), 600);
        let text: String = builder.finish().iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text.len(), 600);
    }

    #[test]
    fn line_numbers_are_right_aligned() {
        assert_eq!(line_number(Some(7)), "   7");
        assert_eq!(line_number(None), "    ");
    }
}
