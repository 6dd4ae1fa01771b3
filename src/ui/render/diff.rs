//! Content pane rendering.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::core::{
    commit_counts, hunk_row_count, layout_hunk, Cell, DisplayRow, FileDiff, LayoutMode, LineKind,
    Viewport,
};
use crate::highlight::{StyleId, StyledSpan};
use crate::theme::Theme;
use crate::ui::app::App;

use super::helpers::{
    char_width, line_number, pad, sanitize_char, tab_width_at, SpanBuilder, SPINNER,
    SPLIT_GUTTER_WIDTH, UNIFIED_GUTTER_WIDTH,
};

/// Collects the rows that fall inside the pane.
struct RowSink {
    lines: Vec<Line<'static>>,
    skip: usize,
    height: usize,
}

impl RowSink {
    fn full(&self) -> bool {
        self.lines.len() >= self.height
    }

    /// Consume one row above the pane; true if the row should not be drawn.
    fn skip_one(&mut self) -> bool {
        if self.skip > 0 {
            self.skip -= 1;
            true
        } else {
            false
        }
    }

    /// Consume `n` rows at once if they all lie above the pane.
    fn skip_rows(&mut self, n: usize) -> bool {
        if self.skip >= n {
            self.skip -= n;
            true
        } else {
            false
        }
    }

    fn push(&mut self, line: Line<'static>) {
        if !self.full() {
            self.lines.push(line);
        }
    }
}

/// Render the diff content pane.
pub fn render_diff(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let base_style = Style::default().bg(theme.bg);
    let files = app.visible_files();

    if files.is_empty() {
        let (message, color) = placeholder(app);
        let para = Paragraph::new(Span::styled(message, Style::default().fg(color))).style(base_style);
        frame.render_widget(para, area);
        return;
    }

    let height = usize::from(area.height);
    let width = usize::from(area.width);
    let viewport = Viewport::new(&files, app.view.layout);
    let first = viewport.file_at(app.view.scroll).unwrap_or(0);

    let mut sink = RowSink {
        lines: Vec::with_capacity(height),
        skip: app.view.scroll.saturating_sub(viewport.offset_of(first)),
        height,
    };
    for file in &files[first..] {
        if sink.full() {
            break;
        }
        push_file_rows(&mut sink, app, file, width);
    }

    let mut lines = sink.lines;
    if let Some(error) = &app.ui.error {
        lines.resize(height.max(1), Line::default());
        if let Some(last) = lines.last_mut() {
            *last = Line::from(Span::styled(
                format!("Error: {}", error),
                Style::default().fg(theme.error),
            ));
        }
    }

    frame.render_widget(Paragraph::new(lines).style(base_style), area);
}

/// Message shown when there is nothing to draw.
fn placeholder(app: &App) -> (String, Color) {
    let theme = &app.theme;
    if app.worktree().is_none() {
        return ("No worktree".to_string(), theme.text_muted);
    }
    if app.is_loading() {
        let frame = SPINNER[app.ui.spinner % SPINNER.len()];
        return (format!("{} Loading…", frame), theme.text_muted);
    }
    if let Some(error) = &app.ui.error {
        return (format!("Error: {}", error), theme.error);
    }
    if !app.diffs.is_empty() {
        return (
            format!(
                "All {} files hidden (press 'h' to show)",
                app.diffs.len()
            ),
            theme.text_muted,
        );
    }

    let (selected, _) = commit_counts(&app.commits);
    if selected > 0 {
        let noun = if selected == 1 { "commit" } else { "commits" };
        return (
            format!("{} {} selected, but no file changes", selected, noun),
            theme.text_muted,
        );
    }
    (
        format!("No changes (branch is same as {})", app.base),
        theme.text_muted,
    )
}

fn push_file_rows(sink: &mut RowSink, app: &App, file: &FileDiff, width: usize) {
    let theme = &app.theme;
    if !sink.skip_one() {
        sink.push(file_header(file, theme, width));
    }

    let placeholder = if file.collapsed {
        Some("(collapsed)")
    } else if file.is_binary {
        Some("Binary file")
    } else {
        None
    };
    if let Some(text) = placeholder {
        if !sink.skip_one() {
            sink.push(Line::from(Span::styled(
                format!("  {}", text),
                Style::default()
                    .fg(theme.text_faint)
                    .add_modifier(Modifier::ITALIC),
            )));
        }
        return;
    }

    let layout = app.view.layout;
    for (idx, hunk) in file.hunks.iter().enumerate() {
        if sink.full() {
            return;
        }
        if sink.skip_rows(hunk_row_count(hunk, layout)) {
            continue;
        }

        let tokens = app.highlights.hunk_spans(&file.path, idx, hunk);
        for row in layout_hunk(hunk, layout, &tokens) {
            if sink.full() {
                return;
            }
            if sink.skip_one() {
                continue;
            }
            let line = match row {
                DisplayRow::Unified(cell) => unified_row(cell, theme, width),
                DisplayRow::Split { left, right } => split_row(left, right, theme, width),
            };
            sink.push(line);
        }
    }
}

fn file_header(file: &FileDiff, theme: &Theme, width: usize) -> Line<'static> {
    let bg = theme.file_header_bg;
    let marker = if file.collapsed { "▶ " } else { "▼ " };

    let mut builder = SpanBuilder::new();
    builder.push_str(marker, Style::default().fg(theme.text_muted).bg(bg));
    builder.push_str(
        &file.display_path(),
        Style::default()
            .fg(theme.text_bright)
            .bg(bg)
            .add_modifier(Modifier::BOLD),
    );
    builder.push_spaces(2, Style::default().bg(bg));
    builder.push_str(
        &format!("+{}", file.added),
        Style::default().fg(theme.stat_added).bg(bg),
    );
    builder.push_spaces(1, Style::default().bg(bg));
    builder.push_str(
        &format!("-{}", file.removed),
        Style::default().fg(theme.stat_removed).bg(bg),
    );
    let used = builder.width();
    pad(&mut builder, width.saturating_sub(used), Style::default().bg(bg));
    Line::from(builder.finish())
}

fn line_bg(kind: LineKind, theme: &Theme) -> Color {
    match kind {
        LineKind::Added => theme.diff_insert_bg,
        LineKind::Removed => theme.diff_delete_bg,
        LineKind::Context => theme.bg,
    }
}

fn unified_row(cell: Cell<'_>, theme: &Theme, width: usize) -> Line<'static> {
    let kind = cell.line.kind;
    let bg = line_bg(kind, theme);
    let gutter = Style::default().fg(theme.text_faint).bg(bg);
    let marker = match kind {
        LineKind::Added => Style::default().fg(theme.stat_added).bg(bg),
        LineKind::Removed => Style::default().fg(theme.stat_removed).bg(bg),
        LineKind::Context => gutter,
    };

    let mut builder = SpanBuilder::new();
    builder.push_str(&line_number(cell.line.old_line), gutter);
    builder.push_spaces(1, gutter);
    builder.push_str(&line_number(cell.line.new_line), gutter);
    builder.push_spaces(1, gutter);
    builder.push_char(DisplayRow::glyph(kind), marker);
    builder.push_spaces(1, gutter);

    let content_width = width.saturating_sub(UNIFIED_GUTTER_WIDTH);
    render_code(&mut builder, &cell.line.content, cell.spans, bg, content_width, theme);
    let used = builder.width();
    pad(&mut builder, width.saturating_sub(used), Style::default().bg(bg));
    Line::from(builder.finish())
}

fn split_row(
    left: Option<Cell<'_>>,
    right: Option<Cell<'_>>,
    theme: &Theme,
    width: usize,
) -> Line<'static> {
    let left_width = width.saturating_sub(1) / 2;
    let right_width = width.saturating_sub(1 + left_width);

    let mut builder = SpanBuilder::new();
    split_cell(&mut builder, left, true, left_width, theme);
    builder.push_char('│', Style::default().fg(theme.gutter_sep).bg(theme.bg));
    split_cell(&mut builder, right, false, right_width, theme);
    Line::from(builder.finish())
}

fn split_cell(
    builder: &mut SpanBuilder,
    cell: Option<Cell<'_>>,
    left: bool,
    width: usize,
    theme: &Theme,
) {
    let start = builder.width();
    let Some(cell) = cell else {
        pad(builder, width, Style::default().bg(theme.diff_empty_bg));
        return;
    };

    let bg = line_bg(cell.line.kind, theme);
    let gutter = Style::default().fg(theme.text_faint).bg(bg);
    builder.push_str(&line_number(cell.number(left)), gutter);
    builder.push_spaces(1, gutter);

    let content_width = width.saturating_sub(SPLIT_GUTTER_WIDTH);
    render_code(builder, &cell.line.content, cell.spans, bg, content_width, theme);
    let used = builder.width() - start;
    pad(builder, width.saturating_sub(used), Style::default().bg(bg));
}

/// Push syntax-colored content, expanding tabs and truncating to `max_width`.
fn render_code(
    builder: &mut SpanBuilder,
    content: &str,
    spans: &[StyledSpan],
    bg: Color,
    max_width: usize,
    theme: &Theme,
) {
    if content.is_empty() || max_width == 0 {
        return;
    }

    let default_span = [StyledSpan {
        start: 0,
        end: content.len(),
        style_id: StyleId::Default,
    }];
    let spans = if spans.is_empty() {
        &default_span[..]
    } else {
        spans
    };

    let mut col = 0usize;
    for span in spans {
        let Some(text) = content.get(span.start..span.end) else {
            continue;
        };
        let style = Style::default().fg(theme.syntax(span.style_id)).bg(bg);
        for ch in text.chars() {
            if col >= max_width {
                return;
            }
            if ch == '\t' {
                let width = tab_width_at(col).min(max_width - col);
                builder.push_spaces(width, style);
                col += width;
                continue;
            }
            let ch = sanitize_char(ch);
            let width = char_width(ch);
            if col + width > max_width {
                return;
            }
            builder.push_char(ch, style);
            col += width;
        }
    }
}

/// Layout label for the footer.
pub fn layout_label(layout: LayoutMode) -> &'static str {
    match layout {
        LayoutMode::SideBySide => "split",
        LayoutMode::Unified => "unified",
    }
}
