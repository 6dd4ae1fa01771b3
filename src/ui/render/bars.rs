//! Top and bottom bar rendering.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::core::{commit_counts, display_names, total_stats, FileDiff};
use crate::ui::app::{App, Focus, Mode};

use super::diff::layout_label;
use super::helpers::{pad, SpanBuilder, SPINNER};

/// File the header describes: the cursor file or the one at the top of the content.
fn current_file<'a>(app: &App, files: &[&'a FileDiff]) -> Option<&'a FileDiff> {
    let index = match app.view.focus {
        Focus::Sidebar => app.view.cursor,
        Focus::Content => app.viewport().file_at(app.view.scroll)?,
    };
    files.get(index).copied()
}

/// Render the header: worktree, base, selection summary and current file.
pub fn render_top_bar(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let bg = theme.bg_elevated;
    let base = Style::default().bg(bg);

    let mut builder = SpanBuilder::new();
    builder.push_str(
        "gv",
        base.fg(theme.accent).add_modifier(Modifier::BOLD),
    );
    builder.push_str(": ", base.fg(theme.text_muted));

    let branch = app
        .worktree()
        .map(|wt| wt.display_branch().to_string())
        .unwrap_or_else(|| "-".to_string());
    builder.push_str(&branch, base.fg(theme.text_bright));
    builder.push_str(" → ", base.fg(theme.text_muted));
    builder.push_str(&app.base, base.fg(theme.text_normal));

    let (selected, total) = commit_counts(&app.commits);
    let uncommitted = app
        .commits
        .iter()
        .any(|c| c.is_uncommitted() && c.selected);
    let summary = if uncommitted {
        format!(" [{}/{} commits + uncommitted]", selected, total)
    } else {
        format!(" [{}/{} commits]", selected, total)
    };
    builder.push_str(&summary, base.fg(theme.text_muted));

    let files = app.visible_files();
    let (added, removed) = total_stats(files.iter().copied());
    builder.push_str(&format!(" +{}", added), base.fg(theme.stat_added));
    builder.push_str(&format!(" -{}", removed), base.fg(theme.stat_removed));

    if let Some(file) = current_file(app, &files) {
        let names = display_names(files.iter().map(|f| f.path.as_str()));
        let name = names.get(&file.path).unwrap_or(&file.path);
        builder.push_str(" │ ", base.fg(theme.border_dim));
        builder.push_str(name, base.fg(theme.text_bright));
        builder.push_str(&format!(" +{}", file.added), base.fg(theme.stat_added));
        builder.push_str(&format!(" -{}", file.removed), base.fg(theme.stat_removed));
    }

    if app.is_loading() {
        let frame_char = SPINNER[app.ui.spinner % SPINNER.len()];
        builder.push_spaces(2, base);
        builder.push_char(frame_char, base.fg(theme.accent));
    }

    let used = builder.width();
    pad(&mut builder, usize::from(area.width).saturating_sub(used), base);
    frame.render_widget(Paragraph::new(Line::from(builder.finish())), area);
}

/// Key hints for the current mode.
fn hints(mode: Mode) -> &'static str {
    match mode {
        Mode::Diff => {
            "j/k move  tab focus  space collapse  n/N file  c commits  w worktree  u layout  x context  h hidden  ? help  q quit"
        }
        Mode::CommitFilter => "j/k move  space toggle  a all  n none  enter/esc close",
        Mode::WorktreeSwitcher | Mode::WorktreeList => "j/k move  enter switch  esc close",
        Mode::Help => "any key to close",
    }
}

/// Render the footer with hints and view settings.
pub fn render_bottom_bar(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let base = Style::default().bg(theme.bg_elevated);

    let mut right = format!(
        "{}  ctx:{} ",
        layout_label(app.view.layout),
        app.view.context_lines
    );
    if !app.view.count.is_empty() {
        right = format!("{}  {}", app.view.count, right);
    }
    let right_len = right.chars().count();

    let width = usize::from(area.width);
    let room = width.saturating_sub(right_len + 2);
    let left: String = hints(app.ui.mode).chars().take(room).collect();

    let mut spans = vec![
        Span::styled(" ", base),
        Span::styled(left.clone(), base.fg(theme.text_muted)),
    ];
    let used = 1 + left.chars().count();
    spans.push(Span::styled(
        " ".repeat(width.saturating_sub(used + right_len)),
        base,
    ));
    spans.push(Span::styled(right, base.fg(theme.accent)));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
