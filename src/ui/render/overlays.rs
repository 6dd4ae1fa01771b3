//! Popup and overlay rendering.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::core::{commit_counts, CommitKind, Worktree, UNCOMMITTED_LABEL};
use crate::theme::Theme;
use crate::ui::app::App;

use super::helpers::truncate_str;

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(2).max(1));
    let height = height.min(area.height.saturating_sub(2).max(1));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

/// Draw a bordered box and return its inner area.
fn popup_block(frame: &mut Frame, area: Rect, title: &str, theme: &Theme) -> Rect {
    frame.render_widget(Clear, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.accent))
        .title(Span::styled(
            format!(" {} ", title),
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        ))
        .style(Style::default().bg(theme.bg_elevated));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    inner
}

/// First row to draw so `cursor` stays within `height` rows.
fn list_scroll(cursor: usize, height: usize) -> usize {
    cursor.saturating_sub(height.saturating_sub(1))
}

fn list_row(text: String, selected: bool, width: usize, theme: &Theme) -> Line<'static> {
    let bg = if selected {
        theme.bg_selected
    } else {
        theme.bg_elevated
    };
    let fg = if selected {
        theme.text_bright
    } else {
        theme.text_normal
    };
    let indicator = if selected { "▌" } else { " " };
    let text_width = width.saturating_sub(1);
    Line::from(vec![
        Span::styled(indicator, Style::default().fg(theme.accent).bg(bg)),
        Span::styled(
            format!("{:<text_width$}", truncate_str(&text, text_width)),
            Style::default().fg(fg).bg(bg),
        ),
    ])
}

/// Render the commit selection popup.
pub fn render_commit_filter(frame: &mut Frame, app: &App) {
    let theme = &app.theme;
    let area = centered(frame.area(), 72, app.commits.len() as u16 + 4);
    let inner = popup_block(frame, area, "Commits (space: toggle, a: all, n: none)", theme);
    let height = usize::from(inner.height);
    let width = usize::from(inner.width);
    if height == 0 {
        return;
    }

    let list_height = height.saturating_sub(1);
    let scroll = list_scroll(app.popup.commit_cursor, list_height);
    let mut lines: Vec<Line> = app
        .commits
        .iter()
        .enumerate()
        .skip(scroll)
        .take(list_height)
        .map(|(i, entry)| {
            let check = if entry.selected { "[x]" } else { "[ ]" };
            let text = match &entry.kind {
                CommitKind::UncommittedChanges => format!("{} {}", check, UNCOMMITTED_LABEL),
                CommitKind::Real { .. } => {
                    format!("{} {} {}", check, entry.short_hash(), entry.subject())
                }
            };
            list_row(text, i == app.popup.commit_cursor, width, theme)
        })
        .collect();

    if app.commits.is_empty() {
        lines.push(Line::from(Span::styled(
            "No commits",
            Style::default().fg(theme.text_muted),
        )));
    }
    while lines.len() < list_height {
        lines.push(Line::default());
    }

    let (selected, total) = commit_counts(&app.commits);
    lines.push(Line::from(Span::styled(
        format!("Showing: {} of {}", selected, total),
        Style::default().fg(theme.text_muted),
    )));

    frame.render_widget(Paragraph::new(lines), inner);
}

fn worktree_text(worktree: &Worktree, current: bool) -> String {
    let marker = if current { "*" } else { " " };
    let bare = if worktree.is_bare { " (bare)" } else { "" };
    format!(
        "{} {:<24} {:<8} {}{}",
        marker,
        worktree.display_branch(),
        worktree.short_head(),
        worktree.path.display(),
        bare
    )
}

fn worktree_lines(app: &App, height: usize, width: usize) -> Vec<Line<'static>> {
    let scroll = list_scroll(app.popup.worktree_cursor, height);
    let mut lines: Vec<Line> = app
        .worktrees
        .iter()
        .enumerate()
        .skip(scroll)
        .take(height)
        .map(|(i, wt)| {
            list_row(
                worktree_text(wt, i == app.current_worktree),
                i == app.popup.worktree_cursor,
                width,
                &app.theme,
            )
        })
        .collect();
    if lines.is_empty() {
        lines.push(Line::from(Span::styled(
            "No worktree",
            Style::default().fg(app.theme.text_muted),
        )));
    }
    lines
}

/// Render the worktree switcher popup.
pub fn render_worktree_switcher(frame: &mut Frame, app: &App) {
    let area = centered(frame.area(), 80, app.worktrees.len() as u16 + 2);
    let inner = popup_block(frame, area, "Worktrees", &app.theme);
    let lines = worktree_lines(app, usize::from(inner.height), usize::from(inner.width));
    frame.render_widget(Paragraph::new(lines), inner);
}

/// Render the full-screen worktree list.
pub fn render_worktree_list(frame: &mut Frame, app: &App) {
    let inner = popup_block(frame, frame.area(), "Worktrees (enter: switch, esc: close)", &app.theme);
    let lines = worktree_lines(app, usize::from(inner.height), usize::from(inner.width));
    frame.render_widget(Paragraph::new(lines), inner);
}

/// Render the help overlay.
pub fn render_help_overlay(frame: &mut Frame, app: &App) {
    let theme = &app.theme;
    let entries = [
        ("Tab", "Switch focus between sidebar and content"),
        ("j/k or ↓/↑", "Move cursor / scroll (accepts a count)"),
        ("Ctrl+D / Ctrl+U", "Scroll half a screen"),
        ("g / G", "First / last (or Nth) file or line"),
        ("n / N", "Next / previous file"),
        ("Space", "Collapse or expand a file"),
        ("Enter", "Show file (sidebar) / collapse (content)"),
        ("z", "Collapse or expand all files"),
        ("u", "Toggle unified / side-by-side"),
        ("x", "Cycle context lines 3 → 1 → 0"),
        ("h", "Show or hide generated files"),
        ("c", "Choose commits"),
        ("w / W", "Switch worktree (popup / list)"),
        ("?", "Toggle this help"),
        ("q or Ctrl+C", "Quit"),
    ];

    let area = centered(frame.area(), 64, entries.len() as u16 + 5);
    let inner = popup_block(frame, area, "Help", theme);
    if inner.height == 0 {
        return;
    }

    let bg = theme.bg_elevated;
    let mut lines: Vec<Line> = Vec::with_capacity(entries.len() + 3);
    lines.push(Line::from(Span::styled(
        "Press any key to close.",
        Style::default().fg(theme.text_muted).bg(bg),
    )));
    lines.push(Line::default());
    for (key, desc) in entries {
        lines.push(Line::from(vec![
            Span::styled(format!("{:<18}", key), Style::default().fg(theme.accent).bg(bg)),
            Span::styled(desc, Style::default().fg(theme.text_normal).bg(bg)),
        ]));
    }
    lines.push(Line::from(vec![
        Span::styled(format!("{:<18}", "Mouse"), Style::default().fg(theme.accent).bg(bg)),
        Span::styled(
            "Wheel moves or scrolls, click selects",
            Style::default().fg(theme.text_normal).bg(bg),
        ),
    ]));

    frame.render_widget(Paragraph::new(lines), inner);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_scroll_keeps_cursor_visible() {
        assert_eq!(list_scroll(0, 5), 0);
        assert_eq!(list_scroll(4, 5), 0);
        assert_eq!(list_scroll(7, 5), 3);
    }

    #[test]
    fn centered_fits_inside() {
        let area = Rect::new(0, 0, 40, 10);
        let popup = centered(area, 100, 100);
        assert_eq!(popup, Rect::new(1, 1, 38, 8));
    }
}
