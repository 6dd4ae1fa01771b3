//! UI rendering with ratatui.
//!
//! Layout: a one-row header, the sidebar and content pane side by side,
//! and a one-row footer. Popups draw over the main view.

mod bars;
mod diff;
mod helpers;
mod overlays;
mod sidebar;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::Block,
    Frame,
};

use super::app::{App, Mode};

/// Sidebar width in columns, border included.
pub const SIDEBAR_WIDTH: u16 = 35;

/// Main render function.
pub fn render(frame: &mut Frame, app: &mut App) {
    let _timer = crate::metrics::Timer::start("render_frame");

    let area = frame.area();
    if (app.ui.width, app.ui.height) != (area.width, area.height) {
        app.set_size(area.width, area.height);
    }
    let app: &App = app;

    frame.render_widget(Block::default().style(Style::default().bg(app.theme.bg)), area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(0),    // Main content
            Constraint::Length(1), // Footer
        ])
        .split(area);

    bars::render_top_bar(frame, app, chunks[0]);
    if app.ui.mode == Mode::WorktreeList {
        overlays::render_worktree_list(frame, app);
    } else {
        render_main(frame, app, chunks[1]);
    }
    bars::render_bottom_bar(frame, app, chunks[2]);

    match app.ui.mode {
        Mode::CommitFilter => overlays::render_commit_filter(frame, app),
        Mode::WorktreeSwitcher => overlays::render_worktree_switcher(frame, app),
        Mode::Help => overlays::render_help_overlay(frame, app),
        Mode::Diff | Mode::WorktreeList => {}
    }
}

fn render_main(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(SIDEBAR_WIDTH), // Sidebar
            Constraint::Min(0),                // Content
        ])
        .split(area);

    sidebar::render_sidebar(frame, app, chunks[0]);
    diff::render_diff(frame, app, chunks[1]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CommitEntry, FileDiff, Hunk, LineKind, RepoRoot, Worktree};
    use crate::ui::app::AppOptions;
    use ratatui::{backend::TestBackend, Terminal};

    fn app_with(diffs: Vec<FileDiff>) -> App {
        let worktree = Worktree {
            path: "/nonexistent".into(),
            branch: "feature".to_string(),
            ..Default::default()
        };
        let mut app = App::with_worktrees(
            RepoRoot::from_path("/nonexistent"),
            Vec::new(),
            0,
            AppOptions::default(),
        );
        app.worktrees = vec![worktree];
        app.diffs = diffs;
        app
    }

    fn draw(app: &mut App, width: u16, height: u16) -> Vec<String> {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| buffer[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect()
    }

    fn sample_file() -> FileDiff {
        let mut hunk = Hunk::new(1, 2, 1, 2);
        hunk.push(LineKind::Removed, "old line");
        hunk.push(LineKind::Added, "new line");
        hunk.push(LineKind::Context, "same");
        FileDiff::new("src/lib.rs", None, vec![hunk], false)
    }

    #[test]
    fn draws_header_sidebar_and_rows() {
        let mut app = app_with(vec![sample_file()]);
        let rows = draw(&mut app, 100, 12);

        assert!(rows[0].starts_with("gv: feature → main"));
        assert!(rows[1].starts_with("Files"));
        assert!(rows[3].contains("▼ src/"));
        assert!(rows[4].contains(">   lib.rs"));
        assert!(rows[1].contains("▼ src/lib.rs  +1 -1"));
        assert!(rows[2].contains("old line"));
        assert!(rows[2].contains("new line"));
        assert!(rows[11].contains("ctx:3"));
        assert_eq!((app.ui.width, app.ui.height), (100, 12));
    }

    #[test]
    fn empty_selection_placeholder() {
        let mut app = app_with(Vec::new());
        app.commits = vec![CommitEntry::real("abc", "s", "a")];
        let rows = draw(&mut app, 100, 8);
        assert!(rows[1].contains("1 commit selected, but no file changes"));

        app.commits[0].selected = false;
        let rows = draw(&mut app, 100, 8);
        assert!(rows[1].contains("No changes (branch is same as main)"));
    }

    #[test]
    fn hidden_files_placeholder() {
        let mut app = app_with(vec![FileDiff::new("Cargo.lock", None, Vec::new(), false)]);
        let rows = draw(&mut app, 100, 8);
        assert!(rows[1].contains("All 1 files hidden (press 'h' to show)"));
        assert!(rows[1].contains("Files (1 hidden)"));
    }

    #[test]
    fn fetch_error_uses_last_row_when_content_exists() {
        let mut app = app_with(vec![sample_file()]);
        app.ui.error = Some("boom".to_string());
        let rows = draw(&mut app, 100, 10);
        assert!(rows[8].contains("Error: boom"));
    }

    #[test]
    fn commit_popup_lists_entries() {
        let mut app = app_with(Vec::new());
        app.commits = vec![
            CommitEntry::uncommitted(),
            CommitEntry::real("0123456789", "Add feature", "me"),
        ];
        app.open_commit_filter();
        let rows = draw(&mut app, 100, 20).join("\n");
        assert!(rows.contains("[x] (uncommitted changes)"));
        assert!(rows.contains("[x] 0123456 Add feature"));
        assert!(rows.contains("Showing: 1 of 1"));
    }
}
