//! Input handling.

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use super::app::{App, Focus, Mode, SIDEBAR_ITEMS_TOP};
use super::render::SIDEBAR_WIDTH;

/// Lines scrolled per mouse wheel notch over the content pane.
const WHEEL_LINES: isize = 3;

/// Handle a crossterm event.
/// Returns true if the event was handled.
pub fn handle_input(app: &mut App, event: Event) -> bool {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => handle_key(app, key),
        Event::Mouse(mouse) => handle_mouse(app, mouse),
        Event::Resize(width, height) => {
            app.set_size(width, height);
            true
        }
        _ => false,
    }
}

/// Handle a key event.
fn handle_key(app: &mut App, key: KeyEvent) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    // Global keys
    match key.code {
        KeyCode::Char('q') => {
            app.should_quit = true;
            return true;
        }
        KeyCode::Char('c') if ctrl => {
            app.should_quit = true;
            return true;
        }
        KeyCode::Char('?') => {
            app.toggle_help();
            return true;
        }
        _ => {}
    }

    if app.is_loading() {
        return false;
    }

    match app.ui.mode {
        Mode::Diff => handle_diff_key(app, key),
        Mode::CommitFilter => handle_commit_filter_key(app, key),
        Mode::WorktreeSwitcher | Mode::WorktreeList => handle_worktree_key(app, key),
        Mode::Help => {
            app.close_help();
            true
        }
    }
}

/// Consume the numeric prefix, if any.
fn take_count(app: &mut App) -> Option<usize> {
    std::mem::take(&mut app.view.count).parse().ok()
}

/// Handle keys in diff mode.
fn handle_diff_key(app: &mut App, key: KeyEvent) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    if let KeyCode::Char(digit @ '0'..='9') = key.code {
        if !ctrl {
            app.view.count.push(digit);
            app.mark_dirty();
            return true;
        }
    }
    if key.code == KeyCode::Esc {
        app.view.count.clear();
        app.mark_dirty();
        return true;
    }

    let count = take_count(app);
    let times = count.unwrap_or(1);
    let steps = isize::try_from(times).unwrap_or(isize::MAX);

    match key.code {
        KeyCode::Char('d') if ctrl => {
            app.scroll_by(isize::try_from(app.half_page()).unwrap_or(isize::MAX));
            true
        }
        KeyCode::Char('u') if ctrl => {
            app.scroll_by(-isize::try_from(app.half_page()).unwrap_or(isize::MAX));
            true
        }
        _ if ctrl => false,
        KeyCode::Tab => {
            app.toggle_focus();
            true
        }
        KeyCode::Char('j') | KeyCode::Down => {
            match app.view.focus {
                Focus::Sidebar => app.move_cursor(steps),
                Focus::Content => app.scroll_by(steps),
            }
            true
        }
        KeyCode::Char('k') | KeyCode::Up => {
            match app.view.focus {
                Focus::Sidebar => app.move_cursor(-steps),
                Focus::Content => app.scroll_by(-steps),
            }
            true
        }
        KeyCode::Char('g') => {
            app.goto_first();
            true
        }
        KeyCode::Char('G') => {
            app.goto_last(count);
            true
        }
        KeyCode::Char('n') => {
            app.jump_file(true, times);
            true
        }
        KeyCode::Char('N') => {
            app.jump_file(false, times);
            true
        }
        KeyCode::Char(' ') => {
            match app.view.focus {
                Focus::Sidebar => app.toggle_collapse_at_cursor(),
                Focus::Content => app.toggle_collapse_at_scroll(),
            }
            true
        }
        KeyCode::Enter => {
            match app.view.focus {
                Focus::Sidebar => app.open_cursor_file(),
                Focus::Content => app.toggle_collapse_at_scroll(),
            }
            true
        }
        KeyCode::Char('z') => {
            app.toggle_all_collapsed();
            true
        }
        KeyCode::Char('u') => {
            app.toggle_layout();
            true
        }
        KeyCode::Char('x') => {
            app.cycle_context();
            true
        }
        KeyCode::Char('h') => {
            app.toggle_hidden();
            true
        }
        KeyCode::Char('c') => {
            app.open_commit_filter();
            true
        }
        KeyCode::Char('w') => {
            app.open_worktrees(false);
            true
        }
        KeyCode::Char('W') => {
            app.open_worktrees(true);
            true
        }
        _ => false,
    }
}

/// Handle keys in the commit filter popup.
fn handle_commit_filter_key(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            app.move_commit_cursor(1);
            true
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.move_commit_cursor(-1);
            true
        }
        KeyCode::Char(' ') => {
            app.toggle_commit();
            true
        }
        KeyCode::Char('a') => {
            app.select_all_commits(true);
            true
        }
        KeyCode::Char('n') => {
            app.select_all_commits(false);
            true
        }
        KeyCode::Enter | KeyCode::Esc => {
            app.close_commit_filter();
            true
        }
        _ => false,
    }
}

/// Handle keys in the worktree switcher and list.
fn handle_worktree_key(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            app.move_worktree_cursor(1);
            true
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.move_worktree_cursor(-1);
            true
        }
        KeyCode::Enter => {
            app.switch_worktree();
            true
        }
        KeyCode::Esc => {
            app.close_popup();
            true
        }
        _ => false,
    }
}

/// Handle mouse events in diff mode.
fn handle_mouse(app: &mut App, mouse: MouseEvent) -> bool {
    if app.is_loading() || app.ui.mode != Mode::Diff {
        return false;
    }

    let in_sidebar = mouse.column < SIDEBAR_WIDTH;
    match mouse.kind {
        MouseEventKind::ScrollDown if in_sidebar => app.move_cursor(1),
        MouseEventKind::ScrollUp if in_sidebar => app.move_cursor(-1),
        MouseEventKind::ScrollDown => app.scroll_by(WHEEL_LINES),
        MouseEventKind::ScrollUp => app.scroll_by(-WHEEL_LINES),
        MouseEventKind::Up(MouseButton::Left) if in_sidebar => {
            if mouse.row < SIDEBAR_ITEMS_TOP {
                return false;
            }
            app.click_sidebar(usize::from(mouse.row - SIDEBAR_ITEMS_TOP));
        }
        MouseEventKind::Up(MouseButton::Left) => app.set_focus(Focus::Content),
        _ => return false,
    }
    true
}
