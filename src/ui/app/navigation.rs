use std::collections::HashMap;

use super::{App, Focus};
use crate::config::next_context;
use crate::core::{build_file_tree, flatten, TreeNode};

/// Rows above the first sidebar item (header, title, separator).
pub const SIDEBAR_ITEMS_TOP: u16 = 3;

enum SidebarHit {
    Folder(String),
    File(usize),
}

impl App {
    /// Toggle focus between sidebar and content.
    pub fn toggle_focus(&mut self) {
        let next = match self.view.focus {
            Focus::Sidebar => Focus::Content,
            Focus::Content => Focus::Sidebar,
        };
        self.set_focus(next);
    }

    /// Set focus to a specific pane.
    pub fn set_focus(&mut self, focus: Focus) {
        self.view.focus = focus;
        self.ui.dirty = true;
    }

    /// Keep cursor and scroll inside the current content.
    pub fn clamp_view(&mut self) {
        let viewport = self.viewport();
        self.view.cursor = viewport.clamp_cursor(self.view.cursor);
        self.view.scroll = viewport.clamp_scroll(self.view.scroll, self.content_height());
        self.ui.dirty = true;
    }

    /// Visible-file indices in the order the sidebar shows them.
    ///
    /// Files inside collapsed folders are skipped.
    pub fn sidebar_files(&self) -> Vec<usize> {
        let tree = self.tree();
        flatten(&tree)
            .into_iter()
            .filter_map(|(node, _)| node.file_index())
            .collect()
    }

    /// Visible-file indices in tree order, ignoring folder collapse.
    fn tree_order(&self) -> Vec<usize> {
        let tree = build_file_tree(&self.visible_files(), &HashMap::new());
        flatten(&tree)
            .into_iter()
            .filter_map(|(node, _)| node.file_index())
            .collect()
    }

    /// File `delta` sidebar rows away from the cursor.
    ///
    /// A cursor inside a collapsed folder sits between its shown neighbours,
    /// so the first step in either direction lands on the nearest one.
    fn sidebar_step(&self, delta: isize) -> Option<usize> {
        let files = self.sidebar_files();
        let last = files.len().checked_sub(1)?;
        let pos = match files.iter().position(|&i| i == self.view.cursor) {
            Some(pos) => pos.saturating_add_signed(delta),
            None => {
                let order = self.tree_order();
                let rank = |index: usize| {
                    order
                        .iter()
                        .position(|&i| i == index)
                        .unwrap_or(usize::MAX)
                };
                let cursor_rank = rank(self.view.cursor);
                let after = files
                    .iter()
                    .position(|&i| rank(i) > cursor_rank)
                    .unwrap_or(files.len());
                if delta >= 0 {
                    (after + delta.unsigned_abs()).saturating_sub(1)
                } else {
                    after.saturating_sub(delta.unsigned_abs())
                }
            }
        };
        Some(files[pos.min(last)])
    }

    /// Move the file cursor through the sidebar by `delta` files.
    pub fn move_cursor(&mut self, delta: isize) {
        if let Some(index) = self.sidebar_step(delta) {
            self.view.cursor = index;
            self.ui.dirty = true;
        }
    }

    /// Scroll the content by `delta` lines.
    pub fn scroll_by(&mut self, delta: isize) {
        let scroll = self.view.scroll.saturating_add_signed(delta);
        self.scroll_to(scroll);
    }

    /// Scroll the content to `line`, clamped.
    pub fn scroll_to(&mut self, line: usize) {
        self.view.scroll = self
            .viewport()
            .clamp_scroll(line, self.content_height());
        self.ui.dirty = true;
    }

    /// Half the terminal height, used by Ctrl+D / Ctrl+U.
    pub fn half_page(&self) -> usize {
        usize::from(self.ui.height / 2).max(1)
    }

    /// `g`: first file or top of content.
    pub fn goto_first(&mut self) {
        match self.view.focus {
            Focus::Sidebar => {
                if let Some(&first) = self.sidebar_files().first() {
                    self.view.cursor = first;
                    self.ui.dirty = true;
                }
            }
            Focus::Content => self.scroll_to(0),
        }
    }

    /// `G`: file / line `count` (1-based), or the end.
    pub fn goto_last(&mut self, count: Option<usize>) {
        match self.view.focus {
            Focus::Sidebar => {
                let files = self.sidebar_files();
                let target = count
                    .and_then(|n| files.get(n.saturating_sub(1)))
                    .or(files.last());
                if let Some(&idx) = target {
                    self.view.cursor = idx;
                    self.ui.dirty = true;
                }
            }
            Focus::Content => {
                let line = match count {
                    Some(n) => n.saturating_sub(1),
                    None => usize::MAX,
                };
                self.scroll_to(line);
            }
        }
    }

    /// Select a visible file and scroll its header to the top.
    pub fn select_file(&mut self, index: usize) {
        let viewport = self.viewport();
        if index >= viewport.file_count() {
            return;
        }
        self.view.cursor = index;
        self.view.scroll = viewport.clamp_scroll(viewport.offset_of(index), self.content_height());
        self.ui.dirty = true;
    }

    /// `n` / `N`: jump `times` files forward or back.
    pub fn jump_file(&mut self, forward: bool, times: usize) {
        let viewport = self.viewport();
        let Some(last) = viewport.file_count().checked_sub(1) else {
            return;
        };

        let target = match self.view.focus {
            Focus::Sidebar => {
                let steps = isize::try_from(times).unwrap_or(isize::MAX);
                let delta = if forward { steps } else { -steps };
                self.sidebar_step(delta).unwrap_or(self.view.cursor).min(last)
            }
            Focus::Content => {
                let mut offset = self.view.scroll;
                for _ in 0..times {
                    let step = if forward {
                        viewport.next_file_offset(offset)
                    } else {
                        viewport.prev_file_offset(offset)
                    };
                    match step {
                        Some(next) => offset = next,
                        None => break,
                    }
                }
                viewport.file_at(offset).unwrap_or(0)
            }
        };
        self.select_file(target);
    }

    /// `Enter` in the sidebar: show the cursor file in the content pane.
    pub fn open_cursor_file(&mut self) {
        self.select_file(self.view.cursor);
        self.set_focus(Focus::Content);
    }

    /// Flip the collapsed flag of a visible file.
    pub fn toggle_collapse(&mut self, index: usize) {
        let Some(&diff_idx) = self.visible_indices().get(index) else {
            return;
        };
        let file = &mut self.diffs[diff_idx];
        file.collapsed = !file.collapsed;
        self.clamp_view();
    }

    /// `Space` in the sidebar.
    pub fn toggle_collapse_at_cursor(&mut self) {
        self.toggle_collapse(self.view.cursor);
    }

    /// `Space` / `Enter` in the content pane.
    pub fn toggle_collapse_at_scroll(&mut self) {
        if let Some(index) = self.viewport().file_at(self.view.scroll) {
            self.toggle_collapse(index);
        }
    }

    /// `z`: collapse every file, or expand them all if all are collapsed.
    pub fn toggle_all_collapsed(&mut self) {
        let visible = self.visible_indices();
        if visible.is_empty() {
            return;
        }
        let collapse = !visible.iter().all(|&i| self.diffs[i].collapsed);
        for i in visible {
            self.diffs[i].collapsed = collapse;
        }
        self.clamp_view();
    }

    /// `u`: switch layout, keeping the file at the top in view.
    pub fn toggle_layout(&mut self) {
        let top = self.viewport().file_at(self.view.scroll);
        self.view.layout = self.view.layout.toggled();
        match top {
            Some(index) => self.select_file_keep_cursor(index),
            None => self.clamp_view(),
        }
    }

    fn select_file_keep_cursor(&mut self, index: usize) {
        let cursor = self.view.cursor;
        self.select_file(index);
        self.view.cursor = cursor;
    }

    /// `x`: cycle the context size and refetch.
    pub fn cycle_context(&mut self) {
        self.view.context_lines = next_context(self.view.context_lines);
        self.request_load(false);
    }

    /// `h`: show or hide filtered files.
    pub fn toggle_hidden(&mut self) {
        self.view.show_hidden = !self.view.show_hidden;
        self.clamp_view();
    }

    /// Flip a folder between expanded and collapsed.
    pub fn toggle_folder(&mut self, path: &str) {
        let expanded = self.view.expanded.get(path).copied().unwrap_or(true);
        self.view.expanded.insert(path.to_string(), !expanded);
        self.ui.dirty = true;
    }

    /// Sidebar rows that fit under the title.
    pub fn sidebar_capacity(&self) -> usize {
        usize::from(self.ui.height.saturating_sub(SIDEBAR_ITEMS_TOP + 1)).max(1)
    }

    /// First sidebar row drawn, chosen so the cursor row stays visible.
    pub fn sidebar_offset(&self) -> usize {
        let tree = self.tree();
        let row = flatten(&tree)
            .iter()
            .position(|(node, _)| node.file_index() == Some(self.view.cursor))
            .unwrap_or(0);
        let capacity = self.sidebar_capacity();
        if row >= capacity {
            row + 1 - capacity
        } else {
            0
        }
    }

    /// Left click on the `row`-th drawn sidebar item.
    pub fn click_sidebar(&mut self, row: usize) {
        let index = self.sidebar_offset() + row;
        let hit = {
            let tree = self.tree();
            flatten(&tree).get(index).map(|(node, _)| match node {
                TreeNode::Folder { path, .. } => SidebarHit::Folder(path.clone()),
                TreeNode::File { index, .. } => SidebarHit::File(*index),
            })
        };

        self.set_focus(Focus::Sidebar);
        match hit {
            Some(SidebarHit::Folder(path)) => self.toggle_folder(&path),
            Some(SidebarHit::File(index)) => self.select_file(index),
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::empty_app;
    use super::*;
    use crate::core::{FileDiff, Hunk, LayoutMode, LineKind};

    fn file(path: &str, lines: usize) -> FileDiff {
        let mut hunk = Hunk::new(1, 1, 1, lines as u32);
        for i in 0..lines {
            hunk.push(LineKind::Added, format!("line {}", i));
        }
        FileDiff::new(path, None, vec![hunk], false)
    }

    fn app_with_files() -> App {
        let mut app = empty_app();
        app.view.layout = LayoutMode::Unified;
        app.ui.height = 12;
        app.diffs = vec![
            file("src/a.rs", 10),
            file("src/b.rs", 10),
            file("z.rs", 10),
        ];
        app
    }

    #[test]
    fn cursor_moves_in_sidebar_order_and_clamps() {
        let mut app = app_with_files();
        app.move_cursor(1);
        assert_eq!(app.view.cursor, 1);
        app.move_cursor(10);
        assert_eq!(app.view.cursor, 2);
        app.move_cursor(-10);
        assert_eq!(app.view.cursor, 0);
    }

    #[test]
    fn collapsed_folders_hide_their_files_from_the_cursor() {
        let mut app = app_with_files();
        app.toggle_folder("src");
        assert_eq!(app.sidebar_files(), vec![2]);
        app.toggle_folder("src");
        assert_eq!(app.sidebar_files(), vec![0, 1, 2]);
    }

    #[test]
    fn next_file_follows_sidebar_order() {
        let mut app = empty_app();
        app.ui.height = 12;
        app.diffs = vec![file("src/a.rs", 3), file("README.md", 3), file("src/b.rs", 3)];
        // Sidebar: src/, a.rs, b.rs, README.md
        assert_eq!(app.sidebar_files(), vec![0, 2, 1]);

        app.jump_file(true, 1);
        assert_eq!(app.view.cursor, 2);
        app.jump_file(true, 1);
        assert_eq!(app.view.cursor, 1);
        app.jump_file(true, 1);
        assert_eq!(app.view.cursor, 1);
        app.jump_file(false, 2);
        assert_eq!(app.view.cursor, 0);
    }

    #[test]
    fn cursor_in_collapsed_folder_steps_to_nearest_neighbour() {
        let mut app = empty_app();
        app.ui.height = 12;
        app.diffs = vec![
            file("a.md", 2),
            file("b.md", 2),
            file("src/x.rs", 2),
            file("z.md", 2),
        ];
        app.view.cursor = 2;
        app.toggle_folder("src");
        assert_eq!(app.sidebar_files(), vec![0, 1, 3]);

        app.move_cursor(1);
        assert_eq!(app.view.cursor, 3);

        app.view.cursor = 2;
        app.move_cursor(-1);
        assert_eq!(app.view.cursor, 1);

        app.view.cursor = 2;
        app.jump_file(true, 1);
        assert_eq!(app.view.cursor, 3);
    }

    #[test]
    fn scroll_is_clamped() {
        let mut app = app_with_files();
        // 3 files of 11 rows, 10 content rows.
        app.scroll_by(1000);
        assert_eq!(app.view.scroll, 23);
        app.scroll_by(-5);
        assert_eq!(app.view.scroll, 18);
        app.scroll_by(-1000);
        assert_eq!(app.view.scroll, 0);
    }

    #[test]
    fn goto_last_uses_count() {
        let mut app = app_with_files();
        app.goto_last(Some(2));
        assert_eq!(app.view.cursor, 1);
        app.goto_last(None);
        assert_eq!(app.view.cursor, 2);

        app.set_focus(Focus::Content);
        app.goto_last(Some(5));
        assert_eq!(app.view.scroll, 4);
        app.goto_last(None);
        assert_eq!(app.view.scroll, 23);
        app.goto_first();
        assert_eq!(app.view.scroll, 0);
    }

    #[test]
    fn next_file_moves_cursor_and_scroll() {
        let mut app = app_with_files();
        app.jump_file(true, 1);
        assert_eq!((app.view.cursor, app.view.scroll), (1, 11));

        app.set_focus(Focus::Content);
        app.jump_file(false, 1);
        assert_eq!((app.view.cursor, app.view.scroll), (0, 0));
        app.jump_file(true, 5);
        assert_eq!(app.view.cursor, 2);
    }

    #[test]
    fn collapse_all_then_expand_all() {
        let mut app = app_with_files();
        app.toggle_collapse(0);
        app.toggle_all_collapsed();
        assert!(app.diffs.iter().all(|d| d.collapsed));
        assert_eq!(app.viewport().total_lines(), 6);
        app.toggle_all_collapsed();
        assert!(app.diffs.iter().all(|d| !d.collapsed));
    }

    #[test]
    fn collapse_at_scroll_targets_the_top_file() {
        let mut app = app_with_files();
        app.scroll_to(12);
        app.toggle_collapse_at_scroll();
        assert!(app.diffs[1].collapsed);
        assert!(!app.diffs[0].collapsed);
    }

    #[test]
    fn clicking_sidebar_rows() {
        let mut app = app_with_files();
        app.set_focus(Focus::Content);
        // Rows: src/, a.rs, b.rs, z.rs
        app.click_sidebar(2);
        assert_eq!(app.view.focus, Focus::Sidebar);
        assert_eq!(app.view.cursor, 1);
        app.click_sidebar(0);
        assert_eq!(app.view.expanded.get("src"), Some(&false));
    }

    #[test]
    fn hidden_toggle_reclamps() {
        let mut app = empty_app();
        app.diffs = vec![file("a.rs", 2), file("Cargo.lock", 40)];
        app.view.show_hidden = true;
        app.select_file(1);
        app.toggle_hidden();
        assert_eq!(app.view.cursor, 0);
        assert_eq!(app.view.scroll, 0);
    }
}
