use tracing::info;

use super::{App, Mode};

impl App {
    /// `c`: open the commit filter with the cursor on the first entry.
    pub fn open_commit_filter(&mut self) {
        self.popup.commit_cursor = 0;
        self.popup.commit_snapshot = self.commits.iter().map(|c| c.selected).collect();
        self.ui.mode = Mode::CommitFilter;
        self.ui.dirty = true;
    }

    /// Move the commit filter cursor.
    pub fn move_commit_cursor(&mut self, delta: isize) {
        let last = self.commits.len().saturating_sub(1);
        self.popup.commit_cursor = self
            .popup
            .commit_cursor
            .saturating_add_signed(delta)
            .min(last);
        self.ui.dirty = true;
    }

    /// Toggle the entry under the commit cursor.
    pub fn toggle_commit(&mut self) {
        if let Some(entry) = self.commits.get_mut(self.popup.commit_cursor) {
            entry.selected = !entry.selected;
            self.ui.dirty = true;
        }
    }

    /// Select or deselect every entry.
    pub fn select_all_commits(&mut self, selected: bool) {
        for entry in &mut self.commits {
            entry.selected = selected;
        }
        self.ui.dirty = true;
    }

    /// Close the commit filter, refetching if the selection changed.
    pub fn close_commit_filter(&mut self) {
        self.ui.mode = Mode::Diff;
        self.ui.dirty = true;

        let changed = self
            .commits
            .iter()
            .map(|c| c.selected)
            .ne(self.popup.commit_snapshot.iter().copied());
        if changed {
            self.view.scroll = 0;
            self.view.cursor = 0;
            self.request_load(false);
        }
    }

    /// `w` / `W`: open a worktree picker on the current worktree.
    pub fn open_worktrees(&mut self, full_screen: bool) {
        self.popup.worktree_cursor = self.current_worktree;
        self.ui.mode = if full_screen {
            Mode::WorktreeList
        } else {
            Mode::WorktreeSwitcher
        };
        self.ui.dirty = true;
    }

    /// Move the worktree cursor.
    pub fn move_worktree_cursor(&mut self, delta: isize) {
        let last = self.worktrees.len().saturating_sub(1);
        self.popup.worktree_cursor = self
            .popup
            .worktree_cursor
            .saturating_add_signed(delta)
            .min(last);
        self.ui.dirty = true;
    }

    /// Switch to the worktree under the cursor and reload everything.
    pub fn switch_worktree(&mut self) {
        self.ui.mode = Mode::Diff;
        self.ui.dirty = true;
        let Some(worktree) = self.worktrees.get(self.popup.worktree_cursor) else {
            return;
        };
        info!(path = %worktree.path.display(), branch = worktree.display_branch(), "switching worktree");

        self.current_worktree = self.popup.worktree_cursor;
        self.commits.clear();
        self.diffs.clear();
        self.highlights.clear();
        self.ui.error = None;
        self.view.scroll = 0;
        self.view.cursor = 0;
        self.view.expanded.clear();
        self.request_load(true);
    }

    /// Close any popup without acting.
    pub fn close_popup(&mut self) {
        self.ui.mode = Mode::Diff;
        self.ui.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::empty_app;
    use super::*;
    use crate::core::{CommitEntry, Worktree};

    #[test]
    fn commit_filter_tracks_changes() {
        let mut app = empty_app();
        app.commits = vec![
            CommitEntry::uncommitted(),
            CommitEntry::real("a1", "first", "me"),
        ];
        app.open_commit_filter();
        assert_eq!(app.ui.mode, Mode::CommitFilter);

        app.move_commit_cursor(5);
        assert_eq!(app.popup.commit_cursor, 1);
        app.toggle_commit();
        assert!(!app.commits[1].selected);
        app.toggle_commit();
        app.close_commit_filter();
        assert_eq!(app.ui.mode, Mode::Diff);
        assert!(!app.is_loading());

        app.open_commit_filter();
        app.select_all_commits(false);
        assert!(app.commits.iter().all(|c| !c.selected));
        app.select_all_commits(true);
        app.close_popup();
        assert_eq!(app.ui.mode, Mode::Diff);
    }

    #[test]
    fn worktree_picker_starts_on_current() {
        let mut app = empty_app();
        app.worktrees = vec![Worktree::default(), Worktree::default()];
        app.current_worktree = 1;
        app.open_worktrees(true);
        assert_eq!(app.ui.mode, Mode::WorktreeList);
        assert_eq!(app.popup.worktree_cursor, 1);
        app.move_worktree_cursor(-3);
        assert_eq!(app.popup.worktree_cursor, 0);
        app.open_worktrees(false);
        assert_eq!(app.ui.mode, Mode::WorktreeSwitcher);
    }
}
