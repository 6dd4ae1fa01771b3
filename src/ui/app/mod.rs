//! Application state and lifecycle.

use std::path::Path;

use anyhow::Context;
use tracing::info;

use crate::core::{
    build_file_tree, find_current_worktree, list_worktrees, CommitEntry, FileDiff, HiddenFilter,
    LayoutMode, RepoRoot, TreeNode, Viewport, Worktree,
};
use crate::highlight::HunkHighlightCache;
use crate::theme::Theme;

mod load;
mod navigation;
mod popups;
mod state;
mod worker_state;

pub use navigation::SIDEBAR_ITEMS_TOP;
pub use state::{Focus, Mode, PopupState, UiState, ViewState};
use worker_state::WorkerState;

/// Terminal size assumed until the first resize or draw.
const DEFAULT_SIZE: (u16, u16) = (80, 24);

/// Startup settings resolved from the config file and command line.
#[derive(Debug, Clone)]
pub struct AppOptions {
    /// Branch the worktrees are compared against.
    pub base: String,
    /// Initial context lines (0, 1 or 3).
    pub context_lines: u32,
    /// Initial layout.
    pub layout: LayoutMode,
    /// Basenames hidden until toggled.
    pub hidden: HiddenFilter,
    /// Colors.
    pub theme: Theme,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            base: "main".to_string(),
            context_lines: 3,
            layout: LayoutMode::default(),
            hidden: HiddenFilter::default(),
            theme: Theme::default(),
        }
    }
}

/// Application state.
pub struct App {
    /// Repository root.
    pub repo: RepoRoot,
    /// Worktrees attached to the repository.
    pub worktrees: Vec<Worktree>,
    /// Index of the worktree being viewed.
    pub current_worktree: usize,
    /// Base branch name.
    pub base: String,
    /// Commit list for the current worktree.
    pub commits: Vec<CommitEntry>,
    /// Parsed diff for the current selection.
    pub diffs: Vec<FileDiff>,
    /// Hidden basenames.
    pub hidden: HiddenFilter,
    /// Diff view navigation.
    pub view: ViewState,
    /// Popup cursors.
    pub popup: PopupState,
    /// UI state (mode, messages).
    pub ui: UiState,
    /// Per-hunk syntax spans for the installed diff.
    pub highlights: HunkHighlightCache,
    /// Current color theme.
    pub theme: Theme,
    /// Should the app quit?
    pub should_quit: bool,

    /// Background worker state.
    worker: WorkerState,
}

impl App {
    /// Discover worktrees around `start` and issue the initial fetch.
    pub fn new(repo: RepoRoot, start: &Path, options: AppOptions) -> anyhow::Result<Self> {
        let worktrees = list_worktrees(&repo).context("failed to list worktrees")?;
        let start = start.canonicalize().unwrap_or_else(|_| start.to_path_buf());
        let current = find_current_worktree(&worktrees, &start);
        info!(
            worktrees = worktrees.len(),
            current,
            base = %options.base,
            "starting"
        );
        Ok(Self::with_worktrees(repo, worktrees, current, options))
    }

    /// Build the app from an already known worktree list.
    ///
    /// A fetch is issued immediately unless the list is empty.
    pub fn with_worktrees(
        repo: RepoRoot,
        worktrees: Vec<Worktree>,
        current_worktree: usize,
        options: AppOptions,
    ) -> Self {
        let AppOptions {
            base,
            context_lines,
            layout,
            hidden,
            theme,
        } = options;

        let mut app = Self {
            repo,
            current_worktree: current_worktree.min(worktrees.len().saturating_sub(1)),
            worktrees,
            base,
            commits: Vec::new(),
            diffs: Vec::new(),
            hidden,
            view: ViewState {
                layout,
                context_lines: crate::config::normalize_context(context_lines),
                ..Default::default()
            },
            popup: PopupState::default(),
            ui: UiState {
                dirty: true,
                width: DEFAULT_SIZE.0,
                height: DEFAULT_SIZE.1,
                ..Default::default()
            },
            highlights: HunkHighlightCache::new(),
            theme,
            should_quit: false,
            worker: WorkerState::new(),
        };

        app.request_load(true);
        app
    }

    /// Worktree being viewed.
    pub fn worktree(&self) -> Option<&Worktree> {
        self.worktrees.get(self.current_worktree)
    }

    /// Whether a fetch is in flight.
    pub fn is_loading(&self) -> bool {
        self.worker.loading
    }

    /// Indices into `diffs` of the files currently shown.
    pub fn visible_indices(&self) -> Vec<usize> {
        self.hidden
            .visible_indices(&self.diffs, self.view.show_hidden)
    }

    /// Files currently shown, in diff order.
    pub fn visible_files(&self) -> Vec<&FileDiff> {
        self.visible_indices()
            .into_iter()
            .map(|i| &self.diffs[i])
            .collect()
    }

    /// Number of files suppressed by the hidden filter.
    pub fn hidden_count(&self) -> usize {
        if self.view.show_hidden {
            return 0;
        }
        self.diffs
            .iter()
            .filter(|d| self.hidden.is_hidden(&d.path))
            .count()
    }

    /// Line addressing for the visible files.
    pub fn viewport(&self) -> Viewport {
        Viewport::new(&self.visible_files(), self.view.layout)
    }

    /// Sidebar tree of the visible files.
    pub fn tree(&self) -> TreeNode {
        build_file_tree(&self.visible_files(), &self.view.expanded)
    }

    /// Rows available to the content pane.
    pub fn content_height(&self) -> usize {
        crate::core::content_height(self.ui.height)
    }

    /// Record the terminal size.
    pub fn set_size(&mut self, width: u16, height: u16) {
        if (self.ui.width, self.ui.height) != (width, height) {
            self.ui.width = width;
            self.ui.height = height;
            self.clamp_view();
        }
        self.ui.dirty = true;
    }

    /// Advance the loading spinner.
    pub fn tick(&mut self) {
        if self.worker.loading {
            self.ui.spinner = self.ui.spinner.wrapping_add(1);
            self.ui.dirty = true;
        }
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        if self.ui.mode == Mode::Help {
            self.close_help();
        } else {
            self.open_help();
        }
    }

    /// Open the in-app help overlay.
    pub fn open_help(&mut self) {
        self.ui.return_mode = self.ui.mode;
        self.ui.mode = Mode::Help;
        self.ui.dirty = true;
    }

    /// Close the help overlay.
    pub fn close_help(&mut self) {
        if self.ui.mode == Mode::Help {
            self.ui.mode = self.ui.return_mode;
            self.ui.dirty = true;
        }
    }

    /// Mark dirty for redraw.
    pub fn mark_dirty(&mut self) {
        self.ui.dirty = true;
    }

    /// Clear dirty flag after drawing.
    pub fn clear_dirty(&mut self) {
        self.ui.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(super) fn empty_app() -> App {
        App::with_worktrees(
            RepoRoot::from_path("/nonexistent"),
            Vec::new(),
            0,
            AppOptions::default(),
        )
    }

    #[test]
    fn worker_state_initializes_defaults() {
        let worker = WorkerState::new();

        assert_eq!(worker.next_request_id, 1);
        assert!(worker.pending_request_id.is_none());
        assert!(worker.queued_request.is_none());
        assert!(!worker.loading);
        assert!(worker.load.request_tx.is_some());
    }

    #[test]
    fn no_worktree_means_no_fetch() {
        let app = empty_app();
        assert!(!app.is_loading());
        assert!(app.worktree().is_none());
        assert_eq!(app.view.focus, Focus::Sidebar);
        assert_eq!(app.ui.mode, Mode::Diff);
    }

    #[test]
    fn help_returns_to_previous_mode() {
        let mut app = empty_app();
        app.ui.mode = Mode::CommitFilter;
        app.toggle_help();
        assert_eq!(app.ui.mode, Mode::Help);
        app.toggle_help();
        assert_eq!(app.ui.mode, Mode::CommitFilter);
    }

    #[test]
    fn hidden_files_are_counted_and_skipped() {
        let mut app = empty_app();
        app.diffs = vec![
            FileDiff::new("Cargo.lock", None, Vec::new(), false),
            FileDiff::new("src/main.rs", None, Vec::new(), false),
        ];
        assert_eq!(app.visible_indices(), vec![1]);
        assert_eq!(app.hidden_count(), 1);
        app.view.show_hidden = true;
        assert_eq!(app.visible_indices(), vec![0, 1]);
        assert_eq!(app.hidden_count(), 0);
    }
}
