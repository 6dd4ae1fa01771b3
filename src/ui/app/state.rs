use std::collections::HashMap;

use crate::core::LayoutMode;

/// Which pane receives navigation keys in diff mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    /// File tree on the left.
    #[default]
    Sidebar,
    /// Diff content on the right.
    Content,
}

/// UI mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Browsing the diff.
    #[default]
    Diff,
    /// Commit selection popup.
    CommitFilter,
    /// Worktree picker popup.
    WorktreeSwitcher,
    /// Full-screen worktree list.
    WorktreeList,
    /// Key reference overlay.
    Help,
}

/// Navigation state of the diff view.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    /// Unified or side-by-side.
    pub layout: LayoutMode,
    /// First visible logical line of the content pane.
    pub scroll: usize,
    /// Index of the selected file among visible files.
    pub cursor: usize,
    /// Pane receiving keys.
    pub focus: Focus,
    /// Lines of context requested from git.
    pub context_lines: u32,
    /// Show files matched by the hidden filter.
    pub show_hidden: bool,
    /// Folder expansion overrides keyed by folder path.
    pub expanded: HashMap<String, bool>,
    /// Pending numeric prefix digits.
    pub count: String,
}

/// Cursor state for the popups.
#[derive(Debug, Clone, Default)]
pub struct PopupState {
    /// Highlighted row in the commit filter.
    pub commit_cursor: usize,
    /// Selection flags when the commit filter opened.
    pub commit_snapshot: Vec<bool>,
    /// Highlighted row in the worktree switcher and list.
    pub worktree_cursor: usize,
}

/// UI mode and message state.
#[derive(Debug, Default)]
pub struct UiState {
    /// Current mode.
    pub mode: Mode,
    /// Mode to return to when help closes.
    pub return_mode: Mode,
    /// Last fetch error.
    pub error: Option<String>,
    /// Dirty flag for redraw.
    pub dirty: bool,
    /// Spinner frame while loading.
    pub spinner: usize,
    /// Terminal width in cells.
    pub width: u16,
    /// Terminal height in rows.
    pub height: u16,
}
