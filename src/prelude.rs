//! Common re-exports for convenient importing.
//!
//! # Example
//!
//! ```rust,ignore
//! use gv::prelude::*;
//! ```

pub use crate::config::Config;
pub use crate::core::{
    compute_diff, list_commits, list_worktrees, parse_unified_diff, CommitEntry, DiffTarget,
    FileDiff, Hunk, LayoutMode, RepoError, RepoRoot, Worktree,
};
pub use crate::ui::{App, AppOptions};
