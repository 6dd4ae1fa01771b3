//! gv - a read-only terminal viewer for changes across git worktrees.
//!
//! Pick a base branch, choose which commits and uncommitted changes to
//! include, and scroll a syntax-highlighted diff in unified or side-by-side
//! layout.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use gv::prelude::*;
//!
//! let repo = RepoRoot::discover(std::path::Path::new("."))?;
//! let worktrees = list_worktrees(&repo)?;
//! let commits = list_commits(&worktrees[0].path, "main");
//! ```

#![deny(missing_docs)]

pub mod config;
pub mod core;
pub mod highlight;
pub mod logging;
pub mod metrics;
pub mod prelude;
pub mod theme;
pub mod ui;
