//! Core primitives for gv (no TUI dependencies).

mod commits;
mod diff;
mod filter;
mod layout;
mod repo;
mod tree;
mod viewport;
mod worktree;

pub use commits::*;
pub use diff::*;
pub use filter::*;
pub use layout::*;
pub use repo::*;
pub use tree::*;
pub use viewport::*;
pub use worktree::*;
