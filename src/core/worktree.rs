//! Worktree discovery via `git worktree list --porcelain`.

use std::path::{Path, PathBuf};

use super::repo::{git_stdout, RepoError, RepoRoot};

/// A checked-out working directory of the repository.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Worktree {
    /// Absolute path of the worktree.
    pub path: PathBuf,
    /// Short branch name, `(detached)`, or empty when unknown.
    pub branch: String,
    /// Commit the worktree's HEAD points at.
    pub head: String,
    /// True for the bare repository entry.
    pub is_bare: bool,
}

impl Worktree {
    /// Branch name for display, falling back to `HEAD`.
    pub fn display_branch(&self) -> &str {
        if self.branch.is_empty() {
            "HEAD"
        } else {
            &self.branch
        }
    }

    /// Abbreviated HEAD hash.
    pub fn short_head(&self) -> &str {
        self.head.get(..7).unwrap_or(&self.head)
    }
}

/// List every worktree attached to the repository at `root`.
pub fn list_worktrees(root: &RepoRoot) -> Result<Vec<Worktree>, RepoError> {
    let output = git_stdout(root.path(), ["worktree", "list", "--porcelain"])?;
    Ok(parse_worktree_list(&output))
}

/// Parse `git worktree list --porcelain` output.
pub fn parse_worktree_list(output: &str) -> Vec<Worktree> {
    let mut worktrees = Vec::new();
    let mut current: Option<Worktree> = None;

    for line in output.lines() {
        if line.is_empty() {
            if let Some(wt) = current.take() {
                worktrees.push(wt);
            }
            continue;
        }

        if let Some(path) = line.strip_prefix("worktree ") {
            if let Some(wt) = current.take() {
                worktrees.push(wt);
            }
            current = Some(Worktree {
                path: PathBuf::from(path),
                ..Worktree::default()
            });
            continue;
        }

        let Some(wt) = current.as_mut() else {
            continue;
        };

        if let Some(head) = line.strip_prefix("HEAD ") {
            wt.head = head.to_string();
        } else if let Some(branch) = line.strip_prefix("branch ") {
            wt.branch = branch
                .strip_prefix("refs/heads/")
                .unwrap_or(branch)
                .to_string();
        } else if line == "bare" {
            wt.is_bare = true;
        } else if line == "detached" {
            wt.branch = "(detached)".to_string();
        }
    }

    if let Some(wt) = current {
        worktrees.push(wt);
    }

    worktrees
}

/// Index of the worktree containing `path`.
///
/// The most specific (longest) worktree path wins so nested worktrees resolve
/// correctly. Matching is per path component, so `/app` never claims
/// `/app-feature`. Returns 0 when nothing matches.
pub fn find_current_worktree(worktrees: &[Worktree], path: &Path) -> usize {
    worktrees
        .iter()
        .enumerate()
        .filter(|(_, wt)| path.starts_with(&wt.path))
        .max_by_key(|(_, wt)| wt.path.components().count())
        .map(|(idx, _)| idx)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wt(path: &str) -> Worktree {
        Worktree {
            path: PathBuf::from(path),
            ..Worktree::default()
        }
    }

    #[test]
    fn parses_porcelain_records() {
        let output = "worktree /repo\nHEAD 1111111111111111111111111111111111111111\nbranch refs/heads/main\n\nworktree /repo-feature\nHEAD 2222222222222222222222222222222222222222\ndetached\n\nworktree /repo.git\nbare\n";
        let list = parse_worktree_list(output);

        assert_eq!(list.len(), 3);
        assert_eq!(list[0].path, PathBuf::from("/repo"));
        assert_eq!(list[0].branch, "main");
        assert_eq!(list[0].short_head(), "1111111");
        assert_eq!(list[1].branch, "(detached)");
        assert!(list[2].is_bare);
        assert_eq!(list[2].display_branch(), "HEAD");
    }

    #[test]
    fn parses_without_trailing_blank_line() {
        let list = parse_worktree_list("worktree /only\nbranch refs/heads/dev");
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].branch, "dev");
    }

    #[test]
    fn exact_matches() {
        let list = [wt("/app"), wt("/app-feature")];
        assert_eq!(find_current_worktree(&list, Path::new("/app")), 0);
        assert_eq!(find_current_worktree(&list, Path::new("/app-feature")), 1);
    }

    #[test]
    fn subdirectory_match() {
        let list = [wt("/app"), wt("/app-feature")];
        assert_eq!(
            find_current_worktree(&list, Path::new("/app-feature/src/lib")),
            1
        );
    }

    #[test]
    fn no_false_prefix_match() {
        let list = [wt("/app"), wt("/app-feature")];
        assert_eq!(
            find_current_worktree(&list, Path::new("/app-feature-two")),
            0
        );
    }

    #[test]
    fn nested_worktrees_select_most_specific() {
        let list = [wt("/workspace/main"), wt("/workspace/main/features/auth")];
        assert_eq!(
            find_current_worktree(&list, Path::new("/workspace/main/features/auth/src")),
            1
        );
    }
}
