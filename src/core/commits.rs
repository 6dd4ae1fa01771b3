//! Commit selection and diff computation for a worktree.

use std::path::Path;

use tracing::debug;

use super::diff::{parse_unified_diff, FileDiff};
use super::repo::{git_bytes, git_stdout, git_succeeds, RepoError};

/// Label shown for the synthetic working-tree entry.
pub const UNCOMMITTED_LABEL: &str = "(uncommitted changes)";

/// What a commit-list row refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitKind {
    /// A real commit on the branch.
    Real {
        /// Full object id.
        hash: String,
        /// First line of the message.
        subject: String,
        /// Author name.
        author: String,
    },
    /// Staged and unstaged changes in the working tree.
    UncommittedChanges,
}

/// A selectable row in the commit filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitEntry {
    /// The commit or working-tree marker.
    pub kind: CommitKind,
    /// Included in the diff.
    pub selected: bool,
}

impl CommitEntry {
    /// A selected real commit.
    pub fn real(
        hash: impl Into<String>,
        subject: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            kind: CommitKind::Real {
                hash: hash.into(),
                subject: subject.into(),
                author: author.into(),
            },
            selected: true,
        }
    }

    /// The selected uncommitted-changes entry.
    pub fn uncommitted() -> Self {
        Self {
            kind: CommitKind::UncommittedChanges,
            selected: true,
        }
    }

    /// True for the working-tree entry.
    pub fn is_uncommitted(&self) -> bool {
        matches!(self.kind, CommitKind::UncommittedChanges)
    }

    /// Abbreviated hash, or `""` for the working-tree entry.
    pub fn short_hash(&self) -> &str {
        match &self.kind {
            CommitKind::Real { hash, .. } => hash.get(..7).unwrap_or(hash),
            CommitKind::UncommittedChanges => "",
        }
    }

    /// Subject line for display.
    pub fn subject(&self) -> &str {
        match &self.kind {
            CommitKind::Real { subject, .. } => subject,
            CommitKind::UncommittedChanges => UNCOMMITTED_LABEL,
        }
    }
}

/// Which `git diff` invocation a commit selection maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffTarget {
    /// Nothing selected; no diff is computed.
    None,
    /// Working tree against HEAD.
    HeadToWorkingTree,
    /// Base branch against HEAD.
    BaseToHead,
    /// Base branch against the working tree.
    BaseToWorkingTree,
}

impl DiffTarget {
    /// Revision argument for `git diff`, or `None` when nothing is selected.
    pub fn revspec(self, base: &str) -> Option<String> {
        match self {
            Self::None => None,
            Self::HeadToWorkingTree => Some("HEAD".to_string()),
            Self::BaseToHead => Some(format!("{}..HEAD", base)),
            Self::BaseToWorkingTree => Some(base.to_string()),
        }
    }

    /// True when the revision argument names the base branch.
    pub fn uses_base(self) -> bool {
        matches!(self, Self::BaseToHead | Self::BaseToWorkingTree)
    }
}

/// Map a commit selection to a diff target.
///
/// Selection is coarse: any selected real commit means "the branch's
/// commits", regardless of which ones are unselected.
pub fn diff_target(entries: &[CommitEntry]) -> DiffTarget {
    let uncommitted = entries.iter().any(|e| e.selected && e.is_uncommitted());
    let commits = entries.iter().any(|e| e.selected && !e.is_uncommitted());
    match (uncommitted, commits) {
        (false, false) => DiffTarget::None,
        (true, false) => DiffTarget::HeadToWorkingTree,
        (false, true) => DiffTarget::BaseToHead,
        (true, true) => DiffTarget::BaseToWorkingTree,
    }
}

/// Number of selected real commits and the total number of real commits.
pub fn commit_counts(entries: &[CommitEntry]) -> (usize, usize) {
    entries
        .iter()
        .filter(|e| !e.is_uncommitted())
        .fold((0, 0), |(sel, total), e| {
            (sel + usize::from(e.selected), total + 1)
        })
}

/// True if `git status --porcelain` reports anything.
pub fn has_uncommitted_changes(repo: &Path) -> bool {
    git_stdout(repo, ["status", "--porcelain"])
        .map(|out| !out.trim().is_empty())
        .unwrap_or(false)
}

fn ref_exists(repo: &Path, name: &str) -> bool {
    let spec = format!("{}^{{commit}}", name);
    git_succeeds(repo, ["rev-parse", "--verify", "--quiet", spec.as_str()])
}

/// Resolve `name` locally, then as `origin/<name>`.
pub fn resolve_ref(repo: &Path, name: &str) -> Option<String> {
    if name.is_empty() {
        return None;
    }
    if ref_exists(repo, name) {
        return Some(name.to_string());
    }
    let remote = format!("origin/{}", name);
    ref_exists(repo, &remote).then_some(remote)
}

/// Commits in `range`, newest first, in topological order.
pub fn log_commits(repo: &Path, range: &str) -> Result<Vec<CommitEntry>, RepoError> {
    let output = git_stdout(
        repo,
        ["log", "--topo-order", "--format=%H%x00%s%x00%an", range],
    )?;
    Ok(parse_log_output(&output))
}

/// Parse `%H%x00%s%x00%an` records, dropping duplicate hashes.
pub fn parse_log_output(output: &str) -> Vec<CommitEntry> {
    let mut seen = std::collections::HashSet::new();
    output
        .lines()
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let mut parts = line.splitn(3, '\0');
            let hash = parts.next()?;
            let subject = parts.next()?;
            let author = parts.next().unwrap_or("");
            seen.insert(hash.to_string())
                .then(|| CommitEntry::real(hash, subject, author))
        })
        .collect()
}

/// Build the commit list for a worktree against `base`.
///
/// A missing base or a failing log is not an error: the list then holds
/// at most the uncommitted entry.
pub fn list_commits(repo: &Path, base: &str) -> Vec<CommitEntry> {
    let mut entries = Vec::new();
    if has_uncommitted_changes(repo) {
        entries.push(CommitEntry::uncommitted());
    }

    let Some(base_ref) = resolve_ref(repo, base) else {
        debug!(base, "base ref not found; listing uncommitted only");
        return entries;
    };

    match log_commits(repo, &format!("{}..HEAD", base_ref)) {
        Ok(commits) => entries.extend(commits),
        Err(err) => debug!(error = %err, "git log failed; listing uncommitted only"),
    }
    entries
}

/// Guess the repository's main branch.
pub fn detect_main_branch(repo: &Path) -> String {
    if let Ok(out) = git_stdout(repo, ["symbolic-ref", "refs/remotes/origin/HEAD"]) {
        if let Some(name) = out.trim().strip_prefix("refs/remotes/origin/") {
            if !name.is_empty() {
                return name.to_string();
            }
        }
    }

    ["main", "master"]
        .into_iter()
        .find(|name| ref_exists(repo, name))
        .unwrap_or("main")
        .to_string()
}

/// Raw `git diff` output in the plain format the parser expects.
///
/// User config such as `color.ui`, `diff.noprefix`, `diff.mnemonicPrefix`
/// or an external diff driver must not leak into the output.
fn git_diff(repo: &Path, context_lines: u32, revspec: &str) -> Result<Vec<u8>, RepoError> {
    let context = format!("-U{}", context_lines);
    git_bytes(
        repo,
        [
            "diff",
            "--no-color",
            "--no-ext-diff",
            "--src-prefix=a/",
            "--dst-prefix=b/",
            context.as_str(),
            revspec,
        ],
    )
}

/// Run `git diff` for the selection and parse the result.
///
/// When the base branch only exists on the remote, the command is retried
/// once with `origin/<base>`.
pub fn compute_diff(
    repo: &Path,
    base: &str,
    entries: &[CommitEntry],
    context_lines: u32,
) -> Result<Vec<FileDiff>, RepoError> {
    let target = diff_target(entries);
    let Some(revspec) = target.revspec(base) else {
        return Ok(Vec::new());
    };

    let output = match git_diff(repo, context_lines, &revspec) {
        Ok(out) => out,
        Err(RepoError::GitError(msg)) if target.uses_base() => {
            debug!(error = %msg, "diff against base failed; retrying with origin");
            let remote = format!("origin/{}", base);
            let Some(retry) = target.revspec(&remote) else {
                return Err(RepoError::GitError(msg));
            };
            git_diff(repo, context_lines, &retry)?
        }
        Err(err) => return Err(err),
    };

    let _timer = crate::metrics::Timer::start("parse_diff");
    parse_unified_diff(output.as_slice()).map_err(|err| RepoError::GitError(err.to_string()))
}
