//! Git repository discovery and command execution.

use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use thiserror::Error;
use tracing::debug;

/// Errors from repository operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RepoError {
    /// Path is not inside a git repository.
    #[error("not inside a git repository")]
    NotARepo,
    /// The `git` executable could not be started.
    #[error("git executable not found on PATH")]
    GitNotFound,
    /// Git command failed with an error message.
    #[error("git command failed: {0}")]
    GitError(String),
    /// I/O error during git operation.
    #[error("io error: {0}")]
    Io(#[source] io::Error),
    /// Git output contained invalid UTF-8.
    #[error("invalid utf-8 in git output")]
    InvalidUtf8,
}

impl From<io::Error> for RepoError {
    fn from(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::NotFound {
            Self::GitNotFound
        } else {
            Self::Io(err)
        }
    }
}

/// Canonicalized path to a git working tree root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoRoot(PathBuf);

impl RepoRoot {
    /// Discover the git working tree containing the given path.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use gv::core::RepoRoot;
    /// use std::path::Path;
    ///
    /// let repo = RepoRoot::discover(Path::new(".")).expect("not in a git repo");
    /// println!("Repo at: {}", repo.path().display());
    /// ```
    #[must_use = "this returns a Result that should be checked"]
    pub fn discover(path: &Path) -> Result<Self, RepoError> {
        let output = git_command(path, ["rev-parse", "--show-toplevel"])?;

        if !output.status.success() {
            return Err(RepoError::NotARepo);
        }

        let root = std::str::from_utf8(&output.stdout)
            .map_err(|_| RepoError::InvalidUtf8)?
            .trim();

        let canonical = PathBuf::from(root)
            .canonicalize()
            .map_err(|_| RepoError::NotARepo)?;

        Ok(Self(canonical))
    }

    /// Wrap an already-known worktree path without running git.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// Get the repository root path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.0
    }
}

fn git_command<I, S>(dir: &Path, args: I) -> Result<Output, RepoError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut command = Command::new("git");
    command.args(args).current_dir(dir);
    debug!(dir = %dir.display(), command = ?command, "running git");
    Ok(command.output()?)
}

/// Run git in `dir` and return raw stdout, failing on a non-zero exit.
pub(crate) fn git_bytes<I, S>(dir: &Path, args: I) -> Result<Vec<u8>, RepoError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let output = git_command(dir, args)?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(RepoError::GitError(stderr));
    }
    Ok(output.stdout)
}

/// Run git in `dir` and return stdout as UTF-8.
pub(crate) fn git_stdout<I, S>(dir: &Path, args: I) -> Result<String, RepoError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let bytes = git_bytes(dir, args)?;
    String::from_utf8(bytes).map_err(|_| RepoError::InvalidUtf8)
}

/// Run git in `dir` and report only whether it exited successfully.
pub(crate) fn git_succeeds<I, S>(dir: &Path, args: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    git_command(dir, args)
        .map(|output| output.status.success())
        .unwrap_or(false)
}
