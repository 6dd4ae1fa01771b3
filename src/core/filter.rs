//! Basename filter for generated files such as lockfiles.

use std::collections::HashSet;

use super::diff::FileDiff;

/// Basenames hidden unless the user asks to see them.
pub const DEFAULT_HIDDEN_FILES: &[&str] = &[
    "go.sum",
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "Cargo.lock",
    "Gemfile.lock",
    "poetry.lock",
    "composer.lock",
    ".pnp.cjs",
    ".pnp.loader.mjs",
];

/// Set of basenames whose diffs are hidden by default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HiddenFilter {
    names: HashSet<String>,
}

impl Default for HiddenFilter {
    fn default() -> Self {
        Self::new(DEFAULT_HIDDEN_FILES.iter().copied())
    }
}

impl HiddenFilter {
    /// Build a filter from basenames.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// True if the file's basename is in the set.
    pub fn is_hidden(&self, path: &str) -> bool {
        let name = path.rsplit('/').next().unwrap_or(path);
        self.names.contains(name)
    }

    /// Indices of diffs to display.
    pub fn visible_indices(&self, diffs: &[FileDiff], show_hidden: bool) -> Vec<usize> {
        diffs
            .iter()
            .enumerate()
            .filter(|(_, d)| show_hidden || !self.is_hidden(&d.path))
            .map(|(i, _)| i)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diff(path: &str) -> FileDiff {
        FileDiff::new(path, None, Vec::new(), false)
    }

    #[test]
    fn default_hides_lockfiles_by_basename() {
        let filter = HiddenFilter::default();
        assert!(filter.is_hidden("Cargo.lock"));
        assert!(filter.is_hidden("web/package-lock.json"));
        assert!(!filter.is_hidden("src/Cargo.lock.rs"));
        assert!(!filter.is_hidden("go.sum/readme.md"));
    }

    #[test]
    fn visible_indices_respect_show_hidden() {
        let diffs = [diff("src/lib.rs"), diff("Cargo.lock"), diff("README.md")];
        let filter = HiddenFilter::default();
        assert_eq!(filter.visible_indices(&diffs, false), vec![0, 2]);
        assert_eq!(filter.visible_indices(&diffs, true), vec![0, 1, 2]);
    }

    #[test]
    fn custom_set_replaces_defaults() {
        let filter = HiddenFilter::new(["schema.graphql"]);
        assert!(filter.is_hidden("api/schema.graphql"));
        assert!(!filter.is_hidden("Cargo.lock"));
    }
}
