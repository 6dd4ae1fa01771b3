//! Folder tree projected from the visible file diffs.

use std::collections::HashMap;

use super::diff::FileDiff;

/// A node of the sidebar tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNode {
    /// A directory; stats cover every file below it.
    Folder {
        /// Last path segment.
        name: String,
        /// Full path from the repository root (empty for the root).
        path: String,
        /// Children in first-seen order.
        children: Vec<TreeNode>,
        /// Whether children are shown.
        expanded: bool,
        /// Added lines across all descendant files.
        added: usize,
        /// Removed lines across all descendant files.
        removed: usize,
    },
    /// A changed file.
    File {
        /// Basename.
        name: String,
        /// Full path.
        path: String,
        /// Index into the visible diff sequence.
        index: usize,
        /// Added lines.
        added: usize,
        /// Removed lines.
        removed: usize,
    },
}

impl TreeNode {
    fn folder(name: &str, path: String, expanded: bool) -> Self {
        Self::Folder {
            name: name.to_string(),
            path,
            children: Vec::new(),
            expanded,
            added: 0,
            removed: 0,
        }
    }

    /// Display name of the node.
    pub fn name(&self) -> &str {
        match self {
            Self::Folder { name, .. } | Self::File { name, .. } => name,
        }
    }

    /// Full path of the node.
    pub fn path(&self) -> &str {
        match self {
            Self::Folder { path, .. } | Self::File { path, .. } => path,
        }
    }

    /// `(added, removed)` for the node.
    pub fn stats(&self) -> (usize, usize) {
        match self {
            Self::Folder { added, removed, .. } | Self::File { added, removed, .. } => {
                (*added, *removed)
            }
        }
    }

    /// True for folders.
    pub fn is_folder(&self) -> bool {
        matches!(self, Self::Folder { .. })
    }

    /// Visible-diff index for files.
    pub fn file_index(&self) -> Option<usize> {
        match self {
            Self::File { index, .. } => Some(*index),
            Self::Folder { .. } => None,
        }
    }
}

/// Build the tree for the visible files.
///
/// Folders appear in the order their first file appears and default to
/// expanded unless `expanded` maps their path to `false`.
pub fn build_file_tree(visible: &[&FileDiff], expanded: &HashMap<String, bool>) -> TreeNode {
    let mut root = TreeNode::folder("", String::new(), true);

    for (index, diff) in visible.iter().enumerate() {
        let parts: Vec<&str> = diff.path.split('/').collect();
        let Some((file_name, dirs)) = parts.split_last() else {
            continue;
        };
        let file = TreeNode::File {
            name: file_name.to_string(),
            path: diff.path.clone(),
            index,
            added: diff.added,
            removed: diff.removed,
        };
        if let TreeNode::Folder { children, .. } = &mut root {
            insert(children, dirs, 0, file, expanded);
        }
    }

    if let TreeNode::Folder { added, removed, .. } = &mut root {
        let (a, r) = super::diff::total_stats(visible.iter().copied());
        *added = a;
        *removed = r;
    }

    root
}

fn insert(
    children: &mut Vec<TreeNode>,
    dirs: &[&str],
    depth: usize,
    file: TreeNode,
    expanded: &HashMap<String, bool>,
) {
    let Some(dir) = dirs.get(depth) else {
        children.push(file);
        return;
    };

    let pos = match children
        .iter()
        .position(|c| c.is_folder() && c.name() == *dir)
    {
        Some(pos) => pos,
        None => {
            let path = dirs[..=depth].join("/");
            let is_expanded = expanded.get(&path).copied().unwrap_or(true);
            children.push(TreeNode::folder(dir, path, is_expanded));
            children.len() - 1
        }
    };

    let (file_added, file_removed) = file.stats();
    if let TreeNode::Folder {
        children,
        added,
        removed,
        ..
    } = &mut children[pos]
    {
        *added += file_added;
        *removed += file_removed;
        insert(children, dirs, depth + 1, file, expanded);
    }
}

/// Pre-order rows for the sidebar with their depth.
///
/// The root is not emitted; collapsed folders hide their descendants.
pub fn flatten(root: &TreeNode) -> Vec<(&TreeNode, usize)> {
    fn walk<'a>(node: &'a TreeNode, depth: usize, out: &mut Vec<(&'a TreeNode, usize)>) {
        if let TreeNode::Folder { children, .. } = node {
            for child in children {
                out.push((child, depth));
                if let TreeNode::Folder { expanded: true, .. } = child {
                    walk(child, depth + 1, out);
                }
            }
        }
    }

    let mut rows = Vec::new();
    walk(root, 0, &mut rows);
    rows
}

/// Short unambiguous labels for each path.
///
/// Unique basenames are shown bare; colliding ones grow leading segments
/// until no other path in the group ends with the same suffix.
pub fn display_names<'a>(paths: impl IntoIterator<Item = &'a str>) -> HashMap<String, String> {
    let paths: Vec<&str> = paths.into_iter().collect();
    let mut groups: HashMap<&str, Vec<&str>> = HashMap::new();
    for path in &paths {
        groups.entry(basename(path)).or_default().push(path);
    }

    paths
        .iter()
        .map(|path| {
            let group = &groups[basename(path)];
            let label = if group.len() == 1 {
                basename(path).to_string()
            } else {
                shortest_unique_suffix(path, group)
            };
            (path.to_string(), label)
        })
        .collect()
}

fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn shortest_unique_suffix(path: &str, group: &[&str]) -> String {
    let parts: Vec<&str> = path.split('/').collect();
    for start in (0..parts.len()).rev() {
        let suffix = parts[start..].join("/");
        let clashes = group
            .iter()
            .filter(|other| **other != path)
            .any(|other| ends_with_segments(other, &suffix));
        if !clashes {
            return suffix;
        }
    }
    path.to_string()
}

fn ends_with_segments(path: &str, suffix: &str) -> bool {
    path == suffix
        || path
            .strip_suffix(suffix)
            .is_some_and(|head| head.ends_with('/'))
}
