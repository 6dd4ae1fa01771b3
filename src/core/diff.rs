//! Structured unified-diff model and parser.

use std::io::{self, BufRead};
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

/// Error while reading a unified diff stream.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The underlying reader failed.
    #[error("failed to read diff stream: {0}")]
    Read(#[from] io::Error),
}

/// Kind of a single diff line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineKind {
    /// Unchanged line present on both sides.
    Context,
    /// Line only present in the new version.
    Added,
    /// Line only present in the old version.
    Removed,
}

/// One line of a hunk with its resolved line numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    /// Line kind.
    pub kind: LineKind,
    /// Text without the leading marker.
    pub content: String,
    /// 1-based line number in the old file (Context and Removed).
    pub old_line: Option<u32>,
    /// 1-based line number in the new file (Context and Added).
    pub new_line: Option<u32>,
}

/// A contiguous block of changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    /// First old line covered by the hunk.
    pub old_start: u32,
    /// Number of old lines (defaults to 1 when omitted in the header).
    pub old_count: u32,
    /// First new line covered by the hunk.
    pub new_start: u32,
    /// Number of new lines (defaults to 1 when omitted in the header).
    pub new_count: u32,
    /// Lines in order.
    pub lines: Vec<DiffLine>,
}

impl Hunk {
    /// Create an empty hunk from header values.
    pub fn new(old_start: u32, old_count: u32, new_start: u32, new_count: u32) -> Self {
        Self {
            old_start,
            old_count,
            new_start,
            new_count,
            lines: Vec::new(),
        }
    }

    /// Append a line, numbering it from the lines already present.
    pub fn push(&mut self, kind: LineKind, content: impl Into<String>) {
        let old_line = matches!(kind, LineKind::Context | LineKind::Removed)
            .then(|| self.next_number(|l| l.old_line, self.old_start));
        let new_line = matches!(kind, LineKind::Context | LineKind::Added)
            .then(|| self.next_number(|l| l.new_line, self.new_start));

        self.lines.push(DiffLine {
            kind,
            content: content.into(),
            old_line,
            new_line,
        });
    }

    /// Next number on one side: one past the most recent line that carried it.
    fn next_number(&self, side: impl Fn(&DiffLine) -> Option<u32>, start: u32) -> u32 {
        self.lines
            .iter()
            .rev()
            .find_map(|l| side(l))
            .map_or(start, |n| n + 1)
    }

    /// Count lines of the given kind.
    pub fn count(&self, kind: LineKind) -> usize {
        self.lines.iter().filter(|l| l.kind == kind).count()
    }
}

/// All changes to one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    /// Path in the new version.
    pub path: String,
    /// Previous path, set only for renames.
    pub old_path: Option<String>,
    /// Number of added lines across all hunks.
    pub added: usize,
    /// Number of removed lines across all hunks.
    pub removed: usize,
    /// Hunks in order.
    pub hunks: Vec<Hunk>,
    /// Body hidden behind a placeholder row.
    pub collapsed: bool,
    /// Git reported a binary change.
    pub is_binary: bool,
}

impl FileDiff {
    /// Build a file diff, deriving the added/removed totals from the hunks.
    pub fn new(
        path: impl Into<String>,
        old_path: Option<String>,
        hunks: Vec<Hunk>,
        is_binary: bool,
    ) -> Self {
        let path = path.into();
        let old_path = old_path.filter(|old| *old != path);
        let added = hunks.iter().map(|h| h.count(LineKind::Added)).sum();
        let removed = hunks.iter().map(|h| h.count(LineKind::Removed)).sum();
        Self {
            path,
            old_path,
            added,
            removed,
            hunks,
            collapsed: false,
            is_binary,
        }
    }

    /// Total number of diff lines across all hunks.
    pub fn line_count(&self) -> usize {
        self.hunks.iter().map(|h| h.lines.len()).sum()
    }

    /// Header label: `old → new` for renames, the path otherwise.
    pub fn display_path(&self) -> String {
        match &self.old_path {
            Some(old) => format!("{} → {}", old, self.path),
            None => self.path.clone(),
        }
    }
}

/// Sum of added/removed lines over a set of files.
pub fn total_stats<'a>(diffs: impl IntoIterator<Item = &'a FileDiff>) -> (usize, usize) {
    diffs
        .into_iter()
        .fold((0, 0), |(a, r), d| (a + d.added, r + d.removed))
}

const METADATA_PREFIXES: &[&str] = &[
    "index ",
    "new file",
    "deleted file",
    "old mode",
    "new mode",
    "similarity",
    "dissimilarity",
    "rename from",
    "rename to",
    "copy from",
    "copy to",
];

fn hunk_header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^@@ -(\d+)(?:,(\d+))? \+(\d+)(?:,(\d+))? @@")
            .expect("hunk header regex should be valid")
    })
}

/// Parse a hunk header like `@@ -10,3 +12 @@ fn name`.
pub fn parse_hunk_header(line: &str) -> Option<Hunk> {
    let caps = hunk_header_re().captures(line)?;
    let num = |idx: usize, default: u32| -> Option<u32> {
        match caps.get(idx) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(default),
        }
    };
    Some(Hunk::new(num(1, 0)?, num(2, 1)?, num(3, 0)?, num(4, 1)?))
}

/// Parse a `diff --git a/old b/new` header into `(old, new)` paths.
pub fn parse_file_header(line: &str) -> Option<(String, String)> {
    let rest = line.strip_prefix("diff --git ")?;

    if rest.starts_with('"') {
        let first_end = find_closing_quote(rest)?;
        let old = unquote_path(&rest[..=first_end]);
        let remainder = rest.get(first_end + 2..)?;
        let new = if remainder.starts_with('"') {
            let second_end = find_closing_quote(remainder)?;
            unquote_path(&remainder[..=second_end])
        } else {
            remainder.to_string()
        };
        return Some((strip_side(&old, "a/"), strip_side(&new, "b/")));
    }

    if let Some(quote_idx) = rest.find(" \"b/") {
        let old = &rest[..quote_idx];
        let new = unquote_path(&rest[quote_idx + 1..]);
        return Some((strip_side(old, "a/"), strip_side(&new, "b/")));
    }

    // Unquoted paths may contain spaces; the last " b/" is the split point.
    let b_idx = rest.rfind(" b/")?;
    Some((
        strip_side(&rest[..b_idx], "a/"),
        strip_side(&rest[b_idx + 1..], "b/"),
    ))
}

fn strip_side(path: &str, prefix: &str) -> String {
    path.strip_prefix(prefix).unwrap_or(path).to_string()
}

fn find_closing_quote(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    if bytes.first() != Some(&b'"') {
        return None;
    }
    let mut i = 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return Some(i),
            _ => i += 1,
        }
    }
    None
}

fn unquote_path(s: &str) -> String {
    let Some(inner) = s
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    else {
        return s.to_string();
    };

    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('\\') => result.push('\\'),
            Some('"') => result.push('"'),
            Some(other) => {
                result.push('\\');
                result.push(other);
            }
            None => result.push('\\'),
        }
    }
    result
}

#[derive(Default)]
struct FileBuilder {
    path: String,
    old_path: String,
    is_binary: bool,
    hunks: Vec<Hunk>,
    hunk: Option<Hunk>,
}

impl FileBuilder {
    fn close_hunk(&mut self) {
        if let Some(hunk) = self.hunk.take() {
            self.hunks.push(hunk);
        }
    }

    fn finish(mut self) -> FileDiff {
        self.close_hunk();
        let file = FileDiff::new(self.path, Some(self.old_path), self.hunks, self.is_binary);
        debug_assert_eq!(
            file.added,
            file.hunks.iter().map(|h| h.count(LineKind::Added)).sum::<usize>()
        );
        file
    }
}

/// Parse unified diff text into per-file records.
///
/// Unrecognized lines are skipped; the only failure is a read error on the
/// underlying stream. Invalid UTF-8 is decoded lossily.
pub fn parse_unified_diff<R: BufRead>(mut reader: R) -> Result<Vec<FileDiff>, ParseError> {
    let mut files = Vec::new();
    let mut current: Option<FileBuilder> = None;
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let decoded = String::from_utf8_lossy(&buf);
        let line = decoded.trim_end_matches('\n').trim_end_matches('\r');

        if line.starts_with("diff --git ") {
            if let Some((old_path, path)) = parse_file_header(line) {
                if let Some(done) = current.take() {
                    files.push(done.finish());
                }
                current = Some(FileBuilder {
                    path,
                    old_path,
                    ..FileBuilder::default()
                });
                continue;
            }
        }

        let Some(file) = current.as_mut() else {
            continue;
        };

        if line.starts_with("Binary files") {
            file.close_hunk();
            file.is_binary = true;
            continue;
        }

        if line.starts_with("@@") {
            if let Some(hunk) = parse_hunk_header(line) {
                file.close_hunk();
                if !file.is_binary {
                    file.hunk = Some(hunk);
                }
                continue;
            }
        }

        let Some(hunk) = file.hunk.as_mut() else {
            // Header region: `---`, `+++`, index, mode and rename lines.
            continue;
        };

        match line.as_bytes().first() {
            Some(b'+') => hunk.push(LineKind::Added, &line[1..]),
            Some(b'-') => hunk.push(LineKind::Removed, &line[1..]),
            Some(b' ') => hunk.push(LineKind::Context, &line[1..]),
            Some(b'\\') => {}
            _ if METADATA_PREFIXES.iter().any(|p| line.starts_with(p)) => {}
            _ => hunk.push(LineKind::Context, line),
        }
    }

    if let Some(done) = current {
        files.push(done.finish());
    }

    Ok(files)
}

/// Parse diff text already held in memory.
pub fn parse_unified_diff_str(text: &str) -> Vec<FileDiff> {
    // Reading from a byte slice cannot fail.
    parse_unified_diff(text.as_bytes()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_counts_match(file: &FileDiff) {
        let added: usize = file.hunks.iter().map(|h| h.count(LineKind::Added)).sum();
        let removed: usize = file.hunks.iter().map(|h| h.count(LineKind::Removed)).sum();
        assert_eq!(file.added, added, "added mismatch for {}", file.path);
        assert_eq!(file.removed, removed, "removed mismatch for {}", file.path);
    }

    #[test]
    fn hunk_header_with_counts() {
        let hunk = parse_hunk_header("@@ -10,3 +12,2 @@ fn main() {").unwrap();
        assert_eq!(
            (hunk.old_start, hunk.old_count, hunk.new_start, hunk.new_count),
            (10, 3, 12, 2)
        );
    }

    #[test]
    fn hunk_header_missing_counts_default_to_one() {
        let hunk = parse_hunk_header("@@ -7 +9 @@").unwrap();
        assert_eq!(
            (hunk.old_start, hunk.old_count, hunk.new_start, hunk.new_count),
            (7, 1, 9, 1)
        );
    }

    #[test]
    fn hunk_header_rejects_garbage() {
        assert!(parse_hunk_header("@@ nope @@").is_none());
    }

    #[test]
    fn line_numbers_advance_by_kind() {
        let diff = "diff --git a/f.txt b/f.txt\n\
index 1..2 100644\n\
--- a/f.txt\n\
+++ b/f.txt\n\
@@ -10,3 +10,2 @@\n\
 keep\n\
-gone\n\
-also gone\n\
+new\n\
 tail\n";
        let files = parse_unified_diff_str(diff);
        assert_eq!(files.len(), 1);
        let lines = &files[0].hunks[0].lines;

        assert_eq!(lines[0].kind, LineKind::Context);
        assert_eq!((lines[0].old_line, lines[0].new_line), (Some(10), Some(10)));
        assert_eq!((lines[1].old_line, lines[1].new_line), (Some(11), None));
        assert_eq!((lines[2].old_line, lines[2].new_line), (Some(12), None));
        assert_eq!((lines[3].old_line, lines[3].new_line), (None, Some(11)));
        assert_eq!((lines[4].old_line, lines[4].new_line), (Some(13), Some(12)));
        assert_counts_match(&files[0]);
        assert_eq!((files[0].added, files[0].removed), (1, 2));
    }

    #[test]
    fn added_first_then_removed_numbers_correctly() {
        let mut hunk = Hunk::new(5, 1, 5, 2);
        hunk.push(LineKind::Added, "a");
        hunk.push(LineKind::Added, "b");
        hunk.push(LineKind::Removed, "c");
        hunk.push(LineKind::Context, "d");
        assert_eq!(hunk.lines[2].old_line, Some(5));
        assert_eq!(hunk.lines[3].old_line, Some(6));
        assert_eq!(hunk.lines[3].new_line, Some(7));
    }

    #[test]
    fn rename_sets_old_path() {
        let diff = "diff --git a/old/name.rs b/new/name.rs\n\
similarity index 90%\n\
rename from old/name.rs\n\
rename to new/name.rs\n\
@@ -1 +1 @@\n\
-a\n\
+b\n";
        let files = parse_unified_diff_str(diff);
        assert_eq!(files[0].path, "new/name.rs");
        assert_eq!(files[0].old_path.as_deref(), Some("old/name.rs"));
        assert_eq!(files[0].display_path(), "old/name.rs → new/name.rs");
    }

    #[test]
    fn same_paths_clear_old_path() {
        let diff = "diff --git a/x b/x\n@@ -1 +1 @@\n-a\n+b\n";
        let files = parse_unified_diff_str(diff);
        assert_eq!(files[0].old_path, None);
    }

    #[test]
    fn binary_file_has_no_hunks() {
        let diff = "diff --git a/img.png b/img.png\n\
index 1..2 100644\n\
Binary files a/img.png and b/img.png differ\n\
diff --git a/t.txt b/t.txt\n\
@@ -1 +1 @@\n\
-x\n\
+y\n";
        let files = parse_unified_diff_str(diff);
        assert_eq!(files.len(), 2);
        assert!(files[0].is_binary);
        assert!(files[0].hunks.is_empty());
        assert!(!files[1].is_binary);
        assert_eq!(files[1].added, 1);
    }

    #[test]
    fn no_newline_marker_is_ignored() {
        let diff = "diff --git a/f b/f\n@@ -1 +1 @@\n-a\n\\ No newline at end of file\n+b\n\\ No newline at end of file\n";
        let files = parse_unified_diff_str(diff);
        let lines = &files[0].hunks[0].lines;
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].new_line, Some(1));
    }

    #[test]
    fn unknown_line_inside_hunk_is_context() {
        let diff = "diff --git a/f b/f\n@@ -1,2 +1,2 @@\nbare\n-a\n+b\n";
        let files = parse_unified_diff_str(diff);
        let first = &files[0].hunks[0].lines[0];
        assert_eq!(first.kind, LineKind::Context);
        assert_eq!(first.content, "bare");
        assert_eq!(files[0].hunks[0].lines[1].old_line, Some(2));
    }

    #[test]
    fn removed_line_starting_with_dashes_is_content() {
        let diff = "diff --git a/q.sql b/q.sql\n--- a/q.sql\n+++ b/q.sql\n@@ -1 +1 @@\n--- comment\n+++ counter\n";
        let files = parse_unified_diff_str(diff);
        let lines = &files[0].hunks[0].lines;
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].kind, LineKind::Removed);
        assert_eq!(lines[0].content, "-- comment");
        assert_eq!(lines[1].content, "++ counter");
    }

    #[test]
    fn content_mentioning_diff_git_does_not_split() {
        let diff = "diff --git a/test.md b/test.md\n\
@@ -1,2 +1,3 @@\n\
 # Example\n\
+This line shows: diff --git a/fake b/fake\n\
 End\n";
        let files = parse_unified_diff_str(diff);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].added, 1);
    }

    #[test]
    fn quoted_paths_are_unquoted() {
        let diff = "diff --git \"a/path with spaces.txt\" \"b/path with spaces.txt\"\n\
new file mode 100644\n\
--- /dev/null\n\
+++ \"b/path with spaces.txt\"\n\
@@ -0,0 +1 @@\n\
+content\n";
        let files = parse_unified_diff_str(diff);
        assert_eq!(files[0].path, "path with spaces.txt");
        assert_eq!(files[0].hunks[0].lines[0].new_line, Some(1));
    }

    #[test]
    fn unquote_escapes() {
        assert_eq!(unquote_path(r#""simple""#), "simple");
        assert_eq!(unquote_path(r#""with\\backslash""#), "with\\backslash");
        assert_eq!(unquote_path(r#""with\ttab""#), "with\ttab");
        assert_eq!(unquote_path(r#""with\"quote""#), "with\"quote");
        assert_eq!(unquote_path("unquoted"), "unquoted");
    }

    #[test]
    fn lines_before_first_header_are_skipped() {
        let diff = "warning: something\n+stray\ndiff --git a/f b/f\n@@ -1 +1 @@\n+x\n";
        let files = parse_unified_diff_str(diff);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].added, 1);
    }

    #[test]
    fn read_failure_is_reported() {
        struct Broken;
        impl io::Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::Other, "boom"))
            }
        }
        let result = parse_unified_diff(io::BufReader::new(Broken));
        assert!(matches!(result, Err(ParseError::Read(_))));
    }

    #[test]
    fn crlf_is_trimmed() {
        let diff = "diff --git a/f b/f\r\n@@ -1 +1 @@\r\n-a\r\n+b\r\n";
        let files = parse_unified_diff_str(diff);
        assert_eq!(files[0].hunks[0].lines[1].content, "b");
    }

    #[test]
    fn total_stats_sums_files() {
        let diff = "diff --git a/a b/a\n@@ -1 +1,2 @@\n-x\n+y\n+z\ndiff --git a/b b/b\n@@ -1 +0,0 @@\n-q\n";
        let files = parse_unified_diff_str(diff);
        assert_eq!(total_stats(&files), (2, 2));
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        fn body_line() -> impl Strategy<Value = String> {
            prop_oneof![
                "[a-z ]{0,12}".prop_map(|s| format!("+{}", s)),
                "[a-z ]{0,12}".prop_map(|s| format!("-{}", s)),
                "[a-z ]{0,12}".prop_map(|s| format!(" {}", s)),
                Just("\\ No newline at end of file".to_string()),
            ]
        }

        proptest! {
            #[test]
            fn counts_always_match_lines(
                hunks in prop::collection::vec(prop::collection::vec(body_line(), 0..20), 1..5)
            ) {
                let mut text = String::from("diff --git a/p.txt b/p.txt\n--- a/p.txt\n+++ b/p.txt\n");
                for (i, body) in hunks.iter().enumerate() {
                    text.push_str(&format!("@@ -{},3 +{},3 @@\n", i * 10 + 1, i * 10 + 1));
                    for line in body {
                        text.push_str(line);
                        text.push('\n');
                    }
                }
                let files = parse_unified_diff_str(&text);
                prop_assert_eq!(files.len(), 1);
                let file = &files[0];
                let added: usize = file.hunks.iter().map(|h| h.count(LineKind::Added)).sum();
                let removed: usize = file.hunks.iter().map(|h| h.count(LineKind::Removed)).sum();
                prop_assert_eq!(file.added, added);
                prop_assert_eq!(file.removed, removed);
            }
        }
    }
}
