//! Syntax highlighting using Tree-sitter.
//!
//! Diff lines are tokenized one hunk at a time: the hunk's lines are joined,
//! highlighted as a single source, and split back into per-line spans.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

use parking_lot::Mutex;
use tracing::warn;
use tree_sitter_highlight::{HighlightConfiguration, HighlightEvent, Highlighter as TsHighlighter};

use crate::core::Hunk;

/// Language identifier for syntax highlighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LanguageId {
    /// Rust source files.
    #[cfg(feature = "lang-rust")]
    Rust,
    /// TypeScript source files.
    #[cfg(feature = "lang-typescript")]
    TypeScript,
    /// TypeScript with JSX.
    #[cfg(feature = "lang-typescript")]
    TypeScriptReact,
    /// JavaScript source files.
    #[cfg(feature = "lang-typescript")]
    JavaScript,
    /// JavaScript with JSX.
    #[cfg(feature = "lang-typescript")]
    JavaScriptReact,
    /// Go source files.
    #[cfg(feature = "lang-go")]
    Go,
    /// Python source files.
    #[cfg(feature = "lang-python")]
    Python,
    /// JSON files.
    #[cfg(feature = "lang-json")]
    Json,
    /// YAML files.
    #[cfg(feature = "lang-yaml")]
    Yaml,
    /// Bash/shell scripts.
    #[cfg(feature = "lang-bash")]
    Bash,
    /// Plain text (no highlighting).
    Plain,
}

impl LanguageId {
    /// Detect language from file extension.
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            #[cfg(feature = "lang-rust")]
            "rs" => Self::Rust,
            #[cfg(feature = "lang-typescript")]
            "ts" | "mts" | "cts" => Self::TypeScript,
            #[cfg(feature = "lang-typescript")]
            "tsx" => Self::TypeScriptReact,
            #[cfg(feature = "lang-typescript")]
            "js" | "mjs" | "cjs" => Self::JavaScript,
            #[cfg(feature = "lang-typescript")]
            "jsx" => Self::JavaScriptReact,
            #[cfg(feature = "lang-go")]
            "go" => Self::Go,
            #[cfg(feature = "lang-python")]
            "py" | "pyi" => Self::Python,
            #[cfg(feature = "lang-json")]
            "json" => Self::Json,
            #[cfg(feature = "lang-yaml")]
            "yaml" | "yml" => Self::Yaml,
            #[cfg(feature = "lang-bash")]
            "sh" | "bash" | "zsh" => Self::Bash,
            _ => Self::Plain,
        }
    }

    /// Detect language from a repository-relative path.
    pub fn from_path(path: &str) -> Self {
        Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(Self::Plain, Self::from_extension)
    }
}

/// A styled byte range within one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledSpan {
    /// Byte start offset in the line.
    pub start: usize,
    /// Byte end offset in the line.
    pub end: usize,
    /// Style identifier (maps to a theme color).
    pub style_id: StyleId,
}

/// Style identifiers for highlighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StyleId {
    /// Default/unstyled text.
    #[default]
    Default,
    /// Language keywords.
    Keyword,
    /// Type names.
    Type,
    /// Function names.
    Function,
    /// String literals.
    String,
    /// Numeric literals.
    Number,
    /// Comments.
    Comment,
    /// Operators.
    Operator,
    /// Punctuation.
    Punctuation,
    /// Variable names.
    Variable,
    /// Constants.
    Constant,
    /// Property access.
    Property,
    /// Attributes/decorators.
    Attribute,
}

const HIGHLIGHT_NAMES: &[&str] = &[
    "attribute",
    "comment",
    "constant",
    "constant.builtin",
    "constructor",
    "function",
    "function.builtin",
    "function.method",
    "keyword",
    "number",
    "operator",
    "property",
    "punctuation",
    "punctuation.bracket",
    "punctuation.delimiter",
    "string",
    "type",
    "type.builtin",
    "variable",
    "variable.builtin",
    "variable.parameter",
];

fn highlight_name_to_style(name: &str) -> StyleId {
    match name {
        "keyword" => StyleId::Keyword,
        "type" | "type.builtin" => StyleId::Type,
        "function" | "function.builtin" | "function.method" | "constructor" => StyleId::Function,
        "string" => StyleId::String,
        "number" => StyleId::Number,
        "comment" => StyleId::Comment,
        "operator" => StyleId::Operator,
        "punctuation" | "punctuation.bracket" | "punctuation.delimiter" => StyleId::Punctuation,
        "variable" | "variable.builtin" | "variable.parameter" => StyleId::Variable,
        "constant" | "constant.builtin" => StyleId::Constant,
        "property" => StyleId::Property,
        "attribute" => StyleId::Attribute,
        _ => StyleId::Default,
    }
}

fn whole(source: &str) -> Vec<StyledSpan> {
    vec![StyledSpan {
        start: 0,
        end: source.len(),
        style_id: StyleId::Default,
    }]
}

/// Trait for syntax highlighters.
pub trait HighlighterTrait: Send + Sync {
    /// Highlight source code, returning styled spans over byte ranges.
    fn highlight(&self, source: &str) -> Vec<StyledSpan>;
}

/// No-op highlighter (plain text).
#[derive(Debug, Default)]
pub struct PlainHighlighter;

impl HighlighterTrait for PlainHighlighter {
    fn highlight(&self, source: &str) -> Vec<StyledSpan> {
        whole(source)
    }
}

/// Tree-sitter based highlighter.
pub struct TreeSitterHighlighter {
    config: HighlightConfiguration,
    highlighter: Mutex<TsHighlighter>,
}

impl TreeSitterHighlighter {
    /// Create a highlighter for the language; `None` for plain text or when
    /// the grammar's query fails to load.
    pub fn new(lang: LanguageId) -> Option<Self> {
        let (language, highlights_query) = match lang {
            #[cfg(feature = "lang-rust")]
            LanguageId::Rust => (
                tree_sitter_rust::LANGUAGE.into(),
                tree_sitter_rust::HIGHLIGHTS_QUERY,
            ),
            #[cfg(feature = "lang-typescript")]
            LanguageId::TypeScript | LanguageId::JavaScript => (
                tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
                tree_sitter_typescript::HIGHLIGHTS_QUERY,
            ),
            #[cfg(feature = "lang-typescript")]
            LanguageId::TypeScriptReact | LanguageId::JavaScriptReact => (
                tree_sitter_typescript::LANGUAGE_TSX.into(),
                tree_sitter_typescript::HIGHLIGHTS_QUERY,
            ),
            #[cfg(feature = "lang-go")]
            LanguageId::Go => (
                tree_sitter_go::LANGUAGE.into(),
                tree_sitter_go::HIGHLIGHTS_QUERY,
            ),
            #[cfg(feature = "lang-python")]
            LanguageId::Python => (
                tree_sitter_python::LANGUAGE.into(),
                tree_sitter_python::HIGHLIGHTS_QUERY,
            ),
            #[cfg(feature = "lang-json")]
            LanguageId::Json => (
                tree_sitter_json::LANGUAGE.into(),
                tree_sitter_json::HIGHLIGHTS_QUERY,
            ),
            #[cfg(feature = "lang-yaml")]
            LanguageId::Yaml => (
                tree_sitter_yaml::LANGUAGE.into(),
                tree_sitter_yaml::HIGHLIGHTS_QUERY,
            ),
            #[cfg(feature = "lang-bash")]
            LanguageId::Bash => (
                tree_sitter_bash::LANGUAGE.into(),
                tree_sitter_bash::HIGHLIGHT_QUERY,
            ),
            _ => return None,
        };

        let mut config =
            match HighlightConfiguration::new(language, "source", highlights_query, "", "") {
                Ok(config) => config,
                Err(err) => {
                    warn!(?lang, error = %err, "highlight query failed to load; using plain text");
                    return None;
                }
            };

        config.configure(HIGHLIGHT_NAMES);
        Some(Self {
            config,
            highlighter: Mutex::new(TsHighlighter::new()),
        })
    }
}

impl HighlighterTrait for TreeSitterHighlighter {
    fn highlight(&self, source: &str) -> Vec<StyledSpan> {
        let mut highlighter = self.highlighter.lock();

        let events = match highlighter.highlight(&self.config, source.as_bytes(), None, |_| None) {
            Ok(events) => events,
            Err(err) => {
                warn!(error = %err, "tree-sitter highlight failed");
                return whole(source);
            }
        };

        let mut spans = Vec::new();
        let mut styles: Vec<StyleId> = vec![StyleId::Default];
        let mut covered = 0;

        for event in events {
            match event {
                Ok(HighlightEvent::Source { start, end }) => {
                    let start = start.min(source.len());
                    let end = end.min(source.len());
                    if start < end {
                        spans.push(StyledSpan {
                            start,
                            end,
                            style_id: styles.last().copied().unwrap_or_default(),
                        });
                    }
                    covered = covered.max(end);
                }
                Ok(HighlightEvent::HighlightStart(highlight)) => {
                    let name = HIGHLIGHT_NAMES.get(highlight.0).copied().unwrap_or("");
                    styles.push(highlight_name_to_style(name));
                }
                Ok(HighlightEvent::HighlightEnd) => {
                    styles.pop();
                }
                Err(_) => break,
            }
        }

        if covered < source.len() {
            spans.push(StyledSpan {
                start: covered,
                end: source.len(),
                style_id: StyleId::Default,
            });
        }

        if spans.is_empty() {
            return whole(source);
        }
        spans
    }
}

/// One highlighter per language, created on first use.
pub struct HighlighterCache {
    highlighters: RefCell<HashMap<LanguageId, Box<dyn HighlighterTrait>>>,
    plain: PlainHighlighter,
}

impl Default for HighlighterCache {
    fn default() -> Self {
        Self::new()
    }
}

impl HighlighterCache {
    /// Create a new empty highlighter cache.
    pub fn new() -> Self {
        Self {
            highlighters: RefCell::new(HashMap::new()),
            plain: PlainHighlighter,
        }
    }

    /// Highlight source code for the given language.
    pub fn highlight(&self, lang: LanguageId, source: &str) -> Vec<StyledSpan> {
        if lang == LanguageId::Plain {
            return self.plain.highlight(source);
        }

        let mut highlighters = self.highlighters.borrow_mut();
        let highlighter = highlighters.entry(lang).or_insert_with(|| {
            match TreeSitterHighlighter::new(lang) {
                Some(h) => Box::new(h),
                None => Box::new(PlainHighlighter),
            }
        });

        highlighter.highlight(source)
    }

    /// Tokenize consecutive lines of `path` as one source.
    ///
    /// Returns exactly one span list per input line, each covering the whole
    /// line. Unknown file types come back unstyled.
    pub fn highlight_lines(&self, path: &str, lines: &[&str]) -> Vec<Vec<StyledSpan>> {
        if lines.is_empty() {
            return Vec::new();
        }

        let source = lines.join("\n");
        let bounds = line_bounds(lines);
        let spans = self.highlight(LanguageId::from_path(path), &source);

        split_spans_by_line(&spans, &bounds)
            .into_iter()
            .zip(&bounds)
            .map(|(spans, (start, end))| fill_line_gaps(spans, end - start))
            .collect()
    }
}

/// Per-hunk token cache for the current diff set.
///
/// Entries are keyed by file path and hunk index and live until
/// [`HunkHighlightCache::clear`] is called on the next install.
#[derive(Default)]
pub struct HunkHighlightCache {
    highlighters: HighlighterCache,
    entries: RefCell<HashMap<(String, usize), Rc<Vec<Vec<StyledSpan>>>>>,
}

impl HunkHighlightCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all cached hunks.
    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }

    /// Number of cached hunks.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// True when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Spans for every line of `hunk`, tokenizing it on first request.
    pub fn hunk_spans(&self, path: &str, hunk_idx: usize, hunk: &Hunk) -> Rc<Vec<Vec<StyledSpan>>> {
        let key = (path.to_string(), hunk_idx);
        if let Some(cached) = self.entries.borrow().get(&key) {
            return Rc::clone(cached);
        }

        let lines: Vec<&str> = hunk.lines.iter().map(|l| l.content.as_str()).collect();
        let spans = Rc::new(self.highlighters.highlight_lines(path, &lines));
        self.entries.borrow_mut().insert(key, Rc::clone(&spans));
        spans
    }
}

fn line_bounds(lines: &[&str]) -> Vec<(usize, usize)> {
    let mut bounds = Vec::with_capacity(lines.len());
    let mut start = 0;
    for line in lines {
        bounds.push((start, start + line.len()));
        start += line.len() + 1;
    }
    bounds
}

fn split_spans_by_line(spans: &[StyledSpan], bounds: &[(usize, usize)]) -> Vec<Vec<StyledSpan>> {
    let mut per_line = vec![Vec::new(); bounds.len()];

    for span in spans {
        if span.start >= span.end {
            continue;
        }

        let mut idx = bounds.partition_point(|(_, end)| *end <= span.start);
        while let Some(&(line_start, line_end)) = bounds.get(idx) {
            if span.end <= line_start {
                break;
            }

            let clipped_start = span.start.max(line_start);
            let clipped_end = span.end.min(line_end);
            if clipped_start < clipped_end {
                per_line[idx].push(StyledSpan {
                    start: clipped_start - line_start,
                    end: clipped_end - line_start,
                    style_id: span.style_id,
                });
            }

            if span.end <= line_end {
                break;
            }
            idx += 1;
        }
    }

    per_line
}

fn fill_line_gaps(spans: Vec<StyledSpan>, line_len: usize) -> Vec<StyledSpan> {
    if line_len == 0 {
        return Vec::new();
    }

    let mut filled = Vec::with_capacity(spans.len() + 1);
    let mut cursor = 0;

    for span in spans {
        if span.end <= cursor {
            continue;
        }
        if span.start > cursor {
            filled.push(StyledSpan {
                start: cursor,
                end: span.start,
                style_id: StyleId::Default,
            });
        }
        cursor = span.end;
        filled.push(span);
    }

    if cursor < line_len {
        filled.push(StyledSpan {
            start: cursor,
            end: line_len,
            style_id: StyleId::Default,
        });
    }

    filled
}
