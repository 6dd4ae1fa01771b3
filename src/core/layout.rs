//! Row layout of hunks for unified and side-by-side display.

use super::diff::{DiffLine, Hunk, LineKind};
use crate::highlight::StyledSpan;

/// How hunks are laid out in the content pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutMode {
    /// Old and new side by side.
    #[default]
    SideBySide,
    /// One column with `+`/`-` markers.
    Unified,
}

impl LayoutMode {
    /// The other mode.
    pub fn toggled(self) -> Self {
        match self {
            Self::SideBySide => Self::Unified,
            Self::Unified => Self::SideBySide,
        }
    }
}

/// One side of a split row.
#[derive(Debug, Clone, Copy)]
pub struct Cell<'a> {
    /// The diff line shown in this cell.
    pub line: &'a DiffLine,
    /// Syntax spans for the line's content.
    pub spans: &'a [StyledSpan],
}

impl Cell<'_> {
    /// Line number for the side this cell is drawn on.
    pub fn number(&self, left: bool) -> Option<u32> {
        if left {
            self.line.old_line
        } else {
            self.line.new_line
        }
    }
}

/// A display row produced from a hunk.
#[derive(Debug, Clone, Copy)]
pub enum DisplayRow<'a> {
    /// Single-column row.
    Unified(Cell<'a>),
    /// Paired row; a missing side renders blank.
    Split {
        /// Old side.
        left: Option<Cell<'a>>,
        /// New side.
        right: Option<Cell<'a>>,
    },
}

impl DisplayRow<'_> {
    /// Marker glyph for a unified row.
    pub fn glyph(kind: LineKind) -> char {
        match kind {
            LineKind::Added => '+',
            LineKind::Removed => '-',
            LineKind::Context => ' ',
        }
    }
}

/// Lay out a hunk's lines as display rows.
///
/// `tokens` holds one span list per hunk line; missing entries render
/// unstyled.
pub fn layout_hunk<'a>(
    hunk: &'a Hunk,
    mode: LayoutMode,
    tokens: &'a [Vec<StyledSpan>],
) -> Vec<DisplayRow<'a>> {
    let cell = |idx: usize| Cell {
        line: &hunk.lines[idx],
        spans: tokens.get(idx).map_or(&[][..], Vec::as_slice),
    };

    match mode {
        LayoutMode::Unified => (0..hunk.lines.len())
            .map(|idx| DisplayRow::Unified(cell(idx)))
            .collect(),
        LayoutMode::SideBySide => pair_rows(hunk)
            .into_iter()
            .map(|(left, right)| DisplayRow::Split {
                left: left.map(cell),
                right: right.map(cell),
            })
            .collect(),
    }
}

/// Pair hunk line indices into side-by-side rows.
///
/// Removed lines queue on the left and added lines on the right; a context
/// line flushes both queues pairwise before appearing on both sides.
pub fn pair_rows(hunk: &Hunk) -> Vec<(Option<usize>, Option<usize>)> {
    let mut rows = Vec::with_capacity(hunk.lines.len());
    let mut removed: Vec<usize> = Vec::new();
    let mut added: Vec<usize> = Vec::new();

    fn flush(
        rows: &mut Vec<(Option<usize>, Option<usize>)>,
        removed: &mut Vec<usize>,
        added: &mut Vec<usize>,
    ) {
        let n = removed.len().max(added.len());
        for i in 0..n {
            rows.push((removed.get(i).copied(), added.get(i).copied()));
        }
        removed.clear();
        added.clear();
    }

    for (idx, line) in hunk.lines.iter().enumerate() {
        match line.kind {
            LineKind::Removed => removed.push(idx),
            LineKind::Added => added.push(idx),
            LineKind::Context => {
                flush(&mut rows, &mut removed, &mut added);
                rows.push((Some(idx), Some(idx)));
            }
        }
    }
    flush(&mut rows, &mut removed, &mut added);

    rows
}

/// Number of rows a hunk occupies in the given layout.
pub fn hunk_row_count(hunk: &Hunk, mode: LayoutMode) -> usize {
    match mode {
        LayoutMode::Unified => hunk.lines.len(),
        LayoutMode::SideBySide => side_by_side_row_count(hunk),
    }
}

/// Paired row count without materializing the rows.
pub fn side_by_side_row_count(hunk: &Hunk) -> usize {
    let (mut rows, mut removed, mut added) = (0, 0, 0);
    for line in &hunk.lines {
        match line.kind {
            LineKind::Removed => removed += 1,
            LineKind::Added => added += 1,
            LineKind::Context => {
                rows += usize::max(removed, added) + 1;
                removed = 0;
                added = 0;
            }
        }
    }
    rows + usize::max(removed, added)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hunk(lines: &[(LineKind, &str)]) -> Hunk {
        let mut hunk = Hunk::new(1, 3, 1, 3);
        for (kind, text) in lines {
            hunk.push(*kind, *text);
        }
        hunk
    }

    fn texts(rows: &[DisplayRow<'_>]) -> Vec<(String, String)> {
        rows.iter()
            .map(|row| match row {
                DisplayRow::Split { left, right } => (
                    left.map_or(String::new(), |c| c.line.content.clone()),
                    right.map_or(String::new(), |c| c.line.content.clone()),
                ),
                DisplayRow::Unified(c) => (c.line.content.clone(), String::new()),
            })
            .collect()
    }

    #[test]
    fn run_pairing() {
        let h = hunk(&[
            (LineKind::Removed, "r1"),
            (LineKind::Removed, "r2"),
            (LineKind::Added, "a1"),
            (LineKind::Context, "c1"),
        ]);
        let rows = layout_hunk(&h, LayoutMode::SideBySide, &[]);
        assert_eq!(
            texts(&rows),
            vec![
                ("r1".into(), "a1".into()),
                ("r2".into(), String::new()),
                ("c1".into(), "c1".into()),
            ]
        );
        assert_eq!(side_by_side_row_count(&h), rows.len());
    }

    #[test]
    fn context_shows_its_own_numbers_on_each_side() {
        let mut h = Hunk::new(10, 2, 20, 2);
        h.push(LineKind::Added, "new");
        h.push(LineKind::Context, "same");
        let rows = layout_hunk(&h, LayoutMode::SideBySide, &[]);
        let DisplayRow::Split {
            left: Some(left),
            right: Some(right),
        } = rows[1]
        else {
            panic!("expected a context row");
        };
        assert_eq!(left.number(true), Some(10));
        assert_eq!(right.number(false), Some(21));
    }

    #[test]
    fn trailing_runs_flush_at_end() {
        let h = hunk(&[
            (LineKind::Context, "c"),
            (LineKind::Added, "a1"),
            (LineKind::Added, "a2"),
        ]);
        assert_eq!(
            pair_rows(&h),
            vec![(Some(0), Some(0)), (None, Some(1)), (None, Some(2))]
        );
        assert_eq!(hunk_row_count(&h, LayoutMode::SideBySide), 3);
        assert_eq!(hunk_row_count(&h, LayoutMode::Unified), 3);
    }

    #[test]
    fn unified_keeps_every_line_and_attaches_tokens() {
        let h = hunk(&[(LineKind::Removed, "x"), (LineKind::Added, "y")]);
        let tokens = vec![vec![StyledSpan {
            start: 0,
            end: 1,
            style_id: crate::highlight::StyleId::Keyword,
        }]];
        let rows = layout_hunk(&h, LayoutMode::Unified, &tokens);
        assert_eq!(rows.len(), 2);
        let DisplayRow::Unified(first) = rows[0] else {
            panic!("expected unified row");
        };
        assert_eq!(first.spans.len(), 1);
        let DisplayRow::Unified(second) = rows[1] else {
            panic!("expected unified row");
        };
        assert!(second.spans.is_empty());
        assert_eq!(DisplayRow::glyph(second.line.kind), '+');
    }

    #[test]
    fn toggle_layout() {
        assert_eq!(LayoutMode::default(), LayoutMode::SideBySide);
        assert_eq!(LayoutMode::SideBySide.toggled(), LayoutMode::Unified);
    }
}
