//! Logical-line addressing across variable-height file sections.

use super::diff::FileDiff;
use super::layout::{hunk_row_count, LayoutMode};

/// Per-file heights of the content pane, in display rows.
///
/// Every file takes one header row plus either its laid-out hunk rows or a
/// single placeholder row when collapsed or binary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Viewport {
    costs: Vec<usize>,
    starts: Vec<usize>,
    total: usize,
}

impl Viewport {
    /// Measure the visible files under `mode`.
    pub fn new(files: &[&FileDiff], mode: LayoutMode) -> Self {
        let costs: Vec<usize> = files.iter().map(|f| file_cost(f, mode)).collect();
        let mut starts = Vec::with_capacity(costs.len());
        let mut total = 0;
        for cost in &costs {
            starts.push(total);
            total += cost;
        }
        Self {
            costs,
            starts,
            total,
        }
    }

    /// Number of files.
    pub fn file_count(&self) -> usize {
        self.costs.len()
    }

    /// Rows occupied by file `i`.
    pub fn cost(&self, i: usize) -> usize {
        self.costs.get(i).copied().unwrap_or(0)
    }

    /// Total rows across all files.
    pub fn total_lines(&self) -> usize {
        self.total
    }

    /// Largest scroll offset that still fills a pane of `height` rows.
    pub fn max_scroll(&self, height: usize) -> usize {
        self.total.saturating_sub(height)
    }

    /// First row of file `i`; indices past the end give the total.
    pub fn offset_of(&self, i: usize) -> usize {
        self.starts.get(i).copied().unwrap_or(self.total)
    }

    /// File whose rows contain `offset`; past the end means the last file.
    pub fn file_at(&self, offset: usize) -> Option<usize> {
        if self.costs.is_empty() {
            return None;
        }
        let idx = self.starts.partition_point(|&start| start <= offset);
        Some(idx.saturating_sub(1))
    }

    /// Clamp a scroll offset to `[0, max_scroll(height)]`.
    pub fn clamp_scroll(&self, scroll: usize, height: usize) -> usize {
        scroll.min(self.max_scroll(height))
    }

    /// Clamp a file cursor to a valid index (0 when empty).
    pub fn clamp_cursor(&self, cursor: usize) -> usize {
        cursor.min(self.costs.len().saturating_sub(1))
    }

    /// Header offset of the file after the one at `scroll`.
    pub fn next_file_offset(&self, scroll: usize) -> Option<usize> {
        let next = self.file_at(scroll)? + 1;
        (next < self.costs.len()).then(|| self.offset_of(next))
    }

    /// Header offset of the file before the one at `scroll`.
    pub fn prev_file_offset(&self, scroll: usize) -> Option<usize> {
        let prev = self.file_at(scroll)?.checked_sub(1)?;
        Some(self.offset_of(prev))
    }
}

/// Rows needed to draw one file.
pub fn file_cost(file: &FileDiff, mode: LayoutMode) -> usize {
    if file.collapsed || file.is_binary {
        return 2;
    }
    1 + file
        .hunks
        .iter()
        .map(|h| hunk_row_count(h, mode))
        .sum::<usize>()
}

/// Rows available for content in a terminal of `height` rows.
pub fn content_height(terminal_height: u16) -> usize {
    usize::from(terminal_height).saturating_sub(2).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Hunk, LineKind};

    fn file(path: &str, lines: &[LineKind]) -> FileDiff {
        let mut hunk = Hunk::new(1, 1, 1, 1);
        for (i, kind) in lines.iter().enumerate() {
            hunk.push(*kind, format!("line {}", i));
        }
        FileDiff::new(path, None, vec![hunk], false)
    }

    fn sample() -> Vec<FileDiff> {
        use LineKind::*;
        vec![
            file("a.rs", &[Removed, Removed, Added, Context]),
            file("b.rs", &[Added]),
            file("c.rs", &[Context, Context]),
        ]
    }

    #[test]
    fn unified_costs_count_lines() {
        let files = sample();
        let refs: Vec<&FileDiff> = files.iter().collect();
        let vp = Viewport::new(&refs, LayoutMode::Unified);
        assert_eq!((vp.cost(0), vp.cost(1), vp.cost(2)), (5, 2, 3));
        assert_eq!(vp.total_lines(), 10);
        assert_eq!(vp.offset_of(2), 7);
        assert_eq!(vp.offset_of(99), 10);
    }

    #[test]
    fn split_costs_count_paired_rows() {
        let files = sample();
        let refs: Vec<&FileDiff> = files.iter().collect();
        let vp = Viewport::new(&refs, LayoutMode::SideBySide);
        assert_eq!(vp.cost(0), 4);
        assert_eq!(vp.total_lines(), 9);
    }

    #[test]
    fn collapsed_and_binary_take_two_rows() {
        let mut files = sample();
        files[0].collapsed = true;
        files[1].is_binary = true;
        files[1].hunks.clear();
        let refs: Vec<&FileDiff> = files.iter().collect();
        let vp = Viewport::new(&refs, LayoutMode::Unified);
        assert_eq!((vp.cost(0), vp.cost(1)), (2, 2));
    }

    #[test]
    fn file_at_maps_ranges_and_overflow() {
        let files = sample();
        let refs: Vec<&FileDiff> = files.iter().collect();
        let vp = Viewport::new(&refs, LayoutMode::Unified);
        for i in 0..vp.file_count() {
            assert_eq!(vp.file_at(vp.offset_of(i)), Some(i));
        }
        assert_eq!(vp.file_at(4), Some(0));
        assert_eq!(vp.file_at(5), Some(1));
        assert_eq!(vp.file_at(1000), Some(2));
        assert_eq!(Viewport::default().file_at(0), None);
    }

    #[test]
    fn max_scroll_is_zero_when_content_fits() {
        let files = sample();
        let refs: Vec<&FileDiff> = files.iter().collect();
        let vp = Viewport::new(&refs, LayoutMode::Unified);
        assert_eq!(vp.max_scroll(10), 0);
        assert_eq!(vp.max_scroll(50), 0);
        assert_eq!(vp.max_scroll(4), 6);
        assert_eq!(vp.clamp_scroll(100, 4), 6);
    }

    #[test]
    fn cursor_clamps() {
        let files = sample();
        let refs: Vec<&FileDiff> = files.iter().collect();
        let vp = Viewport::new(&refs, LayoutMode::Unified);
        assert_eq!(vp.clamp_cursor(7), 2);
        assert_eq!(Viewport::default().clamp_cursor(3), 0);
    }

    #[test]
    fn next_and_prev_file_offsets() {
        let files = sample();
        let refs: Vec<&FileDiff> = files.iter().collect();
        let vp = Viewport::new(&refs, LayoutMode::Unified);
        assert_eq!(vp.next_file_offset(0), Some(5));
        assert_eq!(vp.next_file_offset(8), None);
        assert_eq!(vp.prev_file_offset(8), Some(5));
        assert_eq!(vp.prev_file_offset(2), None);
    }

    #[test]
    fn content_height_reserves_bars() {
        assert_eq!(content_height(24), 22);
        assert_eq!(content_height(1), 1);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn offsets_round_trip_and_fit(
                sizes in prop::collection::vec((0usize..12, any::<bool>()), 1..20),
                height in 1usize..60,
            ) {
                let files: Vec<FileDiff> = sizes
                    .iter()
                    .enumerate()
                    .map(|(i, (n, collapsed))| {
                        let mut f = file(&format!("f{}.rs", i), &vec![LineKind::Added; *n]);
                        f.collapsed = *collapsed;
                        f
                    })
                    .collect();
                let refs: Vec<&FileDiff> = files.iter().collect();
                for mode in [LayoutMode::Unified, LayoutMode::SideBySide] {
                    let vp = Viewport::new(&refs, mode);
                    for i in 0..vp.file_count() {
                        prop_assert_eq!(vp.file_at(vp.offset_of(i)), Some(i));
                    }
                    if vp.total_lines() <= height {
                        prop_assert_eq!(vp.max_scroll(height), 0);
                    }
                }
            }
        }
    }
}
