//! Sidebar file tree rendering.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::core::{flatten, TreeNode};
use crate::ui::app::{App, Focus};

use super::helpers::{pad, truncate_str, SpanBuilder};

/// Render the file tree sidebar.
pub fn render_sidebar(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let is_focused = app.view.focus == Focus::Sidebar;
    let border_color = if is_focused {
        theme.accent
    } else {
        theme.border_dim
    };

    let block = Block::default()
        .borders(Borders::RIGHT)
        .border_style(Style::default().fg(border_color))
        .style(Style::default().bg(theme.bg));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let height = usize::from(inner.height);
    let width = usize::from(inner.width);
    if height == 0 {
        return;
    }

    let hidden = app.hidden_count();
    let title = if hidden > 0 {
        format!("Files ({} hidden)", hidden)
    } else {
        "Files".to_string()
    };
    let title_style = if is_focused {
        Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.text_muted)
    };

    let mut lines: Vec<Line> = Vec::with_capacity(height);
    lines.push(Line::from(Span::styled(truncate_str(&title, width), title_style)));
    lines.push(Line::from(Span::styled(
        "─".repeat(width),
        Style::default().fg(theme.border_dim),
    )));

    let tree = app.tree();
    let rows = flatten(&tree);
    let capacity = height.saturating_sub(2);
    for (node, depth) in rows.iter().skip(app.sidebar_offset()).take(capacity) {
        lines.push(tree_row(app, node, *depth, width));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

fn tree_row(app: &App, node: &TreeNode, depth: usize, width: usize) -> Line<'static> {
    let theme = &app.theme;
    let selected = node.file_index() == Some(app.view.cursor);
    let bg = if selected { theme.bg_selected } else { theme.bg };
    let base = Style::default().bg(bg);

    let mut builder = SpanBuilder::new();
    if selected {
        builder.push_str("> ", base.fg(theme.accent));
    } else {
        builder.push_spaces(2, base);
    }
    builder.push_spaces(depth * 2, base);

    let (added, removed) = node.stats();
    let stats = format!("+{} -{}", added, removed);
    let label = match node {
        TreeNode::Folder { name, expanded, .. } => {
            let marker = if *expanded { "▼" } else { "▶" };
            format!("{} {}/", marker, name)
        }
        TreeNode::File { name, .. } => name.clone(),
    };
    let name_color = match (node.is_folder(), selected) {
        (true, _) => theme.folder,
        (false, true) => theme.text_bright,
        (false, false) => theme.text_normal,
    };

    let room = width.saturating_sub(builder.width() + stats.chars().count() + 1);
    builder.push_str(&truncate_str(&label, room), base.fg(name_color));
    let gap = width.saturating_sub(builder.width() + stats.chars().count());
    pad(&mut builder, gap.max(1), base);
    builder.push_str(&format!("+{}", added), base.fg(theme.stat_added));
    builder.push_spaces(1, base);
    builder.push_str(&format!("-{}", removed), base.fg(theme.stat_removed));
    Line::from(builder.finish())
}
