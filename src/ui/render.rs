use std::collections::BTreeMap;

use ratatui::prelude::*;
use ratatui::widgets::{Clear, Paragraph};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::status;
use crate::app::Model;
use crate::editor::Range;
use crate::mark::DEFAULT_MARK_CLASS;

/// Drawn in the gutter before the number of the marked line.
pub const MARK_INDICATOR: char = '▸';

const CURSOR_STYLE: Style = Style::new().bg(Color::White).fg(Color::Black);
const SELECTION_STYLE: Style = Style::new().bg(Color::Blue).fg(Color::White);
const LINE_NUMBER_STYLE: Style = Style::new().fg(Color::DarkGray);

/// Render the complete UI.
pub fn render(model: &Model, frame: &mut Frame) {
    let area = frame.area();
    let _scope = crate::perf::scope("ui.render");

    let toast_active = model.active_toast().is_some();
    let footer_rows = 1 + u16::from(toast_active);
    let editor_area = Rect {
        height: area.height.saturating_sub(footer_rows),
        ..area
    };
    let toast_area = Rect {
        y: area.y + area.height.saturating_sub(1 + u16::from(toast_active)),
        height: 1,
        ..area
    };
    let status_area = Rect {
        y: area.y + area.height.saturating_sub(1),
        height: 1,
        ..area
    };

    render_editor(model, frame, editor_area);
    if toast_active {
        status::render_toast_bar(model, frame, toast_area);
    }
    status::render_status_bar(model, frame, status_area);
}

fn render_editor(model: &Model, frame: &mut Frame, area: Rect) {
    let Some(view) = model.active_view() else {
        return;
    };
    let buf = view.buffer();

    let show_gutter = model.line_numbers_visible();
    let total_lines = buf.line_count();
    let number_width = usize::from(line_number_width(total_lines));
    let marked: BTreeMap<usize, &str> = view.decorated_lines().into_iter().collect();

    let visible_height = area.height as usize;
    let start = model.scroll_offset;
    let end = (start + visible_height).min(total_lines);
    let cursor = buf.cursor();
    let selection = buf.selection();

    let mut content: Vec<Line> = Vec::new();
    for line_idx in start..end {
        let line_text = buf.line_at(line_idx).unwrap_or_default();
        let mut spans = Vec::new();

        if show_gutter {
            let line_num = format!("{:>number_width$} ", line_idx + 1);
            if let Some(class) = marked.get(&line_idx) {
                let style = decoration_style(class);
                spans.push(Span::styled(MARK_INDICATOR.to_string(), style));
                spans.push(Span::styled(line_num, style));
            } else {
                spans.push(Span::raw(" "));
                spans.push(Span::styled(line_num, LINE_NUMBER_STYLE));
            }
        }

        let cursor_col = (line_idx == cursor.line).then_some(cursor.col);
        let selected = selection.and_then(|range| selected_cols(range, line_idx));
        spans.extend(line_spans(&line_text, model.h_scroll, cursor_col, selected));

        content.push(Line::from(spans));
    }

    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(content), area);
}

/// Style for a line-number decoration of the given class.
fn decoration_style(class: &str) -> Style {
    let color = if class == DEFAULT_MARK_CLASS {
        Color::Yellow
    } else {
        Color::Cyan
    };
    Style::new().fg(color).add_modifier(Modifier::BOLD)
}

/// Selected byte columns `[start, end)` on `line`; `usize::MAX` as the end
/// means the selection continues past the line break.
fn selected_cols(range: Range, line: usize) -> Option<(usize, usize)> {
    if !range.touches_line(line) {
        return None;
    }
    let start = if line == range.start.line {
        range.start.col
    } else {
        0
    };
    let end = if line == range.end.line {
        range.end.col
    } else {
        usize::MAX
    };
    (start < end).then_some((start, end))
}

/// Spans for `text` starting at display column `skip`. Characters that
/// begin left of `skip` are not drawn.
fn line_spans(
    text: &str,
    skip: usize,
    cursor: Option<usize>,
    selected: Option<(usize, usize)>,
) -> Vec<Span<'static>> {
    let style_at = |idx: usize| {
        if cursor == Some(idx) {
            CURSOR_STYLE
        } else if selected.is_some_and(|(start, end)| idx >= start && idx < end) {
            SELECTION_STYLE
        } else {
            Style::default()
        }
    };

    let mut spans = Vec::new();
    let mut run = String::new();
    let mut run_style = Style::default();
    let mut cells = 0;
    for (idx, ch) in text.char_indices() {
        let start = cells;
        cells += ch.width().unwrap_or(0);
        if start < skip {
            continue;
        }
        let style = style_at(idx);
        if style != run_style && !run.is_empty() {
            spans.push(Span::styled(std::mem::take(&mut run), run_style));
        }
        run_style = style;
        run.push(ch);
    }
    if !run.is_empty() {
        spans.push(Span::styled(run, run_style));
    }

    // Cursor or selected line break past the last character.
    let eol_style = style_at(text.len());
    if eol_style != Style::default() && cells >= skip {
        spans.push(Span::styled(" ", eol_style));
    }
    spans
}

/// Columns taken by the gutter, or 0 when it is hidden.
pub fn gutter_width(model: &Model) -> u16 {
    if !model.line_numbers_visible() {
        return 0;
    }
    let total_lines = model.buffer().map_or(1, crate::editor::EditorBuffer::line_count);
    line_number_width(total_lines) + 2
}

/// Byte column of the character drawn at screen cell `x` of `text`, or the
/// line length when `x` is past its end.
pub fn byte_col_at(text: &str, x: usize) -> usize {
    let mut cells = 0;
    for (idx, ch) in text.char_indices() {
        cells += ch.width().unwrap_or(0);
        if cells > x {
            return idx;
        }
    }
    text.len()
}

/// Display column where byte column `col` of `text` is drawn.
pub fn cell_col(text: &str, col: usize) -> usize {
    text.get(..col).map_or_else(|| text.width(), UnicodeWidthStr::width)
}

/// Calculate the width needed for line numbers.
pub const fn line_number_width(total_lines: usize) -> u16 {
    if total_lines < 10 {
        1
    } else if total_lines < 100 {
        2
    } else if total_lines < 1_000 {
        3
    } else if total_lines < 10_000 {
        4
    } else if total_lines < 100_000 {
        5
    } else {
        6
    }
}
