use super::*;
use crate::app::Model;
use crate::workspace::Workspace;
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::buffer::Buffer;
use ratatui::style::Color;
use std::path::PathBuf;

const TEXT: &str = "zero\none\ntwo\nthree\nfour\n";

fn create_test_model(text: &str) -> Model {
    Model::new(PathBuf::from("notes.txt"), text, Workspace::default(), (60, 10))
}

fn draw(model: &Model) -> Buffer {
    let backend = TestBackend::new(60, 10);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal.draw(|frame| render(model, frame)).unwrap();
    terminal.backend().buffer().clone()
}

fn row_text(buffer: &Buffer, y: u16) -> String {
    (0..buffer.area.width)
        .map(|x| buffer[(x, y)].symbol().to_string())
        .collect()
}

fn set_mark_at(model: &mut Model, line: usize, col: usize) {
    model
        .workspace
        .edit(model.view, |buf| buf.move_to(line, col))
        .unwrap();
    model.workspace.dispatch(model.view, "mark:set-mark").unwrap();
}

#[test]
fn test_render_shows_line_numbers_and_text() {
    let model = create_test_model(TEXT);
    let buffer = draw(&model);
    assert!(row_text(&buffer, 0).starts_with(" 1 zero"));
    assert!(row_text(&buffer, 3).starts_with(" 4 three"));
}

#[test]
fn test_marked_line_has_indicator_and_style() {
    let mut model = create_test_model(TEXT);
    set_mark_at(&mut model, 2, 0);
    model
        .workspace
        .edit(model.view, |buf| buf.move_to(0, 0))
        .unwrap();

    let buffer = draw(&model);
    let row = row_text(&buffer, 2);
    assert!(row.starts_with("▸3 two"), "row was {row:?}");
    assert_eq!(buffer[(0, 2)].fg, Color::Yellow);
    assert_eq!(buffer[(1, 2)].fg, Color::Yellow);
    assert!(row_text(&buffer, 1).starts_with(" 2 one"));
    assert_eq!(buffer[(1, 1)].fg, Color::DarkGray);
}

#[test]
fn test_custom_mark_class_uses_other_color() {
    let options = crate::mark::MarkOptions {
        decoration_class: "bookmark".to_string(),
        ..crate::mark::MarkOptions::default()
    };
    let workspace = Workspace::new(crate::clipboard::MemoryClipboard::handle(), options);
    let mut model = Model::new(PathBuf::from("notes.txt"), TEXT, workspace, (60, 10));
    set_mark_at(&mut model, 1, 0);
    let buffer = draw(&model);
    assert_eq!(buffer[(0, 1)].fg, Color::Cyan);
}

#[test]
fn test_hidden_gutter_drops_numbers_and_indicator() {
    let mut model = create_test_model(TEXT);
    set_mark_at(&mut model, 0, 0);
    model.set_line_numbers_visible(false);
    let buffer = draw(&model);
    assert!(row_text(&buffer, 0).starts_with("zero"));
    assert!(!row_text(&buffer, 0).contains(MARK_INDICATOR));
}

#[test]
fn test_mark_follows_inserted_lines() {
    let mut model = create_test_model(TEXT);
    set_mark_at(&mut model, 1, 0);
    model
        .workspace
        .edit(model.view, |buf| {
            buf.move_to(0, 0);
            buf.insert_str("new\n");
        })
        .unwrap();
    let buffer = draw(&model);
    assert!(row_text(&buffer, 2).starts_with("▸3 one"));
}

#[test]
fn test_selection_is_highlighted() {
    let mut model = create_test_model(TEXT);
    set_mark_at(&mut model, 1, 0);
    model
        .workspace
        .edit(model.view, |buf| buf.move_to(1, 2))
        .unwrap();
    model
        .workspace
        .dispatch(model.view, "mark:select-to-mark")
        .unwrap();

    let buffer = draw(&model);
    // Gutter is 3 columns wide: indicator, digit, space.
    assert_eq!(buffer[(3, 1)].bg, Color::Blue);
    assert_eq!(buffer[(4, 1)].bg, Color::Blue);
    // The cursor sits on the selection end.
    assert_eq!(buffer[(5, 1)].bg, Color::White);
}

#[test]
fn test_cursor_drawn_past_line_end() {
    let mut model = create_test_model("ab");
    model
        .workspace
        .edit(model.view, |buf| buf.move_end())
        .unwrap();
    let buffer = draw(&model);
    assert_eq!(buffer[(5, 0)].bg, Color::White);
}

#[test]
fn test_status_bar_shows_mark_state() {
    let mut model = create_test_model(TEXT);
    let buffer = draw(&model);
    let status = row_text(&buffer, 9);
    assert!(status.contains("notes.txt"));
    assert!(status.contains("[no mark]"));

    set_mark_at(&mut model, 3, 1);
    let buffer = draw(&model);
    let status = row_text(&buffer, 9);
    assert!(status.contains("Ln 4, Col 2"));
    assert!(status.contains("[mark 4:2]"));

    model.workspace.deactivate();
    let buffer = draw(&model);
    assert!(row_text(&buffer, 9).contains("[mark off]"));
}

#[test]
fn test_gutter_width_tracks_visibility() {
    let mut model = create_test_model(&"x\n".repeat(20));
    assert_eq!(gutter_width(&model), 4);
    model.set_line_numbers_visible(false);
    assert_eq!(gutter_width(&model), 0);
}

#[test]
fn test_byte_col_at_handles_wide_chars() {
    assert_eq!(byte_col_at("abc", 1), 1);
    assert_eq!(byte_col_at("abc", 10), 3);
    // '日' is two cells and three bytes.
    assert_eq!(byte_col_at("日本", 0), 0);
    assert_eq!(byte_col_at("日本", 1), 0);
    assert_eq!(byte_col_at("日本", 2), 3);
}

#[test]
fn test_line_number_width() {
    assert_eq!(line_number_width(9), 1);
    assert_eq!(line_number_width(10), 2);
    assert_eq!(line_number_width(12_345), 5);
}

#[test]
fn test_long_line_draws_cursor_and_selection_past_width() {
    use crate::app::{Message, update};
    use crate::mark::MarkCommand;

    let text = format!("{}tail\n", "a".repeat(80));
    let model = create_test_model(&text);
    let model = [
        Message::MoveTo(0, 80),
        Message::Mark(MarkCommand::SetMark),
        Message::MoveEnd,
        Message::Mark(MarkCommand::SelectToMark),
    ]
    .into_iter()
    .fold(model, update);
    assert_eq!(model.h_scroll, 28);

    let buffer = draw(&model);
    let row = row_text(&buffer, 0);
    assert!(row.starts_with(&format!("▸1 {}tail", "a".repeat(52))), "row was {row:?}");
    for x in 55..59 {
        assert_eq!(buffer[(x, 0)].bg, Color::Blue);
    }
    assert_eq!(buffer[(59, 0)].bg, Color::White);
}

#[test]
fn test_cell_col_counts_wide_chars() {
    assert_eq!(cell_col("ab", 1), 1);
    assert_eq!(cell_col("日本", 3), 2);
    assert_eq!(cell_col("ab", 10), 2);
}
