use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use tempfile::tempdir;

use crate::editor::{Direction, Point};
use crate::mark::MarkCommand;
use crate::workspace::Workspace;

use super::effects::save_buffer;
use super::event_loop::ResizeDebouncer;
use super::{App, Message, Model, ToastLevel, update};

const TEXT: &str = "zero\none\ntwo\nthree\nfour\nfive\nsix\nseven\n";

fn create_test_model() -> Model {
    Model::new(PathBuf::from("test.txt"), TEXT, Workspace::default(), (80, 24))
}

fn apply(model: Model, msgs: impl IntoIterator<Item = Message>) -> Model {
    msgs.into_iter().fold(model, update)
}

fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
    KeyEvent::new(code, modifiers)
}

fn clipboard_text(model: &Model) -> Option<String> {
    model.workspace.clipboard().borrow().contents()
}

#[test]
fn test_toggle_sets_and_clears_mark() {
    let model = apply(
        create_test_model(),
        [Message::MoveTo(2, 1), Message::Mark(MarkCommand::Toggle)],
    );
    assert_eq!(model.mark_position(), Some(Point::new(2, 1)));

    let model = update(model, Message::Mark(MarkCommand::Toggle));
    assert_eq!(model.mark_position(), None);
}

#[test]
fn test_toggle_with_hidden_gutter_shows_hint() {
    let model = apply(
        create_test_model(),
        [Message::ToggleGutter, Message::Mark(MarkCommand::Toggle)],
    );
    assert!(!model.line_numbers_visible());
    assert_eq!(model.mark_position(), None);
    assert!(matches!(model.active_toast(), Some((_, ToastLevel::Info))));
}

#[test]
fn test_select_to_mark_and_copy_scenario() {
    let model = apply(
        create_test_model(),
        [
            Message::MoveTo(2, 0),
            Message::Mark(MarkCommand::SetMark),
            Message::MoveTo(6, 0),
            Message::Mark(MarkCommand::SelectToMarkAndCopy),
        ],
    );
    assert_eq!(clipboard_text(&model).as_deref(), Some("two\nthree\nfour\nfive\n"));
    assert_eq!(model.mark_position(), None);
    assert!(model.buffer().unwrap().selection().is_none());
    assert_eq!(
        model.active_toast(),
        Some(("Copied to clipboard", ToastLevel::Info))
    );
}

#[test]
fn test_select_to_mark_and_cut_edits_buffer() {
    let model = apply(
        create_test_model(),
        [
            Message::MoveTo(1, 0),
            Message::Mark(MarkCommand::SetMark),
            Message::MoveTo(3, 0),
            Message::Mark(MarkCommand::SelectToMarkAndCut),
        ],
    );
    assert_eq!(clipboard_text(&model).as_deref(), Some("one\ntwo\n"));
    assert!(model.buffer().unwrap().text().starts_with("zero\nthree\n"));
    assert!(model.is_dirty());
    assert_eq!(model.mark_position(), None);
}

#[test]
fn test_ctrl_x_twice_swaps_with_mark() {
    let model = apply(
        create_test_model(),
        [
            Message::MoveTo(1, 2),
            Message::Mark(MarkCommand::SetMark),
            Message::MoveTo(5, 0),
            Message::CtrlX,
        ],
    );
    assert!(model.ctrl_x_pending);
    assert_eq!(model.cursor_position(), Point::new(5, 0));

    let model = update(model, Message::CtrlX);
    assert!(!model.ctrl_x_pending);
    assert_eq!(model.cursor_position(), Point::new(1, 2));
    assert_eq!(model.mark_position(), Some(Point::new(5, 0)));
}

#[test]
fn test_ctrl_x_chord_cancelled_by_other_message() {
    let model = apply(
        create_test_model(),
        [
            Message::Mark(MarkCommand::SetMark),
            Message::MoveTo(4, 0),
            Message::CtrlX,
            Message::MoveCursor(Direction::Down),
            Message::CtrlX,
        ],
    );
    assert!(model.ctrl_x_pending);
    assert_eq!(model.cursor_position(), Point::new(5, 0));
    assert_eq!(model.mark_position(), Some(Point::new(0, 0)));
}

#[test]
fn test_delete_line_under_mark_clears_it() {
    let model = apply(
        create_test_model(),
        [
            Message::MoveTo(3, 2),
            Message::Mark(MarkCommand::SetMark),
            Message::DeleteLine,
        ],
    );
    assert_eq!(model.mark_position(), None);
    assert!(model.active_view().unwrap().markers().is_empty());
}

#[test]
fn test_typing_before_mark_shifts_it() {
    let model = apply(
        create_test_model(),
        [
            Message::MoveTo(2, 1),
            Message::Mark(MarkCommand::SetMark),
            Message::MoveTo(2, 0),
            Message::InsertChar('x'),
            Message::InsertChar('y'),
            Message::MoveTo(0, 0),
            Message::SplitLine,
        ],
    );
    assert_eq!(model.mark_position(), Some(Point::new(3, 3)));
}

#[test]
fn test_go_to_mark_scrolls_into_view() {
    let text = "line\n".repeat(100);
    let model = Model::new(PathBuf::from("long.txt"), &text, Workspace::default(), (80, 11));
    let model = apply(
        model,
        [
            Message::MoveTo(80, 0),
            Message::Mark(MarkCommand::SetMark),
            Message::MoveToStart,
        ],
    );
    assert_eq!(model.scroll_offset, 0);

    let model = update(model, Message::Mark(MarkCommand::GoToMark));
    assert_eq!(model.cursor_position(), Point::new(80, 0));
    assert_eq!(model.scroll_offset, 71);
}

#[test]
fn test_page_down_moves_cursor_by_screen() {
    let text = "line\n".repeat(100);
    let model = Model::new(PathBuf::from("long.txt"), &text, Workspace::default(), (80, 11));
    let model = update(model, Message::PageDown);
    assert_eq!(model.cursor_position().line, 10);
    let model = update(model, Message::PageUp);
    assert_eq!(model.cursor_position().line, 0);
}

#[test]
fn test_scroll_down_is_clamped() {
    let model = update(create_test_model(), Message::ScrollDown(100));
    assert_eq!(model.scroll_offset, 8);
    let model = update(model, Message::ScrollUp(3));
    assert_eq!(model.scroll_offset, 5);
}

#[test]
fn test_quit_requires_confirmation_when_dirty() {
    let model = apply(create_test_model(), [Message::InsertChar('x'), Message::Quit]);
    assert!(!model.should_quit);
    assert!(model.quit_confirmed);
    assert!(matches!(model.active_toast(), Some((_, ToastLevel::Warning))));

    let model = update(model, Message::Quit);
    assert!(model.should_quit);
}

#[test]
fn test_quit_confirmation_reset_by_other_message() {
    let model = apply(
        create_test_model(),
        [
            Message::InsertChar('x'),
            Message::Quit,
            Message::MoveCursor(Direction::Left),
            Message::Quit,
        ],
    );
    assert!(!model.should_quit);
}

#[test]
fn test_clean_buffer_quits_immediately() {
    let model = update(create_test_model(), Message::Quit);
    assert!(model.should_quit);
}

#[test]
fn test_close_disposes_mark_controller() {
    let model = apply(
        create_test_model(),
        [
            Message::MoveTo(3, 2),
            Message::Mark(MarkCommand::SetMark),
            Message::Quit,
        ],
    );
    assert!(model.should_quit);
    assert!(model.controller().is_some_and(|c| c.is_marked()));

    let mut model = model;
    let view = model.close().unwrap();
    assert!(view.markers().is_empty());
    assert!(view.decorated_lines().is_empty());
    assert!(view.registered_commands().next().is_none());
    assert_eq!(model.workspace.view_ids().count(), 0);
    assert!(model.close().is_none());
}

#[test]
fn test_default_model_opens_no_view() {
    let mut model = create_test_model();
    let taken = std::mem::take(&mut model);
    assert_eq!(taken.workspace.view_ids().count(), 1);

    let placeholder = Model::default();
    assert_eq!(placeholder.workspace.view_ids().count(), 0);
    assert!(placeholder.controller().is_none());
    assert!(model.active_view().is_none());
}

#[test]
fn test_save_writes_file_and_marks_clean() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("saved.txt");
    let model = Model::new(path.clone(), "abc", Workspace::default(), (80, 24));
    let mut model = apply(model, [Message::MoveToEnd, Message::InsertChar('d')]);
    assert!(model.is_dirty());

    App::handle_message_side_effects(&mut model, &Message::Save);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "abcd");
    assert!(!model.is_dirty());
    assert_eq!(
        model.active_toast(),
        Some(("Saved saved.txt (4 bytes)", ToastLevel::Info))
    );
}

#[test]
fn test_save_failure_shows_error_toast() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing").join("file.txt");
    let mut model = Model::new(path, "abc", Workspace::default(), (80, 24));
    assert!(save_buffer(&mut model).is_err());

    App::handle_message_side_effects(&mut model, &Message::Save);
    assert!(matches!(model.active_toast(), Some((_, ToastLevel::Error))));
}

#[test]
fn test_dispatch_after_deactivate_reports_error() {
    let mut model = create_test_model();
    model.workspace.deactivate();
    let model = update(model, Message::Mark(MarkCommand::SetMark));
    assert!(matches!(model.active_toast(), Some((_, ToastLevel::Error))));
}

#[test]
fn test_toast_expires() {
    let mut model = update(create_test_model(), Message::Mark(MarkCommand::Toggle));
    model = update(model, Message::ToggleGutter);
    model = update(model, Message::Mark(MarkCommand::Toggle));
    assert!(model.active_toast().is_some());
    assert!(!model.expire_toast(Instant::now()));
    assert!(model.expire_toast(Instant::now() + Duration::from_secs(5)));
    assert!(model.active_toast().is_none());
}

#[test]
fn test_mark_key_bindings() {
    let model = create_test_model();
    let cases = [
        (
            key(KeyCode::Char(' '), KeyModifiers::CONTROL),
            Message::Mark(MarkCommand::Toggle),
        ),
        (
            key(KeyCode::Null, KeyModifiers::NONE),
            Message::Mark(MarkCommand::Toggle),
        ),
        (
            key(KeyCode::Char('m'), KeyModifiers::ALT),
            Message::Mark(MarkCommand::SetMark),
        ),
        (
            key(KeyCode::Char('M'), KeyModifiers::ALT | KeyModifiers::SHIFT),
            Message::Mark(MarkCommand::ClearMark),
        ),
        (
            key(KeyCode::Char('s'), KeyModifiers::ALT),
            Message::Mark(MarkCommand::SelectToMark),
        ),
        (
            key(KeyCode::Char('c'), KeyModifiers::ALT),
            Message::Mark(MarkCommand::SelectToMarkAndCopy),
        ),
        (
            key(KeyCode::Char('x'), KeyModifiers::ALT),
            Message::Mark(MarkCommand::SelectToMarkAndCut),
        ),
        (
            key(KeyCode::Char('g'), KeyModifiers::ALT),
            Message::Mark(MarkCommand::GoToMark),
        ),
        (key(KeyCode::Char('x'), KeyModifiers::CONTROL), Message::CtrlX),
        (
            key(KeyCode::Char('g'), KeyModifiers::CONTROL),
            Message::ToggleGutter,
        ),
    ];
    for (event, expected) in cases {
        assert_eq!(App::handle_key(event, &model), Some(expected), "{event:?}");
    }
}

#[test]
fn test_editing_key_bindings() {
    let model = create_test_model();
    assert_eq!(
        App::handle_key(key(KeyCode::Char('a'), KeyModifiers::NONE), &model),
        Some(Message::InsertChar('a'))
    );
    assert_eq!(
        App::handle_key(key(KeyCode::Char('A'), KeyModifiers::SHIFT), &model),
        Some(Message::InsertChar('A'))
    );
    assert_eq!(
        App::handle_key(key(KeyCode::Enter, KeyModifiers::NONE), &model),
        Some(Message::SplitLine)
    );
    assert_eq!(
        App::handle_key(key(KeyCode::Char('k'), KeyModifiers::CONTROL), &model),
        Some(Message::DeleteLine)
    );
    assert_eq!(
        App::handle_key(key(KeyCode::Char('s'), KeyModifiers::CONTROL), &model),
        Some(Message::Save)
    );
    assert_eq!(
        App::handle_key(key(KeyCode::Char('q'), KeyModifiers::CONTROL), &model),
        Some(Message::Quit)
    );
    assert_eq!(
        App::handle_key(key(KeyCode::Left, KeyModifiers::CONTROL), &model),
        Some(Message::MoveWordLeft)
    );
    assert_eq!(
        App::handle_key(key(KeyCode::Char('z'), KeyModifiers::ALT), &model),
        None
    );
}

#[test]
fn test_key_release_is_ignored() {
    let model = create_test_model();
    let mut event = key(KeyCode::Char('a'), KeyModifiers::NONE);
    event.kind = KeyEventKind::Release;
    assert_eq!(App::handle_key(event, &model), None);
}

#[test]
fn test_esc_cancels_pending_chord() {
    let model = update(create_test_model(), Message::CtrlX);
    let msg = App::handle_key(key(KeyCode::Esc, KeyModifiers::NONE), &model).unwrap();
    let model = update(model, msg);
    assert!(!model.ctrl_x_pending);
}

#[test]
fn test_mouse_click_moves_cursor_past_gutter() {
    let model = create_test_model();
    let click = MouseEvent {
        kind: MouseEventKind::Down(MouseButton::Left),
        column: 5,
        row: 2,
        modifiers: KeyModifiers::NONE,
    };
    // Gutter: indicator, one digit, space.
    assert_eq!(
        App::handle_mouse(click, &model),
        Some(Message::MoveTo(2, 2))
    );

    let below = MouseEvent { row: 20, ..click };
    assert_eq!(App::handle_mouse(below, &model), Some(Message::MoveToEnd));
}

#[test]
fn test_long_line_scrolls_horizontally() {
    let line = format!("{}tail\nshort\n", "a".repeat(80));
    let model = Model::new(PathBuf::from("wide.txt"), &line, Workspace::default(), (60, 10));
    let model = update(model, Message::MoveEnd);
    // 57 text columns after the gutter; the cursor cell past "tail" is the last.
    assert_eq!(model.h_scroll, 28);

    let click = MouseEvent {
        kind: MouseEventKind::Down(MouseButton::Left),
        column: 3,
        row: 0,
        modifiers: KeyModifiers::NONE,
    };
    assert_eq!(
        App::handle_mouse(click, &model),
        Some(Message::MoveTo(0, 28))
    );

    let model = update(model, Message::MoveCursor(Direction::Down));
    assert_eq!(model.cursor_position(), Point::new(1, 5));
    assert_eq!(model.h_scroll, 5);
    let model = update(model, Message::MoveHome);
    assert_eq!(model.h_scroll, 0);
}

#[test]
fn test_mouse_wheel_scrolls() {
    let model = create_test_model();
    let wheel = MouseEvent {
        kind: MouseEventKind::ScrollDown,
        column: 0,
        row: 0,
        modifiers: KeyModifiers::NONE,
    };
    assert_eq!(App::handle_mouse(wheel, &model), Some(Message::ScrollDown(3)));
}

#[test]
fn test_resize_event_is_debounced() {
    let model = create_test_model();
    let mut debouncer = ResizeDebouncer::new(100);
    assert_eq!(
        App::handle_event(&Event::Resize(100, 30), &model, 0, &mut debouncer),
        None
    );
    assert!(debouncer.is_pending());
    assert_eq!(debouncer.take_ready(50), None);
    assert_eq!(debouncer.take_ready(100), Some((100, 30)));
    assert!(!debouncer.is_pending());

    let model = update(model, Message::Resize(100, 30));
    assert_eq!((model.width, model.height), (100, 29));
}
