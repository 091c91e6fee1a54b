use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};

use crate::app::{App, Message, Model};
use crate::editor::Direction;
use crate::mark::MarkCommand;

use super::event_loop::ResizeDebouncer;

impl App {
    pub(super) fn handle_event(
        event: &Event,
        model: &Model,
        now_ms: u64,
        resize_debouncer: &mut ResizeDebouncer,
    ) -> Option<Message> {
        match *event {
            Event::Key(key) => Self::handle_key(key, model),
            Event::Mouse(mouse) => Self::handle_mouse(mouse, model),
            Event::Resize(w, h) => {
                crate::perf::log_event("event.resize.queue", format!("width={w} height={h}"));
                resize_debouncer.queue(w, h, now_ms);
                None
            }
            _ => None,
        }
    }

    pub(super) fn handle_key(key: KeyEvent, model: &Model) -> Option<Message> {
        if key.kind == KeyEventKind::Release {
            return None;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);

        if alt {
            return match key.code {
                KeyCode::Char('m') => Some(Message::Mark(MarkCommand::SetMark)),
                KeyCode::Char('M') => Some(Message::Mark(MarkCommand::ClearMark)),
                KeyCode::Char('s') => Some(Message::Mark(MarkCommand::SelectToMark)),
                KeyCode::Char('c') => Some(Message::Mark(MarkCommand::SelectToMarkAndCopy)),
                KeyCode::Char('x') => Some(Message::Mark(MarkCommand::SelectToMarkAndCut)),
                KeyCode::Char('g') => Some(Message::Mark(MarkCommand::GoToMark)),
                _ => None,
            };
        }

        if ctrl {
            return match key.code {
                KeyCode::Char(' ' | '@') => Some(Message::Mark(MarkCommand::Toggle)),
                KeyCode::Char('x') => Some(Message::CtrlX),
                KeyCode::Char('g') => Some(Message::ToggleGutter),
                KeyCode::Char('k') => Some(Message::DeleteLine),
                KeyCode::Char('s') => Some(Message::Save),
                KeyCode::Char('q') => Some(Message::Quit),
                KeyCode::Char('l') => Some(Message::Redraw),
                KeyCode::Left => Some(Message::MoveWordLeft),
                KeyCode::Right => Some(Message::MoveWordRight),
                KeyCode::Home => Some(Message::MoveToStart),
                KeyCode::End => Some(Message::MoveToEnd),
                _ => None,
            };
        }

        match key.code {
            // Some terminals report Ctrl+Space as NUL with no modifiers.
            KeyCode::Null => Some(Message::Mark(MarkCommand::Toggle)),
            KeyCode::Char(c) => Some(Message::InsertChar(c)),
            KeyCode::Enter => Some(Message::SplitLine),
            KeyCode::Backspace => Some(Message::DeleteBack),
            KeyCode::Delete => Some(Message::DeleteForward),
            KeyCode::Up => Some(Message::MoveCursor(Direction::Up)),
            KeyCode::Down => Some(Message::MoveCursor(Direction::Down)),
            KeyCode::Left => Some(Message::MoveCursor(Direction::Left)),
            KeyCode::Right => Some(Message::MoveCursor(Direction::Right)),
            KeyCode::Home => Some(Message::MoveHome),
            KeyCode::End => Some(Message::MoveEnd),
            KeyCode::PageUp => Some(Message::PageUp),
            KeyCode::PageDown => Some(Message::PageDown),
            KeyCode::Esc if model.ctrl_x_pending => Some(Message::Redraw),
            _ => None,
        }
    }

    pub(super) fn handle_mouse(mouse: MouseEvent, model: &Model) -> Option<Message> {
        match mouse.kind {
            MouseEventKind::ScrollUp => Some(Message::ScrollUp(3)),
            MouseEventKind::ScrollDown => Some(Message::ScrollDown(3)),
            MouseEventKind::Down(MouseButton::Left) => {
                if mouse.row >= model.editor_rows() {
                    return None;
                }
                let buf = model.buffer()?;
                let line = model.scroll_offset + usize::from(mouse.row);
                if line >= buf.line_count() {
                    return Some(Message::MoveToEnd);
                }
                let gutter = crate::ui::gutter_width(model);
                let x = usize::from(mouse.column.saturating_sub(gutter)) + model.h_scroll;
                let text = buf.line_at(line).unwrap_or_default();
                Some(Message::MoveTo(line, crate::ui::byte_col_at(&text, x)))
            }
            _ => None,
        }
    }
}
