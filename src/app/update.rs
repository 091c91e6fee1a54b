use crate::app::{Model, ToastLevel};
use crate::editor::{Direction, EditorBuffer};
use crate::mark::MarkCommand;

/// All possible events and actions in the application.
///
/// These represent user input, system events, and internal actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // Cursor
    /// Move cursor in a direction
    MoveCursor(Direction),
    /// Move cursor to beginning of line (Home)
    MoveHome,
    /// Move cursor to end of line (End)
    MoveEnd,
    /// Move cursor one word left (Ctrl+Left)
    MoveWordLeft,
    /// Move cursor one word right (Ctrl+Right)
    MoveWordRight,
    /// Move cursor to start of buffer (Ctrl+Home)
    MoveToStart,
    /// Move cursor to end of buffer (Ctrl+End)
    MoveToEnd,
    /// Move cursor to absolute position (line, col), e.g. from a mouse click
    MoveTo(usize, usize),
    /// Move cursor up one screen
    PageUp,
    /// Move cursor down one screen
    PageDown,
    /// Scroll viewport up by n lines
    ScrollUp(usize),
    /// Scroll viewport down by n lines
    ScrollDown(usize),

    // Editing
    /// Insert a character at the cursor
    InsertChar(char),
    /// Delete character before cursor (Backspace)
    DeleteBack,
    /// Delete character at cursor (Delete)
    DeleteForward,
    /// Split line at cursor (Enter)
    SplitLine,
    /// Delete the cursor line (Ctrl+K)
    DeleteLine,

    // Mark
    /// Run a mark command in the active view
    Mark(MarkCommand),
    /// `Ctrl+X`; a second one in a row swaps cursor and mark
    CtrlX,
    /// Show or hide the line-number gutter
    ToggleGutter,

    // Window
    /// Terminal resized
    Resize(u16, u16),
    /// Redraw screen
    Redraw,

    // Application
    /// Save the buffer to its file
    Save,
    /// Quit the application
    Quit,
}

/// Update the model for one message.
///
/// Saving happens afterwards as a side effect; the only outside state
/// touched here is the clipboard, through the mark copy and cut commands.
pub fn update(mut model: Model, msg: Message) -> Model {
    // Save preserves the quit flag so Ctrl+S can complete a pending quit.
    if !matches!(msg, Message::Quit | Message::Save) {
        model.quit_confirmed = false;
    }
    if !matches!(msg, Message::CtrlX) {
        model.ctrl_x_pending = false;
    }

    match msg {
        Message::MoveCursor(dir) => edit_buffer(&mut model, |buf| buf.move_cursor(dir)),
        Message::MoveHome => edit_buffer(&mut model, EditorBuffer::move_home),
        Message::MoveEnd => edit_buffer(&mut model, EditorBuffer::move_end),
        Message::MoveWordLeft => edit_buffer(&mut model, EditorBuffer::move_word_left),
        Message::MoveWordRight => edit_buffer(&mut model, EditorBuffer::move_word_right),
        Message::MoveToStart => edit_buffer(&mut model, EditorBuffer::move_to_start),
        Message::MoveToEnd => edit_buffer(&mut model, EditorBuffer::move_to_end),
        Message::MoveTo(line, col) => edit_buffer(&mut model, |buf| buf.move_to(line, col)),
        Message::PageUp => {
            let page = usize::from(model.editor_rows().max(1));
            edit_buffer(&mut model, |buf| {
                let cursor = buf.cursor();
                buf.move_to(cursor.line.saturating_sub(page), cursor.col);
            });
        }
        Message::PageDown => {
            let page = usize::from(model.editor_rows().max(1));
            edit_buffer(&mut model, |buf| {
                let cursor = buf.cursor();
                buf.move_to(cursor.line + page, cursor.col);
            });
        }
        Message::ScrollUp(n) => {
            model.scroll_offset = model.scroll_offset.saturating_sub(n);
        }
        Message::ScrollDown(n) => {
            let max = model
                .buffer()
                .map_or(0, |buf| buf.line_count().saturating_sub(1));
            model.scroll_offset = (model.scroll_offset + n).min(max);
        }

        Message::InsertChar(ch) => edit_buffer(&mut model, |buf| buf.insert_char(ch)),
        Message::DeleteBack => edit_buffer(&mut model, |buf| {
            buf.delete_back();
        }),
        Message::DeleteForward => edit_buffer(&mut model, |buf| {
            buf.delete_forward();
        }),
        Message::SplitLine => edit_buffer(&mut model, EditorBuffer::split_line),
        Message::DeleteLine => edit_buffer(&mut model, |buf| {
            buf.delete_line(buf.cursor().line);
        }),

        Message::Mark(command) => run_mark_command(&mut model, command),
        Message::CtrlX => {
            if model.ctrl_x_pending {
                model.ctrl_x_pending = false;
                run_mark_command(&mut model, MarkCommand::SwapWithMark);
            } else {
                model.ctrl_x_pending = true;
            }
        }
        Message::ToggleGutter => {
            let visible = !model.line_numbers_visible();
            model.set_line_numbers_visible(visible);
            model.ensure_cursor_visible();
        }

        Message::Resize(width, height) => {
            model.width = width;
            model.height = height.saturating_sub(1);
            model.ensure_cursor_visible();
        }
        Message::Redraw | Message::Save => {}

        Message::Quit => {
            if model.is_dirty() && !model.quit_confirmed {
                model.show_toast(
                    ToastLevel::Warning,
                    "Unsaved changes! Press Ctrl+Q again to quit, or Ctrl+S to save",
                );
                model.quit_confirmed = true;
            } else {
                model.should_quit = true;
            }
        }
    }
    model
}

fn edit_buffer(model: &mut Model, f: impl FnOnce(&mut EditorBuffer)) {
    if let Err(err) = model.workspace.edit(model.view, f) {
        model.show_toast(ToastLevel::Error, err.to_string());
    }
    model.ensure_cursor_visible();
}

fn run_mark_command(model: &mut Model, command: MarkCommand) {
    let had_range = model
        .mark_position()
        .is_some_and(|mark| mark != model.cursor_position());
    let gutter_hidden = !model.line_numbers_visible();

    if let Err(err) = model.workspace.dispatch(model.view, command.name()) {
        model.show_toast(ToastLevel::Error, err.to_string());
        return;
    }
    crate::perf::log_event("mark.command", format!("{} {command}", model.view));

    match command {
        MarkCommand::Toggle if gutter_hidden => model.show_toast(
            ToastLevel::Info,
            "Line numbers are hidden (Ctrl+G to show); mark unchanged",
        ),
        MarkCommand::SelectToMarkAndCopy if had_range => {
            model.show_toast(ToastLevel::Info, "Copied to clipboard");
        }
        MarkCommand::SelectToMarkAndCut if had_range => {
            model.show_toast(ToastLevel::Info, "Cut to clipboard");
        }
        _ => {}
    }
    model.ensure_cursor_visible();
}
