use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::editor::{EditorBuffer, EditorView, Point};
use crate::mark::{LINE_NUMBER_GUTTER, MarkController, MarkHost};
use crate::workspace::{ViewId, Workspace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
struct Toast {
    level: ToastLevel,
    message: String,
    expires_at: Instant,
}

/// The complete application state.
///
/// All state lives here - no global or scattered state.
pub struct Model {
    /// Open views and their mark controllers
    pub workspace: Workspace,
    /// The view being edited
    pub view: ViewId,
    /// Path the buffer is saved to
    pub file_path: PathBuf,
    /// Line index of the first visible line
    pub scroll_offset: usize,
    /// Display column of the first visible text cell
    pub h_scroll: usize,
    /// Terminal width in columns
    pub width: u16,
    /// Rows available to the editor (terminal height minus the status bar)
    pub height: u16,
    toast: Option<Toast>,
    /// Whether the app should quit
    pub should_quit: bool,
    /// Set after first quit attempt with unsaved changes; allows second quit to proceed
    pub quit_confirmed: bool,
    /// First half of the `Ctrl+X Ctrl+X` chord was seen
    pub ctrl_x_pending: bool,
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("view", &self.view)
            .field("file_path", &self.file_path)
            .field("scroll_offset", &self.scroll_offset)
            .field("h_scroll", &self.h_scroll)
            .field("should_quit", &self.should_quit)
            .finish_non_exhaustive()
    }
}

impl Default for Model {
    fn default() -> Self {
        Self {
            workspace: Workspace::default(),
            view: ViewId::default(),
            file_path: PathBuf::new(),
            scroll_offset: 0,
            h_scroll: 0,
            width: 80,
            height: 23,
            toast: None,
            should_quit: false,
            quit_confirmed: false,
            ctrl_x_pending: false,
        }
    }
}

impl Model {
    /// Open `text` as a new view in `workspace`.
    pub fn new(
        file_path: PathBuf,
        text: &str,
        mut workspace: Workspace,
        terminal_size: (u16, u16),
    ) -> Self {
        let view = workspace.open_view(text);
        Self {
            workspace,
            view,
            file_path,
            width: terminal_size.0,
            height: terminal_size.1.saturating_sub(1),
            ..Self::default()
        }
    }

    /// Close the active view, disposing its mark controller.
    pub fn close(&mut self) -> Option<EditorView> {
        let view = self.workspace.close_view(self.view).ok()?;
        crate::perf::log_event(
            "app.close",
            format!(
                "lines={} dirty={}",
                view.buffer().line_count(),
                view.buffer().is_dirty()
            ),
        );
        Some(view)
    }

    pub fn active_view(&self) -> Option<&EditorView> {
        self.workspace.view(self.view)
    }

    pub fn buffer(&self) -> Option<&EditorBuffer> {
        self.active_view().map(EditorView::buffer)
    }

    pub fn controller(&self) -> Option<&MarkController> {
        self.workspace.controller(self.view)
    }

    pub fn cursor_position(&self) -> Point {
        self.buffer()
            .map_or_else(Point::default, |buf| buf.cursor().point())
    }

    pub fn mark_position(&self) -> Option<Point> {
        let view = self.active_view()?;
        self.controller()?.mark_position(view)
    }

    pub fn line_numbers_visible(&self) -> bool {
        self.active_view()
            .is_some_and(|view| view.gutter_visible(LINE_NUMBER_GUTTER))
    }

    pub fn set_line_numbers_visible(&mut self, visible: bool) {
        if let Some(view) = self.workspace.view_mut(self.view) {
            view.set_gutter_visible(LINE_NUMBER_GUTTER, visible);
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.buffer().is_some_and(EditorBuffer::is_dirty)
    }

    /// Scroll so the cursor cell is on screen.
    pub(super) fn ensure_cursor_visible(&mut self) {
        let cursor = self.cursor_position();
        let visible_height = usize::from(self.editor_rows());
        self.scroll_offset = scroll_to_show(self.scroll_offset, cursor.line, visible_height);

        let text_width = usize::from(self.width.saturating_sub(crate::ui::gutter_width(self)));
        let cursor_x = self
            .buffer()
            .and_then(|buf| buf.line_at(cursor.line))
            .map_or(0, |line| crate::ui::cell_col(&line, cursor.col));
        self.h_scroll = scroll_to_show(self.h_scroll, cursor_x, text_width);
    }

    /// Rows left for text once the toast bar (if any) is drawn.
    pub fn editor_rows(&self) -> u16 {
        self.height.saturating_sub(u16::from(self.toast.is_some()))
    }

    pub(super) fn show_toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.toast = Some(Toast {
            level,
            message: message.into(),
            expires_at: Instant::now() + Duration::from_secs(4),
        });
    }

    pub(super) fn expire_toast(&mut self, now: Instant) -> bool {
        if self
            .toast
            .as_ref()
            .is_some_and(|toast| toast.expires_at <= now)
        {
            self.toast = None;
            return true;
        }
        false
    }

    pub fn active_toast(&self) -> Option<(&str, ToastLevel)> {
        self.toast
            .as_ref()
            .map(|toast| (toast.message.as_str(), toast.level))
    }
}

/// New offset of a `size`-wide window at `offset` so that `target` is inside it.
const fn scroll_to_show(offset: usize, target: usize, size: usize) -> usize {
    if size == 0 || target < offset {
        target
    } else if target >= offset + size {
        target + 1 - size
    } else {
        offset
    }
}
