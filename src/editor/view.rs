use std::collections::BTreeMap;

use tracing::warn;

use super::buffer::{EditorBuffer, Point, Range};
use super::markers::{Decoration, DecorationId, MarkerEvent, MarkerId, MarkerStore, Subscription};
use crate::clipboard::ClipboardHandle;
use crate::mark::{CommandRegistration, LINE_NUMBER_GUTTER, MarkCommand, MarkHost};

/// One open editor: a buffer, the markers tracking positions in it, its
/// gutters and the commands registered in its scope.
pub struct EditorView {
    buffer: EditorBuffer,
    markers: MarkerStore,
    gutters: BTreeMap<String, bool>,
    clipboard: ClipboardHandle,
    commands: BTreeMap<&'static str, (u64, MarkCommand)>,
    next_registration: u64,
}

impl EditorView {
    pub fn new(buffer: EditorBuffer, clipboard: ClipboardHandle) -> Self {
        let mut gutters = BTreeMap::new();
        gutters.insert(LINE_NUMBER_GUTTER.to_string(), true);
        Self {
            buffer,
            markers: MarkerStore::new(),
            gutters,
            clipboard,
            commands: BTreeMap::new(),
            next_registration: 0,
        }
    }

    pub const fn buffer(&self) -> &EditorBuffer {
        &self.buffer
    }

    pub const fn markers(&self) -> &MarkerStore {
        &self.markers
    }

    /// Run `f` against the buffer, then move markers to follow whatever it
    /// changed.
    pub fn edit<R>(&mut self, f: impl FnOnce(&mut EditorBuffer) -> R) -> R {
        let result = f(&mut self.buffer);
        self.sync_markers();
        result
    }

    pub fn set_gutter_visible(&mut self, name: &str, visible: bool) {
        self.gutters.insert(name.to_string(), visible);
    }

    /// The command bound to `name` in this view's scope.
    pub fn resolve_command(&self, name: &str) -> Option<MarkCommand> {
        self.commands.get(name).map(|(_, command)| *command)
    }

    pub fn registered_commands(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.commands.keys().copied()
    }

    /// Lines carrying a line-number decoration, with the decoration class.
    pub fn decorated_lines(&self) -> Vec<(usize, &str)> {
        self.markers
            .decorations()
            .map(|(idx, decoration)| {
                (self.buffer.char_to_point(idx).line, decoration.class.as_str())
            })
            .collect()
    }

    /// Notifications raised by edits since the last call.
    pub fn take_marker_events(&mut self) -> Vec<MarkerEvent> {
        self.markers.drain_events()
    }

    fn sync_markers(&mut self) {
        for edit in self.buffer.take_edits() {
            self.markers.apply(edit);
        }
    }
}

impl MarkHost for EditorView {
    fn cursor_position(&self) -> Point {
        self.buffer.cursor().point()
    }

    fn set_cursor_position(&mut self, point: Point) {
        self.buffer.move_to(point.line, point.col);
    }

    fn set_selected_range(&mut self, range: Range) {
        self.buffer.select(range);
    }

    fn clear_selection(&mut self) {
        self.buffer.clear_selection();
    }

    fn copy_selected_text(&mut self) {
        let Some(text) = self.buffer.selected_text() else {
            return;
        };
        if let Err(err) = self.clipboard.borrow_mut().write(&text) {
            warn!(%err, "clipboard write failed");
        }
    }

    fn cut_selected_text(&mut self) {
        if self.buffer.selection().is_none() {
            return;
        }
        self.copy_selected_text();
        self.edit(EditorBuffer::delete_selection);
    }

    fn create_marker(&mut self, point: Point) -> MarkerId {
        let idx = self.buffer.point_to_char(point);
        self.markers.create(idx)
    }

    fn destroy_marker(&mut self, marker: MarkerId) {
        self.markers.destroy(marker);
    }

    fn marker_position(&self, marker: MarkerId) -> Option<Point> {
        self.markers
            .position(marker)
            .map(|idx| self.buffer.char_to_point(idx))
    }

    fn set_marker_position(&mut self, marker: MarkerId, point: Point) {
        let idx = self.buffer.point_to_char(point);
        self.markers.set_position(marker, idx);
    }

    fn subscribe_invalidation(&mut self, marker: MarkerId) -> Subscription {
        self.markers.subscribe(marker)
    }

    fn cancel_subscription(&mut self, subscription: Subscription) {
        self.markers.cancel(subscription);
    }

    fn decorate_marker(&mut self, marker: MarkerId, decoration: Decoration) -> Option<DecorationId> {
        self.markers.decorate(marker, decoration)
    }

    fn remove_decoration(&mut self, decoration: DecorationId) {
        self.markers.remove_decoration(decoration);
    }

    fn gutter_visible(&self, name: &str) -> bool {
        self.gutters.get(name).copied().unwrap_or(false)
    }

    fn register_commands(&mut self, bindings: &[(&'static str, MarkCommand)]) -> CommandRegistration {
        self.next_registration += 1;
        let id = self.next_registration;
        for (name, command) in bindings {
            self.commands.insert(*name, (id, *command));
        }
        CommandRegistration::new(id)
    }

    fn unregister_commands(&mut self, registration: &mut CommandRegistration) {
        let id = registration.id();
        self.commands.retain(|_, (owner, _)| *owner != id);
        registration.mark_disposed();
    }
}

impl std::fmt::Debug for EditorView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorView")
            .field("buffer", &self.buffer)
            .field("markers", &self.markers.len())
            .field("gutters", &self.gutters)
            .field("commands", &self.commands.len())
            .finish_non_exhaustive()
    }
}
