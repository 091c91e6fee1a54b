//! Open views and their mark controllers.
//!
//! The workspace is the dispatcher: it resolves `mark:*` names in a view's
//! command scope, runs them on that view's controller, and hands queued
//! marker invalidations back to the controller after every command or edit.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::debug;

use crate::clipboard::{ClipboardHandle, MemoryClipboard};
use crate::editor::{EditorBuffer, EditorView, MarkerEvent};
use crate::mark::{CommandError, MarkCommand, MarkController, MarkOptions};

/// Identifies an open view. The default id never names an open view.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ViewId(u64);

impl std::fmt::Display for ViewId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "view#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkspaceError {
    #[error("no open view {0}")]
    UnknownView(ViewId),
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error("{0} is not registered in this view")]
    NotRegistered(String),
}

#[derive(Debug)]
struct Slot {
    view: EditorView,
    controller: Option<MarkController>,
}

impl Slot {
    fn deliver_marker_events(&mut self) {
        let Some(controller) = self.controller.as_mut() else {
            return;
        };
        for MarkerEvent::Invalidated(subscription) in self.view.take_marker_events() {
            controller.handle_invalidated(subscription, &mut self.view);
        }
    }
}

#[derive(Debug)]
pub struct Workspace {
    views: BTreeMap<ViewId, Slot>,
    next_id: u64,
    clipboard: ClipboardHandle,
    options: MarkOptions,
    deactivated: bool,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new(MemoryClipboard::handle(), MarkOptions::default())
    }
}

impl Workspace {
    pub fn new(clipboard: ClipboardHandle, options: MarkOptions) -> Self {
        Self {
            views: BTreeMap::new(),
            next_id: 0,
            clipboard,
            options,
            deactivated: false,
        }
    }

    /// Open a view on `text`. Unless the workspace was deactivated, a mark
    /// controller is attached to it.
    pub fn open_view(&mut self, text: &str) -> ViewId {
        self.next_id += 1;
        let id = ViewId(self.next_id);
        let mut view = EditorView::new(EditorBuffer::from_text(text), self.clipboard.clone());
        let controller =
            (!self.deactivated).then(|| MarkController::attach(&mut view, self.options.clone()));
        self.views.insert(id, Slot { view, controller });
        debug!(%id, "view opened");
        id
    }

    /// Close a view, disposing its controller first.
    ///
    /// # Errors
    /// Returns [`WorkspaceError::UnknownView`] if `id` is not open.
    pub fn close_view(&mut self, id: ViewId) -> Result<EditorView, WorkspaceError> {
        let mut slot = self
            .views
            .remove(&id)
            .ok_or(WorkspaceError::UnknownView(id))?;
        if let Some(controller) = slot.controller.as_mut() {
            controller.dispose(&mut slot.view);
        }
        debug!(%id, "view closed");
        Ok(slot.view)
    }

    /// Run the command `name` in the scope of view `id`.
    ///
    /// # Errors
    /// Fails if the view is not open, the name is not a mark command, or the
    /// view has no binding for it (for example after deactivation).
    pub fn dispatch(&mut self, id: ViewId, name: &str) -> Result<(), WorkspaceError> {
        let command: MarkCommand = name.parse()?;
        let slot = self
            .views
            .get_mut(&id)
            .ok_or(WorkspaceError::UnknownView(id))?;
        let bound = slot
            .view
            .resolve_command(name)
            .ok_or_else(|| WorkspaceError::NotRegistered(name.to_string()))?;
        debug_assert_eq!(bound, command);
        if let Some(controller) = slot.controller.as_mut() {
            controller.execute(bound, &mut slot.view);
        }
        slot.deliver_marker_events();
        Ok(())
    }

    /// Apply `f` to the buffer of view `id`, then deliver any invalidations
    /// the edit caused.
    ///
    /// # Errors
    /// Returns [`WorkspaceError::UnknownView`] if `id` is not open.
    pub fn edit<R>(
        &mut self,
        id: ViewId,
        f: impl FnOnce(&mut EditorBuffer) -> R,
    ) -> Result<R, WorkspaceError> {
        let slot = self
            .views
            .get_mut(&id)
            .ok_or(WorkspaceError::UnknownView(id))?;
        let result = slot.view.edit(f);
        slot.deliver_marker_events();
        Ok(result)
    }

    /// Dispose every controller. Views stay open without mark commands, and
    /// views opened later get no controller.
    pub fn deactivate(&mut self) {
        for slot in self.views.values_mut() {
            if let Some(controller) = slot.controller.as_mut() {
                controller.dispose(&mut slot.view);
            }
        }
        self.deactivated = true;
        debug!("mark commands deactivated");
    }

    pub fn view(&self, id: ViewId) -> Option<&EditorView> {
        self.views.get(&id).map(|slot| &slot.view)
    }

    pub fn view_mut(&mut self, id: ViewId) -> Option<&mut EditorView> {
        self.views.get_mut(&id).map(|slot| &mut slot.view)
    }

    pub fn controller(&self, id: ViewId) -> Option<&MarkController> {
        self.views.get(&id).and_then(|slot| slot.controller.as_ref())
    }

    pub fn view_ids(&self) -> impl Iterator<Item = ViewId> + '_ {
        self.views.keys().copied()
    }

    pub fn clipboard(&self) -> &ClipboardHandle {
        &self.clipboard
    }

    pub const fn options(&self) -> &MarkOptions {
        &self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::Point;
    use crate::mark::{LINE_NUMBER_GUTTER, MarkHost};

    fn mark_point(ws: &Workspace, id: ViewId) -> Option<Point> {
        let view = ws.view(id)?;
        ws.controller(id)?.mark_position(view)
    }

    #[test]
    fn test_open_view_registers_commands() {
        let mut ws = Workspace::default();
        let id = ws.open_view("hello");
        assert_eq!(ws.view(id).map(|v| v.registered_commands().count()), Some(9));
        assert!(ws.controller(id).is_some_and(|c| !c.is_marked()));
    }

    #[test]
    fn test_debug_output_includes_clipboard() {
        let mut ws = Workspace::default();
        ws.open_view("hello");
        let debug = format!("{ws:?}");
        assert!(debug.contains("MemoryClipboard"));
        assert!(debug.contains("views"));
        assert!(!format!("{:?}", ViewId::default()).is_empty());
    }

    #[test]
    fn test_dispatch_toggle_sets_mark() {
        let mut ws = Workspace::default();
        let id = ws.open_view("one\ntwo");
        ws.edit(id, |buf| buf.move_to(1, 1)).unwrap();
        ws.dispatch(id, "mark:toggle").unwrap();
        assert_eq!(mark_point(&ws, id), Some(Point::new(1, 1)));
        assert_eq!(ws.view(id).unwrap().decorated_lines(), vec![(1, "marked")]);
    }

    #[test]
    fn test_dispatch_unknown_name() {
        let mut ws = Workspace::default();
        let id = ws.open_view("");
        assert_eq!(
            ws.dispatch(id, "mark:pop"),
            Err(WorkspaceError::Command(CommandError::Unknown(
                "mark:pop".to_string()
            )))
        );
    }

    #[test]
    fn test_dispatch_unknown_view() {
        let mut ws = Workspace::default();
        let id = ws.open_view("");
        ws.close_view(id).unwrap();
        assert_eq!(
            ws.dispatch(id, "mark:toggle"),
            Err(WorkspaceError::UnknownView(id))
        );
    }

    #[test]
    fn test_marks_are_per_view() {
        let mut ws = Workspace::default();
        let a = ws.open_view("a\nb");
        let b = ws.open_view("c\nd");
        ws.dispatch(a, "mark:set-mark").unwrap();
        assert!(ws.controller(a).unwrap().is_marked());
        assert!(!ws.controller(b).unwrap().is_marked());
    }

    #[test]
    fn test_edit_deleting_marked_line_clears_mark() {
        let mut ws = Workspace::default();
        let id = ws.open_view("a\nb\nc");
        ws.edit(id, |buf| buf.move_to(1, 0)).unwrap();
        ws.dispatch(id, "mark:set-mark").unwrap();
        ws.edit(id, |buf| buf.delete_line(1)).unwrap();
        assert!(!ws.controller(id).unwrap().is_marked());
        assert!(ws.view(id).unwrap().markers().is_empty());
    }

    #[test]
    fn test_edit_above_mark_moves_it() {
        let mut ws = Workspace::default();
        let id = ws.open_view("a\nb\nc");
        ws.edit(id, |buf| buf.move_to(2, 1)).unwrap();
        ws.dispatch(id, "mark:set-mark").unwrap();
        ws.edit(id, |buf| {
            buf.move_to(0, 0);
            buf.insert_str("new\n");
        })
        .unwrap();
        assert_eq!(mark_point(&ws, id), Some(Point::new(3, 1)));
    }

    #[test]
    fn test_cut_across_mark_line_delivers_nothing_stale() {
        let mut ws = Workspace::default();
        let id = ws.open_view("zero\none\ntwo\nthree");
        ws.edit(id, |buf| buf.move_to(1, 0)).unwrap();
        ws.dispatch(id, "mark:set-mark").unwrap();
        ws.edit(id, |buf| buf.move_to(3, 0)).unwrap();
        ws.dispatch(id, "mark:select-to-mark-and-cut").unwrap();
        assert_eq!(ws.view(id).unwrap().buffer().text(), "zero\nthree");
        assert_eq!(
            ws.clipboard().borrow().contents().as_deref(),
            Some("one\ntwo\n")
        );
        assert!(!ws.controller(id).unwrap().is_marked());
    }

    #[test]
    fn test_clipboard_is_shared_between_views() {
        let mut ws = Workspace::default();
        let a = ws.open_view("alpha\nbeta");
        ws.dispatch(a, "mark:set-mark").unwrap();
        ws.edit(a, |buf| buf.move_to(0, 5)).unwrap();
        ws.dispatch(a, "mark:select-to-mark-and-copy").unwrap();
        let b = ws.open_view("");
        ws.edit(b, |buf| buf.insert_str("x")).unwrap();
        assert_eq!(ws.clipboard().borrow().contents().as_deref(), Some("alpha"));
    }

    #[test]
    fn test_toggle_respects_hidden_gutter() {
        let mut ws = Workspace::default();
        let id = ws.open_view("a");
        ws.view_mut(id)
            .unwrap()
            .set_gutter_visible(LINE_NUMBER_GUTTER, false);
        ws.dispatch(id, "mark:toggle").unwrap();
        assert!(!ws.controller(id).unwrap().is_marked());
        assert!(!ws.view(id).unwrap().gutter_visible(LINE_NUMBER_GUTTER));
    }

    #[test]
    fn test_close_view_disposes_controller() {
        let mut ws = Workspace::default();
        let id = ws.open_view("a\nb");
        ws.dispatch(id, "mark:set-mark").unwrap();
        let view = ws.close_view(id).unwrap();
        assert_eq!(view.registered_commands().count(), 0);
        assert!(view.markers().is_empty());
        assert_eq!(ws.close_view(id).unwrap_err(), WorkspaceError::UnknownView(id));
    }

    #[test]
    fn test_deactivate_unregisters_everything() {
        let mut ws = Workspace::default();
        let id = ws.open_view("a\nb");
        ws.dispatch(id, "mark:set-mark").unwrap();
        ws.deactivate();
        assert!(ws.controller(id).unwrap().is_disposed());
        assert_eq!(
            ws.dispatch(id, "mark:set-mark"),
            Err(WorkspaceError::NotRegistered("mark:set-mark".to_string()))
        );
        let later = ws.open_view("c");
        assert!(ws.controller(later).is_none());
        assert!(ws.dispatch(later, "mark:toggle").is_err());
    }
}
