//! The single-mark controller.
//!
//! One [`MarkController`] lives per editor view. It remembers at most one
//! mark (a marker in the host buffer with a line-number decoration) and
//! turns the `mark:*` commands into cursor, selection and clipboard calls
//! on a [`MarkHost`].
//!
//! Every guard (no mark, mark on the cursor, hidden gutter, disposed
//! controller) is a silent no-op.

mod command;

pub use command::{CommandError, MarkCommand};

use tracing::{debug, trace};

use crate::editor::{Decoration, DecorationId, MarkerId, Point, Range, Subscription};

/// Name of the gutter whose visibility gates [`MarkController::toggle`].
pub const LINE_NUMBER_GUTTER: &str = "line-number";

/// Decoration class used when none is configured.
pub const DEFAULT_MARK_CLASS: &str = "marked";

/// Services a view provides to its mark controller.
pub trait MarkHost {
    fn cursor_position(&self) -> Point;
    /// Move the cursor, collapsing any selection.
    fn set_cursor_position(&mut self, point: Point);
    fn set_selected_range(&mut self, range: Range);
    fn clear_selection(&mut self);
    fn copy_selected_text(&mut self);
    fn cut_selected_text(&mut self);

    fn create_marker(&mut self, point: Point) -> MarkerId;
    fn destroy_marker(&mut self, marker: MarkerId);
    fn marker_position(&self, marker: MarkerId) -> Option<Point>;
    fn set_marker_position(&mut self, marker: MarkerId, point: Point);
    fn subscribe_invalidation(&mut self, marker: MarkerId) -> Subscription;
    fn cancel_subscription(&mut self, subscription: Subscription);

    fn decorate_marker(&mut self, marker: MarkerId, decoration: Decoration)
    -> Option<DecorationId>;
    fn remove_decoration(&mut self, decoration: DecorationId);

    fn gutter_visible(&self, name: &str) -> bool;

    fn register_commands(&mut self, bindings: &[(&'static str, MarkCommand)])
    -> CommandRegistration;
    /// Drop every binding made under `registration` and mark it disposed.
    fn unregister_commands(&mut self, registration: &mut CommandRegistration);
}

/// Handle to a set of command bindings made in one view's scope.
#[derive(Debug, PartialEq, Eq)]
pub struct CommandRegistration {
    id: u64,
    disposed: bool,
}

impl CommandRegistration {
    pub const fn new(id: u64) -> Self {
        Self {
            id,
            disposed: false,
        }
    }

    pub const fn id(&self) -> u64 {
        self.id
    }

    pub const fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub const fn mark_disposed(&mut self) {
        self.disposed = true;
    }
}

/// Whether select-to-mark-and-copy/cut clear the mark when nothing was
/// selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClearPolicy {
    /// Copy or cut, collapse and clear run unconditionally, even after a
    /// select-to-mark that selected nothing.
    #[default]
    Always,
    /// Nothing runs unless select-to-mark produced a selection, so the
    /// mark survives a degenerate copy or cut.
    OnSelection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkOptions {
    pub clear_policy: ClearPolicy,
    pub decoration_class: String,
}

impl Default for MarkOptions {
    fn default() -> Self {
        Self {
            clear_policy: ClearPolicy::default(),
            decoration_class: DEFAULT_MARK_CLASS.to_string(),
        }
    }
}

/// The live mark: marker, its decoration and its invalidation subscription.
/// All three are released together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ActiveMark {
    marker: MarkerId,
    decoration: Option<DecorationId>,
    subscription: Subscription,
}

impl ActiveMark {
    fn release<H: MarkHost + ?Sized>(self, host: &mut H) {
        host.cancel_subscription(self.subscription);
        if let Some(decoration) = self.decoration {
            host.remove_decoration(decoration);
        }
        host.destroy_marker(self.marker);
    }
}

#[derive(Debug)]
pub struct MarkController {
    registration: CommandRegistration,
    mark: Option<ActiveMark>,
    attached: bool,
    options: MarkOptions,
}

impl MarkController {
    /// Register the `mark:*` commands in `host`'s scope and return the
    /// controller that serves them.
    pub fn attach<H: MarkHost + ?Sized>(host: &mut H, options: MarkOptions) -> Self {
        let registration = host.register_commands(&MarkCommand::BINDINGS);
        debug!(registration = registration.id(), "mark controller attached");
        Self {
            registration,
            mark: None,
            attached: true,
            options,
        }
    }

    pub const fn is_marked(&self) -> bool {
        self.mark.is_some()
    }

    pub const fn is_disposed(&self) -> bool {
        self.registration.is_disposed()
    }

    pub const fn options(&self) -> &MarkOptions {
        &self.options
    }

    /// Where the mark currently is, if one is set.
    pub fn mark_position<H: MarkHost + ?Sized>(&self, host: &H) -> Option<Point> {
        let mark = self.mark?;
        host.marker_position(mark.marker)
    }

    /// Run the method bound to `command`.
    pub fn execute<H: MarkHost + ?Sized>(&mut self, command: MarkCommand, host: &mut H) {
        if !self.attached {
            trace!(%command, "ignored: controller disposed");
            return;
        }
        match command {
            MarkCommand::Toggle => self.toggle(host),
            MarkCommand::SetMark => self.set_mark(host),
            MarkCommand::ClearMark => self.clear_mark(host),
            MarkCommand::SelectToMark => {
                self.select_to_mark(host);
            }
            MarkCommand::SelectToMarkAndCopy => self.select_to_mark_and_copy(host),
            MarkCommand::SelectToMarkAndCut => self.select_to_mark_and_cut(host),
            MarkCommand::GoToMark => self.go_to_mark(host),
            MarkCommand::SwapWithMark => self.swap_with_mark(host),
        }
    }

    /// Drop any existing mark and set a new one at the cursor.
    pub fn set_mark<H: MarkHost + ?Sized>(&mut self, host: &mut H) {
        if !self.attached {
            return;
        }
        self.clear_mark(host);

        let point = host.cursor_position();
        let marker = host.create_marker(point);
        let decoration = host.decorate_marker(
            marker,
            Decoration::line_number(self.options.decoration_class.clone()),
        );
        let subscription = host.subscribe_invalidation(marker);
        self.mark = Some(ActiveMark {
            marker,
            decoration,
            subscription,
        });
        debug!(%point, "mark set");
    }

    pub fn clear_mark<H: MarkHost + ?Sized>(&mut self, host: &mut H) {
        let Some(mark) = self.mark.take() else {
            return;
        };
        mark.release(host);
        debug!("mark cleared");
    }

    /// Clear the mark if there is one, set it otherwise. Does nothing while
    /// the line-number gutter is hidden, since the mark would be invisible.
    pub fn toggle<H: MarkHost + ?Sized>(&mut self, host: &mut H) {
        if !self.attached {
            return;
        }
        if !host.gutter_visible(LINE_NUMBER_GUTTER) {
            trace!("toggle ignored: line-number gutter hidden");
            return;
        }
        if self.mark.is_some() {
            self.clear_mark(host);
        } else {
            self.set_mark(host);
        }
    }

    /// Select from the mark to the cursor. Returns whether a selection was made.
    pub fn select_to_mark<H: MarkHost + ?Sized>(&mut self, host: &mut H) -> bool {
        if !self.attached {
            return false;
        }
        let Some(mark) = self.mark_position(host) else {
            trace!("select-to-mark ignored: no mark");
            return false;
        };
        let cursor = host.cursor_position();
        if mark == cursor {
            trace!("select-to-mark ignored: mark is on the cursor");
            return false;
        }
        host.set_selected_range(Range::new(mark, cursor));
        true
    }

    pub fn select_to_mark_and_copy<H: MarkHost + ?Sized>(&mut self, host: &mut H) {
        if !self.attached {
            return;
        }
        let selected = self.select_to_mark(host);
        if !selected && self.options.clear_policy == ClearPolicy::OnSelection {
            return;
        }
        host.copy_selected_text();
        host.clear_selection();
        self.clear_mark(host);
    }

    pub fn select_to_mark_and_cut<H: MarkHost + ?Sized>(&mut self, host: &mut H) {
        if !self.attached {
            return;
        }
        let selected = self.select_to_mark(host);
        if !selected && self.options.clear_policy == ClearPolicy::OnSelection {
            return;
        }
        host.cut_selected_text();
        self.clear_mark(host);
    }

    /// Move the cursor onto the mark. The mark stays.
    pub fn go_to_mark<H: MarkHost + ?Sized>(&mut self, host: &mut H) {
        if !self.attached {
            return;
        }
        if let Some(mark) = self.mark_position(host) {
            host.set_cursor_position(mark);
        }
    }

    /// Exchange the cursor and mark positions.
    pub fn swap_with_mark<H: MarkHost + ?Sized>(&mut self, host: &mut H) {
        if !self.attached {
            return;
        }
        let Some(mark) = self.mark else {
            return;
        };
        let Some(mark_point) = host.marker_position(mark.marker) else {
            return;
        };
        let cursor = host.cursor_position();
        if mark_point == cursor {
            return;
        }
        host.set_marker_position(mark.marker, cursor);
        host.set_cursor_position(mark_point);
        debug!(mark = %cursor, cursor = %mark_point, "swapped cursor and mark");
    }

    /// Invalidation callback. Clears the mark when `subscription` belongs to
    /// it; stale subscriptions are ignored.
    pub fn handle_invalidated<H: MarkHost + ?Sized>(
        &mut self,
        subscription: Subscription,
        host: &mut H,
    ) {
        if self.mark.is_some_and(|mark| mark.subscription == subscription) {
            debug!("marked text removed");
            self.clear_mark(host);
        } else {
            trace!(?subscription, "stale invalidation ignored");
        }
    }

    /// Release the command bindings and the mark. Safe to call repeatedly.
    pub fn dispose<H: MarkHost + ?Sized>(&mut self, host: &mut H) {
        if self.registration.is_disposed() {
            return;
        }
        host.unregister_commands(&mut self.registration);
        self.registration.mark_disposed();
        self.clear_mark(host);
        self.attached = false;
        debug!(registration = self.registration.id(), "mark controller disposed");
    }
}
