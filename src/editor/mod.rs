//! Lightweight editor model.
//!
//! Provides a rope-backed text buffer with cursor and selection, markers
//! that track positions through edits, and the [`EditorView`] that exposes
//! both to a [`MarkController`](crate::mark::MarkController).

mod buffer;
mod markers;
mod view;

pub use buffer::{Cursor, Direction, Edit, EditorBuffer, Point, Range};
pub use markers::{
    Decoration, DecorationId, DecorationKind, MarkerEvent, MarkerId, MarkerStore, Subscription,
};
pub use view::EditorView;
