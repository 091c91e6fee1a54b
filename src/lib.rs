// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. mark::MarkCommand)
    clippy::module_name_repetitions
)]

//! # Editmark
//!
//! A terminal text editor built around a single, emacs-style mark.
//!
//! One mark per editor view remembers a buffer position. It is shown in the
//! line-number gutter, follows edits, and anchors range commands:
//! - toggle, set and clear the mark
//! - select, copy or cut from the cursor to the mark
//! - jump to the mark, or swap it with the cursor
//!
//! ## Architecture
//!
//! The terminal front end uses The Elm Architecture (TEA) pattern:
//! - **Model**: Application state
//! - **Message**: Events and actions
//! - **Update**: State transitions
//! - **View**: Render to terminal
//!
//! ## Modules
//!
//! - [`mark`]: The mark controller and its host contract
//! - [`editor`]: Rope buffer, tracked markers and the editor view
//! - [`workspace`]: Open views and command dispatch
//! - [`clipboard`]: Clipboard backends
//! - [`script`]: Headless command scripts
//! - [`app`]: Main application loop and state
//! - [`ui`]: Terminal UI components
//! - [`config`]: Flag files
//! - [`perf`]: Timing scopes and debug event log

pub mod app;
pub mod clipboard;
pub mod config;
pub mod editor;
pub mod mark;
pub mod perf;
pub mod script;
pub mod ui;
pub mod workspace;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::{App, Message, Model};
    pub use crate::editor::{EditorBuffer, EditorView, Point, Range};
    pub use crate::mark::{ClearPolicy, MarkCommand, MarkController, MarkHost, MarkOptions};
    pub use crate::workspace::{ViewId, Workspace, WorkspaceError};
}
