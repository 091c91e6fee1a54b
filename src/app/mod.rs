//! Terminal front end.
//!
//! This module implements The Elm Architecture (TEA):
//! - [`Model`]: The complete application state
//! - [`Message`]: All possible events and actions
//! - [`update`]: State transitions; the clipboard is the only outside effect
//! - [`App::run`]: Main event loop with rendering

mod effects;
mod event_loop;
mod input;
mod model;
mod update;

pub use model::{Model, ToastLevel};
pub use update::{Message, update};

use std::path::PathBuf;

use crate::mark::MarkOptions;

/// Main application struct that owns the terminal and runs the event loop.
pub struct App {
    file_path: PathBuf,
    line_numbers: bool,
    mark_options: MarkOptions,
}

impl App {
    /// Create a new application for the given file.
    pub fn new(file_path: PathBuf) -> Self {
        Self {
            file_path,
            line_numbers: true,
            mark_options: MarkOptions::default(),
        }
    }

    /// Start with the line-number gutter shown or hidden.
    pub const fn with_line_numbers(mut self, visible: bool) -> Self {
        self.line_numbers = visible;
        self
    }

    pub fn with_mark_options(mut self, options: MarkOptions) -> Self {
        self.mark_options = options;
        self
    }
}

#[cfg(test)]
mod tests;
