//! Terminal UI components.
//!
//! - [`render`]: draws the editor, gutter, toast and status bars
//! - the gutter shows line numbers and the mark indicator when visible

mod render;
mod status;

pub use render::{
    MARK_INDICATOR, byte_col_at, cell_col, gutter_width, line_number_width, render,
};

#[cfg(test)]
mod tests;
