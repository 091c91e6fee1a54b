use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::{Model, ToastLevel};

/// Short description of the mark for the status bar.
pub(super) fn mark_label(model: &Model) -> String {
    match model.controller() {
        None => "mark off".to_string(),
        Some(controller) if controller.is_disposed() => "mark off".to_string(),
        Some(_) => model
            .mark_position()
            .map_or_else(|| "no mark".to_string(), |point| format!("mark {point}")),
    }
}

pub fn render_status_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let filename = model.file_path.file_name().map_or_else(
        || "untitled".to_string(),
        |s| s.to_string_lossy().to_string(),
    );
    let dirty_indicator = if model.is_dirty() { " [modified]" } else { "" };
    let cursor = model.cursor_position();
    let chord = if model.ctrl_x_pending { "  C-x-" } else { "" };

    let status = format!(
        " EDIT  {filename}{dirty_indicator}  Ln {}, Col {}  [{}]{chord}  C-Space:mark  C-s:save  C-q:quit",
        cursor.line + 1,
        cursor.col + 1,
        mark_label(model),
    );

    let status_bar =
        Paragraph::new(status).style(Style::default().bg(Color::Magenta).fg(Color::White));
    frame.render_widget(status_bar, area);
}

pub fn render_toast_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let Some((message, level)) = model.active_toast() else {
        return;
    };
    let (prefix, style) = match level {
        ToastLevel::Info => (
            "[info]",
            Style::default().bg(Color::DarkGray).fg(Color::White),
        ),
        ToastLevel::Warning => (
            "[warn]",
            Style::default().bg(Color::Yellow).fg(Color::Black),
        ),
        ToastLevel::Error => ("[error]", Style::default().bg(Color::Red).fg(Color::White)),
    };
    let toast = Paragraph::new(format!("{prefix} {message}")).style(style);
    frame.render_widget(toast, area);
}
