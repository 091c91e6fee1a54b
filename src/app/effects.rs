use anyhow::{Context, Result};

use crate::app::{App, Message, Model, ToastLevel};
use crate::editor::EditorBuffer;

impl App {
    pub(super) fn handle_message_side_effects(model: &mut Model, msg: &Message) {
        if matches!(msg, Message::Save) {
            match save_buffer(model) {
                Ok(bytes) => {
                    let name = model.file_path.file_name().map_or_else(
                        || "untitled".to_string(),
                        |s| s.to_string_lossy().to_string(),
                    );
                    model.show_toast(ToastLevel::Info, format!("Saved {name} ({bytes} bytes)"));
                }
                Err(err) => {
                    model.show_toast(ToastLevel::Error, format!("Save failed: {err:#}"));
                    crate::perf::log_event(
                        "save.error",
                        format!("path={} err={err:#}", model.file_path.display()),
                    );
                }
            }
        }
    }
}

/// Write the active buffer to its file and mark it clean.
pub(super) fn save_buffer(model: &mut Model) -> Result<usize> {
    let text = model.buffer().map(EditorBuffer::text).unwrap_or_default();
    std::fs::write(&model.file_path, &text)
        .with_context(|| format!("Failed to write {}", model.file_path.display()))?;
    model.workspace.edit(model.view, EditorBuffer::mark_clean)?;
    Ok(text.len())
}
