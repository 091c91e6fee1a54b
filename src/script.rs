//! Headless command scripts for `--exec`.
//!
//! A script is a comma-separated list of steps:
//!
//! - any `mark:*` command name, dispatched in the view's scope
//! - `goto:LINE:COL` moves the cursor (1-based)
//! - `insert:TEXT` types `TEXT` at the cursor (`\n` becomes a newline)
//! - `delete-line` removes the cursor line
//! - `gutter:on` / `gutter:off` shows or hides the line-number gutter

use thiserror::Error;

use crate::editor::Point;
use crate::mark::{LINE_NUMBER_GUTTER, MarkCommand};
use crate::workspace::{ViewId, Workspace, WorkspaceError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Command(MarkCommand, String),
    Goto(Point),
    Insert(String),
    DeleteLine,
    Gutter(bool),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    #[error("empty step at position {0}")]
    EmptyStep(usize),
    #[error("bad goto step {0:?}, expected goto:LINE:COL with 1-based numbers")]
    BadGoto(String),
    #[error("unknown step {0:?}")]
    UnknownStep(String),
    #[error(transparent)]
    Workspace(#[from] WorkspaceError),
}

pub fn parse_script(script: &str) -> Result<Vec<Step>, ScriptError> {
    script
        .split(',')
        .enumerate()
        .map(|(idx, raw)| parse_step(idx + 1, raw.trim()))
        .collect()
}

fn parse_step(position: usize, step: &str) -> Result<Step, ScriptError> {
    if step.is_empty() {
        return Err(ScriptError::EmptyStep(position));
    }
    if step.starts_with("mark:") {
        let command = step.parse::<MarkCommand>().map_err(WorkspaceError::from)?;
        return Ok(Step::Command(command, step.to_string()));
    }
    if let Some(rest) = step.strip_prefix("goto:") {
        return parse_goto(rest).ok_or_else(|| ScriptError::BadGoto(step.to_string()));
    }
    if let Some(text) = step.strip_prefix("insert:") {
        return Ok(Step::Insert(text.replace("\\n", "\n")));
    }
    match step {
        "delete-line" => Ok(Step::DeleteLine),
        "gutter:on" => Ok(Step::Gutter(true)),
        "gutter:off" => Ok(Step::Gutter(false)),
        _ => Err(ScriptError::UnknownStep(step.to_string())),
    }
}

fn parse_goto(rest: &str) -> Option<Step> {
    let (line, col) = rest.split_once(':')?;
    let line = line.parse::<usize>().ok()?.checked_sub(1)?;
    let col = col.parse::<usize>().ok()?.checked_sub(1)?;
    Some(Step::Goto(Point::new(line, col)))
}

/// Run `steps` against view `id`, stopping at the first failing step.
pub fn run_script(workspace: &mut Workspace, id: ViewId, steps: &[Step]) -> Result<(), ScriptError> {
    for step in steps {
        crate::perf::log_event("script.step", format!("{id} {step:?}"));
        match step {
            Step::Command(_, name) => workspace.dispatch(id, name)?,
            Step::Goto(point) => workspace.edit(id, |buf| buf.move_to(point.line, point.col))?,
            Step::Insert(text) => workspace.edit(id, |buf| buf.insert_str(text))?,
            Step::DeleteLine => {
                workspace.edit(id, |buf| buf.delete_line(buf.cursor().line))?;
            }
            Step::Gutter(visible) => workspace
                .view_mut(id)
                .ok_or(WorkspaceError::UnknownView(id))?
                .set_gutter_visible(LINE_NUMBER_GUTTER, *visible),
        }
    }
    Ok(())
}
