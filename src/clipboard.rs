//! Clipboard backends.
//!
//! Views share one clipboard through a [`ClipboardHandle`]. The terminal
//! front end uses [`Osc52Clipboard`]; headless runs and tests use
//! [`MemoryClipboard`].

use std::cell::RefCell;
use std::io::{Write, stdout};
use std::rc::Rc;

use base64::Engine;

pub trait Clipboard: std::fmt::Debug {
    /// Replace the clipboard contents.
    ///
    /// # Errors
    /// Returns an error if the backend could not deliver the text.
    fn write(&mut self, text: &str) -> std::io::Result<()>;

    /// The most recently written text, if any.
    fn contents(&self) -> Option<String>;
}

pub type ClipboardHandle = Rc<RefCell<dyn Clipboard>>;

/// Keeps clipboard text in memory only.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    text: Option<String>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle() -> ClipboardHandle {
        Rc::new(RefCell::new(Self::new()))
    }
}

impl Clipboard for MemoryClipboard {
    fn write(&mut self, text: &str) -> std::io::Result<()> {
        self.text = Some(text.to_string());
        Ok(())
    }

    fn contents(&self) -> Option<String> {
        self.text.clone()
    }
}

/// Sends clipboard text to the terminal with an OSC 52 sequence
/// (`pbcopy` first on macOS), and remembers it locally.
#[derive(Debug, Default)]
pub struct Osc52Clipboard {
    last: Option<String>,
}

impl Osc52Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle() -> ClipboardHandle {
        Rc::new(RefCell::new(Self::new()))
    }
}

impl Clipboard for Osc52Clipboard {
    fn write(&mut self, text: &str) -> std::io::Result<()> {
        self.last = Some(text.to_string());
        copy_to_system(text)
    }

    fn contents(&self) -> Option<String> {
        self.last.clone()
    }
}

fn copy_to_system(text: &str) -> std::io::Result<()> {
    #[cfg(target_os = "macos")]
    {
        if copy_to_pbcopy(text).is_ok() {
            return Ok(());
        }
    }
    let mut out = stdout();
    out.write_all(osc52_sequence(text).as_bytes())?;
    out.flush()
}

#[cfg(target_os = "macos")]
fn copy_to_pbcopy(text: &str) -> std::io::Result<()> {
    use std::process::{Command, Stdio};

    let mut child = Command::new("pbcopy").stdin(Stdio::piped()).spawn()?;
    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(text.as_bytes())?;
    }
    if child.wait()?.success() {
        Ok(())
    } else {
        Err(std::io::Error::other("pbcopy failed"))
    }
}

fn osc52_sequence(text: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(text.as_bytes());
    format!("\x1b]52;c;{encoded}\x07")
}
