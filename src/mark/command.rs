use std::str::FromStr;

use thiserror::Error;

/// The zero-argument commands a [`MarkController`](super::MarkController)
/// answers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkCommand {
    Toggle,
    SetMark,
    ClearMark,
    SelectToMark,
    SelectToMarkAndCopy,
    SelectToMarkAndCut,
    GoToMark,
    SwapWithMark,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown mark command: {0}")]
    Unknown(String),
}

impl MarkCommand {
    /// Every command name registered for a view, in registration order.
    /// `mark:goto-mark` is an alias of `mark:go-to-mark`.
    pub const BINDINGS: [(&'static str, Self); 9] = [
        ("mark:toggle", Self::Toggle),
        ("mark:set-mark", Self::SetMark),
        ("mark:clear-mark", Self::ClearMark),
        ("mark:select-to-mark", Self::SelectToMark),
        ("mark:select-to-mark-and-copy", Self::SelectToMarkAndCopy),
        ("mark:select-to-mark-and-cut", Self::SelectToMarkAndCut),
        ("mark:go-to-mark", Self::GoToMark),
        ("mark:goto-mark", Self::GoToMark),
        ("mark:swap", Self::SwapWithMark),
    ];

    /// The primary name of the command.
    pub fn name(self) -> &'static str {
        Self::BINDINGS
            .iter()
            .find(|(_, command)| *command == self)
            .map_or("mark:unknown", |(name, _)| name)
    }
}

impl FromStr for MarkCommand {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::BINDINGS
            .iter()
            .find(|(name, _)| *name == s)
            .map(|(_, command)| *command)
            .ok_or_else(|| CommandError::Unknown(s.to_string()))
    }
}

impl std::fmt::Display for MarkCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
