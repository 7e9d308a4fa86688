//! Command/Chat mode transition table.

use serde::{Deserialize, Serialize};

/// Interpreter input mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TerminalMode {
    /// Lines are parsed and executed as commands.
    #[default]
    Command,
    /// Lines are forwarded to the chat collaborator.
    Chat,
}

/// What the terminal should do with one submitted line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModeInput {
    /// Run the line through the interpreter.
    Execute(String),
    /// Leave chat mode.
    ExitChat,
    /// Reset the conversation and clear the log.
    ClearChat,
    /// Nothing to do.
    Ignore,
    /// Send the line to the chat collaborator.
    Forward(String),
}

/// Classifies `line` for the current `mode`.
pub fn transition(mode: TerminalMode, line: &str) -> ModeInput {
    match mode {
        TerminalMode::Command => ModeInput::Execute(line.to_string()),
        TerminalMode::Chat => {
            let trimmed = line.trim();
            match trimmed.to_lowercase().as_str() {
                "" => ModeInput::Ignore,
                "exit" | "quit" => ModeInput::ExitChat,
                "clear" => ModeInput::ClearChat,
                _ => ModeInput::Forward(trimmed.to_string()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn command_mode_always_executes() {
        assert_eq!(
            transition(TerminalMode::Command, "exit"),
            ModeInput::Execute("exit".to_string())
        );
    }

    #[test]
    fn chat_mode_recognizes_control_words_case_insensitively() {
        let cases = [
            (" EXIT ", ModeInput::ExitChat),
            ("quit", ModeInput::ExitChat),
            ("Clear", ModeInput::ClearChat),
            ("   ", ModeInput::Ignore),
            (
                " open paint please ",
                ModeInput::Forward("open paint please".to_string()),
            ),
        ];
        for (line, expected) in cases {
            assert_eq!(transition(TerminalMode::Chat, line), expected, "line {line:?}");
        }
    }
}
