//! Shared terminal contracts used by the command interpreter, the assistant reconciler and the
//! terminal session.
//!
//! This crate is runtime-agnostic. It defines parsed command lines, execution outcomes, side-effect
//! intents, structured errors, persisted history entries, completion results and the display log
//! both interpreter output and streamed assistant output are written into.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

use desktop_app_contract::AppId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Display-log tag for a line the user typed in chat mode.
pub const AI_USER_TAG: &str = "ai-user";
/// Display-log tag for the placeholder shown while waiting for the first assistant token.
pub const AI_THINKING_TAG: &str = "ai-thinking";
/// Display-log tag for streamed assistant output.
pub const AI_ASSISTANT_TAG: &str = "ai-assistant";
/// Display-log tag for chat transport failures.
pub const AI_ERROR_TAG: &str = "ai-error";
/// Default cap on retained display-log rows.
pub const DEFAULT_MAX_LOG_ENTRIES: usize = 500;

/// Command line split into a lower-cased verb and positional arguments.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParsedCommand {
    /// Lower-cased verb; empty for a blank line.
    pub cmd: String,
    /// Positional arguments with quoting removed.
    pub args: Vec<String>,
}

impl ParsedCommand {
    /// Returns `true` for a blank line.
    pub fn is_empty(&self) -> bool {
        self.cmd.is_empty()
    }
}

/// Side-effect intent produced by a command for the terminal session to carry out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ShellEffect {
    /// Empty the display log after `delay_ms` (0 = immediately).
    ClearLog {
        /// Delay that lets an exit animation finish.
        delay_ms: u32,
    },
    /// Launch (or focus) an application with a launch payload.
    LaunchApp {
        /// Application to launch.
        app_id: AppId,
        /// Payload handed to the application.
        initial_data: Option<Value>,
    },
    /// Switch the terminal into chat mode, optionally forwarding a first prompt.
    EnterChat {
        /// Prompt typed inline after the verb.
        initial_prompt: Option<String>,
    },
}

/// Result of executing one command line.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CommandOutcome {
    /// Text printed to the display log.
    pub output: String,
    /// Whether the output describes a failure.
    pub is_error: bool,
    /// New working directory when the command changed it.
    pub cwd: Option<String>,
    /// Side effects for the caller.
    pub effects: Vec<ShellEffect>,
}

impl CommandOutcome {
    /// Successful outcome printing `output`.
    pub fn ok(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            ..Self::default()
        }
    }

    /// Error outcome printing `message`.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            output: message.into(),
            is_error: true,
            ..Self::default()
        }
    }

    /// Attaches a side effect.
    pub fn with_effect(mut self, effect: ShellEffect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Records a working-directory change.
    pub fn with_cwd(mut self, cwd: impl Into<String>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }
}

impl From<ShellError> for CommandOutcome {
    fn from(err: ShellError) -> Self {
        Self::error(err.message)
    }
}

/// Structured shell error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShellErrorCode {
    /// User input violated command usage.
    Usage,
    /// The command, file or directory was not found.
    NotFound,
    /// The target already exists or has the wrong kind.
    Conflict,
    /// A collaborator was unavailable.
    Unavailable,
    /// Internal failure.
    Internal,
}

/// Error emitted by parsing, lookup or command handlers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShellError {
    /// Error category.
    pub code: ShellErrorCode,
    /// Human-readable message.
    pub message: String,
}

impl ShellError {
    /// Creates a new shell error.
    pub fn new(code: ShellErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Usage error shorthand.
    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(ShellErrorCode::Usage, message)
    }

    /// Not-found shorthand.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ShellErrorCode::NotFound, message)
    }

    /// Conflict shorthand.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ShellErrorCode::Conflict, message)
    }

    /// Wraps a collaborator failure.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(ShellErrorCode::Unavailable, message)
    }

    /// Converts the error into a conventional exit code.
    pub fn exit_code(&self) -> i32 {
        match self.code {
            ShellErrorCode::Usage => 2,
            ShellErrorCode::NotFound => 3,
            ShellErrorCode::Conflict => 4,
            ShellErrorCode::Unavailable => 5,
            ShellErrorCode::Internal => 6,
        }
    }
}

impl std::fmt::Display for ShellError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ShellError {}

/// One submitted command in persisted history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedCommand {
    /// Raw line as submitted (chat-mode lines carry the `ryo ` prefix).
    pub command: String,
    /// Submission time in unix milliseconds.
    pub timestamp: u64,
}

/// Tab-completion result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "kebab-case")]
pub enum Completion {
    /// Nothing matched.
    None,
    /// Replace the input line.
    Replace(String),
    /// Several candidates; list them in the log.
    Candidates(Vec<String>),
}

/// Inline HTML preview extracted from assistant output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HtmlPreview {
    /// HTML source to render in the sandboxed preview.
    pub html: String,
    /// Whether the source is still arriving (unterminated fence).
    pub is_streaming: bool,
}

/// One row of the terminal display log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Command text echoed for the row (empty for assistant rows).
    pub command: String,
    /// Output text.
    pub output: String,
    /// Working directory at command time, or one of the `ai-*` tags.
    pub path: String,
    /// Whether the row reports a failure.
    #[serde(default)]
    pub is_error: bool,
    /// Chat message id for streamed assistant rows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    /// HTML split out of assistant output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_preview: Option<HtmlPreview>,
}

impl LogEntry {
    /// Row for an interpreter command and its outcome.
    pub fn command(
        command: impl Into<String>,
        cwd: impl Into<String>,
        outcome: &CommandOutcome,
    ) -> Self {
        Self {
            command: command.into(),
            output: outcome.output.clone(),
            path: cwd.into(),
            is_error: outcome.is_error,
            message_id: None,
            html_preview: None,
        }
    }

    /// Row carrying only a tag and output text.
    pub fn tagged(tag: &str, command: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            output: output.into(),
            path: tag.to_string(),
            is_error: tag == AI_ERROR_TAG,
            message_id: None,
            html_preview: None,
        }
    }
}

/// Where an upsert landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    /// A new row was appended at this index.
    Appended(usize),
    /// The existing row at this index was replaced.
    Replaced(usize),
}

/// Append-only scrollback shared by interpreter and assistant output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayLog {
    entries: Vec<LogEntry>,
    max_entries: usize,
}

impl Default for DisplayLog {
    fn default() -> Self {
        Self::with_capacity_limit(DEFAULT_MAX_LOG_ENTRIES)
    }
}

impl DisplayLog {
    /// Creates an empty log that keeps at most `max_entries` rows.
    pub fn with_capacity_limit(max_entries: usize) -> Self {
        Self {
            entries: Vec::new(),
            max_entries: max_entries.max(1),
        }
    }

    /// Rows in insertion order.
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log has no rows.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Appends a row, dropping the oldest rows beyond the cap.
    pub fn push(&mut self, entry: LogEntry) -> usize {
        self.entries.push(entry);
        self.trim();
        self.entries.len() - 1
    }

    /// Replaces the row for `entry.message_id` in place, or appends it.
    pub fn upsert(&mut self, entry: LogEntry) -> Upsert {
        let existing = entry.message_id.as_ref().and_then(|id| {
            self.entries
                .iter()
                .position(|row| row.message_id.as_ref() == Some(id))
        });
        match existing {
            Some(index) => {
                self.entries[index] = entry;
                Upsert::Replaced(index)
            }
            None => Upsert::Appended(self.push(entry)),
        }
    }

    /// Removes every row tagged `tag`; returns how many were removed.
    pub fn remove_tagged(&mut self, tag: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|row| row.path != tag);
        before - self.entries.len()
    }

    /// Empties the log.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Replaces every row with `entries`.
    pub fn replace_with(&mut self, entries: Vec<LogEntry>) {
        self.entries = entries;
        self.trim();
    }

    fn trim(&mut self) {
        if self.entries.len() > self.max_entries {
            let overflow = self.entries.len() - self.max_entries;
            self.entries.drain(0..overflow);
        }
    }
}
