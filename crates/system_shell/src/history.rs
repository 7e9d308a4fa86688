//! Submitted-command history: up/down navigation and persistence.

use leptos::logging;
use platform_host::{load_json_with, save_json_with, KeyValueStore};
use system_shell_contract::PersistedCommand;

use crate::mode::TerminalMode;

/// Storage key for persisted command history.
pub const HISTORY_KEY: &str = "ryos.terminal.history.v1";
/// Default number of retained history entries.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

const CHAT_PREFIX: &str = "ryo ";

/// Bounded, ordered list of submitted commands (oldest first).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandHistory {
    entries: Vec<PersistedCommand>,
    limit: usize,
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }
}

impl CommandHistory {
    /// Creates an empty history retaining at most `limit` entries.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Creates a history from persisted entries, keeping the newest `limit`.
    pub fn from_entries(entries: Vec<PersistedCommand>, limit: usize) -> Self {
        let mut history = Self::with_limit(limit);
        history.entries = entries;
        history.trim();
        history
    }

    /// Appends a submitted line. Chat-mode lines are stored with the `ryo ` prefix so replaying
    /// them from command mode re-enters chat.
    pub fn record(&mut self, line: &str, mode: TerminalMode, timestamp: u64) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        let command = match mode {
            TerminalMode::Command => line.to_string(),
            TerminalMode::Chat => format!("{CHAT_PREFIX}{line}"),
        };
        self.entries.push(PersistedCommand { command, timestamp });
        self.trim();
    }

    /// Persisted entries, oldest first.
    pub fn entries(&self) -> &[PersistedCommand] {
        &self.entries
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Navigation cursor over the recorded lines.
    pub fn cursor(&self) -> HistoryCursor {
        HistoryCursor::new(self.entries.iter().map(|entry| entry.command.clone()).collect())
    }

    fn trim(&mut self) {
        if self.entries.len() > self.limit {
            let overflow = self.entries.len() - self.limit;
            self.entries.drain(0..overflow);
        }
    }
}

/// Loads persisted history; a missing or unreadable value yields an empty history.
pub async fn load_command_history<S: KeyValueStore + ?Sized>(
    store: &S,
    limit: usize,
) -> CommandHistory {
    match load_json_with::<_, Vec<PersistedCommand>>(store, HISTORY_KEY).await {
        Ok(entries) => CommandHistory::from_entries(entries.unwrap_or_default(), limit),
        Err(err) => {
            logging::warn!("command history load failed: {err}");
            CommandHistory::with_limit(limit)
        }
    }
}

/// Persists `history` under [`HISTORY_KEY`].
///
/// # Errors
///
/// Returns the store's error message.
pub async fn save_command_history<S: KeyValueStore + ?Sized>(
    store: &S,
    history: &CommandHistory,
) -> Result<(), String> {
    save_json_with(store, HISTORY_KEY, &history.entries).await
}

/// Up/down navigation over submitted lines, most recent first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HistoryCursor {
    lines: Vec<String>,
    offset: Option<usize>,
}

impl HistoryCursor {
    /// Creates a cursor over `lines` (oldest first) positioned on the empty input line.
    pub fn new(lines: Vec<String>) -> Self {
        Self {
            lines,
            offset: None,
        }
    }

    /// Steps to the next older line. Stepping past the oldest resets to an empty line.
    pub fn up(&mut self) -> String {
        let next = self.offset.map_or(0, |offset| offset + 1);
        if next >= self.lines.len() {
            self.offset = None;
            return String::new();
        }
        self.offset = Some(next);
        self.line_at(next)
    }

    /// Steps to the next newer line. Stepping past the newest resets to an empty line.
    pub fn down(&mut self) -> String {
        match self.offset {
            None | Some(0) => {
                self.offset = None;
                String::new()
            }
            Some(offset) => {
                self.offset = Some(offset - 1);
                self.line_at(offset - 1)
            }
        }
    }

    /// Returns to the empty input line.
    pub fn reset(&mut self) {
        self.offset = None;
    }

    fn line_at(&self, offset: usize) -> String {
        self.lines[self.lines.len() - 1 - offset].clone()
    }
}
