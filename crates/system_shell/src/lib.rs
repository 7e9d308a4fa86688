//! Terminal command interpreter for the ryOS desktop.
//!
//! The interpreter is runtime-agnostic: it parses a typed line, runs one built-in verb against an
//! injected [`platform_host::VirtualFsService`], and returns a [`CommandOutcome`] whose effects
//! the caller carries out (clearing the log, launching TextEdit, entering chat mode). Tab
//! completion, up/down history navigation, persisted history and the Command/Chat mode
//! transition table live alongside it.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

mod builtins;
mod completion;
mod history;
mod mode;
mod parser;

pub use builtins::{execute, CLEAR_DELAY_MS, HELP_TEXT, SHELL_VERBS};
pub use completion::complete;
pub use history::{
    load_command_history, save_command_history, CommandHistory, HistoryCursor,
    DEFAULT_HISTORY_LIMIT, HISTORY_KEY,
};
pub use mode::{transition, ModeInput, TerminalMode};
pub use parser::{parse_command, tokenize_line};
pub use system_shell_contract::{
    CommandOutcome, Completion, ParsedCommand, ShellEffect, ShellError,
};
