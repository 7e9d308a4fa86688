//! Headless terminal session for the ryOS desktop.
//!
//! [`TerminalSession`] owns the display log, working directory, input mode and history, routes
//! submitted lines to the command interpreter or the chat collaborator, and applies the
//! resulting effects to the shared application registry. Rendering, timers, audio and the
//! network transport stay with the host, which drains [`TerminalEffect`]s.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

mod config;
mod session;

pub use config::{load_terminal_config, TerminalConfig, TERMINAL_CONFIG_KEY};
pub use session::{TerminalEffect, TerminalServices, TerminalSession, ERROR_SOUND};
