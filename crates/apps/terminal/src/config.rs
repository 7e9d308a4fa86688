//! Terminal settings persisted in the key-value store.

use leptos::logging;
use platform_host::{load_json_with, KeyValueStore};
use serde::{Deserialize, Serialize};
use system_shell::{CLEAR_DELAY_MS, DEFAULT_HISTORY_LIMIT};
use system_shell_contract::DEFAULT_MAX_LOG_ENTRIES;

/// Storage key for [`TerminalConfig`].
pub const TERMINAL_CONFIG_KEY: &str = "ryos.terminal.config.v1";

/// Terminal behavior settings. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    /// Display-log rows kept before the oldest are dropped.
    pub max_log_entries: usize,
    /// Submitted commands kept in persisted history.
    pub history_limit: usize,
    /// Delay before a clear replaces the log.
    pub clear_delay_ms: u32,
    /// Placeholder shown while waiting for the first assistant token.
    pub thinking_text: String,
    /// Lines printed when the session opens.
    pub welcome: Vec<String>,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            max_log_entries: DEFAULT_MAX_LOG_ENTRIES,
            history_limit: DEFAULT_HISTORY_LIMIT,
            clear_delay_ms: CLEAR_DELAY_MS,
            thinking_text: "thinking...".to_string(),
            welcome: vec![
                "ryOS terminal".to_string(),
                "type 'help' for commands, 'ryo' to chat".to_string(),
            ],
        }
    }
}

/// Loads the persisted configuration, falling back to defaults when missing or unreadable.
pub async fn load_terminal_config<S: KeyValueStore + ?Sized>(store: &S) -> TerminalConfig {
    match load_json_with::<_, TerminalConfig>(store, TERMINAL_CONFIG_KEY).await {
        Ok(config) => config.unwrap_or_default(),
        Err(err) => {
            logging::warn!("terminal config load failed: {err}");
            TerminalConfig::default()
        }
    }
}
