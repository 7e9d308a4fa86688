//! Terminal window session: command and chat modes over the shared display log.

use std::{cell::RefCell, rc::Rc};

use desktop_app_contract::AppControl;
use desktop_assistant::{
    seed_messages, ChatCollaborator, ChatMessage, ChatTransportError, ReconcileEffect,
    StreamReconciler, SubscriptionId,
};
use leptos::logging;
use platform_host::{unix_time_ms_now, KeyValueStore, VirtualFsService, ROOT_DIR};
use platform_host_web::LocalStorageKeyValueStore;
use system_shell::{
    complete, execute, load_command_history, save_command_history, transition, CommandHistory,
    HistoryCursor, ModeInput, TerminalMode,
};
use system_shell_contract::{
    CommandOutcome, Completion, DisplayLog, LogEntry, ShellEffect, AI_ASSISTANT_TAG,
    AI_ERROR_TAG, AI_THINKING_TAG, AI_USER_TAG,
};

use crate::config::{load_terminal_config, TerminalConfig};

/// Sound played for error rows.
pub const ERROR_SOUND: &str = "error";

/// Side effects the host carries out for the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalEffect {
    /// Play a named UI sound.
    PlaySound(&'static str),
    /// Call [`TerminalSession::apply_scheduled_clear`] after `delay_ms`.
    ScheduleClear {
        /// Delay that lets the exit animation finish.
        delay_ms: u32,
    },
    /// Stream an assistant reply for the chat collaborator's conversation.
    RequestReply,
}

/// Host services the terminal runs against.
#[derive(Clone)]
pub struct TerminalServices {
    /// Virtual filesystem browsed by commands.
    pub fs: Rc<dyn VirtualFsService>,
    /// Store for history and settings.
    pub store: Rc<dyn KeyValueStore>,
    /// Conversation used in chat mode.
    pub chat: Rc<dyn ChatCollaborator>,
}

impl TerminalServices {
    /// Services persisting to browser `localStorage`.
    pub fn with_local_storage(
        fs: Rc<dyn VirtualFsService>,
        chat: Rc<dyn ChatCollaborator>,
    ) -> Self {
        Self {
            fs,
            store: Rc::new(LocalStorageKeyValueStore),
            chat,
        }
    }
}

/// State the chat observer updates between calls.
struct SharedState {
    chat_active: bool,
    log: DisplayLog,
    reconciler: StreamReconciler,
    effects: Vec<TerminalEffect>,
}

/// One terminal window's session.
pub struct TerminalSession {
    config: TerminalConfig,
    services: TerminalServices,
    apps: Rc<RefCell<dyn AppControl>>,
    shared: Rc<RefCell<SharedState>>,
    subscription: SubscriptionId,
    cwd: String,
    mode: TerminalMode,
    history: CommandHistory,
    cursor: HistoryCursor,
    pending_clear: Option<Vec<LogEntry>>,
}

impl TerminalSession {
    /// Opens a session, loading settings and history from the store.
    pub async fn open(services: TerminalServices, apps: Rc<RefCell<dyn AppControl>>) -> Self {
        let config = load_terminal_config(&*services.store).await;
        let history = load_command_history(&*services.store, config.history_limit).await;
        Self::with_config(services, apps, config, history)
    }

    /// Creates a session from already-loaded settings and history.
    pub fn with_config(
        services: TerminalServices,
        apps: Rc<RefCell<dyn AppControl>>,
        config: TerminalConfig,
        history: CommandHistory,
    ) -> Self {
        let mut log = DisplayLog::with_capacity_limit(config.max_log_entries);
        for line in &config.welcome {
            log.push(LogEntry::tagged(ROOT_DIR, "", line.clone()));
        }
        let shared = Rc::new(RefCell::new(SharedState {
            chat_active: false,
            log,
            reconciler: StreamReconciler::default(),
            effects: Vec::new(),
        }));
        let subscription = services
            .chat
            .subscribe(chat_observer(shared.clone(), apps.clone()));
        let cursor = history.cursor();
        Self {
            config,
            services,
            apps,
            shared,
            subscription,
            cwd: ROOT_DIR.to_string(),
            mode: TerminalMode::Command,
            history,
            cursor,
            pending_clear: None,
        }
    }

    /// Current working directory.
    pub fn cwd(&self) -> &str {
        &self.cwd
    }

    /// Current input mode.
    pub fn mode(&self) -> TerminalMode {
        self.mode
    }

    /// Submitted-command history.
    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    /// Snapshot of the display log.
    pub fn log(&self) -> Vec<LogEntry> {
        self.shared.borrow().log.entries().to_vec()
    }

    /// Whether an assistant reply is in flight.
    pub fn is_loading(&self) -> bool {
        self.services.chat.is_loading()
    }

    /// Drains queued effects.
    pub fn take_effects(&mut self) -> Vec<TerminalEffect> {
        std::mem::take(&mut self.shared.borrow_mut().effects)
    }

    /// Handles one submitted input line.
    pub async fn submit(&mut self, line: &str) {
        self.history.record(line, self.mode, unix_time_ms_now());
        self.cursor = self.history.cursor();
        if let Err(err) = save_command_history(&*self.services.store, &self.history).await {
            logging::warn!("persist command history failed: {err}");
        }

        match transition(self.mode, line) {
            ModeInput::Execute(line) => self.run_command(&line).await,
            ModeInput::Forward(prompt) => self.forward(&prompt),
            ModeInput::ExitChat => self.exit_chat(line.trim()),
            ModeInput::ClearChat => self.clear_chat(),
            ModeInput::Ignore => {}
        }
    }

    /// Completes the input line. Candidate lists are printed to the log.
    pub async fn complete(&mut self, line: &str) -> Option<String> {
        if self.mode == TerminalMode::Chat {
            return None;
        }
        match complete(line, &self.cwd, &*self.services.fs).await {
            Completion::Replace(line) => Some(line),
            Completion::Candidates(candidates) => {
                let row = LogEntry::tagged(&self.cwd, line, candidates.join("  "));
                self.push(row);
                None
            }
            Completion::None => None,
        }
    }

    /// Previous history line.
    pub fn history_up(&mut self) -> String {
        self.cursor.up()
    }

    /// Next history line.
    pub fn history_down(&mut self) -> String {
        self.cursor.down()
    }

    /// Cancels the in-flight reply. Safe to call at any time.
    pub fn stop(&mut self) {
        self.services.chat.stop();
        self.shared.borrow_mut().log.remove_tagged(AI_THINKING_TAG);
    }

    /// Reports a transport failure for the current reply.
    pub fn report_chat_error(&mut self, err: &ChatTransportError) {
        let mut shared = self.shared.borrow_mut();
        shared.log.remove_tagged(AI_THINKING_TAG);
        shared.log.push(LogEntry::tagged(
            AI_ERROR_TAG,
            "",
            format!("ryo couldn't answer ({}): {err}", err.status_code()),
        ));
        shared.effects.push(TerminalEffect::PlaySound(ERROR_SOUND));
    }

    /// Applies a clear requested by [`TerminalEffect::ScheduleClear`].
    ///
    /// Returns `false` when nothing was pending.
    pub fn apply_scheduled_clear(&mut self) -> bool {
        let Some(rows) = self.pending_clear.take() else {
            return false;
        };
        self.shared.borrow_mut().log.replace_with(rows);
        true
    }

    async fn run_command(&mut self, line: &str) {
        let outcome = execute(line, &self.cwd, &*self.services.fs, &self.history).await;
        let row = LogEntry::command(line.trim(), &self.cwd, &outcome);
        self.push(row);
        if outcome.is_error {
            self.queue(TerminalEffect::PlaySound(ERROR_SOUND));
        }
        let CommandOutcome { cwd, effects, .. } = outcome;
        if let Some(cwd) = cwd {
            self.cwd = cwd;
        }
        for effect in effects {
            match effect {
                ShellEffect::ClearLog { .. } => self.schedule_clear(Vec::new()),
                ShellEffect::LaunchApp {
                    app_id,
                    initial_data,
                } => match self.apps.try_borrow_mut() {
                    Ok(mut apps) => apps.launch_app(app_id, initial_data),
                    Err(_) => logging::warn!("app registry busy; dropped launch of {app_id}"),
                },
                ShellEffect::EnterChat { initial_prompt } => {
                    self.enter_chat();
                    if let Some(prompt) = initial_prompt {
                        self.forward(&prompt);
                    }
                }
            }
        }
    }

    fn enter_chat(&mut self) {
        self.mode = TerminalMode::Chat;
        {
            let mut shared = self.shared.borrow_mut();
            shared.chat_active = true;
            shared.reconciler.reset();
        }
        self.services.chat.reset(seed_messages());
    }

    fn exit_chat(&mut self, line: &str) {
        {
            let mut shared = self.shared.borrow_mut();
            shared.chat_active = false;
            shared.reconciler.reset();
        }
        self.services.chat.stop();
        self.services.chat.reset(seed_messages());
        self.mode = TerminalMode::Command;
        let mut shared = self.shared.borrow_mut();
        shared.log.remove_tagged(AI_THINKING_TAG);
        shared
            .log
            .push(LogEntry::tagged(&self.cwd, line, "bye! back to the terminal."));
    }

    fn clear_chat(&mut self) {
        self.services.chat.stop();
        self.shared.borrow_mut().reconciler.reset();
        self.services.chat.reset(seed_messages());
        self.schedule_clear(vec![LogEntry::tagged(
            AI_ASSISTANT_TAG,
            "",
            "chat cleared. ask ryo anything.",
        )]);
    }

    fn forward(&mut self, prompt: &str) {
        {
            let mut shared = self.shared.borrow_mut();
            shared.reconciler.begin_turn();
            shared.log.remove_tagged(AI_THINKING_TAG);
            shared.log.push(LogEntry::tagged(AI_USER_TAG, prompt, ""));
            shared.log.push(LogEntry::tagged(
                AI_THINKING_TAG,
                "",
                self.config.thinking_text.clone(),
            ));
        }
        self.services.chat.append_user_message(prompt);
        self.queue(TerminalEffect::RequestReply);
    }

    fn schedule_clear(&mut self, rows: Vec<LogEntry>) {
        self.pending_clear = Some(rows);
        self.queue(TerminalEffect::ScheduleClear {
            delay_ms: self.config.clear_delay_ms,
        });
    }

    fn push(&mut self, entry: LogEntry) {
        self.shared.borrow_mut().log.push(entry);
    }

    fn queue(&mut self, effect: TerminalEffect) {
        self.shared.borrow_mut().effects.push(effect);
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        self.services.chat.unsubscribe(self.subscription);
    }
}

fn chat_observer(
    shared: Rc<RefCell<SharedState>>,
    apps: Rc<RefCell<dyn AppControl>>,
) -> Rc<dyn Fn(&[ChatMessage])> {
    Rc::new(move |messages: &[ChatMessage]| {
        let Ok(mut shared) = shared.try_borrow_mut() else {
            logging::warn!("terminal busy; skipped chat update");
            return;
        };
        if !shared.chat_active {
            return;
        }
        let Ok(mut apps) = apps.try_borrow_mut() else {
            logging::warn!("app registry busy; skipped chat update");
            return;
        };
        let SharedState {
            log,
            reconciler,
            effects,
            ..
        } = &mut *shared;
        let report = reconciler.reconcile(messages, log, &mut *apps);
        effects.extend(report.effects.into_iter().map(|effect| match effect {
            ReconcileEffect::PlaySound(sound) => TerminalEffect::PlaySound(sound),
        }));
    })
}
