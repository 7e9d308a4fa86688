//! Merges streamed assistant messages into the terminal display log.

use std::collections::{BTreeSet, HashMap, HashSet};

use desktop_app_contract::{AppControl, AppId};
use leptos::logging;
use system_shell_contract::{DisplayLog, LogEntry, AI_ASSISTANT_TAG, AI_THINKING_TAG};

use crate::{
    control_tags::{render_markers, ControlAction, ControlTagParser, RegexControlTagParser},
    html::extract_html,
    message::ChatMessage,
};

/// Sound played when an assistant reply first appears.
pub const AI_RESPONSE_SOUND: &str = "ai-response";

/// Side effect requested by the reconciler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileEffect {
    /// Play a named UI sound.
    PlaySound(&'static str),
}

/// What one reconcile pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Whether the display log changed.
    pub updated: bool,
    /// Applications launched in this pass.
    pub launched: Vec<AppId>,
    /// Applications closed in this pass.
    pub closed: Vec<AppId>,
    /// Effects for the host.
    pub effects: Vec<ReconcileEffect>,
}

/// Observer-side state for one chat-mode session.
pub struct StreamReconciler {
    parser: Box<dyn ControlTagParser>,
    last_seen: Option<(String, String)>,
    launched: BTreeSet<AppId>,
    applied_tags: HashMap<String, usize>,
    announced: HashSet<String>,
}

impl Default for StreamReconciler {
    fn default() -> Self {
        Self::with_parser(RegexControlTagParser)
    }
}

impl StreamReconciler {
    /// Creates a reconciler using `parser` for control tags.
    pub fn with_parser(parser: impl ControlTagParser + 'static) -> Self {
        Self {
            parser: Box::new(parser),
            last_seen: None,
            launched: BTreeSet::new(),
            applied_tags: HashMap::new(),
            announced: HashSet::new(),
        }
    }

    /// Starts a new assistant turn: apps launched earlier may be launched again.
    pub fn begin_turn(&mut self) {
        self.launched.clear();
    }

    /// Forgets everything; used when leaving chat mode or clearing the conversation.
    pub fn reset(&mut self) {
        self.last_seen = None;
        self.launched.clear();
        self.applied_tags.clear();
        self.announced.clear();
    }

    /// Apps launched during the current turn.
    pub fn launched(&self) -> impl Iterator<Item = AppId> + '_ {
        self.launched.iter().copied()
    }

    /// Processes the latest message list.
    ///
    /// Only a trailing assistant message is considered, and an unchanged (id, content) pair is
    /// skipped. Control tags run at most once each; launches at most once per app per turn.
    pub fn reconcile<A: AppControl + ?Sized>(
        &mut self,
        messages: &[ChatMessage],
        log: &mut DisplayLog,
        apps: &mut A,
    ) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        let Some(message) = messages.last().filter(|message| message.is_assistant()) else {
            return report;
        };
        let key = (message.id.clone(), message.content.clone());
        if self.last_seen.as_ref() == Some(&key) {
            return report;
        }
        self.last_seen = Some(key);

        let tags = self.parser.parse(&message.content);
        let applied = self.applied_tags.entry(message.id.clone()).or_insert(0);
        for tag in tags.iter().skip(*applied) {
            match tag.action {
                ControlAction::Launch => {
                    if self.launched.insert(tag.app_id) {
                        apps.launch_app(tag.app_id, None);
                        report.launched.push(tag.app_id);
                    } else {
                        logging::log!("{} already launched this turn", tag.app_id);
                    }
                }
                ControlAction::Close => {
                    apps.close_app(tag.app_id);
                    self.launched.remove(&tag.app_id);
                    report.closed.push(tag.app_id);
                }
            }
        }
        *applied = (*applied).max(tags.len());

        let split = extract_html(&render_markers(&message.content, &tags));
        if self.announced.insert(message.id.clone()) {
            log.remove_tagged(AI_THINKING_TAG);
            report
                .effects
                .push(ReconcileEffect::PlaySound(AI_RESPONSE_SOUND));
        }
        log.upsert(LogEntry {
            message_id: Some(message.id.clone()),
            html_preview: split.preview,
            ..LogEntry::tagged(AI_ASSISTANT_TAG, "", split.text)
        });
        report.updated = true;
        report
    }
}
