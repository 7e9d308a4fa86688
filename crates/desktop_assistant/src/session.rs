//! Streaming chat collaborator contract and its in-memory implementation.

use std::{cell::RefCell, rc::Rc};

use crate::message::{ChatMessage, ChatRole};

/// Callback invoked with the full message list after every change.
pub type ChatObserver = Rc<dyn Fn(&[ChatMessage])>;

/// Handle returned by [`ChatCollaborator::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

/// Conversation the terminal talks to while in chat mode.
///
/// Implementations notify observers synchronously after each change; observers must not call
/// back into the collaborator while being notified.
pub trait ChatCollaborator {
    /// Appends a user message, marks the conversation as loading and returns the message id.
    fn append_user_message(&self, content: &str) -> String;

    /// Snapshot of the message list.
    fn messages(&self) -> Vec<ChatMessage>;

    /// Whether an assistant reply is in flight.
    fn is_loading(&self) -> bool;

    /// Cancels the in-flight reply. Calling it with nothing in flight is a no-op.
    fn stop(&self);

    /// Replaces the conversation, cancelling any in-flight reply.
    fn reset(&self, messages: Vec<ChatMessage>);

    /// Registers an observer.
    fn subscribe(&self, observer: ChatObserver) -> SubscriptionId;

    /// Removes an observer.
    fn unsubscribe(&self, subscription: SubscriptionId);
}

/// Identifies one streamed assistant reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamHandle {
    /// Id the reply's message will carry.
    pub message_id: String,
    generation: u64,
}

#[derive(Default)]
struct SessionState {
    messages: Vec<ChatMessage>,
    loading: bool,
    generation: u64,
    next_message_id: u64,
    next_subscription: u64,
    observers: Vec<(SubscriptionId, ChatObserver)>,
}

impl SessionState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_message_id += 1;
        format!("{prefix}-{}", self.next_message_id)
    }
}

/// In-memory [`ChatCollaborator`]; clones share one conversation.
///
/// The streaming side ([`Self::begin_reply`], [`Self::push_chunk`], [`Self::finish_reply`]) is
/// driven by [`crate::drive_chat_stream`] or directly by tests.
#[derive(Clone, Default)]
pub struct MemoryChatSession {
    inner: Rc<RefCell<SessionState>>,
}

impl MemoryChatSession {
    /// Creates an empty conversation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts the assistant reply to the pending user message. The message itself appears with
    /// the first chunk.
    ///
    /// Returns `None` when no request is in flight, i.e. it was already stopped or reset.
    pub fn begin_reply(&self) -> Option<StreamHandle> {
        let mut state = self.inner.borrow_mut();
        if !state.loading {
            return None;
        }
        Some(StreamHandle {
            message_id: state.next_id("assistant"),
            generation: state.generation,
        })
    }

    /// Appends streamed text to the reply. Returns `false` once the reply was stopped or reset.
    pub fn push_chunk(&self, handle: &StreamHandle, chunk: &str) -> bool {
        {
            let mut state = self.inner.borrow_mut();
            if !state.loading || state.generation != handle.generation {
                return false;
            }
            match state
                .messages
                .iter_mut()
                .find(|message| message.id == handle.message_id)
            {
                Some(message) => message.content.push_str(chunk),
                None => state.messages.push(ChatMessage::new(
                    handle.message_id.clone(),
                    ChatRole::Assistant,
                    chunk,
                )),
            }
        }
        self.notify();
        true
    }

    /// Marks the reply complete.
    pub fn finish_reply(&self, handle: &StreamHandle) {
        let finished = {
            let mut state = self.inner.borrow_mut();
            let current = state.loading && state.generation == handle.generation;
            if current {
                state.loading = false;
            }
            current
        };
        if finished {
            self.notify();
        }
    }

    fn notify(&self) {
        let (messages, observers) = {
            let state = self.inner.borrow();
            let observers = state
                .observers
                .iter()
                .map(|(_, observer)| observer.clone())
                .collect::<Vec<_>>();
            (state.messages.clone(), observers)
        };
        for observer in observers {
            observer(&messages);
        }
    }
}

impl ChatCollaborator for MemoryChatSession {
    fn append_user_message(&self, content: &str) -> String {
        let id = {
            let mut state = self.inner.borrow_mut();
            let id = state.next_id("user");
            state
                .messages
                .push(ChatMessage::new(id.clone(), ChatRole::User, content));
            state.loading = true;
            state.generation += 1;
            id
        };
        self.notify();
        id
    }

    fn messages(&self) -> Vec<ChatMessage> {
        self.inner.borrow().messages.clone()
    }

    fn is_loading(&self) -> bool {
        self.inner.borrow().loading
    }

    fn stop(&self) {
        let stopped = {
            let mut state = self.inner.borrow_mut();
            let was_loading = state.loading;
            if was_loading {
                state.loading = false;
                state.generation += 1;
            }
            was_loading
        };
        if stopped {
            self.notify();
        }
    }

    fn reset(&self, messages: Vec<ChatMessage>) {
        {
            let mut state = self.inner.borrow_mut();
            state.messages = messages;
            state.loading = false;
            state.generation += 1;
        }
        self.notify();
    }

    fn subscribe(&self, observer: ChatObserver) -> SubscriptionId {
        let mut state = self.inner.borrow_mut();
        state.next_subscription += 1;
        let id = SubscriptionId(state.next_subscription);
        state.observers.push((id, observer));
        id
    }

    fn unsubscribe(&self, subscription: SubscriptionId) {
        self.inner
            .borrow_mut()
            .observers
            .retain(|(id, _)| *id != subscription);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use pretty_assertions::assert_eq;

    use super::*;

    fn contents(session: &MemoryChatSession) -> Vec<String> {
        session
            .messages()
            .into_iter()
            .map(|message| message.content)
            .collect()
    }

    #[test]
    fn chunks_accumulate_into_one_assistant_message() {
        let session = MemoryChatSession::new();
        session.append_user_message("hi");
        let reply = session.begin_reply().expect("pending request");
        assert!(session.push_chunk(&reply, "Hello "));
        assert!(session.push_chunk(&reply, "world"));
        session.finish_reply(&reply);

        assert_eq!(contents(&session), vec!["hi", "Hello world"]);
        assert!(!session.is_loading());
    }

    #[test]
    fn stop_is_idempotent_and_drops_late_chunks() {
        let session = MemoryChatSession::new();
        session.append_user_message("hi");
        let reply = session.begin_reply().expect("pending request");
        session.push_chunk(&reply, "Hel");
        session.stop();
        session.stop();
        assert!(!session.push_chunk(&reply, "lo"));
        assert_eq!(contents(&session), vec!["hi", "Hel"]);
        assert!(!session.is_loading());
    }

    #[test]
    fn stopped_request_never_starts_a_reply() {
        let session = MemoryChatSession::new();
        assert_eq!(session.begin_reply(), None);

        session.append_user_message("hi");
        session.stop();
        assert_eq!(session.begin_reply(), None);
        assert!(!session.is_loading());
        assert_eq!(contents(&session), vec!["hi"]);
    }

    #[test]
    fn reset_replaces_conversation_and_invalidates_replies() {
        let session = MemoryChatSession::new();
        session.append_user_message("hi");
        let reply = session.begin_reply().expect("pending request");
        session.reset(vec![ChatMessage::new("seed", ChatRole::System, "be nice")]);
        assert!(!session.push_chunk(&reply, "late"));
        assert_eq!(contents(&session), vec!["be nice"]);
    }

    #[test]
    fn observers_fire_synchronously_until_unsubscribed() {
        let session = MemoryChatSession::new();
        let calls = Rc::new(Cell::new(0));
        let seen = calls.clone();
        let subscription = session.subscribe(Rc::new(move |_messages: &[ChatMessage]| {
            seen.set(seen.get() + 1);
        }));

        session.append_user_message("one");
        assert_eq!(calls.get(), 1);
        session.unsubscribe(subscription);
        session.append_user_message("two");
        assert_eq!(calls.get(), 1);
    }
}
