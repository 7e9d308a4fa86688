//! Chat transport seam: request parsing, error taxonomy and the chunk-stream driver.

use futures::{
    stream::{self, LocalBoxStream},
    StreamExt,
};
use leptos::logging;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    message::ChatMessage,
    session::{ChatCollaborator, MemoryChatSession},
};

/// Stream of text deltas for one assistant reply.
pub type ChatChunkStream = LocalBoxStream<'static, Result<String, ChatTransportError>>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Failures surfaced by a chat transport.
pub enum ChatTransportError {
    /// The request payload was malformed.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// The upstream provider failed.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ChatTransportError {
    /// HTTP-style status code for the failure.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) => 400,
            Self::Internal(_) => 500,
        }
    }
}

/// Payload sent to the chat backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Full conversation so far.
    pub messages: Vec<ChatMessage>,
    /// Provider model override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Parses a raw JSON chat request.
///
/// # Errors
///
/// Returns [`ChatTransportError::BadRequest`] for invalid JSON or an empty conversation.
pub fn parse_chat_request(raw: &str) -> Result<ChatRequest, ChatTransportError> {
    let request: ChatRequest =
        serde_json::from_str(raw).map_err(|e| ChatTransportError::BadRequest(e.to_string()))?;
    if request.messages.is_empty() {
        return Err(ChatTransportError::BadRequest(
            "messages must not be empty".to_string(),
        ));
    }
    Ok(request)
}

/// Produces streamed replies.
pub trait ChatTransport {
    /// Starts streaming a reply to `request`.
    fn stream_reply(&self, request: ChatRequest) -> ChatChunkStream;
}

/// Transport that replays a fixed script of chunks for every request.
#[derive(Debug, Clone, Default)]
pub struct ScriptedChatTransport {
    script: Vec<Result<String, ChatTransportError>>,
}

impl ScriptedChatTransport {
    /// Replies with `chunks` in order.
    pub fn chunks<I, S>(chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: chunks.into_iter().map(|chunk| Ok(chunk.into())).collect(),
        }
    }

    /// Appends a failure after the scripted chunks.
    pub fn then_fail(mut self, err: ChatTransportError) -> Self {
        self.script.push(Err(err));
        self
    }
}

impl ChatTransport for ScriptedChatTransport {
    fn stream_reply(&self, _request: ChatRequest) -> ChatChunkStream {
        stream::iter(self.script.clone()).boxed_local()
    }
}

/// Streams one reply to the session's current conversation.
///
/// Does nothing when the pending request was already stopped, and stops early without error once
/// the reply is stopped or reset mid-stream.
///
/// # Errors
///
/// Returns the transport failure; the session is left not loading.
pub async fn drive_chat_stream<T: ChatTransport + ?Sized>(
    session: &MemoryChatSession,
    transport: &T,
) -> Result<(), ChatTransportError> {
    let request = ChatRequest {
        messages: session.messages(),
        model: None,
    };
    let Some(reply) = session.begin_reply() else {
        logging::log!("chat request cancelled before the reply started");
        return Ok(());
    };
    let mut chunks = transport.stream_reply(request);
    while let Some(chunk) = chunks.next().await {
        match chunk {
            Ok(text) => {
                if !session.push_chunk(&reply, &text) {
                    logging::log!("chat reply {} stopped", reply.message_id);
                    return Ok(());
                }
            }
            Err(err) => {
                logging::warn!("chat reply {} failed: {err}", reply.message_id);
                session.finish_reply(&reply);
                return Err(err);
            }
        }
    }
    session.finish_reply(&reply);
    Ok(())
}
