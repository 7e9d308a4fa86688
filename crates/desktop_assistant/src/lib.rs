//! Assistant side of the ryOS terminal.
//!
//! Assistant replies arrive as an incrementally growing message list from a
//! [`ChatCollaborator`]. [`StreamReconciler`] merges each update into the terminal
//! [`system_shell_contract::DisplayLog`], runs the embedded `<app:launch/>`/`<app:close/>` control
//! tags against an [`desktop_app_contract::AppControl`] and splits HTML out for preview.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod control_tags;
pub mod html;
pub mod message;
pub mod persona;
pub mod reconciler;
pub mod session;
pub mod transport;

pub use control_tags::{
    render_markers, ControlAction, ControlTag, ControlTagParser, RegexControlTagParser,
};
pub use html::{extract_html, HtmlSplit};
pub use message::{ChatMessage, ChatRole};
pub use persona::{seed_messages, system_prompt, SYSTEM_SEED_ID};
pub use reconciler::{ReconcileEffect, ReconcileReport, StreamReconciler, AI_RESPONSE_SOUND};
pub use session::{
    ChatCollaborator, ChatObserver, MemoryChatSession, StreamHandle, SubscriptionId,
};
pub use transport::{
    drive_chat_stream, parse_chat_request, ChatChunkStream, ChatRequest, ChatTransport,
    ChatTransportError, ScriptedChatTransport,
};
