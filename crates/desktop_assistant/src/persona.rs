//! The "ryo" persona seed that starts every terminal conversation.

use desktop_app_contract::AppId;

use crate::message::{ChatMessage, ChatRole};

/// Id of the system seed message.
pub const SYSTEM_SEED_ID: &str = "system";

const PERSONA: &str = "\
You are ryo, the assistant living inside the ryOS terminal. Answer in short lowercase \
sentences, like a friend typing in a terminal. Never use markdown headings.

You can control the desktop. To open an app, write <app:launch id=\"APPID\"/>. To close one, \
write <app:close id=\"APPID\"/>. Use each tag at most once per reply and only when the user \
asks for it.

When asked to build something visual, reply with a single ```html fenced block containing a \
complete page.";

/// Full system prompt, including the application ids the control tags accept.
pub fn system_prompt() -> String {
    let ids = AppId::ALL
        .iter()
        .map(|app_id| format!("{} ({})", app_id.canonical_id(), app_id.title()))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{PERSONA}\n\nAvailable app ids: {ids}.")
}

/// Conversation a fresh chat starts from.
pub fn seed_messages() -> Vec<ChatMessage> {
    vec![ChatMessage::new(
        SYSTEM_SEED_ID,
        ChatRole::System,
        system_prompt(),
    )]
}
