use serde::Serialize;

use crate::format::{ escape_html, render_markdown };
use crate::models::chat::{ Message, Role };

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct MessageView {
    pub role: Role,
    pub html: String,
    pub timestamp: String,
    pub meta: String,
    pub is_error: bool,
}

impl MessageView {
    /// Assistant text is rendered as markdown; everything else is escaped.
    pub fn from_message(message: &Message) -> Self {
        let html = match message.role() {
            Role::Assistant => render_markdown(message.text()),
            Role::User | Role::System => escape_html(message.text()),
        };
        Self {
            role: message.role(),
            html,
            timestamp: message.timestamp_label(),
            meta: message_meta(message),
            is_error: message.is_error(),
        }
    }
}

/// Footer line under a bubble, e.g. `14:05 • Cached • 812ms`.
pub fn message_meta(message: &Message) -> String {
    let mut meta = message.timestamp_label();
    if message.cached() {
        meta.push_str(" • Cached");
    }
    if let Some(ms) = message.generation_time_ms().filter(|ms| *ms > 0) {
        meta.push_str(&format!(" • {}ms", ms));
    }
    meta
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ChatView {
    pub messages: Vec<MessageView>,
    pub loading: bool,
    pub typing: bool,
    pub error: Option<String>,
    pub input: String,
    pub can_clear: bool,
    pub can_send: bool,
}

pub fn render_transcript(messages: &[Message]) -> Vec<MessageView> {
    messages.iter().map(MessageView::from_message).collect()
}
