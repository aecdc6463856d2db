use serde::{ Serialize, Deserialize };

use crate::render::ChatView;
use crate::suggestion::WidgetView;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum ClientMessage {
    #[serde(rename = "chat")] Chat {
        content: String,
    },
    #[serde(rename = "clear")]
    Clear,
    #[serde(rename = "dismiss_error")]
    DismissError,
    #[serde(rename = "suggest")] Suggest {
        #[serde(default)]
        prompt: Option<String>,
    },
}

#[derive(Serialize, Debug, Clone)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "chat_state")] ChatState {
        view: ChatView,
    },
    #[serde(rename = "suggestion")] Suggestion {
        view: WidgetView,
    },
    #[serde(rename = "focus")]
    Focus,
    #[serde(rename = "error")] Error {
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_frames_parse() {
        let chat: ClientMessage = serde_json::from_str(r#"{"type":"chat","content":"hi"}"#).unwrap();
        assert_eq!(chat, ClientMessage::Chat { content: "hi".to_string() });

        let clear: ClientMessage = serde_json::from_str(r#"{"type":"clear"}"#).unwrap();
        assert_eq!(clear, ClientMessage::Clear);

        let suggest: ClientMessage = serde_json::from_str(r#"{"type":"suggest"}"#).unwrap();
        assert_eq!(suggest, ClientMessage::Suggest { prompt: None });
    }

    #[test]
    fn focus_frame_is_tag_only() {
        let json = serde_json::to_string(&ServerMessage::Focus).unwrap();
        assert_eq!(json, r#"{"type":"focus"}"#);
    }
}
