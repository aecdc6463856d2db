use chrono::{ DateTime, Local, Utc };
use serde::{ Serialize, Deserialize };
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One turn of the transcript. Messages are never edited after creation,
/// so there are no setters; a change in state is a new message.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    role: Role,
    text: String,
    timestamp: DateTime<Utc>,
    #[serde(default)]
    cached: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    generation_time_ms: Option<u64>,
    #[serde(default)]
    is_error: bool,
}

impl Message {
    fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            timestamp: Utc::now(),
            cached: false,
            generation_time_ms: None,
            is_error: false,
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Role::System, text)
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    /// `text` is the formatted answer, not the raw provider payload.
    pub fn assistant(text: impl Into<String>, cached: bool, generation_time_ms: Option<u64>) -> Self {
        Self {
            cached,
            generation_time_ms,
            ..Self::new(Role::Assistant, text)
        }
    }

    /// An assistant turn synthesized locally after a failed request.
    pub fn assistant_error(text: impl Into<String>) -> Self {
        Self {
            is_error: true,
            ..Self::new(Role::Assistant, text)
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn cached(&self) -> bool {
        self.cached
    }

    pub fn generation_time_ms(&self) -> Option<u64> {
        self.generation_time_ms
    }

    pub fn is_error(&self) -> bool {
        self.is_error
    }

    /// Wall-clock `HH:MM` in the host's local zone.
    pub fn timestamp_label(&self) -> String {
        self.timestamp.with_timezone(&Local).format("%H:%M").to_string()
    }
}
