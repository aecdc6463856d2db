use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use super::{ ApiError, GenerateClient };
use crate::models::suggestion::SuggestionPayload;

pub enum Reply {
    Payload(SuggestionPayload),
    Status(u16),
    Fault,
}

/// Answers generate calls from a script, recording every prompt.
#[derive(Default)]
pub struct ScriptedClient {
    replies: Mutex<VecDeque<Reply>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedClient {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

fn answer(reply: Reply) -> Result<SuggestionPayload, ApiError> {
    match reply {
        Reply::Payload(payload) => Ok(payload),
        Reply::Status(status) => Err(ApiError::Status { status, body: String::new() }),
        Reply::Fault => Err(ApiError::Request("scripted fault".to_string())),
    }
}

#[async_trait]
impl GenerateClient for ScriptedClient {
    async fn generate(&self, prompt: &str) -> Result<SuggestionPayload, ApiError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let reply = self.replies.lock().unwrap().pop_front().unwrap_or(Reply::Status(500));
        answer(reply)
    }

    fn endpoint(&self) -> String {
        "scripted".to_string()
    }
}
