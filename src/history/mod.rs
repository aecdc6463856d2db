pub mod context;

use crate::models::chat::Message;

pub use context::{ build_context_prompt, CONTEXT_WINDOW_LEN };

pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful career assistant. I can help you explore career paths, find learning resources, understand salary expectations, and discover job opportunities.";

/// The transcript of one chat page. Index 0 is always the seed system message
/// and messages stay in insertion order; nothing is ever removed except by
/// [`ConversationStore::reset`], which goes back to the seed alone.
#[derive(Clone, Debug)]
pub struct ConversationStore {
    seed: Message,
    messages: Vec<Message>,
}

impl ConversationStore {
    pub fn new(seed: Message) -> Self {
        Self {
            messages: vec![seed.clone()],
            seed,
        }
    }

    pub fn with_system_prompt(prompt: &str) -> Self {
        Self::new(Message::system(prompt))
    }

    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn reset(&mut self) {
        self.messages.clear();
        self.messages.push(self.seed.clone());
    }

    pub fn all(&self) -> &[Message] {
        &self.messages
    }

    pub fn seed(&self) -> &Message {
        &self.seed
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Always false: the seed can't be removed.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::with_system_prompt(DEFAULT_SYSTEM_PROMPT)
    }
}
