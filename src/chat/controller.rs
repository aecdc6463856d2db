use log::{ debug, info, warn };
use std::sync::Arc;
use std::time::Duration;

use super::error::FailureKind;
use crate::format::format_suggestion;
use crate::history::{ build_context_prompt, ConversationStore, CONTEXT_WINDOW_LEN, DEFAULT_SYSTEM_PROMPT };
use crate::llm::{ ApiError, GenerateClient };
use crate::models::chat::Message;
use crate::models::suggestion::SuggestionPayload;
use crate::render::{ render_transcript, ChatView };

pub const DEFAULT_TYPING_DELAY: Duration = Duration::from_millis(500);
pub const MAX_INPUT_CHARS: usize = 2000;

#[derive(Debug, Clone)]
pub struct ChatSettings {
    pub system_prompt: String,
    pub context_window: usize,
    pub typing_delay: Duration,
    pub max_input_chars: usize,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            context_window: CONTEXT_WINDOW_LEN,
            typing_delay: DEFAULT_TYPING_DELAY,
            max_input_chars: MAX_INPUT_CHARS,
        }
    }
}

/// A submitted turn waiting for the generator.
#[derive(Debug)]
pub struct PendingTurn {
    token: u64,
    prompt: String,
}

impl PendingTurn {
    pub fn token(&self) -> u64 {
        self.token
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Runs the remote call. A successful answer is held back for
    /// `typing_delay` so the typing indicator stays visible; failures
    /// return immediately.
    pub async fn resolve(self, client: Arc<dyn GenerateClient>, typing_delay: Duration) -> TurnOutcome {
        let result = client.generate(&self.prompt).await;
        if result.is_ok() && !typing_delay.is_zero() {
            tokio::time::sleep(typing_delay).await;
        }
        TurnOutcome { token: self.token, result }
    }
}

#[derive(Debug)]
pub struct TurnOutcome {
    pub token: u64,
    pub result: Result<SuggestionPayload, ApiError>,
}

/// Drives one chat page: input buffer, transcript, and the
/// idle -> sending -> idle cycle around each generate call.
///
/// At most one turn is outstanding at a time. [`ChatController::send`] runs a
/// whole turn; hosts that need to show the `loading` state while the call is
/// in flight use [`submit`](ChatController::submit) and
/// [`complete`](ChatController::complete) around
/// [`PendingTurn::resolve`] instead.
pub struct ChatController {
    client: Arc<dyn GenerateClient>,
    settings: ChatSettings,
    store: ConversationStore,
    input: String,
    loading: bool,
    typing: bool,
    error: Option<String>,
    outstanding: Option<u64>,
    next_token: u64,
    focus_requested: bool,
}

impl ChatController {
    pub fn new(client: Arc<dyn GenerateClient>, settings: ChatSettings) -> Self {
        let store = ConversationStore::with_system_prompt(&settings.system_prompt);
        Self {
            client,
            settings,
            store,
            input: String::new(),
            loading: false,
            typing: false,
            error: None,
            outstanding: None,
            next_token: 0,
            // The input is focused on mount.
            focus_requested: true,
        }
    }

    pub fn client(&self) -> Arc<dyn GenerateClient> {
        Arc::clone(&self.client)
    }

    pub fn settings(&self) -> &ChatSettings {
        &self.settings
    }

    pub fn messages(&self) -> &[Message] {
        self.store.all()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_typing(&self) -> bool {
        self.typing
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Replaces the input buffer, cut to `max_input_chars`. Ignored while a
    /// turn is outstanding since the field is disabled.
    pub fn set_input(&mut self, text: &str) {
        if self.loading {
            return;
        }
        self.input = text.chars().take(self.settings.max_input_chars).collect();
    }

    /// Starts a turn from the current input. Returns `None` without touching
    /// any state when the trimmed input is empty or a turn is outstanding.
    pub fn submit(&mut self) -> Option<PendingTurn> {
        if self.loading {
            debug!("Submit ignored: a request is already outstanding");
            return None;
        }
        let text = self.input.trim().to_string();
        if text.is_empty() {
            return None;
        }

        self.error = None;
        let prompt = build_context_prompt(self.store.all(), self.settings.context_window, &text);
        self.store.append(Message::user(text));
        self.input.clear();
        self.loading = true;
        self.typing = true;

        self.next_token += 1;
        let token = self.next_token;
        self.outstanding = Some(token);
        debug!("Turn {} prompt: {}", token, prompt);

        Some(PendingTurn { token, prompt })
    }

    /// Applies the outcome of the outstanding turn. Outcomes of any other
    /// turn are dropped and `false` is returned.
    pub fn complete(&mut self, outcome: TurnOutcome) -> bool {
        if self.outstanding != Some(outcome.token) {
            debug!("Dropping outcome of stale turn {}", outcome.token);
            return false;
        }

        match outcome.result {
            Ok(payload) => {
                let text = format_suggestion(&payload);
                info!(
                    "Turn {} answered (cached: {}, {:?}ms)",
                    outcome.token,
                    payload.cached,
                    payload.generation_time_ms
                );
                self.store.append(Message::assistant(text, payload.cached, payload.generation_time_ms));
            }
            Err(e) => {
                let kind = FailureKind::classify(&e);
                warn!("Turn {} failed ({}): {}", outcome.token, kind, e);
                let text = kind.user_message();
                self.error = Some(text.clone());
                self.store.append(Message::assistant_error(text));
            }
        }

        self.outstanding = None;
        self.loading = false;
        self.typing = false;
        self.focus_requested = true;
        true
    }

    /// Runs a whole turn. Returns `false` when the input was a no-op.
    pub async fn send(&mut self) -> bool {
        let Some(turn) = self.submit() else {
            return false;
        };
        let outcome = turn.resolve(self.client(), self.settings.typing_delay).await;
        self.complete(outcome)
    }

    pub async fn send_text(&mut self, text: &str) -> bool {
        self.set_input(text);
        self.send().await
    }

    /// Back to the seed message. Refused while a turn is outstanding.
    pub fn clear_chat(&mut self) -> bool {
        if self.loading {
            return false;
        }
        self.store.reset();
        self.error = None;
        self.focus_requested = true;
        true
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Returns and resets the pending request to focus the input field.
    pub fn take_focus_request(&mut self) -> bool {
        std::mem::take(&mut self.focus_requested)
    }

    pub fn can_clear(&self) -> bool {
        !self.loading && self.store.len() > 1
    }

    pub fn can_send(&self) -> bool {
        !self.loading && !self.input.trim().is_empty()
    }

    pub fn view(&self) -> ChatView {
        ChatView {
            messages: render_transcript(self.store.all()),
            loading: self.loading,
            typing: self.typing,
            error: self.error.clone(),
            input: self.input.clone(),
            can_clear: self.can_clear(),
            can_send: self.can_send(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::FALLBACK_RESPONSE;
    use crate::llm::mock::{ Reply, ScriptedClient };
    use crate::llm::HttpGenerateClient;
    use crate::models::chat::Role;
    use pretty_assertions::assert_eq;

    fn instant_settings() -> ChatSettings {
        ChatSettings { typing_delay: Duration::ZERO, ..Default::default() }
    }

    fn controller(replies: Vec<Reply>) -> (ChatController, Arc<ScriptedClient>) {
        let client = Arc::new(ScriptedClient::new(replies));
        let controller = ChatController::new(client.clone(), instant_settings());
        (controller, client)
    }

    fn titled(title: &str) -> Reply {
        Reply::Payload(SuggestionPayload { title: Some(title.to_string()), ..Default::default() })
    }

    #[tokio::test]
    async fn completed_send_adds_two_messages() {
        let (mut chat, client) = controller(vec![titled("Data Analyst")]);

        assert!(chat.send_text("  What should I learn?  ").await);

        let messages = chat.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].role(), Role::User);
        assert_eq!(messages[1].text(), "What should I learn?");
        assert_eq!(messages[2].role(), Role::Assistant);
        assert_eq!(messages[2].text(), "**Data Analyst**");
        assert!(!messages[2].is_error());
        assert_eq!(client.prompts(), vec!["user: What should I learn?".to_string()]);
        assert_eq!(chat.input(), "");
        assert!(!chat.is_loading());
    }

    #[tokio::test]
    async fn blank_input_is_a_no_op() {
        let (mut chat, client) = controller(vec![]);
        for input in ["", "   ", "\n\t "] {
            chat.set_input(input);
            assert!(!chat.send().await);
            assert_eq!(chat.messages().len(), 1);
            assert_eq!(chat.input(), input);
        }
        assert!(client.prompts().is_empty());
    }

    #[tokio::test]
    async fn user_message_is_appended_before_the_call() {
        let (mut chat, _client) = controller(vec![titled("x")]);
        chat.set_input("hello");
        let turn = chat.submit().unwrap();

        assert_eq!(chat.messages().len(), 2);
        assert_eq!(chat.messages()[1].text(), "hello");
        assert!(chat.is_loading());
        assert!(chat.is_typing());
        assert_eq!(chat.input(), "");
        assert_eq!(turn.prompt(), "user: hello");

        let view = chat.view();
        assert!(view.loading);
        assert!(!view.can_clear);
        assert!(!view.can_send);
    }

    #[tokio::test]
    async fn second_submit_while_loading_is_refused() {
        let (mut chat, _client) = controller(vec![titled("x")]);
        chat.set_input("one");
        let _turn = chat.submit().unwrap();

        chat.set_input("two");
        assert!(chat.submit().is_none());
        assert_eq!(chat.messages().len(), 2);
        assert!(!chat.clear_chat());
    }

    #[tokio::test]
    async fn context_uses_pre_submission_history() {
        let (mut chat, client) = controller(vec![titled("A"), titled("B")]);
        chat.send_text("first").await;
        chat.send_text("second").await;

        let prompts = client.prompts();
        assert_eq!(prompts[0], "user: first");
        assert_eq!(prompts[1], "user: first\nassistant: **A**\nuser: second");
    }

    #[tokio::test]
    async fn failure_appends_error_message_and_banner() {
        let (mut chat, _client) = controller(vec![Reply::Status(429)]);
        assert!(chat.send_text("hi").await);

        let last = chat.messages().last().unwrap();
        assert!(last.is_error());
        assert_eq!(last.role(), Role::Assistant);
        assert!(last.text().contains("too many requests"));
        assert_eq!(chat.error(), Some(last.text()));
        assert_eq!(chat.messages().len(), 3);
        assert!(!chat.is_loading());
    }

    #[tokio::test]
    async fn each_status_gets_its_own_wording() {
        let cases = [
            (503, "temporarily unavailable"),
            (400, "rephrasing your question"),
            (500, "Please try again in a moment."),
        ];
        for (status, wording) in cases {
            let (mut chat, _client) = controller(vec![Reply::Status(status)]);
            chat.send_text("hi").await;
            assert!(chat.error().unwrap().contains(wording), "status {}", status);
        }

        let (mut chat, _client) = controller(vec![Reply::Fault]);
        chat.send_text("hi").await;
        assert!(chat.error().unwrap().ends_with("An unexpected error occurred."));
    }

    #[tokio::test]
    async fn unreachable_service_asks_to_check_connection() {
        let base = url::Url::parse("http://127.0.0.1:9").unwrap();
        let client = HttpGenerateClient::new(&base, Some(Duration::from_secs(2))).unwrap();
        let mut chat = ChatController::new(Arc::new(client), instant_settings());

        chat.send_text("hi").await;
        assert!(chat.error().unwrap().contains("check your internet connection"));
    }

    #[tokio::test]
    async fn retry_after_error_clears_banner() {
        let (mut chat, client) = controller(vec![Reply::Status(503), titled("Back")]);
        chat.send_text("hi").await;
        assert!(chat.error().is_some());

        chat.send_text("hi").await;
        assert_eq!(chat.error(), None);
        assert_eq!(chat.messages().len(), 5);
        assert_eq!(chat.messages()[4].text(), "**Back**");
        assert!(client.prompts()[1].contains("assistant: I'm having trouble"));
    }

    #[tokio::test]
    async fn empty_answer_uses_fallback_sentence() {
        let (mut chat, _client) = controller(vec![Reply::Payload(SuggestionPayload::default())]);
        chat.send_text("hi").await;
        assert_eq!(chat.messages()[2].text(), FALLBACK_RESPONSE);
        assert!(!chat.messages()[2].is_error());
    }

    #[tokio::test]
    async fn cache_metadata_is_carried() {
        let payload = SuggestionPayload {
            title: Some("Cached".into()),
            cached: true,
            generation_time_ms: Some(12),
            ..Default::default()
        };
        let (mut chat, _client) = controller(vec![Reply::Payload(payload)]);
        chat.send_text("hi").await;
        let answer = &chat.messages()[2];
        assert!(answer.cached());
        assert_eq!(answer.generation_time_ms(), Some(12));
    }

    #[tokio::test]
    async fn clear_resets_to_seed_and_banner() {
        let (mut chat, _client) = controller(vec![titled("a"), Reply::Status(500)]);
        let seed = chat.messages()[0].clone();
        chat.send_text("one").await;
        chat.send_text("two").await;
        assert!(chat.error().is_some());

        assert!(chat.clear_chat());
        assert_eq!(chat.messages(), &[seed]);
        assert_eq!(chat.error(), None);
        assert!(!chat.can_clear());
    }

    #[tokio::test]
    async fn stale_outcome_is_ignored() {
        let (mut chat, client) = controller(vec![titled("x")]);
        chat.set_input("hi");
        let turn = chat.submit().unwrap();
        let outcome = TurnOutcome { token: turn.token() + 7, result: Ok(SuggestionPayload::default()) };
        assert!(!chat.complete(outcome));
        assert!(chat.is_loading());

        let real = turn.resolve(client, Duration::ZERO).await;
        assert!(chat.complete(real));
        assert_eq!(chat.messages().len(), 3);
    }

    #[tokio::test]
    async fn focus_is_requested_after_send_and_clear() {
        let (mut chat, _client) = controller(vec![titled("a")]);
        assert!(chat.take_focus_request());
        assert!(!chat.take_focus_request());

        chat.send_text("hi").await;
        assert!(chat.take_focus_request());

        chat.clear_chat();
        assert!(chat.take_focus_request());
    }

    #[tokio::test]
    async fn input_is_capped() {
        let (mut chat, _client) = controller(vec![]);
        chat.set_input(&"é".repeat(MAX_INPUT_CHARS + 50));
        assert_eq!(chat.input().chars().count(), MAX_INPUT_CHARS);
    }

    #[tokio::test(start_paused = true)]
    async fn success_waits_for_typing_delay() {
        let client = Arc::new(ScriptedClient::new(vec![titled("x")]));
        let mut chat = ChatController::new(client.clone(), ChatSettings::default());
        chat.set_input("hi");
        let turn = chat.submit().unwrap();

        let start = tokio::time::Instant::now();
        let outcome = turn.resolve(client, DEFAULT_TYPING_DELAY).await;
        assert!(start.elapsed() >= DEFAULT_TYPING_DELAY);
        assert!(chat.is_typing());

        chat.complete(outcome);
        assert!(!chat.is_typing());
    }

    #[tokio::test(start_paused = true)]
    async fn failure_skips_typing_delay() {
        let client = Arc::new(ScriptedClient::new(vec![Reply::Status(503)]));
        let mut chat = ChatController::new(client.clone(), ChatSettings::default());
        chat.set_input("hi");
        let turn = chat.submit().unwrap();

        let start = tokio::time::Instant::now();
        let _ = turn.resolve(client, DEFAULT_TYPING_DELAY).await;
        assert!(start.elapsed() < DEFAULT_TYPING_DELAY);
    }
}
