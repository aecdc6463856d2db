use log::{ debug, info };
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::chat::{ ChatController, ChatSettings, TurnOutcome };
use crate::llm::GenerateClient;
use crate::models::websocket::{ ClientMessage, ServerMessage };
use crate::suggestion::{ SuggestionResult, SuggestionWidget };

/// Result of a background generate call, routed back to its session.
#[derive(Debug)]
pub enum TaskResult {
    Chat(TurnOutcome),
    Suggestion(SuggestionResult),
}

/// Everything one connected page owns: its chat transcript and its
/// suggestion widget. Generate calls run as spawned tasks and report back
/// through the channel returned by [`ChatSession::new`]; dropping the
/// session aborts them.
pub struct ChatSession {
    id: String,
    client: Arc<dyn GenerateClient>,
    chat: ChatController,
    widget: SuggestionWidget,
    widget_prompt: String,
    results_tx: mpsc::UnboundedSender<TaskResult>,
    chat_task: Option<JoinHandle<()>>,
    suggestion_task: Option<JoinHandle<()>>,
}

impl ChatSession {
    pub fn new(
        id: String,
        client: Arc<dyn GenerateClient>,
        settings: ChatSettings,
        widget_prompt: String
    ) -> (Self, mpsc::UnboundedReceiver<TaskResult>) {
        let (results_tx, results_rx) = mpsc::unbounded_channel();
        let chat = ChatController::new(Arc::clone(&client), settings);
        let session = Self {
            id,
            client,
            chat,
            widget: SuggestionWidget::new(),
            widget_prompt,
            results_tx,
            chat_task: None,
            suggestion_task: None,
        };
        (session, results_rx)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn chat(&self) -> &ChatController {
        &self.chat
    }

    pub fn widget(&self) -> &SuggestionWidget {
        &self.widget
    }

    /// State pushed right after the page connects.
    pub fn initial_frames(&mut self) -> Vec<ServerMessage> {
        self.frames_with_chat_state()
    }

    pub fn handle(&mut self, message: ClientMessage) -> Vec<ServerMessage> {
        match message {
            ClientMessage::Chat { content } => {
                self.chat.set_input(&content);
                if let Some(turn) = self.chat.submit() {
                    let client = Arc::clone(&self.client);
                    let delay = self.chat.settings().typing_delay;
                    let tx = self.results_tx.clone();
                    self.chat_task = Some(
                        tokio::spawn(async move {
                            let outcome = turn.resolve(client, delay).await;
                            let _ = tx.send(TaskResult::Chat(outcome));
                        })
                    );
                }
                self.frames_with_chat_state()
            }
            ClientMessage::Clear => {
                if !self.chat.clear_chat() {
                    debug!("Session {}: clear refused while a request is outstanding", self.id);
                }
                self.frames_with_chat_state()
            }
            ClientMessage::DismissError => {
                self.chat.dismiss_error();
                self.frames_with_chat_state()
            }
            ClientMessage::Suggest { prompt } => {
                let prompt = prompt
                    .filter(|p| !p.trim().is_empty())
                    .unwrap_or_else(|| self.widget_prompt.clone());
                let request = if self.widget.is_mounted() {
                    self.widget.set_prompt(&prompt)
                } else {
                    Some(self.widget.mount(&prompt))
                };
                if let Some(request) = request {
                    if let Some(previous) = self.suggestion_task.take() {
                        previous.abort();
                    }
                    let client = Arc::clone(&self.client);
                    let tx = self.results_tx.clone();
                    self.suggestion_task = Some(
                        tokio::spawn(async move {
                            let outcome = request.run(client).await;
                            let _ = tx.send(TaskResult::Suggestion(outcome));
                        })
                    );
                }
                vec![ServerMessage::Suggestion { view: self.widget.view() }]
            }
        }
    }

    pub fn on_result(&mut self, result: TaskResult) -> Vec<ServerMessage> {
        match result {
            TaskResult::Chat(outcome) => {
                if !self.chat.complete(outcome) {
                    return Vec::new();
                }
                self.chat_task = None;
                self.frames_with_chat_state()
            }
            TaskResult::Suggestion(outcome) => {
                if !self.widget.apply(outcome) {
                    return Vec::new();
                }
                self.suggestion_task = None;
                vec![ServerMessage::Suggestion { view: self.widget.view() }]
            }
        }
    }

    /// Page teardown: outstanding calls are aborted and any result still in
    /// flight is ignored.
    pub fn close(&mut self) {
        for task in [self.chat_task.take(), self.suggestion_task.take()].into_iter().flatten() {
            task.abort();
        }
        if self.widget.is_mounted() {
            self.widget.unmount();
        }
        info!("Session {} closed", self.id);
    }

    fn frames_with_chat_state(&mut self) -> Vec<ServerMessage> {
        let mut frames = vec![ServerMessage::ChatState { view: self.chat.view() }];
        if self.chat.take_focus_request() {
            frames.push(ServerMessage::Focus);
        }
        frames
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        for task in [self.chat_task.take(), self.suggestion_task.take()].into_iter().flatten() {
            task.abort();
        }
    }
}
