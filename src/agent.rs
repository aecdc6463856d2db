use log::info;
use std::error::Error;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::llm::{ new_client, GenerateClient };
use crate::session::{ ChatSession, TaskResult };
use crate::suggestion::{ SuggestionWidget, WidgetView };

/// Shared by every connection: the configuration and the generate client.
/// Per-page state lives in the sessions it opens.
#[derive(Clone)]
pub struct CareerAgent {
    config: Arc<AppConfig>,
    client: Arc<dyn GenerateClient>,
}

impl CareerAgent {
    pub fn new(config: AppConfig) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let client = new_client(&config)?;
        info!(
            "Generate client configured: Endpoint={}, Timeout={:?}",
            client.endpoint(),
            config.request_timeout
        );
        Ok(Self::with_client(config, client))
    }

    pub fn with_client(config: AppConfig, client: Arc<dyn GenerateClient>) -> Self {
        Self { config: Arc::new(config), client }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn open_session(&self) -> (ChatSession, mpsc::UnboundedReceiver<TaskResult>) {
        ChatSession::new(
            Uuid::new_v4().to_string(),
            Arc::clone(&self.client),
            self.config.chat.clone(),
            self.config.widget_prompt.clone()
        )
    }

    /// Mounts a throwaway widget and waits for its single request.
    pub async fn suggest_once(&self, prompt: Option<&str>) -> WidgetView {
        let prompt = prompt
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or(self.config.widget_prompt.as_str());
        let mut widget = SuggestionWidget::new();
        widget.fetch(Arc::clone(&self.client), prompt).await;
        widget.view()
    }
}
