use log::{ debug, warn };
use serde::Serialize;
use std::sync::Arc;

use crate::chat::FailureKind;
use crate::llm::{ ApiError, GenerateClient };
use crate::models::suggestion::SuggestionPayload;

pub const DEFAULT_WIDGET_PROMPT: &str = "Suggest a career roadmap and recommended resources";
pub const FALLBACK_WARNING: &str = "AI service not available — showing fallback suggestions.";
pub const MAX_WIDGET_RESOURCES: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionRequest {
    token: u64,
    prompt: String,
}

impl SuggestionRequest {
    pub fn token(&self) -> u64 {
        self.token
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub async fn run(self, client: Arc<dyn GenerateClient>) -> SuggestionResult {
        let result = client.generate(&self.prompt).await;
        SuggestionResult { token: self.token, result }
    }
}

#[derive(Debug)]
pub struct SuggestionResult {
    pub token: u64,
    pub result: Result<SuggestionPayload, ApiError>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ResourceLink {
    pub title: String,
    pub url: String,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct WidgetView {
    pub loading: bool,
    pub title: Option<String>,
    pub explanation: Option<String>,
    pub average_salary: Option<String>,
    pub resources: Vec<ResourceLink>,
    pub video_url: Option<String>,
    pub warning: Option<String>,
}

/// State of one mounted widget.
///
/// Every request gets a fresh token and only the most recently issued one
/// may land; results of superseded requests, or any result arriving after
/// [`unmount`](SuggestionWidget::unmount), are discarded.
#[derive(Debug, Default)]
pub struct SuggestionWidget {
    prompt: Option<String>,
    mounted: bool,
    latest: u64,
    loading: bool,
    data: Option<SuggestionPayload>,
    warning: Option<String>,
}

impl SuggestionWidget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mount(&mut self, prompt: &str) -> SuggestionRequest {
        self.mounted = true;
        self.prompt = Some(prompt.to_string());
        self.issue()
    }

    /// Issues a request only if the widget is mounted and the prompt changed.
    pub fn set_prompt(&mut self, prompt: &str) -> Option<SuggestionRequest> {
        if !self.mounted || self.prompt.as_deref() == Some(prompt) {
            return None;
        }
        self.prompt = Some(prompt.to_string());
        Some(self.issue())
    }

    fn issue(&mut self) -> SuggestionRequest {
        self.latest += 1;
        self.loading = true;
        self.warning = None;
        let prompt = self.prompt.clone().unwrap_or_default();
        debug!("Suggestion request {} for prompt: {}", self.latest, prompt);
        SuggestionRequest { token: self.latest, prompt }
    }

    pub fn unmount(&mut self) {
        self.mounted = false;
        // Nothing issued so far can match any more.
        self.latest += 1;
        self.loading = false;
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn is_current(&self, token: u64) -> bool {
        self.mounted && token == self.latest
    }

    pub fn apply(&mut self, outcome: SuggestionResult) -> bool {
        if !self.is_current(outcome.token) {
            debug!("Discarding superseded suggestion result {}", outcome.token);
            return false;
        }
        match outcome.result {
            Ok(payload) => {
                self.data = Some(payload);
                self.warning = None;
            }
            Err(e) => {
                warn!(
                    "Suggestion request {} failed ({}): {}. Using fallback.",
                    outcome.token,
                    FailureKind::classify(&e),
                    e
                );
                self.data = Some(SuggestionPayload::fallback());
                self.warning = Some(FALLBACK_WARNING.to_string());
            }
        }
        self.loading = false;
        true
    }

    /// Mounts (or re-prompts) and waits for the request inline.
    pub async fn fetch(&mut self, client: Arc<dyn GenerateClient>, prompt: &str) -> bool {
        let request = if self.mounted { self.set_prompt(prompt) } else { Some(self.mount(prompt)) };
        match request {
            Some(request) => {
                let outcome = request.run(client).await;
                self.apply(outcome)
            }
            None => false,
        }
    }

    pub fn payload(&self) -> Option<&SuggestionPayload> {
        self.data.as_ref()
    }

    pub fn warning(&self) -> Option<&str> {
        self.warning.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn view(&self) -> WidgetView {
        let data = self.data.as_ref();
        let resources = data
            .map(|d| {
                d.learning_resources
                    .iter()
                    .take(MAX_WIDGET_RESOURCES)
                    .map(|r| ResourceLink {
                        title: r.title.clone().unwrap_or_default(),
                        url: r.url.clone().unwrap_or_default(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        WidgetView {
            loading: self.loading,
            title: data.and_then(|d| d.title.clone()),
            explanation: data.and_then(|d| d.explanation.clone()),
            average_salary: data.and_then(|d| d.average_salary.clone()),
            resources,
            video_url: data.and_then(|d| d.youtube_video_recommendation.clone()),
            warning: self.warning.clone(),
        }
    }
}
