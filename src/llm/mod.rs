pub mod http;
#[cfg(test)]
pub mod mock;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::config::AppConfig;
use crate::models::suggestion::SuggestionPayload;

pub use self::http::HttpGenerateClient;

pub const GENERATE_ROUTE: &str = "/api/ai/generate";

/// Transport outcome of a failed generate call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The service answered with a non-2xx status.
    #[error("generate endpoint returned HTTP {status}")]
    Status {
        status: u16,
        body: String,
    },

    /// The request went out but no response came back.
    #[error("no response from generate endpoint: {0}")]
    NoResponse(#[source] reqwest::Error),

    /// The request could not be built.
    #[error("generate request failed: {0}")]
    Request(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return ApiError::Status { status: status.as_u16(), body: String::new() };
        }
        // A body that stops arriving reports as a decode error too, so the
        // transport checks go first.
        if err.is_timeout() || err.is_connect() || err.is_body() || err.is_request() {
            return ApiError::NoResponse(err);
        }
        if err.is_builder() || err.is_decode() {
            ApiError::Request(err.to_string())
        } else {
            ApiError::NoResponse(err)
        }
    }
}

#[async_trait]
pub trait GenerateClient: Send + Sync {
    /// Sends `{"prompt": prompt}` and returns the decoded answer.
    async fn generate(&self, prompt: &str) -> Result<SuggestionPayload, ApiError>;

    fn endpoint(&self) -> String;
}

pub fn new_client(config: &AppConfig) -> Result<Arc<dyn GenerateClient>, ApiError> {
    let client = HttpGenerateClient::new(&config.api_base_url, config.request_timeout)?;
    Ok(Arc::new(client))
}
