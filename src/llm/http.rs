use async_trait::async_trait;
use log::{ debug, warn };
use reqwest::{ Client as HttpClient, header::{ HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE } };
use serde::Serialize;
use std::time::Duration;
use url::Url;

use super::{ ApiError, GenerateClient, GENERATE_ROUTE };
use crate::models::suggestion::SuggestionPayload;

#[derive(Serialize)]
struct GenerateRequest<'a> {
    prompt: &'a str,
}

pub struct HttpGenerateClient {
    http: HttpClient,
    endpoint: Url,
}

impl HttpGenerateClient {
    pub fn new(base_url: &Url, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let raw = format!("{}{}", base_url.as_str().trim_end_matches('/'), GENERATE_ROUTE);
        let endpoint = Url::parse(&raw).map_err(|e|
            ApiError::Request(format!("Invalid generate endpoint '{}': {}", raw, e))
        )?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = HttpClient::builder().default_headers(headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ApiError::Request(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { http, endpoint })
    }
}

#[async_trait]
impl GenerateClient for HttpGenerateClient {
    async fn generate(&self, prompt: &str) -> Result<SuggestionPayload, ApiError> {
        debug!("Sending prompt to {}: {}", self.endpoint, prompt);

        let resp = self.http
            .post(self.endpoint.clone())
            .json(&(GenerateRequest { prompt }))
            .send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!("Generate endpoint answered {}: {}", status, body);
            return Err(ApiError::Status { status: status.as_u16(), body });
        }

        let body = resp.text().await.map_err(ApiError::NoResponse)?;
        // A 2xx body that isn't a payload object is treated as an empty
        // answer, which the formatter turns into its fallback sentence.
        match serde_json::from_str::<SuggestionPayload>(&body) {
            Ok(payload) => Ok(payload),
            Err(e) => {
                warn!("Unreadable generate response ({}), treating as empty", e);
                Ok(SuggestionPayload::default())
            }
        }
    }

    fn endpoint(&self) -> String {
        self.endpoint.to_string()
    }
}
