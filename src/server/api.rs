use crate::agent::CareerAgent;
use crate::format::render_markdown;
use crate::suggestion::WidgetView;
use std::error::Error;
use std::net::SocketAddr;
use axum::{ routing::{ get, post }, Router, extract::State, Json };
use serde::{ Deserialize, Serialize };
use tower_http::cors::{ Any, CorsLayer };
use log::{ info, error };

#[derive(Deserialize, Default)]
pub struct SuggestionRequestBody {
    #[serde(default)]
    pub prompt: Option<String>,
}

#[derive(Deserialize)]
pub struct RenderRequestBody {
    pub text: String,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct RenderResponse {
    pub html: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

pub fn router(agent: CareerAgent) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/suggestion", post(suggestion_handler))
        .route("/api/render", post(render_handler))
        .layer(cors)
        .with_state(agent)
}

pub async fn start_http_server(
    http_port: u16,
    agent: CareerAgent
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let addr = format!("0.0.0.0:{}", http_port).parse::<SocketAddr>()?;
    let tls = agent.config().tls.clone();
    let app = router(agent);

    if let Some(tls) = tls {
        let tls_config = axum_server::tls_rustls::RustlsConfig::from_pem_file(
            &tls.cert_path,
            &tls.key_path
        ).await?;

        tokio::spawn(async move {
            let result = axum_server::bind_rustls(addr, tls_config).serve(app.into_make_service()).await;

            if let Err(e) = result {
                error!("HTTPS server error: {}", e);
            }
        });

        info!("HTTPS API server started on: https://{}", addr);
    } else {
        tokio::spawn(async move {
            match tokio::net::TcpListener::bind(addr).await {
                Ok(listener) => {
                    if let Err(e) = axum::serve(listener, app.into_make_service()).await {
                        error!("HTTP server error: {}", e);
                    }
                }
                Err(e) => {
                    error!("Failed to bind HTTP server to {}: {}. Try a different port.", addr, e);
                }
            }
        });

        info!("HTTP API server started on: http://{}", addr);
    }

    Ok(())
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Always answers 200: failures come back as the fallback suggestion.
async fn suggestion_handler(
    State(agent): State<CareerAgent>,
    body: Option<Json<SuggestionRequestBody>>
) -> Json<WidgetView> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    Json(agent.suggest_once(body.prompt.as_deref()).await)
}

async fn render_handler(Json(body): Json<RenderRequestBody>) -> Json<RenderResponse> {
    Json(RenderResponse { html: render_markdown(&body.text) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::ChatSettings;
    use crate::config::AppConfig;
    use crate::llm::mock::{ Reply, ScriptedClient };
    use crate::models::suggestion::SuggestionPayload;
    use crate::suggestion::FALLBACK_WARNING;
    use serde_json::{ json, Value as JsonValue };
    use std::sync::Arc;

    fn agent(replies: Vec<Reply>) -> CareerAgent {
        let config = AppConfig {
            api_base_url: url::Url::parse("http://127.0.0.1:9").unwrap(),
            request_timeout: None,
            chat: ChatSettings::default(),
            widget_prompt: "widget".to_string(),
            server_addr: "127.0.0.1:0".to_string(),
            server_api_key: None,
            http_port: None,
            tls: None,
        };
        CareerAgent::with_client(config, Arc::new(ScriptedClient::new(replies)))
    }

    async fn serve(agent: CareerAgent) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(agent)).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let base = serve(agent(vec![])).await;
        let resp = reqwest::get(format!("{}/api/health", base)).await.unwrap();
        assert_eq!(resp.status(), 200);
        let body: JsonValue = resp.json().await.unwrap();
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn suggestion_without_body_falls_back_on_failure() {
        let base = serve(agent(vec![Reply::Status(503)])).await;
        let resp = reqwest::Client::new()
            .post(format!("{}/api/suggestion", base))
            .send().await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let view: JsonValue = resp.json().await.unwrap();
        assert_eq!(view["title"], "Frontend Developer");
        assert_eq!(view["warning"], FALLBACK_WARNING);
        assert_eq!(view["loading"], false);
    }

    #[tokio::test]
    async fn suggestion_uses_prompt_from_body() {
        let payload = SuggestionPayload {
            title: Some("Cloud Engineer".to_string()),
            ..Default::default()
        };
        let base = serve(agent(vec![Reply::Payload(payload)])).await;
        let resp = reqwest::Client::new()
            .post(format!("{}/api/suggestion", base))
            .json(&json!({ "prompt": "cloud" }))
            .send().await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let view: JsonValue = resp.json().await.unwrap();
        assert_eq!(view["title"], "Cloud Engineer");
        assert!(view["warning"].is_null());
    }

    #[tokio::test]
    async fn render_escapes_before_markup() {
        let base = serve(agent(vec![])).await;
        let resp = reqwest::Client::new()
            .post(format!("{}/api/render", base))
            .json(&json!({ "text": "<i>**b**" }))
            .send().await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: RenderResponse = resp.json().await.unwrap();
        assert_eq!(body, RenderResponse { html: "&lt;i&gt;<strong>b</strong>".to_string() });
    }
}
