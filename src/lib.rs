pub mod agent;
pub mod chat;
pub mod cli;
pub mod config;
pub mod format;
pub mod history;
pub mod llm;
pub mod models;
pub mod render;
pub mod server;
pub mod session;
pub mod suggestion;
pub mod websocket;

use agent::CareerAgent;
use cli::Args;
use config::AppConfig;
use log::info;
use server::Server;
use std::error::Error;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = AppConfig::from_args(&args)?;

    info!("--- Core Configuration ---");
    info!("Server Address: {}", config.server_addr);
    info!("HTTP API Port: {:?}", config.http_port);
    info!("Generate API Base URL: {}", config.api_base_url);
    info!("Request Timeout: {:?}", config.request_timeout);
    info!("Context Window: {}", config.chat.context_window);
    info!("Typing Delay: {:?}", config.chat.typing_delay);
    info!("Max Input Chars: {}", config.chat.max_input_chars);
    info!("Widget Prompt: {}", config.widget_prompt);
    info!("TLS Enabled: {}", config.tls.is_some());
    info!("-------------------------");

    let agent = CareerAgent::new(config)?;
    let server = Server::new(agent);
    server.run().await?;

    Ok(())
}
