use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Generate API Args ---
    /// Base URL of the backend hosting /api/ai/generate
    #[arg(long, env = "API_URL", default_value = "http://127.0.0.1:8000")]
    pub api_url: String,

    /// Client-side timeout for each generate call, in seconds. 0 disables it.
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "30")]
    pub request_timeout_secs: u64,

    // --- Chat Args ---
    /// Seed system message shown at the top of every conversation.
    #[arg(long, env = "SYSTEM_PROMPT")] // No default, the built-in seed is used if None
    pub system_prompt: Option<String>,

    /// Number of most recent messages considered when building the context prompt.
    #[arg(long, env = "CONTEXT_WINDOW", default_value = "5")]
    pub context_window: usize,

    /// Delay before a successful answer is shown, in milliseconds.
    #[arg(long, env = "TYPING_DELAY_MS", default_value = "500")]
    pub typing_delay_ms: u64,

    /// Maximum characters accepted in the chat input field.
    #[arg(long, env = "MAX_INPUT_CHARS", default_value = "2000")]
    pub max_input_chars: usize,

    // --- Suggestion Widget Args ---
    /// Prompt used by the dashboard widget when the page doesn't send one.
    #[arg(long, env = "WIDGET_PROMPT")]
    pub widget_prompt: Option<String>,

    // --- Server Args ---
    /// Host address and port for the WebSocket bridge to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "127.0.0.1:4000")]
    pub server_addr: String,

    /// Optional API Key required for clients to connect to the WebSocket server. If set, clients must provide this key.
    #[arg(long, env = "SERVER_API_KEY")]
    pub server_api_key: Option<String>,

    /// Optional port for the plain HTTP API (health, one-shot suggestion, render).
    #[arg(long, env = "HTTP_PORT")]
    pub http_port: Option<u16>,

    /// Optional path to the TLS certificate file (PEM format) for enabling WSS. Requires --tls-key.
    #[arg(long, env = "TLS_CERT_PATH")]
    pub tls_cert_path: Option<String>,

    /// Optional path to the TLS private key file (PEM format) for enabling WSS. Requires --tls-cert.
    #[arg(long, env = "TLS_KEY_PATH")]
    pub tls_key_path: Option<String>,

    #[arg(long, env = "ENABLE_TLS", default_value = "false")]
    pub enable_tls: bool,
}
