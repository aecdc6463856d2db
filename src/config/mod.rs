use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::chat::ChatSettings;
use crate::cli::Args;
use crate::history::DEFAULT_SYSTEM_PROMPT;
use crate::suggestion::DEFAULT_WIDGET_PROMPT;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid API URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue {
        field: &'static str,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TlsPaths {
    pub cert_path: String,
    pub key_path: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base_url: Url,
    pub request_timeout: Option<Duration>,
    pub chat: ChatSettings,
    pub widget_prompt: String,
    pub server_addr: String,
    pub server_api_key: Option<String>,
    pub http_port: Option<u16>,
    pub tls: Option<TlsPaths>,
}

impl AppConfig {
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        let api_base_url = Url::parse(args.api_url.trim()).map_err(|source| ConfigError::InvalidUrl {
            url: args.api_url.clone(),
            source,
        })?;
        if !matches!(api_base_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue {
                field: "api_url",
                reason: format!("unsupported scheme '{}'", api_base_url.scheme()),
            });
        }

        if args.context_window == 0 {
            return Err(ConfigError::InvalidValue {
                field: "context_window",
                reason: "must be at least 1".to_string(),
            });
        }
        if args.max_input_chars == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_input_chars",
                reason: "must be at least 1".to_string(),
            });
        }

        let tls = if args.enable_tls {
            match (&args.tls_cert_path, &args.tls_key_path) {
                (Some(cert_path), Some(key_path)) =>
                    Some(TlsPaths { cert_path: cert_path.clone(), key_path: key_path.clone() }),
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: "enable_tls",
                        reason: "both --tls-cert-path and --tls-key-path must be provided".to_string(),
                    });
                }
            }
        } else {
            None
        };

        let non_blank = |s: &Option<String>| s.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);

        Ok(Self {
            api_base_url,
            request_timeout: Some(args.request_timeout_secs)
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
            chat: ChatSettings {
                system_prompt: non_blank(&args.system_prompt).unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
                context_window: args.context_window,
                typing_delay: Duration::from_millis(args.typing_delay_ms),
                max_input_chars: args.max_input_chars,
            },
            widget_prompt: non_blank(&args.widget_prompt).unwrap_or_else(|| DEFAULT_WIDGET_PROMPT.to_string()),
            server_addr: args.server_addr.clone(),
            server_api_key: non_blank(&args.server_api_key),
            http_port: args.http_port,
            tls,
        })
    }
}
