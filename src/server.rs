pub mod api;

use crate::agent::CareerAgent;
use crate::config::TlsPaths;
use crate::websocket::handle_connection;
use std::error::Error;
use std::sync::Arc;
use std::fs::File;
use std::io::BufReader;
use std::num::NonZeroU32;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::io::{ AsyncRead, AsyncWrite };
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::handshake::server::{ ErrorResponse, Request, Response };
use tokio_tungstenite::tungstenite::http::StatusCode;
use tokio_rustls::TlsAcceptor;
use rustls::ServerConfig;
use rustls::pki_types::{ CertificateDer, PrivateKeyDer };
use rustls_pemfile::{ certs, pkcs8_private_keys };
use once_cell::sync::Lazy;
use governor::{ RateLimiter, Quota, state::{ InMemoryState, NotKeyed }, clock::DefaultClock };
use url::form_urlencoded;

use log::{ info, warn, error, debug };

const CONNECTIONS_PER_SECOND: NonZeroU32 = match NonZeroU32::new(10) {
    Some(n) => n,
    None => panic!("connection quota must be non-zero"),
};

static CONNECTION_LIMITER: Lazy<RateLimiter<NotKeyed, InMemoryState, DefaultClock>> = Lazy::new(||
    RateLimiter::direct(Quota::per_second(CONNECTIONS_PER_SECOND))
);

pub struct Server {
    agent: CareerAgent,
    api_key: Option<String>,
}

pub fn load_tls_config(
    cert_path: &str,
    key_path: &str
) -> Result<Arc<ServerConfig>, Box<dyn Error + Send + Sync>> {
    let cert_file = File::open(cert_path).map_err(|e|
        format!("Failed to open TLS certificate file '{}': {}", cert_path, e)
    )?;
    let key_file = File::open(key_path).map_err(|e|
        format!("Failed to open TLS key file '{}': {}", key_path, e)
    )?;

    let mut cert_reader = BufReader::new(cert_file);
    let mut key_reader = BufReader::new(key_file);
    let cert_chain: Vec<CertificateDer<'static>> = certs(&mut cert_reader)
        .collect::<Result<_, _>>()
        .map_err(|e| format!("Failed to read certificate(s): {}", e))?;

    let mut keys = pkcs8_private_keys(&mut key_reader);
    let key = match keys.next() {
        Some(Ok(k)) => PrivateKeyDer::Pkcs8(k),
        Some(Err(e)) => {
            return Err(format!("Error reading private key: {}", e).into());
        }
        None => {
            return Err("No PKCS8 private key found in key file".into());
        }
    };

    let config = ServerConfig::builder_with_provider(
        Arc::new(rustls::crypto::ring::default_provider())
    )
        .with_safe_default_protocol_versions()?
        .with_no_client_auth()
        .with_single_cert(cert_chain, key)?;

    Ok(Arc::new(config))
}

/// Pulls the API key from the `X-API-Key` header, falling back to the
/// `api_key` query parameter.
fn provided_api_key(req: &Request) -> Option<String> {
    if let Some(key) = req
        .headers()
        .get("X-API-Key")
        .and_then(|v| v.to_str().ok())
    {
        return Some(key.to_owned());
    }
    req.uri()
        .query()
        .and_then(|q| {
            form_urlencoded
                ::parse(q.as_bytes())
                .find(|(k, _)| k == "api_key")
                .map(|(_, v)| v.into_owned())
        })
}

fn unauthorized() -> ErrorResponse {
    let mut resp = ErrorResponse::new(Some("Unauthorized".to_string()));
    *resp.status_mut() = StatusCode::UNAUTHORIZED;
    resp
}

impl Server {
    pub fn new(agent: CareerAgent) -> Self {
        let api_key = agent.config().server_api_key.clone();

        if api_key.is_some() {
            info!("Server configured with API Key authentication.");
        } else {
            warn!("Server configured WITHOUT API Key authentication. Connections are open.");
        }

        Self { agent, api_key }
    }

    pub async fn run(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let config = self.agent.config();

        if let Some(http_port) = config.http_port {
            api::start_http_server(http_port, self.agent.clone()).await?;
        }

        let listener = TcpListener::bind(&config.server_addr).await?;

        let tls_acceptor = match &config.tls {
            Some(TlsPaths { cert_path, key_path }) => {
                info!(
                    "TLS enabled. Loading certificate from '{}' and key from '{}'",
                    cert_path,
                    key_path
                );
                let tls_config = load_tls_config(cert_path, key_path)?;
                Some(TlsAcceptor::from(tls_config))
            }
            None => {
                info!("TLS not enabled. Running plain WebSocket (WS) server.");
                None
            }
        };
        let protocol = if tls_acceptor.is_some() { "wss" } else { "ws" };
        info!("{} server listening on: {}", protocol.to_uppercase(), config.server_addr);

        loop {
            let (stream, peer) = listener.accept().await?;

            if CONNECTION_LIMITER.check().is_err() {
                warn!("Global connection rate limit exceeded for {}. Dropping connection.", peer);
                continue;
            }

            info!("Incoming connection from: {}", peer);
            let agent_clone = self.agent.clone();
            let required_api_key = self.api_key.clone();
            let tls_acceptor_clone = tls_acceptor.clone();

            tokio::spawn(async move {
                let process_result = if let Some(acceptor) = tls_acceptor_clone {
                    match acceptor.accept(stream).await {
                        Ok(tls_stream) => {
                            info!("TLS handshake successful for {}", peer);
                            Self::process_connection(
                                peer,
                                tls_stream,
                                agent_clone,
                                required_api_key
                            ).await
                        }
                        Err(e) => {
                            error!("TLS handshake error for {}: {}", peer, e);
                            Err(Box::new(e) as Box<dyn Error + Send + Sync>)
                        }
                    }
                } else {
                    Self::process_connection(peer, stream, agent_clone, required_api_key).await
                };

                if let Err(e) = process_result {
                    error!("Failed to process connection for {}: {}", peer, e);
                }
            });
        }
    }

    async fn process_connection<S>(
        peer: SocketAddr,
        stream: S,
        agent: CareerAgent,
        required_api_key: Option<String>
    ) -> Result<(), Box<dyn Error + Send + Sync>>
        where S: AsyncRead + AsyncWrite + Unpin + Send + 'static
    {
        let auth_callback = |req: &Request, response: Response| -> Result<Response, ErrorResponse> {
            info!("Handshake from {}", peer);
            let provided = provided_api_key(req);
            debug!("Client provided API key: {}", provided.is_some());

            if let Some(ref required) = required_api_key {
                if provided.as_deref() != Some(required.as_str()) {
                    warn!("{}: bad or missing API key", peer);
                    return Err(unauthorized());
                }
                info!("{} authenticated", peer);
            }

            Ok(response)
        };

        match accept_hdr_async(stream, auth_callback).await {
            Ok(ws) => {
                handle_connection(peer, ws, agent).await;
                Ok(())
            }
            Err(e) => {
                error!("Handshake failed for {}: {}", peer, e);
                Err(Box::new(e) as _)
            }
        }
    }
}
