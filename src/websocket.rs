use crate::{ agent::CareerAgent, models::websocket::{ ClientMessage, ServerMessage } };
use futures::{ Sink, SinkExt, StreamExt };
use log::{ info, warn, error };
use std::net::SocketAddr;
use tokio::io::{ AsyncRead, AsyncWrite };
use tokio_tungstenite::{ tungstenite::protocol::Message, WebSocketStream };

const MAX_MESSAGE_SIZE: usize = 1 * 1024 * 1024;

async fn send_frames<T>(tx: &mut T, frames: Vec<ServerMessage>) -> bool
    where T: Sink<Message> + Unpin, T::Error: std::fmt::Display
{
    for frame in frames {
        let json = match serde_json::to_string(&frame) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize frame: {}", e);
                continue;
            }
        };
        if let Err(e) = tx.send(Message::Text(json)).await {
            error!("Error sending frame: {}", e);
            return false;
        }
    }
    true
}

/// One page connection. The session lives exactly as long as the socket;
/// closing it is the page's unmount.
pub async fn handle_connection<S>(peer: SocketAddr, websocket: WebSocketStream<S>, agent: CareerAgent)
    where S: AsyncRead + AsyncWrite + Unpin
{
    let (mut tx, mut rx) = websocket.split();
    let (mut session, mut results) = agent.open_session();
    info!("Assigned session ID {} to {}", session.id(), peer);

    if !send_frames(&mut tx, session.initial_frames()).await {
        session.close();
        return;
    }

    loop {
        tokio::select! {
            Some(result) = results.recv() => {
                let frames = session.on_result(result);
                if !send_frames(&mut tx, frames).await {
                    break;
                }
            }
            msg = rx.next() => {
                let Some(msg) = msg else {
                    info!("Stream ended for {}", peer);
                    break;
                };
                let message = match msg {
                    Ok(message) => message,
                    Err(e) => {
                        match e {
                            | tokio_tungstenite::tungstenite::Error::ConnectionClosed
                            | tokio_tungstenite::tungstenite::Error::Protocol(_)
                            | tokio_tungstenite::tungstenite::Error::Utf8 => {
                                info!("WebSocket connection closed or protocol error for {}: {}", peer, e);
                            }
                            tokio_tungstenite::tungstenite::Error::Io(ref io_err) if
                                io_err.kind() == std::io::ErrorKind::ConnectionReset
                            => {
                                info!("WebSocket connection reset by peer {}", peer);
                            }
                            _ => {
                                error!("Error receiving message from {}: {}", peer, e);
                            }
                        }
                        break;
                    }
                };

                if message.len() > MAX_MESSAGE_SIZE {
                    warn!(
                        "Message from {} exceeds size limit ({} > {})",
                        peer,
                        message.len(),
                        MAX_MESSAGE_SIZE
                    );
                    let frames = vec![ServerMessage::Error { message: "Message too large".to_string() }];
                    let _ = send_frames(&mut tx, frames).await;
                    break;
                }

                match message {
                    Message::Text(text) => {
                        let frames = match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(client_msg) => session.handle(client_msg),
                            Err(e) => {
                                error!("Failed to parse message from {}: {}", peer, e);
                                vec![ServerMessage::Error { message: format!("Failed to parse message: {}", e) }]
                            }
                        };
                        if !send_frames(&mut tx, frames).await {
                            break;
                        }
                    }
                    Message::Close(_) => {
                        info!("Received close frame from {}", peer);
                        break;
                    }
                    Message::Ping(ping_data) => {
                        if tx.send(Message::Pong(ping_data)).await.is_err() {
                            error!("Failed to send pong to {}", peer);
                            break;
                        }
                    }
                    Message::Pong(_) => {}
                    Message::Binary(_) => {
                        warn!("Ignoring binary message from {}", peer);
                    }
                    Message::Frame(_) => {}
                }
            }
        }
    }

    session.close();
    info!("WebSocket connection closed for {}", peer);
}
