pub mod chat;
pub mod suggestion;
pub mod websocket;
