//! Shared helpers for integration tests: in-process mock clinic servers.

#![allow(dead_code, clippy::panic)]

use std::net::SocketAddr;

use axum::Router;
use axum::extract::ws::{Message, WebSocket};
use tokio::net::TcpListener;
use url::Url;

use clinic_booking_client::config::ClientConfig;
use clinic_booking_client::live::StompFrame;

/// Serves `app` on an ephemeral local port.
pub async fn serve(app: Router) -> SocketAddr {
    let Ok(listener) = TcpListener::bind("127.0.0.1:0").await else {
        panic!("bind failed");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("no local addr");
    };
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// Default configuration pointed at `addr`.
pub fn config_for(addr: SocketAddr) -> ClientConfig {
    let Ok(base) = Url::parse(&format!("http://{addr}")) else {
        panic!("bad base url");
    };
    ClientConfig::new(base)
}

/// An address nothing listens on.
pub async fn closed_addr() -> SocketAddr {
    let Ok(listener) = TcpListener::bind("127.0.0.1:0").await else {
        panic!("bind failed");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("no local addr");
    };
    drop(listener);
    addr
}

/// Reads the next text message from a mock broker socket.
pub async fn next_text(socket: &mut WebSocket) -> Option<String> {
    while let Some(Ok(message)) = socket.recv().await {
        match message {
            Message::Text(text) => return Some(text.as_str().to_string()),
            Message::Close(_) => return None,
            _ => {}
        }
    }
    None
}

/// Decodes a STOMP frame the client sent, or `None` if it is not one.
pub fn stomp(raw: &str) -> Option<StompFrame> {
    StompFrame::decode(raw).ok().flatten()
}
