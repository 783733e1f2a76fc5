//! Messaging transport negotiation.
//!
//! The clinic's `/ws` endpoint is served through SockJS, which exposes a
//! SockJS-framed WebSocket at `/ws/{server}/{session}/websocket` and a raw
//! WebSocket at `/ws/websocket`. [`Transport::open`] tries the configured
//! kinds in order and keeps the first one whose handshake completes.

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use url::Url;

use super::sockjs::{self, SockJsFrame};
use super::stomp::{HeaderEscaping, StompFrame};
use crate::error::ClientError;

/// WebSocket variants a session can run over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportKind {
    /// SockJS WebSocket transport with SockJS framing.
    SockJsWebSocket,
    /// Plain WebSocket carrying bare STOMP frames.
    RawWebSocket,
}

impl TransportKind {
    /// Order tried when nothing is configured.
    pub const DEFAULT_ORDER: [Self; 2] = [Self::SockJsWebSocket, Self::RawWebSocket];

    /// Configuration name of the transport.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SockJsWebSocket => "sockjs",
            Self::RawWebSocket => "websocket",
        }
    }

    /// Request path for this transport under `endpoint` (e.g. `/ws`).
    #[must_use]
    pub fn path(self, endpoint: &str) -> String {
        match self {
            Self::SockJsWebSocket => sockjs::session_path(endpoint),
            Self::RawWebSocket => format!("{}/websocket", endpoint.trim_end_matches('/')),
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransportKind {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sockjs" | "sockjs-websocket" => Ok(Self::SockJsWebSocket),
            "websocket" | "raw" => Ok(Self::RawWebSocket),
            other => Err(ClientError::Config(format!("unknown transport {other:?}"))),
        }
    }
}

/// An open messaging connection that sends and receives STOMP frames.
pub struct Transport {
    kind: TransportKind,
    url: Url,
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    escaping: HeaderEscaping,
    pending: VecDeque<StompFrame>,
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transport")
            .field("kind", &self.kind)
            .field("url", &self.url.as_str())
            .field("escaping", &self.escaping)
            .field("pending", &self.pending.len())
            .finish_non_exhaustive()
    }
}

impl Transport {
    /// Connects to `endpoint` on `origin`, trying `kinds` in order.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::TransportUnavailable`] listing every attempt
    /// if none connects, or [`ClientError::Url`] if a transport URL cannot
    /// be built.
    pub async fn open(
        origin: &Url,
        endpoint: &str,
        kinds: &[TransportKind],
    ) -> Result<Self, ClientError> {
        let mut failures = Vec::new();
        for &kind in kinds {
            let url = origin.join(&kind.path(endpoint))?;
            match Self::connect(kind, url.clone()).await {
                Ok(transport) => {
                    tracing::info!(transport = %kind, url = %url, "transport connected");
                    return Ok(transport);
                }
                Err(err) => {
                    tracing::debug!(transport = %kind, url = %url, error = %err, "transport failed");
                    failures.push(format!("{kind}: {err}"));
                }
            }
        }
        if failures.is_empty() {
            failures.push("no transports configured".to_string());
        }
        Err(ClientError::TransportUnavailable(failures.join("; ")))
    }

    async fn connect(kind: TransportKind, url: Url) -> Result<Self, ClientError> {
        let (stream, _response) = connect_async(url.as_str()).await?;
        let mut transport = Self {
            kind,
            url,
            stream,
            escaping: HeaderEscaping::default(),
            pending: VecDeque::new(),
        };
        if kind == TransportKind::SockJsWebSocket {
            transport.await_open().await?;
        }
        Ok(transport)
    }

    /// Waits for the SockJS `o` frame.
    async fn await_open(&mut self) -> Result<(), ClientError> {
        while let Some(message) = self.stream.next().await {
            let Message::Text(text) = message? else {
                continue;
            };
            match SockJsFrame::decode(text.as_str())? {
                SockJsFrame::Open => return Ok(()),
                SockJsFrame::Heartbeat => {}
                SockJsFrame::Close { code, reason } => {
                    return Err(ClientError::ConnectionClosed(format!("{code} {reason}")));
                }
                SockJsFrame::Messages(_) => {
                    return Err(ClientError::SockJs(
                        "messages received before open frame".to_string(),
                    ));
                }
            }
        }
        Err(ClientError::ConnectionClosed(
            "closed before sockjs open frame".to_string(),
        ))
    }

    /// The negotiated transport kind.
    #[must_use]
    pub const fn kind(&self) -> TransportKind {
        self.kind
    }

    /// Applies the header escaping rules of the negotiated STOMP version to
    /// every frame received from now on.
    pub fn set_escaping(&mut self, escaping: HeaderEscaping) {
        self.escaping = escaping;
    }

    /// Sends one STOMP frame.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::WebSocket`] if the write fails.
    pub async fn send(&mut self, frame: &StompFrame) -> Result<(), ClientError> {
        let wire = frame.encode();
        let text = match self.kind {
            TransportKind::RawWebSocket => wire,
            TransportKind::SockJsWebSocket => sockjs::encode_messages(&[wire.as_str()])?,
        };
        self.stream.send(Message::text(text)).await?;
        Ok(())
    }

    /// Receives the next STOMP frame, skipping heart-beats.
    ///
    /// Returns `Ok(None)` once the peer closes the connection.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::WebSocket`] on stream failure,
    /// [`ClientError::SockJs`] or [`ClientError::Stomp`] on malformed input,
    /// and [`ClientError::ConnectionClosed`] when a SockJS server closes the
    /// session with a reason.
    pub async fn next_frame(&mut self) -> Result<Option<StompFrame>, ClientError> {
        loop {
            if let Some(frame) = self.pending.pop_front() {
                return Ok(Some(frame));
            }
            let Some(message) = self.stream.next().await else {
                return Ok(None);
            };
            match message? {
                Message::Text(text) => self.ingest(text.as_str())?,
                Message::Binary(bytes) => {
                    let text = std::str::from_utf8(&bytes)
                        .map_err(|e| ClientError::Stomp(format!("binary frame not utf-8: {e}")))?;
                    self.ingest(text)?;
                }
                Message::Close(_) => return Ok(None),
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
            }
        }
    }

    /// Queues every STOMP frame carried by one WebSocket message.
    fn ingest(&mut self, text: &str) -> Result<(), ClientError> {
        match self.kind {
            TransportKind::RawWebSocket => {
                let frames = StompFrame::decode_all_with(text, self.escaping)?;
                self.pending.extend(frames);
            }
            TransportKind::SockJsWebSocket => match SockJsFrame::decode(text)? {
                SockJsFrame::Open | SockJsFrame::Heartbeat => {}
                SockJsFrame::Messages(messages) => {
                    for message in messages {
                        let frames = StompFrame::decode_all_with(&message, self.escaping)?;
                        self.pending.extend(frames);
                    }
                }
                SockJsFrame::Close { code, reason } => {
                    return Err(ClientError::ConnectionClosed(format!("{code} {reason}")));
                }
            },
        }
        Ok(())
    }

    /// Closes the WebSocket, dropping any frames not yet read.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::WebSocket`] if the close handshake fails.
    pub async fn close(mut self) -> Result<(), ClientError> {
        self.stream.close(None).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_parse_back() {
        for kind in TransportKind::DEFAULT_ORDER {
            assert_eq!(kind.as_str().parse::<TransportKind>().ok(), Some(kind));
        }
        assert_eq!("RAW".parse::<TransportKind>().ok(), Some(TransportKind::RawWebSocket));
        assert!("xhr-streaming".parse::<TransportKind>().is_err());
    }

    #[test]
    fn raw_path_appends_websocket() {
        assert_eq!(TransportKind::RawWebSocket.path("/ws"), "/ws/websocket");
        assert_eq!(TransportKind::RawWebSocket.path("/ws/"), "/ws/websocket");
    }

    #[test]
    fn sockjs_path_is_session_scoped() {
        let path = TransportKind::SockJsWebSocket.path("/ws");
        assert!(path.starts_with("/ws/"));
        assert!(path.ends_with("/websocket"));
        assert_ne!(path, TransportKind::SockJsWebSocket.path("/ws"));
    }

    #[tokio::test]
    async fn empty_transport_list_is_unavailable() {
        let Ok(origin) = Url::parse("ws://127.0.0.1:9/") else {
            return;
        };
        let result = Transport::open(&origin, "/ws", &[]).await;
        assert!(matches!(result, Err(ClientError::TransportUnavailable(_))));
    }
}
