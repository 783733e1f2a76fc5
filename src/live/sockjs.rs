//! SockJS WebSocket-transport framing.
//!
//! Over its WebSocket transport a SockJS server wraps application messages
//! in single-letter frames:
//!
//! | Frame            | Meaning                      |
//! |------------------|------------------------------|
//! | `o`              | session open                 |
//! | `h`              | heartbeat                    |
//! | `a["m1","m2"]`   | one or more messages         |
//! | `c[3000,"bye"]`  | session closed with a reason |
//!
//! Client-to-server messages are sent as a bare JSON array of strings.

use crate::error::ClientError;

/// One frame received from a SockJS server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SockJsFrame {
    /// Session opened.
    Open,
    /// Server heartbeat.
    Heartbeat,
    /// Application messages, in order.
    Messages(Vec<String>),
    /// Session closed.
    Close {
        /// SockJS close code.
        code: u16,
        /// Human-readable reason.
        reason: String,
    },
}

impl SockJsFrame {
    /// Parses one SockJS frame.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::SockJs`] for an unknown frame type or a
    /// malformed JSON payload.
    pub fn decode(raw: &str) -> Result<Self, ClientError> {
        let mut chars = raw.chars();
        let kind = chars
            .next()
            .ok_or_else(|| ClientError::SockJs("empty frame".to_string()))?;
        let payload = chars.as_str();
        match kind {
            'o' => Ok(Self::Open),
            'h' => Ok(Self::Heartbeat),
            'a' => serde_json::from_str::<Vec<String>>(payload)
                .map(Self::Messages)
                .map_err(|e| ClientError::SockJs(format!("bad message array: {e}"))),
            'c' => serde_json::from_str::<(u16, String)>(payload)
                .map(|(code, reason)| Self::Close { code, reason })
                .map_err(|e| ClientError::SockJs(format!("bad close frame: {e}"))),
            other => Err(ClientError::SockJs(format!("unknown frame type {other:?}"))),
        }
    }
}

/// Wraps outgoing messages in the JSON array SockJS expects.
///
/// # Errors
///
/// Returns [`ClientError::Json`] if serialization fails.
pub fn encode_messages(messages: &[&str]) -> Result<String, ClientError> {
    Ok(serde_json::to_string(messages)?)
}

/// Path of the SockJS WebSocket transport under `endpoint`:
/// `{endpoint}/{server}/{session}/websocket`.
///
/// The server id is three digits and the session id is random, as the
/// SockJS protocol requires.
#[must_use]
pub fn session_path(endpoint: &str) -> String {
    let session = uuid::Uuid::new_v4();
    let [hi, lo, ..] = *session.as_bytes();
    let server = u16::from_be_bytes([hi, lo]) % 1000;
    format!(
        "{}/{server:03}/{}/websocket",
        endpoint.trim_end_matches('/'),
        session.simple()
    )
}
