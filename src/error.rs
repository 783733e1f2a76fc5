//! Client error types.
//!
//! [`ClientError`] is the central error type for the crate. Only two kinds
//! ever reach the user: a booking failure (surfaced through a
//! [`crate::booking::Notifier`]) and a live-update setup failure (logged,
//! listener degraded). Every other variant describes where one of those
//! two originated.

use tokio_tungstenite::tungstenite;

/// Error enum shared by the page, booking and live-update layers.
///
/// # Categories
///
/// | Variants                                   | Raised by          |
/// |--------------------------------------------|--------------------|
/// | `Config`, `Url`                            | configuration      |
/// | `Page`, `InvalidDoctorId`                  | page parsing       |
/// | `Http`, `Json`                             | booking / page GET |
/// | `WebSocket`, `SockJs`, `Stomp`, `Broker`,  | live updates       |
/// | `TransportUnavailable`, `ConnectionClosed` |                    |
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// A configuration value could not be used.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A URL could not be parsed or joined.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    /// The booking page could not be interpreted.
    #[error("page error: {0}")]
    Page(String),

    /// A card's `data-id` is present but is not a doctor id.
    #[error("invalid doctor id {0:?}")]
    InvalidDoctorId(String),

    /// HTTP transport failure (connect, send, body read).
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A body that was expected to be JSON was not.
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),

    /// WebSocket handshake or stream failure.
    #[error("websocket error: {0}")]
    WebSocket(Box<tungstenite::Error>),

    /// Malformed SockJS frame.
    #[error("sockjs framing error: {0}")]
    SockJs(String),

    /// Malformed STOMP frame or unexpected frame in the session.
    #[error("stomp protocol error: {0}")]
    Stomp(String),

    /// The broker answered with a STOMP `ERROR` frame.
    #[error("broker error: {0}")]
    Broker(String),

    /// Every configured transport failed to connect.
    #[error("no transport available: {0}")]
    TransportUnavailable(String),

    /// The remote side closed the connection.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),
}

impl From<tungstenite::Error> for ClientError {
    fn from(err: tungstenite::Error) -> Self {
        Self::WebSocket(Box::new(err))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context() {
        let err = ClientError::Broker("Bad destination".to_string());
        assert_eq!(err.to_string(), "broker error: Bad destination");
    }

    #[test]
    fn invalid_doctor_id_quotes_raw_value() {
        let err = ClientError::InvalidDoctorId("dr-7".to_string());
        assert_eq!(err.to_string(), r#"invalid doctor id "dr-7""#);
    }

    #[test]
    fn json_error_converts() {
        let Err(parse_err) = serde_json::from_str::<serde_json::Value>("not json") else {
            panic!("expected parse failure");
        };
        let err: ClientError = parse_err.into();
        assert!(matches!(err, ClientError::Json(_)));
    }

    #[test]
    fn websocket_errors_are_boxed() {
        let err: ClientError = tungstenite::Error::ConnectionClosed.into();
        assert!(matches!(err, ClientError::WebSocket(_)));
        assert!(err.to_string().starts_with("websocket error:"));
    }
}
