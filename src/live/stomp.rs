//! STOMP 1.1/1.2 frame codec.
//!
//! A frame is a command line, `header:value` lines, a blank line, a body
//! and a NUL terminator. One text message may carry several frames, with
//! heart-beat EOLs between them. Header names and values are escaped (`\\`,
//! `\n`, `\r`, `\c`) in every frame except `CONNECT` and `CONNECTED`, unless
//! the session negotiated STOMP 1.0, which has no escaping at all.

use std::fmt;
use std::str::FromStr;

use crate::error::ClientError;

/// Protocol versions offered in `CONNECT`.
pub const ACCEPT_VERSION: &str = "1.1,1.0";

/// STOMP frame commands understood by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StompCommand {
    /// Client opens a session.
    Connect,
    /// Broker accepts the session.
    Connected,
    /// Client subscribes to a destination.
    Subscribe,
    /// Client cancels a subscription.
    Unsubscribe,
    /// Client sends a message.
    Send,
    /// Client closes the session.
    Disconnect,
    /// Broker delivers a message.
    Message,
    /// Broker acknowledges a receipt request.
    Receipt,
    /// Broker reports a failure.
    Error,
}

impl StompCommand {
    /// Wire name of the command.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Connect => "CONNECT",
            Self::Connected => "CONNECTED",
            Self::Subscribe => "SUBSCRIBE",
            Self::Unsubscribe => "UNSUBSCRIBE",
            Self::Send => "SEND",
            Self::Disconnect => "DISCONNECT",
            Self::Message => "MESSAGE",
            Self::Receipt => "RECEIPT",
            Self::Error => "ERROR",
        }
    }

    const fn escapes_headers(self) -> bool {
        !matches!(self, Self::Connect | Self::Connected)
    }
}

/// Header escaping rules in force for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderEscaping {
    /// STOMP 1.1 and later: escape every frame but `CONNECT`/`CONNECTED`.
    #[default]
    Escaped,
    /// STOMP 1.0: header text is taken verbatim.
    Verbatim,
}

impl HeaderEscaping {
    /// Rules for the `version` header of a `CONNECTED` frame.
    ///
    /// A missing or blank version means the broker speaks 1.0.
    #[must_use]
    pub fn for_version(version: Option<&str>) -> Self {
        match version.map(str::trim) {
            None | Some("" | "1.0") => Self::Verbatim,
            Some(_) => Self::Escaped,
        }
    }

    const fn applies_to(self, command: StompCommand) -> bool {
        matches!(self, Self::Escaped) && command.escapes_headers()
    }
}

impl fmt::Display for StompCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StompCommand {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CONNECT" | "STOMP" => Ok(Self::Connect),
            "CONNECTED" => Ok(Self::Connected),
            "SUBSCRIBE" => Ok(Self::Subscribe),
            "UNSUBSCRIBE" => Ok(Self::Unsubscribe),
            "SEND" => Ok(Self::Send),
            "DISCONNECT" => Ok(Self::Disconnect),
            "MESSAGE" => Ok(Self::Message),
            "RECEIPT" => Ok(Self::Receipt),
            "ERROR" => Ok(Self::Error),
            other => Err(ClientError::Stomp(format!("unknown command {other:?}"))),
        }
    }
}

/// One STOMP frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StompFrame {
    /// Frame command.
    pub command: StompCommand,
    /// Headers in wire order. Repeated names keep the first value.
    pub headers: Vec<(String, String)>,
    /// Frame body.
    pub body: String,
}

impl StompFrame {
    /// Creates a frame with no headers and an empty body.
    #[must_use]
    pub const fn new(command: StompCommand) -> Self {
        Self {
            command,
            headers: Vec::new(),
            body: String::new(),
        }
    }

    /// Adds a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// `CONNECT` frame for virtual host `host`, with heart-beating off.
    #[must_use]
    pub fn connect(host: &str) -> Self {
        Self::new(StompCommand::Connect)
            .header("accept-version", ACCEPT_VERSION)
            .header("host", host)
            .header("heart-beat", "0,0")
    }

    /// `SUBSCRIBE` frame for `destination` under subscription `id`.
    #[must_use]
    pub fn subscribe(id: &str, destination: &str) -> Self {
        Self::new(StompCommand::Subscribe)
            .header("id", id)
            .header("destination", destination)
    }

    /// `DISCONNECT` frame.
    #[must_use]
    pub const fn disconnect() -> Self {
        Self::new(StompCommand::Disconnect)
    }

    /// First value of header `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Serializes the frame, including the NUL terminator.
    #[must_use]
    pub fn encode(&self) -> String {
        let escape = self.command.escapes_headers();
        let mut out = String::with_capacity(64 + self.body.len());
        out.push_str(self.command.as_str());
        out.push('\n');
        for (name, value) in &self.headers {
            if escape {
                out.push_str(&escape_header(name));
                out.push(':');
                out.push_str(&escape_header(value));
            } else {
                out.push_str(name);
                out.push(':');
                out.push_str(value);
            }
            out.push('\n');
        }
        out.push('\n');
        out.push_str(&self.body);
        out.push('\0');
        out
    }

    /// Parses a text holding at most one frame.
    ///
    /// Returns `Ok(None)` for heart-beats (input made only of EOLs).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Stomp`] if the text is malformed (see
    /// [`StompFrame::decode_all`]) or carries more than one frame.
    pub fn decode(raw: &str) -> Result<Option<Self>, ClientError> {
        let mut frames = Self::decode_all(raw)?;
        if frames.len() > 1 {
            return Err(ClientError::Stomp(format!(
                "expected one frame, got {}",
                frames.len()
            )));
        }
        Ok(frames.pop())
    }

    /// Parses every frame in `raw` with STOMP 1.1 header escaping.
    ///
    /// # Errors
    ///
    /// See [`StompFrame::decode_all_with`].
    pub fn decode_all(raw: &str) -> Result<Vec<Self>, ClientError> {
        Self::decode_all_with(raw, HeaderEscaping::Escaped)
    }

    /// Parses every frame in `raw`, skipping heart-beat EOLs between them.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Stomp`] for an unknown command, a header line
    /// without `:`, a missing blank line, a bad escape sequence, or a
    /// `content-length` that does not fit the body.
    pub fn decode_all_with(raw: &str, escaping: HeaderEscaping) -> Result<Vec<Self>, ClientError> {
        let mut frames = Vec::new();
        let mut rest = raw;
        loop {
            rest = rest.trim_start_matches(['\r', '\n', '\0']);
            if rest.is_empty() {
                return Ok(frames);
            }
            let (frame, remainder) = decode_one(rest, escaping)?;
            frames.push(frame);
            rest = remainder;
        }
    }
}

/// Parses the frame at the start of `raw` and returns it with the text
/// that follows its NUL terminator.
fn decode_one(raw: &str, escaping: HeaderEscaping) -> Result<(StompFrame, &str), ClientError> {
    let (head, rest) = split_head(raw)
        .filter(|(head, _)| !head.contains('\0'))
        .ok_or_else(|| ClientError::Stomp("missing blank line after headers".to_string()))?;

    let mut lines = head.lines();
    let command: StompCommand = lines
        .next()
        .ok_or_else(|| ClientError::Stomp("missing command".to_string()))?
        .parse()?;
    let escaped = escaping.applies_to(command);

    let mut headers = Vec::new();
    for line in lines {
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| ClientError::Stomp(format!("malformed header {line:?}")))?;
        if escaped {
            headers.push((unescape_header(name)?, unescape_header(value)?));
        } else {
            headers.push((name.to_string(), value.to_string()));
        }
    }

    let mut frame = StompFrame {
        command,
        headers,
        body: String::new(),
    };

    let (body, remainder) = match frame.get("content-length") {
        Some(len) => {
            let len: usize = len
                .trim()
                .parse()
                .map_err(|_| ClientError::Stomp(format!("bad content-length {len:?}")))?;
            let body = rest.get(..len).ok_or_else(|| {
                ClientError::Stomp(format!("content-length {len} exceeds body"))
            })?;
            let after = rest.get(len..).unwrap_or_default();
            (body, after.strip_prefix('\0').unwrap_or(after))
        }
        None => rest.split_once('\0').unwrap_or((rest, "")),
    };
    frame.body = body.to_string();
    Ok((frame, remainder))
}

/// Splits at the first blank line, accepting `\n` or `\r\n` line endings.
fn split_head(raw: &str) -> Option<(&str, &str)> {
    let lf = raw.find("\n\n").map(|i| (i, 2));
    let crlf = raw.find("\r\n\r\n").map(|i| (i, 4));
    let (at, sep) = match (lf, crlf) {
        (Some(a), Some(b)) => {
            if a.0 <= b.0 {
                a
            } else {
                b
            }
        }
        (Some(a), None) => a,
        (None, Some(b)) => b,
        (None, None) => return None,
    };
    Some((raw.get(..at)?, raw.get(at + sep..)?))
}

fn escape_header(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            ':' => out.push_str("\\c"),
            other => out.push(other),
        }
    }
    out
}

fn unescape_header(raw: &str) -> Result<String, ClientError> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('c') => out.push(':'),
            other => {
                return Err(ClientError::Stomp(format!(
                    "invalid header escape \\{}",
                    other.map(String::from).unwrap_or_default()
                )));
            }
        }
    }
    Ok(out)
}
