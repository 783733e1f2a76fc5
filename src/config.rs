//! Client configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). Every key has a default matching the
//! clinic server's stock deployment.

use std::str::FromStr;

use url::Url;

use crate::error::ClientError;
use crate::live::TransportKind;

/// Default origin of the clinic server.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
/// Default path of the page carrying the doctor cards.
pub const DEFAULT_PAGE_PATH: &str = "/dashboard";
/// Default booking endpoint.
pub const DEFAULT_BOOKING_PATH: &str = "/api/appointments";
/// Default messaging endpoint.
pub const DEFAULT_WS_PATH: &str = "/ws";
/// Default appointment topic.
pub const DEFAULT_TOPIC: &str = "/topic/appointments";
/// Default patient username sent with every booking.
pub const DEFAULT_PATIENT_USERNAME: &str = "patient";

/// Top-level client configuration.
///
/// Loaded once at startup via [`ClientConfig::from_env`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Origin of the clinic server (e.g. `http://localhost:8080`).
    pub base_url: Url,

    /// Path of the HTML page carrying `.doctor` cards.
    pub page_path: String,

    /// Path of the booking endpoint.
    pub booking_path: String,

    /// Path of the messaging endpoint.
    pub ws_path: String,

    /// Topic to subscribe to for appointment changes.
    pub topic: String,

    /// Username placed in every booking request.
    pub patient_username: String,

    /// Transports to try, in order, when opening the messaging connection.
    pub transports: Vec<TransportKind>,

    /// Master switch for the live-update listener.
    pub live_updates_enabled: bool,

    /// Capacity of the update broadcast channel.
    pub event_bus_capacity: usize,
}

impl ClientConfig {
    /// Returns the default configuration pointed at `base_url`.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            page_path: DEFAULT_PAGE_PATH.to_string(),
            booking_path: DEFAULT_BOOKING_PATH.to_string(),
            ws_path: DEFAULT_WS_PATH.to_string(),
            topic: DEFAULT_TOPIC.to_string(),
            patient_username: DEFAULT_PATIENT_USERNAME.to_string(),
            transports: TransportKind::DEFAULT_ORDER.to_vec(),
            live_updates_enabled: true,
            event_bus_capacity: 1024,
        }
    }

    /// Loads configuration from environment variables.
    ///
    /// Falls back to the defaults when a variable is not set.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Url`] if `CLINIC_BASE_URL` is set but is not a
    /// valid URL, and [`ClientError::Config`] if it is not `http`/`https` or
    /// if `CLINIC_WS_TRANSPORTS` names an unknown transport.
    pub fn from_env() -> Result<Self, ClientError> {
        dotenvy::dotenv().ok();

        let raw_base = std::env::var("CLINIC_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let base_url = Url::parse(&raw_base)?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ClientError::Config(format!(
                "CLINIC_BASE_URL must be http or https, got {}",
                base_url.scheme()
            )));
        }

        let defaults = Self::new(base_url);

        let transports = match std::env::var("CLINIC_WS_TRANSPORTS") {
            Ok(raw) => parse_transports(&raw)?,
            Err(_) => defaults.transports,
        };

        Ok(Self {
            page_path: env_or("CLINIC_PAGE_PATH", defaults.page_path),
            booking_path: env_or("CLINIC_BOOKING_PATH", defaults.booking_path),
            ws_path: env_or("CLINIC_WS_PATH", defaults.ws_path),
            topic: env_or("CLINIC_TOPIC", defaults.topic),
            patient_username: env_or("CLINIC_PATIENT_USERNAME", defaults.patient_username),
            transports,
            live_updates_enabled: parse_env_bool("LIVE_UPDATES_ENABLED", true),
            event_bus_capacity: parse_env("EVENT_BUS_CAPACITY", defaults.event_bus_capacity),
            base_url: defaults.base_url,
        })
    }

    /// Absolute URL of the booking endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Url`] if the path cannot be joined.
    pub fn booking_url(&self) -> Result<Url, ClientError> {
        Ok(self.base_url.join(&self.booking_path)?)
    }

    /// Absolute URL of the doctor page.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Url`] if the path cannot be joined.
    pub fn page_url(&self) -> Result<Url, ClientError> {
        Ok(self.base_url.join(&self.page_path)?)
    }

    /// Origin of the messaging endpoint with a `ws`/`wss` scheme.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if the base URL's scheme has no
    /// WebSocket counterpart.
    pub fn ws_origin(&self) -> Result<Url, ClientError> {
        let scheme = match self.base_url.scheme() {
            "http" => "ws",
            "https" => "wss",
            other => {
                return Err(ClientError::Config(format!(
                    "no websocket scheme for {other}"
                )));
            }
        };
        let mut origin = self.base_url.clone();
        origin
            .set_scheme(scheme)
            .map_err(|()| ClientError::Config(format!("cannot switch to {scheme}")))?;
        origin.set_path("/");
        origin.set_query(None);
        Ok(origin)
    }
}

/// Parses a comma-separated transport list such as `"sockjs,websocket"`.
fn parse_transports(raw: &str) -> Result<Vec<TransportKind>, ClientError> {
    let transports = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(TransportKind::from_str)
        .collect::<Result<Vec<_>, _>>()?;
    if transports.is_empty() {
        return Err(ClientError::Config(
            "CLINIC_WS_TRANSPORTS names no transport".to_string(),
        ));
    }
    Ok(transports)
}

/// Reads a string variable, returning `default` when unset or blank.
fn env_or(key: &str, default: String) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(default)
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Parses an environment variable as a boolean. Accepts `"true"`, `"1"`,
/// `"false"`, `"0"` (case-insensitive). Returns `default` otherwise.
fn parse_env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key)
        .ok()
        .map(|v| v.to_ascii_lowercase())
        .as_deref()
    {
        Some("true") | Some("1") => true,
        Some("false") | Some("0") => false,
        _ => default,
    }
}
