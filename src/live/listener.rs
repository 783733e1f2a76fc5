//! Live appointment update listener.
//!
//! One listener per page load: [`LiveUpdateListener::spawn`] consumes the
//! listener, so a second session can never be started from it.
//!
//! ```text
//! Uninitialized ──spawn──▶ Connecting ──CONNECTED + SUBSCRIBE──▶ Subscribed
//!                              │                                     │
//!                              └─ failure ─▶ Degraded ◀─ closed/shutdown ┘
//! ```
//!
//! There is no transition out of `Degraded`. [`ListenerHandle::shutdown`]
//! sends `DISCONNECT` before closing the socket.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use url::Url;

use super::handler::AppointmentHandler;
use super::stomp::{HeaderEscaping, StompCommand, StompFrame};
use super::transport::{Transport, TransportKind};
use crate::config::ClientConfig;
use crate::domain::AppointmentUpdate;
use crate::error::ClientError;

/// Subscription id used for the appointment topic.
pub const SUBSCRIPTION_ID: &str = "sub-0";

/// Connection state of a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// Not started yet.
    #[default]
    Uninitialized,
    /// Opening the transport and negotiating the STOMP session.
    Connecting,
    /// Subscribed; updates are flowing.
    Subscribed,
    /// No live updates for the rest of this session.
    Degraded,
}

impl ConnectionState {
    /// Returns `true` once the state can no longer change on its own.
    #[must_use]
    pub const fn is_settled(self) -> bool {
        matches!(self, Self::Subscribed | Self::Degraded)
    }
}

/// How a subscribed session ended without an error.
enum SessionEnd {
    /// The handle asked for shutdown.
    Stopped,
    /// The broker closed the connection.
    Closed,
}

/// Subscribes to appointment updates and feeds them to a handler.
pub struct LiveUpdateListener {
    origin: Url,
    endpoint: String,
    topic: String,
    transports: Vec<TransportKind>,
    handler: Arc<dyn AppointmentHandler>,
}

impl fmt::Debug for LiveUpdateListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveUpdateListener")
            .field("origin", &self.origin.as_str())
            .field("endpoint", &self.endpoint)
            .field("topic", &self.topic)
            .field("transports", &self.transports)
            .finish_non_exhaustive()
    }
}

impl LiveUpdateListener {
    /// Creates a listener for the configured endpoint and topic.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if the base URL has no WebSocket
    /// counterpart.
    pub fn new(
        config: &ClientConfig,
        handler: Arc<dyn AppointmentHandler>,
    ) -> Result<Self, ClientError> {
        Ok(Self {
            origin: config.ws_origin()?,
            endpoint: config.ws_path.clone(),
            topic: config.topic.clone(),
            transports: config.transports.clone(),
            handler,
        })
    }

    /// Starts the session on a background task.
    #[must_use]
    pub fn spawn(self) -> ListenerHandle {
        let (state_tx, state_rx) = watch::channel(ConnectionState::Uninitialized);
        let (stop_tx, stop_rx) = oneshot::channel();
        let task = tokio::spawn(self.run(state_tx, stop_rx));
        ListenerHandle {
            state: state_rx,
            stop: stop_tx,
            task,
        }
    }

    async fn run(self, state: watch::Sender<ConnectionState>, mut stop: oneshot::Receiver<()>) {
        state.send_replace(ConnectionState::Connecting);
        let opened = tokio::select! {
            opened = self.open_session() => opened,
            _ = &mut stop => {
                tracing::info!("live updates stopped while connecting");
                state.send_replace(ConnectionState::Degraded);
                return;
            }
        };
        let transport = match opened {
            Ok(transport) => transport,
            Err(err) => {
                tracing::warn!(error = %err, "live updates not available");
                state.send_replace(ConnectionState::Degraded);
                return;
            }
        };

        state.send_replace(ConnectionState::Subscribed);
        tracing::info!(topic = %self.topic, "subscribed to appointment updates");

        match self.receive(transport, &mut stop).await {
            Ok(SessionEnd::Stopped) => tracing::info!("live updates stopped"),
            Ok(SessionEnd::Closed) => tracing::warn!("live update connection closed by broker"),
            Err(err) => tracing::warn!(error = %err, "live update connection lost"),
        }
        state.send_replace(ConnectionState::Degraded);
    }

    /// Opens a transport, negotiates the STOMP session and subscribes.
    async fn open_session(&self) -> Result<Transport, ClientError> {
        let mut transport =
            Transport::open(&self.origin, &self.endpoint, &self.transports).await?;

        let host = self.origin.host_str().unwrap_or("localhost");
        transport.send(&StompFrame::connect(host)).await?;
        let connected = await_connected(&mut transport).await?;
        let version = connected.get("version");
        transport.set_escaping(HeaderEscaping::for_version(version));
        tracing::info!(
            transport = %transport.kind(),
            version = version.unwrap_or("1.0"),
            server = connected.get("server").unwrap_or("unknown"),
            "connected to broker"
        );

        transport
            .send(&StompFrame::subscribe(SUBSCRIPTION_ID, &self.topic))
            .await?;
        Ok(transport)
    }

    /// Dispatches frames until the broker goes away or `stop` fires.
    async fn receive(
        &self,
        mut transport: Transport,
        stop: &mut oneshot::Receiver<()>,
    ) -> Result<SessionEnd, ClientError> {
        loop {
            let next = tokio::select! {
                frame = transport.next_frame() => Some(frame),
                _ = &mut *stop => None,
            };
            let Some(frame) = next else {
                transport.send(&StompFrame::disconnect()).await?;
                transport.close().await?;
                return Ok(SessionEnd::Stopped);
            };
            let Some(frame) = frame? else {
                return Ok(SessionEnd::Closed);
            };
            match frame.command {
                StompCommand::Message => self.dispatch(&frame),
                StompCommand::Error => return Err(broker_error(&frame)),
                StompCommand::Receipt => {}
                other => tracing::debug!(command = %other, "ignoring frame"),
            }
        }
    }

    fn dispatch(&self, frame: &StompFrame) {
        let payload = match serde_json::from_str::<serde_json::Value>(&frame.body) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!(error = %err, "appointment update body is not json");
                return;
            }
        };
        let update = AppointmentUpdate {
            destination: frame
                .get("destination")
                .unwrap_or(self.topic.as_str())
                .to_string(),
            subscription: frame.get("subscription").map(str::to_string),
            message_id: frame.get("message-id").map(str::to_string),
            payload,
            received_at: Utc::now(),
        };
        tracing::debug!(payload = %update.payload, "appointment update received");
        self.handler.on_update(&update);
    }
}

async fn await_connected(transport: &mut Transport) -> Result<StompFrame, ClientError> {
    while let Some(frame) = transport.next_frame().await? {
        match frame.command {
            StompCommand::Connected => return Ok(frame),
            StompCommand::Error => return Err(broker_error(&frame)),
            other => tracing::debug!(command = %other, "frame before CONNECTED"),
        }
    }
    Err(ClientError::ConnectionClosed(
        "closed before CONNECTED".to_string(),
    ))
}

fn broker_error(frame: &StompFrame) -> ClientError {
    let message = frame.get("message").unwrap_or("no message");
    let details = frame.body.trim();
    if details.is_empty() {
        ClientError::Broker(message.to_string())
    } else {
        ClientError::Broker(format!("{message}: {details}"))
    }
}

/// Handle to a running listener.
///
/// Dropping the handle ends the session the same way
/// [`ListenerHandle::shutdown`] does, without waiting for it.
#[derive(Debug)]
pub struct ListenerHandle {
    state: watch::Receiver<ConnectionState>,
    stop: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl ListenerHandle {
    /// Current connection state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// A receiver that observes every state change.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    /// Waits until the listener is subscribed or degraded.
    pub async fn settled(&mut self) -> ConnectionState {
        match self.state.wait_for(|state| state.is_settled()).await {
            Ok(state) => *state,
            Err(_) => ConnectionState::Degraded,
        }
    }

    /// Waits until the listener has given up on live updates.
    pub async fn degraded(&mut self) {
        let _ = self
            .state
            .wait_for(|state| *state == ConnectionState::Degraded)
            .await;
    }

    /// Returns `true` once the background task has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Ends the session and waits for the background task to exit.
    ///
    /// A subscribed session sends `DISCONNECT` and closes the socket. A
    /// session still connecting is abandoned. Either way the final state is
    /// [`ConnectionState::Degraded`].
    pub async fn shutdown(self) {
        let _ = self.stop.send(());
        if let Err(err) = self.task.await {
            tracing::warn!(error = %err, "live update task failed");
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::live::LoggingHandler;

    #[test]
    fn settled_states() {
        assert!(!ConnectionState::Uninitialized.is_settled());
        assert!(!ConnectionState::Connecting.is_settled());
        assert!(ConnectionState::Subscribed.is_settled());
        assert!(ConnectionState::Degraded.is_settled());
    }

    #[test]
    fn broker_error_combines_header_and_body() {
        let frame = StompFrame::new(StompCommand::Error)
            .header("message", "Bad destination")
            .body(" /topic/nope \n");
        assert_eq!(
            broker_error(&frame).to_string(),
            "broker error: Bad destination: /topic/nope"
        );
        let bare = StompFrame::new(StompCommand::Error);
        assert_eq!(broker_error(&bare).to_string(), "broker error: no message");
    }

    #[tokio::test]
    async fn unreachable_broker_degrades() {
        let Ok(reserved) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
            panic!("bind failed");
        };
        let Ok(addr) = reserved.local_addr() else {
            panic!("no local addr");
        };
        drop(reserved);

        let Ok(base) = Url::parse(&format!("http://{addr}")) else {
            panic!("bad url");
        };
        let config = ClientConfig::new(base);
        let Ok(listener) = LiveUpdateListener::new(&config, Arc::new(LoggingHandler)) else {
            panic!("listener config rejected");
        };
        let mut handle = listener.spawn();
        assert_eq!(handle.settled().await, ConnectionState::Degraded);
        handle.degraded().await;
    }
}
