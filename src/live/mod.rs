//! Live-update layer: STOMP over a negotiated WebSocket transport.
//!
//! ```text
//! LiveUpdateListener ──▶ Transport (sockjs | websocket) ──▶ broker
//!         │
//!         └──▶ AppointmentHandler (LoggingHandler, BroadcastHandler, ...)
//! ```

pub mod handler;
pub mod listener;
pub mod sockjs;
pub mod stomp;
pub mod transport;

pub use handler::{AppointmentHandler, BroadcastHandler, LoggingHandler};
pub use listener::{ConnectionState, ListenerHandle, LiveUpdateListener, SUBSCRIPTION_ID};
pub use stomp::{HeaderEscaping, StompCommand, StompFrame};
pub use transport::{Transport, TransportKind};
