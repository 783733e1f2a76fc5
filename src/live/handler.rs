//! Extension point for reacting to appointment updates.
//!
//! The listener hands every parsed message to an [`AppointmentHandler`].
//! Implement the trait to update a view, mark slots as taken, or forward
//! updates elsewhere.

use crate::domain::{AppointmentUpdate, EventBus};

/// Receives every update delivered on the subscribed topic.
///
/// Called from the listener task, one update at a time, in arrival order.
pub trait AppointmentHandler: Send + Sync {
    /// Handles one update.
    fn on_update(&self, update: &AppointmentUpdate);
}

/// Logs each update and does nothing else.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

impl AppointmentHandler for LoggingHandler {
    fn on_update(&self, update: &AppointmentUpdate) {
        tracing::info!(
            destination = %update.destination,
            payload = %update.payload,
            "appointment update"
        );
    }
}

/// Publishes each update into an [`EventBus`].
#[derive(Debug, Clone)]
pub struct BroadcastHandler {
    bus: EventBus,
}

impl BroadcastHandler {
    /// Creates a handler publishing into `bus`.
    #[must_use]
    pub const fn new(bus: EventBus) -> Self {
        Self { bus }
    }
}

impl AppointmentHandler for BroadcastHandler {
    fn on_update(&self, update: &AppointmentUpdate) {
        let receivers = self.bus.publish(update.clone());
        tracing::trace!(receivers, "appointment update broadcast");
    }
}
