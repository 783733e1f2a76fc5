//! In-process fan-out of live appointment updates.
//!
//! The listener task owns the broker connection, but the terminal view and
//! any embedding code each want their own copy of every update. The bus
//! sits between them: [`crate::live::BroadcastHandler`] feeds it from the
//! listener task and each consumer holds its own receiver.

use tokio::sync::broadcast;

use super::AppointmentUpdate;

/// Hands each [`AppointmentUpdate`] to every consumer subscribed at the time
/// it arrives.
///
/// A consumer that subscribes late does not see earlier updates. One that
/// falls more than `capacity` updates behind gets
/// [`broadcast::error::RecvError::Lagged`] and resumes at the oldest update
/// still buffered.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<AppointmentUpdate>,
}

impl EventBus {
    /// Buffers up to `capacity` updates per consumer (at least one).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Delivers `update` to the current consumers and returns how many
    /// there were. With none, the update is dropped.
    pub fn publish(&self, update: AppointmentUpdate) -> usize {
        self.sender.send(update).unwrap_or(0)
    }

    /// Registers a consumer for updates published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AppointmentUpdate> {
        self.sender.subscribe()
    }
}
