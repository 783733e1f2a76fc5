//! Appointment change notifications received from the broker.
//!
//! The clinic server publishes a small JSON object on every appointment
//! save. The client treats the body as opaque ([`AppointmentUpdate::payload`])
//! and offers a best-effort typed view ([`AppointmentSummary`]) for
//! handlers that want one.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::page::slots::format_time_label;

/// One inbound message on the appointment topic.
#[derive(Debug, Clone, Serialize)]
pub struct AppointmentUpdate {
    /// Destination the broker delivered the message on.
    pub destination: String,
    /// Subscription id the message was routed to.
    pub subscription: Option<String>,
    /// Broker-assigned message id.
    pub message_id: Option<String>,
    /// Parsed JSON body.
    pub payload: serde_json::Value,
    /// When the client received the message.
    pub received_at: DateTime<Utc>,
}

impl AppointmentUpdate {
    /// Wraps a parsed payload received on `destination`, stamped now.
    #[must_use]
    pub fn new(destination: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            destination: destination.into(),
            subscription: None,
            message_id: None,
            payload,
            received_at: Utc::now(),
        }
    }

    /// Interprets the payload as the server's appointment summary.
    ///
    /// Returns `None` when the payload is not a JSON object of that shape.
    #[must_use]
    pub fn summary(&self) -> Option<AppointmentSummary> {
        if !self.payload.is_object() {
            return None;
        }
        AppointmentSummary::deserialize(&self.payload).ok()
    }
}

/// Fields the clinic server includes when it announces a saved appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentSummary {
    /// Appointment primary key.
    #[serde(default)]
    pub id: Option<u64>,
    /// Doctor display name.
    #[serde(default)]
    pub doctor: Option<String>,
    /// Appointment date.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// Booked slot label.
    #[serde(default)]
    pub time: Option<String>,
    /// Whether the doctor confirmed the appointment.
    #[serde(default)]
    pub confirmed: bool,
}

impl AppointmentSummary {
    /// Slot label in 12-hour form, if the update carried one.
    #[must_use]
    pub fn display_time(&self) -> Option<String> {
        self.time.as_deref().map(format_time_label)
    }
}
