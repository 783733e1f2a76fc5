//! Booking layer: request body, HTTP client and outcome notification.

pub mod client;
pub mod notifier;
pub mod request;

pub use client::{BookingClient, BookingOutcome};
pub use notifier::{ConsoleNotifier, Notifier, RecordingNotifier};
pub use request::{BookingRequest, today};
