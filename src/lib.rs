//! # clinic-booking-client
//!
//! Client for the clinic's doctor-appointment booking page.
//!
//! The crate reads the page's doctor cards, renders each card's available
//! time slots into controls, books a slot with a JSON `POST`, and listens
//! for appointment changes over STOMP on a SockJS-capable WebSocket.
//!
//! ## Architecture
//!
//! ```text
//! Booking page (HTML)            Clinic server
//!     │                              ▲      │
//!     ├── Page / DoctorCard (page/)  │      │ /topic/appointments
//!     │       │                      │      ▼
//!     │       └── BookingClient ─────┘   LiveUpdateListener (live/)
//!     │             (booking/)               │
//!     │                                      ├── Transport (sockjs | websocket)
//!     └── Notifier                           └── AppointmentHandler ──▶ EventBus
//! ```

pub mod booking;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod live;
pub mod page;
