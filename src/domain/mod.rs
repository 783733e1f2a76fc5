//! Domain layer: doctor identity, appointment updates and the update bus.

pub mod appointment_update;
pub mod doctor_id;
pub mod event_bus;

pub use appointment_update::{AppointmentSummary, AppointmentUpdate};
pub use doctor_id::DoctorId;
pub use event_bus::EventBus;
