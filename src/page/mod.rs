//! Page layer: the booking page's doctor cards, slot containers and
//! rendered slot controls.

pub mod document;
pub mod slots;
pub mod visibility;

pub use document::{DoctorCard, Page, SlotContainer};
pub use slots::{Slot, SlotControl, format_time_label, parse_slots, render_controls};
pub use visibility::Display;
