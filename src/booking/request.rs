//! Booking request body.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::DoctorId;

/// Body of `POST /api/appointments`.
///
/// ```json
/// { "doctorId": 3, "patientUsername": "patient", "date": "2026-10-19", "time": "09:30" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    /// Doctor to book with.
    pub doctor_id: DoctorId,
    /// Patient placing the booking.
    pub patient_username: String,
    /// Appointment date, serialized as `YYYY-MM-DD`.
    pub date: NaiveDate,
    /// Slot label.
    pub time: String,
}

impl BookingRequest {
    /// Builds a request for `time` on `date`.
    #[must_use]
    pub fn new(
        doctor_id: DoctorId,
        patient_username: impl Into<String>,
        date: NaiveDate,
        time: impl Into<String>,
    ) -> Self {
        Self {
            doctor_id,
            patient_username: patient_username.into(),
            date,
            time: time.into(),
        }
    }

    /// Builds a request for `time` on the current UTC date.
    #[must_use]
    pub fn for_today(
        doctor_id: DoctorId,
        patient_username: impl Into<String>,
        time: impl Into<String>,
    ) -> Self {
        Self::new(doctor_id, patient_username, today(), time)
    }
}

/// Current calendar date in UTC.
#[must_use]
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_with_camel_case_fields() {
        let Some(date) = NaiveDate::from_ymd_opt(2026, 10, 19) else {
            panic!("valid date");
        };
        let request = BookingRequest::new(DoctorId::new(4), "patient", date, "09:30");
        let Ok(value) = serde_json::to_value(&request) else {
            panic!("serialization failed");
        };
        assert_eq!(
            value,
            json!({
                "doctorId": 4,
                "patientUsername": "patient",
                "date": "2026-10-19",
                "time": "09:30"
            })
        );
    }

    #[test]
    fn for_today_uses_iso_date() {
        let request = BookingRequest::for_today(DoctorId::FALLBACK, "patient", "10:00");
        let Ok(value) = serde_json::to_value(&request) else {
            panic!("serialization failed");
        };
        let expected = today().format("%Y-%m-%d").to_string();
        assert_eq!(value["date"], json!(expected));
        assert_eq!(value["doctorId"], json!(1));
    }
}
