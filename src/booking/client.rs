//! Booking client: posts booking requests and reports the outcome.

use url::Url;

use super::notifier::Notifier;
use super::request::BookingRequest;
use crate::config::ClientConfig;
use crate::domain::DoctorId;
use crate::error::ClientError;
use crate::page::DoctorCard;

/// What a single booking attempt produced.
#[derive(Debug, Clone, PartialEq)]
pub enum BookingOutcome {
    /// The server answered with a JSON body.
    Booked(serde_json::Value),
    /// The request failed or the body was not JSON.
    Failed(String),
}

impl BookingOutcome {
    /// Text shown to the user for this outcome.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Booked(body) => format!("Booked: {body}"),
            Self::Failed(reason) => format!("Booking failed: {reason}"),
        }
    }

    /// Returns `true` for [`BookingOutcome::Booked`].
    #[must_use]
    pub const fn is_booked(&self) -> bool {
        matches!(self, Self::Booked(_))
    }
}

/// Posts booking requests to the clinic's booking endpoint.
#[derive(Debug, Clone)]
pub struct BookingClient {
    http: reqwest::Client,
    endpoint: Url,
    patient_username: String,
}

impl BookingClient {
    /// Creates a client posting to `endpoint` on behalf of `patient_username`.
    #[must_use]
    pub fn new(http: reqwest::Client, endpoint: Url, patient_username: impl Into<String>) -> Self {
        Self {
            http,
            endpoint,
            patient_username: patient_username.into(),
        }
    }

    /// Creates a client from the configured endpoint and username.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Url`] if the booking URL cannot be built.
    pub fn from_config(http: reqwest::Client, config: &ClientConfig) -> Result<Self, ClientError> {
        Ok(Self::new(
            http,
            config.booking_url()?,
            config.patient_username.clone(),
        ))
    }

    /// Builds today's request for `time` with `doctor_id`.
    #[must_use]
    pub fn request_for(&self, doctor_id: DoctorId, time: &str) -> BookingRequest {
        BookingRequest::for_today(doctor_id, self.patient_username.as_str(), time)
    }

    /// Sends one booking request and parses the response body as JSON.
    ///
    /// The HTTP status is not inspected: any JSON body is returned.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the request cannot be sent or the
    /// body cannot be read, and [`ClientError::Json`] if the body is not
    /// JSON.
    pub async fn submit(&self, request: &BookingRequest) -> Result<serde_json::Value, ClientError> {
        tracing::info!(
            doctor_id = %request.doctor_id,
            date = %request.date,
            time = %request.time,
            "submitting booking"
        );
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        tracing::debug!(status = %status, "booking response received");
        Ok(serde_json::from_str(&body)?)
    }

    /// Books `time` with the doctor of `card` and notifies the user exactly
    /// once with the outcome.
    pub async fn book_slot(
        &self,
        card: &DoctorCard,
        time: &str,
        notifier: &dyn Notifier,
    ) -> BookingOutcome {
        let outcome = match self.attempt(card, time).await {
            Ok(body) => BookingOutcome::Booked(body),
            Err(err) => {
                tracing::warn!(error = %err, "booking failed");
                BookingOutcome::Failed(err.to_string())
            }
        };
        notifier.notify(&outcome.message());
        outcome
    }

    async fn attempt(&self, card: &DoctorCard, time: &str) -> Result<serde_json::Value, ClientError> {
        let request = self.request_for(card.doctor_id()?, time);
        self.submit(&request).await
    }

    /// Activates the control at `position` in `card`'s slot container.
    ///
    /// Returns `None` without sending anything if no such control was
    /// rendered.
    pub async fn activate(
        &self,
        card: &DoctorCard,
        position: usize,
        notifier: &dyn Notifier,
    ) -> Option<BookingOutcome> {
        let control = card.slots().control(position)?;
        Some(self.book_slot(card, control.text(), notifier).await)
    }
}
