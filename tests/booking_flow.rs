//! End-to-end booking against a mock clinic server.

#![allow(clippy::panic)]

mod common;

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::sync::Mutex;

use clinic_booking_client::booking::{BookingClient, BookingOutcome, RecordingNotifier, today};
use clinic_booking_client::domain::DoctorId;
use clinic_booking_client::page::{DoctorCard, Page, SlotContainer, Display};

type Captured = Arc<Mutex<Vec<Value>>>;

const DASHBOARD: &str = r#"
<!doctype html>
<html><body>
  <div class="doctor" data-id="3">
    <h3>Dr. Grey</h3>
    <div class="slots" data-slots="09:00, 09:30 ,,10:00"></div>
  </div>
  <div class="doctor">
    <h3>Dr. Nobody</h3>
    <div class="slots" data-slots="16:00"></div>
  </div>
  <div class="doctor" data-id="dr-7">
    <h3>Dr. Typo</h3>
    <div class="slots" data-slots="17:00"></div>
  </div>
</body></html>
"#;

async fn book(State(captured): State<Captured>, Json(body): Json<Value>) -> Json<Value> {
    let time = body.get("time").cloned().unwrap_or(Value::Null);
    captured.lock().await.push(body);
    Json(json!({ "id": 42, "status": "Pending", "time": time }))
}

async fn reject() -> impl IntoResponse {
    (StatusCode::BAD_REQUEST, "Invalid doctor or patient")
}

async fn reject_with_json() -> impl IntoResponse {
    (StatusCode::BAD_REQUEST, Json(json!({ "message": "Appointment not found" })))
}

async fn clinic() -> (std::net::SocketAddr, Captured) {
    let captured: Captured = Arc::default();
    let app = Router::new()
        .route("/dashboard", get(|| async { Html(DASHBOARD) }))
        .route("/api/appointments", post(book))
        .route("/plain/api/appointments", post(reject))
        .route("/json-error/api/appointments", post(reject_with_json))
        .with_state(Arc::clone(&captured));
    (common::serve(app).await, captured)
}

async fn rendered_page(addr: std::net::SocketAddr) -> Page {
    let config = common::config_for(addr);
    let Ok(url) = config.page_url() else {
        panic!("page url");
    };
    let Ok(mut page) = Page::fetch(&reqwest::Client::new(), url).await else {
        panic!("page fetch failed");
    };
    page.render_all();
    page
}

fn client_for(addr: std::net::SocketAddr, booking_path: &str) -> BookingClient {
    let mut config = common::config_for(addr);
    config.booking_path = booking_path.to_string();
    let Ok(client) = BookingClient::from_config(reqwest::Client::new(), &config) else {
        panic!("client config");
    };
    client
}

#[tokio::test]
async fn activating_a_control_posts_exactly_once() {
    let (addr, captured) = clinic().await;
    let page = rendered_page(addr).await;
    let Some(card) = page.doctor(0) else {
        panic!("missing card");
    };
    let labels: Vec<&str> = card.slots().controls().iter().map(|c| c.text()).collect();
    assert_eq!(labels, vec!["09:00", "09:30", "10:00"]);

    let client = client_for(addr, "/api/appointments");
    let notifier = RecordingNotifier::new();
    let Some(outcome) = client.activate(card, 1, &notifier).await else {
        panic!("control 1 should exist");
    };
    assert!(outcome.is_booked());

    let bodies = captured.lock().await.clone();
    assert_eq!(bodies.len(), 1);
    let Some(body) = bodies.first() else {
        panic!("no body captured");
    };
    assert_eq!(
        body,
        &json!({
            "doctorId": 3,
            "patientUsername": "patient",
            "date": today().format("%Y-%m-%d").to_string(),
            "time": "09:30"
        })
    );

    assert_eq!(
        notifier.messages(),
        vec![r#"Booked: {"id":42,"status":"Pending","time":"09:30"}"#.to_string()]
    );
}

#[tokio::test]
async fn missing_doctor_id_books_doctor_one() {
    let (addr, captured) = clinic().await;
    let page = rendered_page(addr).await;
    let Some(card) = page.doctor(1) else {
        panic!("missing second card");
    };
    assert_eq!(card.doctor_id().ok(), Some(DoctorId::FALLBACK));

    let notifier = RecordingNotifier::new();
    let outcome = client_for(addr, "/api/appointments")
        .activate(card, 0, &notifier)
        .await;
    assert!(matches!(outcome, Some(BookingOutcome::Booked(_))));

    let bodies = captured.lock().await.clone();
    let Some(body) = bodies.first() else {
        panic!("no body captured");
    };
    assert_eq!(body["doctorId"], json!(1));
    assert_eq!(body["time"], json!("16:00"));
    assert_eq!(notifier.messages().len(), 1);
}

#[tokio::test]
async fn malformed_doctor_id_notifies_failure_without_posting() {
    let (addr, captured) = clinic().await;
    let page = rendered_page(addr).await;
    let Some(card) = page.doctor(2) else {
        panic!("missing third card");
    };
    assert_eq!(card.raw_id(), Some("dr-7"));

    let notifier = RecordingNotifier::new();
    let outcome = client_for(addr, "/api/appointments")
        .activate(card, 0, &notifier)
        .await;
    assert!(matches!(outcome, Some(BookingOutcome::Failed(_))));
    assert!(captured.lock().await.is_empty());
    assert_eq!(
        notifier.messages(),
        vec![r#"Booking failed: invalid doctor id "dr-7""#.to_string()]
    );
}

#[tokio::test]
async fn non_json_response_notifies_failure_once() {
    let (addr, _captured) = clinic().await;
    let card = DoctorCard::new(
        Some("3".to_string()),
        None,
        SlotContainer::new(Some("09:00".to_string()), Display::Visible),
    );
    let notifier = RecordingNotifier::new();
    let outcome = client_for(addr, "/plain/api/appointments")
        .book_slot(&card, "09:00", &notifier)
        .await;

    assert!(matches!(outcome, BookingOutcome::Failed(_)));
    let messages = notifier.messages();
    assert_eq!(messages.len(), 1);
    let Some(message) = messages.first() else {
        panic!("no notification");
    };
    assert!(message.starts_with("Booking failed: invalid json"), "{message}");
}

#[tokio::test]
async fn json_error_body_is_surfaced_verbatim() {
    let (addr, _captured) = clinic().await;
    let card = DoctorCard::new(None, None, SlotContainer::default());
    let notifier = RecordingNotifier::new();
    let outcome = client_for(addr, "/json-error/api/appointments")
        .book_slot(&card, "11:00", &notifier)
        .await;

    assert_eq!(
        outcome,
        BookingOutcome::Booked(json!({ "message": "Appointment not found" }))
    );
    assert_eq!(
        notifier.messages(),
        vec![r#"Booked: {"message":"Appointment not found"}"#.to_string()]
    );
}

#[tokio::test]
async fn unreachable_server_notifies_failure_once() {
    let addr = common::closed_addr().await;
    let card = DoctorCard::new(Some("3".to_string()), None, SlotContainer::default());
    let notifier = RecordingNotifier::new();
    let outcome = client_for(addr, "/api/appointments")
        .book_slot(&card, "09:00", &notifier)
        .await;

    assert!(!outcome.is_booked());
    let messages = notifier.messages();
    assert_eq!(messages.len(), 1);
    let Some(message) = messages.first() else {
        panic!("no notification");
    };
    assert!(message.starts_with("Booking failed: http request failed"), "{message}");
}

#[tokio::test]
async fn page_fetch_fails_on_missing_page() {
    let (addr, _captured) = clinic().await;
    let mut config = common::config_for(addr);
    config.page_path = "/nope".to_string();
    let Ok(url) = config.page_url() else {
        panic!("page url");
    };
    assert!(Page::fetch(&reqwest::Client::new(), url).await.is_err());
}
