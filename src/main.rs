//! clinic-booking terminal entry point.
//!
//! Loads the booking page, renders every doctor's slots, listens for live
//! appointment updates and books slots from typed commands.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;

use clinic_booking_client::booking::{BookingClient, ConsoleNotifier};
use clinic_booking_client::cli::{self, Command};
use clinic_booking_client::config::ClientConfig;
use clinic_booking_client::domain::{AppointmentUpdate, EventBus};
use clinic_booking_client::live::{BroadcastHandler, LiveUpdateListener};
use clinic_booking_client::page::Page;

/// How long the live update listener gets to send `DISCONNECT` on exit.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let config = ClientConfig::from_env()?;
    tracing::info!(base_url = %config.base_url, "starting clinic-booking");

    // Load and render the page
    let http = reqwest::Client::new();
    let mut page = Page::fetch(&http, config.page_url()?).await?;
    page.render_all();
    let booking = BookingClient::from_config(http, &config)?;

    // Live updates
    let bus = EventBus::new(config.event_bus_capacity);
    let mut updates = bus.subscribe();
    let listener = if config.live_updates_enabled {
        let handler = Arc::new(BroadcastHandler::new(bus.clone()));
        Some(LiveUpdateListener::new(&config, handler)?.spawn())
    } else {
        tracing::info!("live updates disabled");
        None
    };

    print!("{}", cli::render_page(&page));
    println!("{}", cli::HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<Command>() {
                    Ok(Command::Quit) => break,
                    Ok(command) => run_command(command, &mut page, &booking).await,
                    Err(message) => println!("{message}"),
                }
            }
            update = updates.recv() => match update {
                Ok(update) => print_update(&update),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(lagged = n, "terminal lagged behind live updates");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }

    if let Some(handle) = listener {
        if tokio::time::timeout(SHUTDOWN_GRACE, handle.shutdown())
            .await
            .is_err()
        {
            tracing::warn!("live update listener did not stop in time");
        }
    }
    Ok(())
}

async fn run_command(command: Command, page: &mut Page, booking: &BookingClient) {
    match command {
        Command::List => print!("{}", cli::render_page(page)),
        Command::Show { doctor } => {
            let Some(card) = page.doctor_mut(doctor) else {
                println!("no doctor {}", doctor + 1);
                return;
            };
            card.toggle_slots();
            print!("{}", cli::render_page(page));
        }
        Command::Book { doctor, slot } => {
            let Some(card) = page.doctor(doctor) else {
                println!("no doctor {}", doctor + 1);
                return;
            };
            if booking.activate(card, slot, &ConsoleNotifier).await.is_none() {
                println!("doctor {} has no slot {}", doctor + 1, slot + 1);
            }
        }
        Command::Help => println!("{}", cli::HELP),
        Command::Quit => {}
    }
}

fn print_update(update: &AppointmentUpdate) {
    let Some(summary) = update.summary() else {
        println!("update: {}", update.payload);
        return;
    };
    println!(
        "update: appointment {} with {} on {} at {} ({})",
        summary.id.map_or_else(|| "?".to_string(), |id| id.to_string()),
        summary.doctor.as_deref().unwrap_or("unknown doctor"),
        summary
            .date
            .map_or_else(|| "?".to_string(), |date| date.to_string()),
        summary.display_time().unwrap_or_else(|| "?".to_string()),
        if summary.confirmed {
            "confirmed"
        } else {
            "pending"
        },
    );
}
