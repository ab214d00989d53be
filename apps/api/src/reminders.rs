//! Daily reminder job. Stateless: each pass reads upcoming events and emails
//! their owners; it writes nothing, so a pass with no events is a no-op.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::errors::AppError;
use crate::state::AppState;

pub const REMINDER_PERIOD: Duration = Duration::from_secs(24 * 60 * 60);

/// Emails the owner of every event dated within the next 24 hours.
/// Returns how many reminders were delivered.
pub async fn run_reminder_pass(state: &AppState, now: DateTime<Utc>) -> Result<usize, AppError> {
    let until = now + chrono::Duration::hours(24);
    let events = state.documents.list_events_between(now, until).await?;

    let mut delivered = 0;
    for event in &events {
        let Some(owner_id) = event.owner_id else {
            continue;
        };
        let owner = match state.documents.find_user(owner_id).await {
            Ok(Some(owner)) => owner,
            Ok(None) => continue,
            Err(e) => {
                warn!(event_id = %event.id, error = %e, "Could not load event owner");
                continue;
            }
        };

        let body = format!(
            "Reminder: \"{}\" takes place at {} on {}.",
            event.title,
            event.location,
            event.date.format("%Y-%m-%d %H:%M UTC")
        );
        delivered += state
            .relay
            .email_all("Event reminder", &body, std::slice::from_ref(&owner.email))
            .await
            .delivered;
    }

    info!(upcoming = events.len(), delivered, "Reminder pass complete");
    Ok(delivered)
}

/// Runs `run_reminder_pass` every `period` until the runtime shuts down.
pub fn spawn(state: AppState, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            if let Err(e) = run_reminder_pass(&state, Utc::now()).await {
                error!(error = %e, "Reminder pass failed");
            }
        }
    })
}
