use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{EventRecord, NewEvent};
use crate::relay::Notice;
use crate::state::AppState;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub location: String,
    pub description: Option<String>,
    pub user_id: Option<Uuid>,
}

/// Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_event_date(raw: &str) -> Result<DateTime<Utc>, AppError> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| AppError::Validation(format!("Invalid event date '{raw}'.")))
}

fn validate(req: CreateEventRequest) -> Result<NewEvent, AppError> {
    let mut missing = Vec::new();
    if req.title.trim().is_empty() {
        missing.push("title");
    }
    if req.date.trim().is_empty() {
        missing.push("date");
    }
    if req.location.trim().is_empty() {
        missing.push("location");
    }
    if !missing.is_empty() {
        return Err(AppError::Validation(format!(
            "Missing required fields: {}.",
            missing.join(", ")
        )));
    }

    Ok(NewEvent {
        title: req.title.trim().to_string(),
        date: parse_event_date(&req.date)?,
        location: req.location.trim().to_string(),
        description: req
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty()),
        owner_id: req.user_id,
    })
}

/// Persists the event, then announces it to every known user.
pub async fn create(state: &AppState, req: CreateEventRequest) -> Result<EventRecord, AppError> {
    let new = validate(req)?;
    let event = state.documents.insert_event(new).await?;
    info!(event_id = %event.id, "Event created");

    if let Err(e) = state
        .relay
        .notify_all_users(&Notice::new_event(event.owner_id))
        .await
    {
        warn!(event_id = %event.id, error = %e, "Event announcement not recorded");
    }

    Ok(event)
}

pub async fn list(state: &AppState) -> Result<Vec<EventRecord>, AppError> {
    state.documents.list_events().await
}

pub async fn delete(state: &AppState, id: Uuid) -> Result<EventRecord, AppError> {
    let event = state
        .documents
        .find_event(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

    if !state.documents.delete_event(id).await? {
        return Err(AppError::NotFound("Event not found".to_string()));
    }
    info!(event_id = %id, "Event deleted");
    Ok(event)
}
