//! Axum route handlers for forms, events and notifications.

use axum::{
    extract::{rejection::JsonRejection, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::Serialize;

use crate::errors::AppError;
use crate::intake::Upload;
use crate::lifecycle::events::CreateEventRequest;
use crate::lifecycle::forms::SubmissionInput;
use crate::lifecycle::{events, forms, notifications, parse_id};
use crate::models::{EventRecord, NotificationRecord, SubmissionRecord};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub message: &'static str,
    pub form_data: SubmissionRecord,
}

#[derive(Debug, Serialize)]
pub struct EventCreatedResponse {
    pub message: &'static str,
    pub event: EventRecord,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

// ────────────────────────────────────────────────────────────────────────────
// Forms
// ────────────────────────────────────────────────────────────────────────────

/// Reads the `name`, `email` and `resume` parts of the upload form. Unknown parts are skipped.
async fn read_submission(mut multipart: Multipart) -> Result<SubmissionInput, AppError> {
    let mut input = SubmissionInput::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed form data: {e}")))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "name" | "email" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Unreadable form field: {e}")))?;
                if field_name == "name" {
                    input.name = value;
                } else {
                    input.email = value;
                }
            }
            "resume" => {
                let original_name = field.file_name().unwrap_or_default().to_string();
                let mime_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes: Bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Unreadable file: {e}")))?;
                input.upload = Some(Upload {
                    bytes,
                    mime_type,
                    original_name,
                });
            }
            _ => {}
        }
    }

    Ok(input)
}

/// POST /upload
pub async fn handle_upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let input = read_submission(multipart).await?;
    let record = forms::submit(&state, input).await?;
    Ok(Json(UploadResponse {
        message: "Form submitted successfully",
        form_data: record,
    }))
}

/// GET /api/forms
pub async fn handle_list_forms(
    State(state): State<AppState>,
) -> Result<Json<Vec<SubmissionRecord>>, AppError> {
    Ok(Json(forms::list(&state).await?))
}

/// DELETE /api/delete/:id
pub async fn handle_delete_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = parse_id(&id, "Form")?;
    forms::delete(&state, id).await?;
    Ok(Json(MessageResponse {
        message: "Form and resume deleted successfully",
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Events
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/events
///
/// Body rejections (bad JSON, wrong field types, missing content type) are reported
/// as validation errors so they share the JSON error shape.
pub async fn handle_create_event(
    State(state): State<AppState>,
    body: Result<Json<CreateEventRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<EventCreatedResponse>), AppError> {
    let Json(req) = body.map_err(|e| AppError::Validation(e.body_text()))?;
    let event = events::create(&state, req).await?;
    Ok((
        StatusCode::CREATED,
        Json(EventCreatedResponse {
            message: "Event created successfully",
            event,
        }),
    ))
}

/// GET /api/events
pub async fn handle_list_events(
    State(state): State<AppState>,
) -> Result<Json<Vec<EventRecord>>, AppError> {
    Ok(Json(events::list(&state).await?))
}

/// DELETE /api/events/:id
pub async fn handle_delete_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = parse_id(&id, "Event")?;
    events::delete(&state, id).await?;
    Ok(Json(MessageResponse {
        message: "Event deleted successfully",
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Notifications
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/notifications
pub async fn handle_list_notifications(
    State(state): State<AppState>,
) -> Result<Json<Vec<NotificationRecord>>, AppError> {
    Ok(Json(notifications::list(&state).await?))
}

/// DELETE /api/notifications/:id
pub async fn handle_delete_notification(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = parse_id(&id, "Notification")?;
    notifications::delete(&state, id).await?;
    Ok(Json(MessageResponse {
        message: "Notification and associated file deleted successfully",
    }))
}
