use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::NotificationRecord;
use crate::state::AppState;

pub async fn list(state: &AppState) -> Result<Vec<NotificationRecord>, AppError> {
    state.documents.list_notifications().await
}

/// Deletes an attached blob first (if any); the row is kept when that fails.
pub async fn delete(state: &AppState, id: Uuid) -> Result<NotificationRecord, AppError> {
    let notification = state
        .documents
        .find_notification(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Notification not found".to_string()))?;

    if let Some(key) = &notification.storage_key {
        state.objects.delete(key).await?;
    }

    if !state.documents.delete_notification(id).await? {
        return Err(AppError::NotFound("Notification not found".to_string()));
    }
    info!(
        notification_id = %id,
        had_attachment = notification.storage_key.is_some(),
        "Notification deleted"
    );
    Ok(notification)
}
