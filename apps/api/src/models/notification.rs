use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Durable in-app notification. Deleting it also deletes the blob under `storage_key`, if any.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRecord {
    pub id: Uuid,
    pub recipient_id: Option<Uuid>,
    pub message: String,
    pub storage_key: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub recipient_id: Option<Uuid>,
    pub message: String,
    pub storage_key: Option<String>,
}
