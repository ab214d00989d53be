//! Document Store Adapter: typed records keyed by database-generated UUIDs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{
    EventRecord, NewEvent, NewNotification, NewSubmission, NotificationRecord, SubmissionRecord,
    User,
};

mod postgres;

pub use postgres::PgDocumentStore;

/// Persistence for every record type the service owns.
///
/// Lists come back in insertion order. `delete_*` returns `false` when no row matched.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert_submission(&self, new: NewSubmission) -> Result<SubmissionRecord, AppError>;
    async fn list_submissions(&self) -> Result<Vec<SubmissionRecord>, AppError>;
    async fn find_submission(&self, id: Uuid) -> Result<Option<SubmissionRecord>, AppError>;
    async fn find_submission_by_storage_key(
        &self,
        storage_key: &str,
    ) -> Result<Option<SubmissionRecord>, AppError>;
    async fn delete_submission(&self, id: Uuid) -> Result<bool, AppError>;

    async fn insert_event(&self, new: NewEvent) -> Result<EventRecord, AppError>;
    async fn list_events(&self) -> Result<Vec<EventRecord>, AppError>;
    /// Events dated in `[from, to)`.
    async fn list_events_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<EventRecord>, AppError>;
    async fn find_event(&self, id: Uuid) -> Result<Option<EventRecord>, AppError>;
    async fn delete_event(&self, id: Uuid) -> Result<bool, AppError>;

    async fn insert_notification(
        &self,
        new: NewNotification,
    ) -> Result<NotificationRecord, AppError>;
    async fn list_notifications(&self) -> Result<Vec<NotificationRecord>, AppError>;
    async fn find_notification(&self, id: Uuid) -> Result<Option<NotificationRecord>, AppError>;
    async fn delete_notification(&self, id: Uuid) -> Result<bool, AppError>;

    async fn list_users(&self) -> Result<Vec<User>, AppError>;
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError>;
}
