use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::DocumentStore;
use crate::deadline::bounded;
use crate::errors::AppError;
use crate::models::{
    EventRecord, NewEvent, NewNotification, NewSubmission, NotificationRecord, SubmissionRecord,
    User,
};

const WHAT: &str = "database";

const INSERT_SUBMISSION: &str = r#"
    INSERT INTO submissions (name, email, resume_url, storage_key, original_filename)
    VALUES ($1, $2, $3, $4, $5)
    RETURNING *
"#;

const INSERT_EVENT: &str = r#"
    INSERT INTO events (title, date, location, description, owner_id)
    VALUES ($1, $2, $3, $4, $5)
    RETURNING *
"#;

const INSERT_NOTIFICATION: &str = r#"
    INSERT INTO notifications (recipient_id, message, storage_key)
    VALUES ($1, $2, $3)
    RETURNING *
"#;

/// `DocumentStore` over the Postgres pool. Every query is bounded by `timeout`.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
    timeout: Duration,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    async fn delete_by_id(&self, sql: &'static str, id: Uuid) -> Result<bool, AppError> {
        bounded(WHAT, self.timeout, async {
            let result = sqlx::query(sql).bind(id).execute(&self.pool).await?;
            Ok::<_, AppError>(result.rows_affected() > 0)
        })
        .await
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn insert_submission(&self, new: NewSubmission) -> Result<SubmissionRecord, AppError> {
        bounded(WHAT, self.timeout, async {
            let row = sqlx::query_as::<_, SubmissionRecord>(INSERT_SUBMISSION)
                .bind(&new.name)
                .bind(&new.email)
                .bind(&new.resume_url)
                .bind(&new.storage_key)
                .bind(&new.original_filename)
                .fetch_one(&self.pool)
                .await?;
            Ok::<_, AppError>(row)
        })
        .await
    }

    async fn list_submissions(&self) -> Result<Vec<SubmissionRecord>, AppError> {
        bounded(WHAT, self.timeout, async {
            let rows = sqlx::query_as::<_, SubmissionRecord>(
                "SELECT * FROM submissions ORDER BY created_at, id",
            )
            .fetch_all(&self.pool)
            .await?;
            Ok::<_, AppError>(rows)
        })
        .await
    }

    async fn find_submission(&self, id: Uuid) -> Result<Option<SubmissionRecord>, AppError> {
        bounded(WHAT, self.timeout, async {
            let row =
                sqlx::query_as::<_, SubmissionRecord>("SELECT * FROM submissions WHERE id = $1")
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await?;
            Ok::<_, AppError>(row)
        })
        .await
    }

    async fn find_submission_by_storage_key(
        &self,
        storage_key: &str,
    ) -> Result<Option<SubmissionRecord>, AppError> {
        bounded(WHAT, self.timeout, async {
            let row = sqlx::query_as::<_, SubmissionRecord>(
                "SELECT * FROM submissions WHERE storage_key = $1",
            )
            .bind(storage_key)
            .fetch_optional(&self.pool)
            .await?;
            Ok::<_, AppError>(row)
        })
        .await
    }

    async fn delete_submission(&self, id: Uuid) -> Result<bool, AppError> {
        self.delete_by_id("DELETE FROM submissions WHERE id = $1", id)
            .await
    }

    async fn insert_event(&self, new: NewEvent) -> Result<EventRecord, AppError> {
        bounded(WHAT, self.timeout, async {
            let row = sqlx::query_as::<_, EventRecord>(INSERT_EVENT)
                .bind(&new.title)
                .bind(new.date)
                .bind(&new.location)
                .bind(&new.description)
                .bind(new.owner_id)
                .fetch_one(&self.pool)
                .await?;
            Ok::<_, AppError>(row)
        })
        .await
    }

    async fn list_events(&self) -> Result<Vec<EventRecord>, AppError> {
        bounded(WHAT, self.timeout, async {
            let rows =
                sqlx::query_as::<_, EventRecord>("SELECT * FROM events ORDER BY created_at, id")
                    .fetch_all(&self.pool)
                    .await?;
            Ok::<_, AppError>(rows)
        })
        .await
    }

    async fn list_events_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<EventRecord>, AppError> {
        bounded(WHAT, self.timeout, async {
            let rows = sqlx::query_as::<_, EventRecord>(
                "SELECT * FROM events WHERE date >= $1 AND date < $2 ORDER BY date",
            )
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await?;
            Ok::<_, AppError>(rows)
        })
        .await
    }

    async fn find_event(&self, id: Uuid) -> Result<Option<EventRecord>, AppError> {
        bounded(WHAT, self.timeout, async {
            let row = sqlx::query_as::<_, EventRecord>("SELECT * FROM events WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
            Ok::<_, AppError>(row)
        })
        .await
    }

    async fn delete_event(&self, id: Uuid) -> Result<bool, AppError> {
        self.delete_by_id("DELETE FROM events WHERE id = $1", id)
            .await
    }

    async fn insert_notification(
        &self,
        new: NewNotification,
    ) -> Result<NotificationRecord, AppError> {
        bounded(WHAT, self.timeout, async {
            let row = sqlx::query_as::<_, NotificationRecord>(INSERT_NOTIFICATION)
                .bind(new.recipient_id)
                .bind(&new.message)
                .bind(&new.storage_key)
                .fetch_one(&self.pool)
                .await?;
            Ok::<_, AppError>(row)
        })
        .await
    }

    async fn list_notifications(&self) -> Result<Vec<NotificationRecord>, AppError> {
        bounded(WHAT, self.timeout, async {
            let rows = sqlx::query_as::<_, NotificationRecord>(
                "SELECT * FROM notifications ORDER BY created_at, id",
            )
            .fetch_all(&self.pool)
            .await?;
            Ok::<_, AppError>(rows)
        })
        .await
    }

    async fn find_notification(&self, id: Uuid) -> Result<Option<NotificationRecord>, AppError> {
        bounded(WHAT, self.timeout, async {
            let row = sqlx::query_as::<_, NotificationRecord>(
                "SELECT * FROM notifications WHERE id = $1",
            )
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
            Ok::<_, AppError>(row)
        })
        .await
    }

    async fn delete_notification(&self, id: Uuid) -> Result<bool, AppError> {
        self.delete_by_id("DELETE FROM notifications WHERE id = $1", id)
            .await
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        bounded(WHAT, self.timeout, async {
            let rows = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at, id")
                .fetch_all(&self.pool)
                .await?;
            Ok::<_, AppError>(rows)
        })
        .await
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        bounded(WHAT, self.timeout, async {
            let row = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
            Ok::<_, AppError>(row)
        })
        .await
    }
}
