//! Notification Relay: one email per recipient (best-effort), then exactly one
//! durable `NotificationRecord` for the event.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::mailer::{EmailError, Mailer};
use crate::models::{NewNotification, NotificationRecord};
use crate::store::DocumentStore;

/// Fixed message template used for every notification kind.
#[derive(Debug, Clone)]
pub struct Notice {
    pub subject: String,
    pub message: String,
    /// Who the stored notification is addressed to, when that is a known user.
    pub recipient_id: Option<Uuid>,
}

impl Notice {
    pub fn new_event(owner_id: Option<Uuid>) -> Self {
        Self {
            subject: "New Event Notification".to_string(),
            message: "A new event has been created!".to_string(),
            recipient_id: owner_id,
        }
    }

    pub fn submission_received(name: &str) -> Self {
        Self {
            subject: "Resume received".to_string(),
            message: format!("Thank you {name}, your resume has been received."),
            recipient_id: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    pub attempted: usize,
    pub delivered: usize,
}

#[derive(Clone)]
pub struct NotificationRelay {
    mailer: Arc<dyn Mailer>,
    documents: Arc<dyn DocumentStore>,
    timeout: Duration,
}

impl NotificationRelay {
    pub fn new(
        mailer: Arc<dyn Mailer>,
        documents: Arc<dyn DocumentStore>,
        timeout: Duration,
    ) -> Self {
        Self {
            mailer,
            documents,
            timeout,
        }
    }

    /// Emails every address in `recipients` concurrently, each send bounded by the
    /// relay timeout, so the whole fan-out takes at most one timeout.
    /// Individual failures are logged and skipped.
    pub async fn email_all(&self, subject: &str, body: &str, recipients: &[String]) -> Delivery {
        let sends = recipients.iter().map(|to| async move {
            let result = tokio::time::timeout(self.timeout, self.mailer.send(to, subject, body))
                .await
                .unwrap_or(Err(EmailError::Timeout));
            if let Err(e) = &result {
                warn!(to = %to, error = %e, "Notification email failed");
            }
            result.is_ok()
        });

        let delivered = join_all(sends).await.into_iter().filter(|ok| *ok).count();
        Delivery {
            attempted: recipients.len(),
            delivered,
        }
    }

    /// Emails the recipients, then records a single notification.
    /// Only the notification write can fail the call.
    pub async fn notify(
        &self,
        notice: &Notice,
        recipients: &[String],
    ) -> Result<NotificationRecord, AppError> {
        let delivery = self
            .email_all(&notice.subject, &notice.message, recipients)
            .await;

        let record = self
            .documents
            .insert_notification(NewNotification {
                recipient_id: notice.recipient_id,
                message: notice.message.clone(),
                storage_key: None,
            })
            .await?;

        info!(
            notification_id = %record.id,
            attempted = delivery.attempted,
            delivered = delivery.delivered,
            "Notification relayed"
        );
        Ok(record)
    }

    /// Announces to every known user.
    pub async fn notify_all_users(&self, notice: &Notice) -> Result<NotificationRecord, AppError> {
        let users = self.documents.list_users().await?;
        let recipients: Vec<String> = users.into_iter().map(|u| u.email).collect();
        self.notify(notice, &recipients).await
    }
}
