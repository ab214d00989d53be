//! Outgoing email. Every send is best-effort from the caller's point of view:
//! failures are reported as `EmailError` and callers log them instead of failing.

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

mod smtp;

pub use smtp::SmtpMailer;

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Invalid SMTP configuration: {0}")]
    Config(String),

    #[error("Failed to build email: {0}")]
    Build(String),

    #[error("Failed to send email: {0}")]
    Send(String),

    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    #[error("Timed out sending email")]
    Timeout,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), EmailError>;
}

/// Used when no SMTP host is configured: the message is logged and dropped.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), EmailError> {
        info!(to, subject, body_len = body.len(), "SMTP not configured, email not sent");
        Ok(())
    }
}
