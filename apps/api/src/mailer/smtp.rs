use std::time::Duration;

use async_trait::async_trait;
use lettre::{
    message::header::ContentType, transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use super::{EmailError, Mailer};
use crate::config::SmtpConfig;

/// SMTP delivery through `lettre`. The transport is built once and shared.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
    timeout: Duration,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig, from: String, timeout: Duration) -> Result<Self, EmailError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
            .map_err(|e| EmailError::Config(format!("{}: {e}", config.host)))?
            .port(config.port)
            .timeout(Some(timeout));
        if !config.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ));
        }

        Ok(Self {
            transport: builder.build(),
            from,
            timeout,
        })
    }
}

/// Builds a plain-text message.
fn build_message(from: &str, to: &str, subject: &str, body: &str) -> Result<Message, EmailError> {
    Message::builder()
        .from(
            from.parse()
                .map_err(|e| EmailError::InvalidAddress(format!("{from}: {e}")))?,
        )
        .to(to
            .parse()
            .map_err(|e| EmailError::InvalidAddress(format!("{to}: {e}")))?)
        .subject(subject)
        .header(ContentType::TEXT_PLAIN)
        .body(body.to_string())
        .map_err(|e| EmailError::Build(e.to_string()))
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), EmailError> {
        let email = build_message(&self.from, to, subject, body)?;

        match tokio::time::timeout(self.timeout, self.transport.send(email)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(EmailError::Send(e.to_string())),
            Err(_) => Err(EmailError::Timeout),
        }
    }
}
