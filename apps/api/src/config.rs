use std::time::Duration;

use anyhow::{Context, Result};

/// Default upload ceiling: 5 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;
const DEFAULT_IO_TIMEOUT_SECS: u64 = 10;

/// Application configuration loaded from environment variables.
/// Start-up fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub s3_bucket: String,
    pub s3_region: String,
    /// Custom endpoint (MinIO, R2). When set the client uses path-style addressing.
    pub s3_endpoint: Option<String>,
    /// Base URL returned to clients for stored objects.
    pub s3_public_url: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    /// `None` means outgoing mail is only logged.
    pub smtp: Option<SmtpConfig>,
    pub mail_from: String,
    pub max_upload_bytes: usize,
    /// Upper bound for every object store, database and mail call.
    pub io_timeout: Duration,
    pub reminders_enabled: bool,
    pub port: u16,
    pub rust_log: String,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .with_context(|| format!("Required environment variable '{key}' is not set"))
        };

        let s3_bucket = require("S3_BUCKET")?;
        let s3_region = lookup("AWS_REGION").unwrap_or_else(|| "us-east-1".to_string());
        let s3_public_url = lookup("S3_PUBLIC_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| format!("https://{s3_bucket}.s3.{s3_region}.amazonaws.com"));

        let smtp = match lookup("SMTP_HOST").filter(|h| !h.is_empty()) {
            Some(host) => Some(SmtpConfig {
                host,
                port: parse_or(&lookup, "SMTP_PORT", 587u16)?,
                username: lookup("SMTP_USERNAME").unwrap_or_default(),
                password: lookup("SMTP_PASSWORD").unwrap_or_default(),
            }),
            None => None,
        };

        Ok(Config {
            database_url: require("DATABASE_URL")?,
            s3_bucket,
            s3_region,
            s3_endpoint: lookup("S3_ENDPOINT").filter(|v| !v.is_empty()),
            s3_public_url,
            aws_access_key_id: require("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require("AWS_SECRET_ACCESS_KEY")?,
            smtp,
            mail_from: lookup("MAIL_FROM")
                .unwrap_or_else(|| "Resume Desk <no-reply@example.com>".to_string()),
            max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            io_timeout: Duration::from_secs(parse_or(
                &lookup,
                "IO_TIMEOUT_SECS",
                DEFAULT_IO_TIMEOUT_SECS,
            )?),
            reminders_enabled: parse_or(&lookup, "REMINDERS_ENABLED", false)?,
            port: parse_or(&lookup, "PORT", 3000u16)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) if !raw.is_empty() => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value")),
        _ => Ok(default),
    }
}
