mod config;
mod db;
mod deadline;
mod errors;
mod intake;
mod lifecycle;
mod mailer;
mod models;
mod relay;
mod reminders;
mod routes;
mod state;
mod storage;
mod store;
#[cfg(test)]
mod testing;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::mailer::{LogMailer, Mailer, SmtpMailer};
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::S3ObjectStore;
use crate::store::PgDocumentStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http={}",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log,
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting submissions API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let pool = create_pool(&config.database_url).await?;
    let documents = Arc::new(PgDocumentStore::new(pool, config.io_timeout));

    // Initialize S3 / MinIO
    let objects = Arc::new(S3ObjectStore::from_config(&config).await);

    // Initialize mail delivery
    let mailer: Arc<dyn Mailer> = match &config.smtp {
        Some(smtp) => {
            info!(host = %smtp.host, port = smtp.port, "SMTP mailer initialized");
            Arc::new(SmtpMailer::new(
                smtp,
                config.mail_from.clone(),
                config.io_timeout,
            )?)
        }
        None => {
            warn!("SMTP_HOST not set; outgoing email will only be logged");
            Arc::new(LogMailer)
        }
    };

    let state = AppState::new(objects, documents, mailer, config.clone());

    if config.reminders_enabled {
        reminders::spawn(state.clone(), reminders::REMINDER_PERIOD);
        info!("Daily reminder task scheduled");
    }

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
