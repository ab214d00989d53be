use std::sync::Arc;

use crate::config::Config;
use crate::intake::IntakePipeline;
use crate::mailer::Mailer;
use crate::relay::NotificationRelay;
use crate::storage::ObjectStore;
use crate::store::DocumentStore;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// The external services are trait objects so the same handlers run against
/// S3/Postgres/SMTP in production and in-memory doubles in tests.
#[derive(Clone)]
pub struct AppState {
    pub objects: Arc<dyn ObjectStore>,
    pub documents: Arc<dyn DocumentStore>,
    pub intake: IntakePipeline,
    pub relay: NotificationRelay,
    pub config: Config,
}

impl AppState {
    pub fn new(
        objects: Arc<dyn ObjectStore>,
        documents: Arc<dyn DocumentStore>,
        mailer: Arc<dyn Mailer>,
        config: Config,
    ) -> Self {
        let intake = IntakePipeline::new(objects.clone(), config.max_upload_bytes);
        let relay = NotificationRelay::new(mailer, documents.clone(), config.io_timeout);
        Self {
            objects,
            documents,
            intake,
            relay,
            config,
        }
    }
}
