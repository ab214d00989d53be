pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};

use crate::lifecycle::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    // Room above the file limit so oversize uploads get the 400 from intake
    // rather than a bare 413 from the extractor.
    let body_limit = state.config.max_upload_bytes.saturating_mul(2);

    Router::new()
        .route("/health", get(health::health_handler))
        // Resume forms
        .route("/upload", post(handlers::handle_upload))
        .route("/api/forms", get(handlers::handle_list_forms))
        .route("/api/delete/:id", delete(handlers::handle_delete_form))
        // Events
        .route(
            "/api/events",
            get(handlers::handle_list_events).post(handlers::handle_create_event),
        )
        .route("/api/events/:id", delete(handlers::handle_delete_event))
        // Notifications
        .route(
            "/api/notifications",
            get(handlers::handle_list_notifications),
        )
        .route(
            "/api/notifications/:id",
            delete(handlers::handle_delete_notification),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
