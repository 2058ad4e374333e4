use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tracing::info;

use crate::handlers::{
    cleanup_handler, end_handler, health_handler, register_activity_handler,
    register_apns_handler, register_push_to_start_handler, remove_device_handler, start_handler,
    stats_handler, status_handler, tokens_handler, update_handler, LiveActivityState,
};

/// Create the Live Activity routes for the API
///
/// The router is meant to be nested under `/api` by the backend.
pub fn routes(state: Arc<LiveActivityState>) -> Router {
    info!("Live Activity routes initialized");

    Router::new()
        .route(
            "/live-activity/register-push-to-start",
            post(register_push_to_start_handler),
        )
        .route(
            "/live-activity/register-activity",
            post(register_activity_handler),
        )
        .route("/live-activity/register-apns", post(register_apns_handler))
        .route("/live-activity/tokens", get(tokens_handler))
        .route("/live-activity/stats", get(stats_handler))
        .route("/live-activity/cleanup", post(cleanup_handler))
        .route(
            "/live-activity/devices/{device_id}",
            delete(remove_device_handler),
        )
        .route("/live-activity/start", post(start_handler))
        .route("/live-activity/update", post(update_handler))
        .route("/live-activity/end", post(end_handler))
        .route("/live-activity/status", get(status_handler))
        .route("/live-activity/health", get(health_handler))
        .with_state(state)
}
