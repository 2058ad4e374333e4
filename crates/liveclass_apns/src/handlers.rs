//! HTTP handlers for the Live Activity API
//!
//! Registration endpoints are called by the mobile app; the dispatch and
//! maintenance endpoints by operators or schedulers.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{Duration, Utc};
use liveclass_common::{validation_error, LiveClassError};
use liveclass_registry::{
    AllTokens, CleanupResult, RegisterActivityRequest, RegisterActivityResponse,
    RegisterApnsRequest, RegisterApnsResponse, RegisterPushToStartRequest,
    RegisterPushToStartResponse, RegistryStats, RemoveDeviceResult, TokenCounts, TokenRegistry,
};
use liveclass_schedule::{PeriodClock, PeriodSnapshot};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

use crate::dispatcher::{DispatchSummary, Dispatcher};

/// Shared state for Live Activity handlers
#[derive(Clone)]
pub struct LiveActivityState {
    pub registry: TokenRegistry,
    pub dispatcher: Arc<Dispatcher>,
    pub clock: Arc<PeriodClock>,
    /// Inactivity after which tokens are swept.
    pub token_ttl: Duration,
}

/// Response body of the health endpoint
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub ready: bool,
    pub reason: Option<String>,
    pub tokens: TokenCounts,
}

fn require(field: &str, value: &str) -> Result<(), LiveClassError> {
    if value.trim().is_empty() {
        return Err(validation_error(format!("{} must not be empty", field)));
    }
    Ok(())
}

#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/live-activity/register-push-to-start",
    request_body = RegisterPushToStartRequest,
    responses(
        (status = 200, description = "Token stored", body = RegisterPushToStartResponse),
        (status = 400, description = "Missing token, deviceId or bundleId"),
        (status = 503, description = "Token store unavailable")
    ),
    tag = "Live Activity"
))]
pub async fn register_push_to_start_handler(
    State(state): State<Arc<LiveActivityState>>,
    Json(payload): Json<RegisterPushToStartRequest>,
) -> Result<Json<RegisterPushToStartResponse>, LiveClassError> {
    require("token", &payload.token)?;
    require("deviceId", &payload.device_id)?;
    require("bundleId", &payload.bundle_id)?;

    let response = state.registry.register_push_to_start(payload).await?;
    Ok(Json(response))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/live-activity/register-activity",
    request_body = RegisterActivityRequest,
    responses(
        (status = 200, description = "Token stored", body = RegisterActivityResponse),
        (status = 400, description = "Missing token, activityId, deviceId or bundleId"),
        (status = 503, description = "Token store unavailable")
    ),
    tag = "Live Activity"
))]
pub async fn register_activity_handler(
    State(state): State<Arc<LiveActivityState>>,
    Json(payload): Json<RegisterActivityRequest>,
) -> Result<Json<RegisterActivityResponse>, LiveClassError> {
    require("token", &payload.token)?;
    require("activityId", &payload.activity_id)?;
    require("deviceId", &payload.device_id)?;
    require("bundleId", &payload.bundle_id)?;

    let response = state.registry.register_activity(payload).await?;
    Ok(Json(response))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/live-activity/register-apns",
    request_body = RegisterApnsRequest,
    responses(
        (status = 200, description = "Token stored", body = RegisterApnsResponse),
        (status = 400, description = "Missing token, deviceId or bundleId"),
        (status = 503, description = "Token store unavailable")
    ),
    tag = "Live Activity"
))]
pub async fn register_apns_handler(
    State(state): State<Arc<LiveActivityState>>,
    Json(payload): Json<RegisterApnsRequest>,
) -> Result<Json<RegisterApnsResponse>, LiveClassError> {
    require("token", &payload.token)?;
    require("deviceId", &payload.device_id)?;
    require("bundleId", &payload.bundle_id)?;

    let response = state.registry.register_apns(payload).await?;
    Ok(Json(response))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/live-activity/tokens",
    responses((status = 200, description = "All registered tokens", body = AllTokens)),
    tag = "Live Activity"
))]
pub async fn tokens_handler(
    State(state): State<Arc<LiveActivityState>>,
) -> Result<Json<AllTokens>, LiveClassError> {
    Ok(Json(state.registry.all_tokens().await?))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/live-activity/stats",
    responses((status = 200, description = "Registry statistics", body = RegistryStats)),
    tag = "Live Activity"
))]
pub async fn stats_handler(
    State(state): State<Arc<LiveActivityState>>,
) -> Result<Json<RegistryStats>, LiveClassError> {
    Ok(Json(state.registry.stats().await?))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/live-activity/cleanup",
    responses((status = 200, description = "Expired tokens removed", body = CleanupResult)),
    tag = "Live Activity"
))]
pub async fn cleanup_handler(
    State(state): State<Arc<LiveActivityState>>,
) -> Result<Json<CleanupResult>, LiveClassError> {
    let removed = state.registry.sweep(state.token_ttl).await?;
    Ok(Json(CleanupResult { removed }))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    delete,
    path = "/live-activity/devices/{device_id}",
    params(("device_id" = String, Path, description = "Device whose tokens are removed")),
    responses((status = 200, description = "Whether anything was removed", body = RemoveDeviceResult)),
    tag = "Live Activity"
))]
pub async fn remove_device_handler(
    State(state): State<Arc<LiveActivityState>>,
    Path(device_id): Path<String>,
) -> Result<Json<RemoveDeviceResult>, LiveClassError> {
    let removed = state.registry.remove_device_tokens(&device_id).await?;
    Ok(Json(RemoveDeviceResult { removed }))
}

fn dispatch_result(
    kind: &str,
    result: Result<DispatchSummary, crate::error::ApnsError>,
) -> Result<Json<DispatchSummary>, LiveClassError> {
    match result {
        Ok(summary) => Ok(Json(summary)),
        Err(e) => {
            error!("{} fan-out aborted: {}", kind, e);
            Err(e.into())
        }
    }
}

#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/live-activity/start",
    responses(
        (status = 200, description = "Start pushed to every push-to-start token", body = DispatchSummary),
        (status = 503, description = "APNs credentials not configured")
    ),
    tag = "Live Activity"
))]
pub async fn start_handler(
    State(state): State<Arc<LiveActivityState>>,
) -> Result<Json<DispatchSummary>, LiveClassError> {
    info!("live activity start requested");
    dispatch_result("start", state.dispatcher.fan_out_start().await)
}

#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/live-activity/update",
    responses(
        (status = 200, description = "Update pushed to every activity token", body = DispatchSummary),
        (status = 503, description = "APNs credentials not configured")
    ),
    tag = "Live Activity"
))]
pub async fn update_handler(
    State(state): State<Arc<LiveActivityState>>,
) -> Result<Json<DispatchSummary>, LiveClassError> {
    dispatch_result("update", state.dispatcher.fan_out_update().await)
}

#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/live-activity/end",
    responses(
        (status = 200, description = "End pushed to every activity token", body = DispatchSummary),
        (status = 503, description = "APNs credentials not configured")
    ),
    tag = "Live Activity"
))]
pub async fn end_handler(
    State(state): State<Arc<LiveActivityState>>,
) -> Result<Json<DispatchSummary>, LiveClassError> {
    info!("live activity end requested");
    dispatch_result("end", state.dispatcher.fan_out_end().await)
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/live-activity/status",
    responses((status = 200, description = "Current period state and window", body = PeriodSnapshot)),
    tag = "Live Activity"
))]
pub async fn status_handler(State(state): State<Arc<LiveActivityState>>) -> Json<PeriodSnapshot> {
    Json(state.clock.snapshot(Utc::now()))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/live-activity/health",
    responses((status = 200, description = "Readiness and registry size", body = HealthResponse)),
    tag = "Live Activity"
))]
pub async fn health_handler(
    State(state): State<Arc<LiveActivityState>>,
) -> Result<Json<HealthResponse>, LiveClassError> {
    Ok(Json(HealthResponse {
        ready: state.dispatcher.is_ready(),
        reason: state.dispatcher.not_ready_reason().map(str::to_string),
        tokens: state.registry.counts().await?,
    }))
}
