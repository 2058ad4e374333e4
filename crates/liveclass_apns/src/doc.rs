use utoipa::OpenApi;

use crate::dispatcher::DispatchSummary;
use crate::handlers::{self, HealthResponse};
use crate::payload::{ActivityAttributes, Alert, Aps, ContentState, LiveActivityEvent, PushPayload};
use liveclass_registry::{
    ActivityToken, AllTokens, CleanupResult, PushToStartToken, RecentRegistration,
    RegisterActivityRequest, RegisterActivityResponse, RegisterApnsRequest, RegisterApnsResponse,
    RegisterPushToStartRequest, RegisterPushToStartResponse, RegistryStats, RemoveDeviceResult,
    TokenCounts, TokenKind,
};
use liveclass_schedule::{Lesson, PeriodSnapshot, PeriodState};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::register_push_to_start_handler,
        handlers::register_activity_handler,
        handlers::register_apns_handler,
        handlers::tokens_handler,
        handlers::stats_handler,
        handlers::cleanup_handler,
        handlers::remove_device_handler,
        handlers::start_handler,
        handlers::update_handler,
        handlers::end_handler,
        handlers::status_handler,
        handlers::health_handler,
    ),
    components(
        schemas(
            RegisterPushToStartRequest,
            RegisterPushToStartResponse,
            RegisterActivityRequest,
            RegisterActivityResponse,
            RegisterApnsRequest,
            RegisterApnsResponse,
            PushToStartToken,
            ActivityToken,
            AllTokens,
            RegistryStats,
            RecentRegistration,
            TokenCounts,
            TokenKind,
            CleanupResult,
            RemoveDeviceResult,
            DispatchSummary,
            HealthResponse,
            PeriodSnapshot,
            PeriodState,
            Lesson,
            PushPayload,
            Aps,
            ContentState,
            ActivityAttributes,
            Alert,
            LiveActivityEvent,
        )
    ),
    tags(
        (name = "Live Activity", description = "Live Activity token registry and push dispatch")
    ),
    servers(
        (url = "/api", description = "LiveClass API server")
    )
)]
pub struct LiveActivityApiDoc;
