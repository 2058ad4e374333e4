//! Token records and the registration request/response bodies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Shared behaviour of the three stored token kinds.
pub trait TokenRecord: Clone + Send + Sync {
    fn device_id(&self) -> &str;

    fn last_updated(&self) -> DateTime<Utc>;

    /// Keeps identity and first-registration time from an earlier entry
    /// under the same key, and never lets `last_updated` move backwards.
    fn carry_over(&mut self, previous: &Self);
}

macro_rules! impl_token_record {
    ($ty:ty) => {
        impl TokenRecord for $ty {
            fn device_id(&self) -> &str {
                &self.device_id
            }

            fn last_updated(&self) -> DateTime<Utc> {
                self.last_updated
            }

            fn carry_over(&mut self, previous: &Self) {
                self.id = previous.id;
                self.registered_at = previous.registered_at;
                self.last_updated = self.last_updated.max(previous.last_updated);
            }
        }
    };
}

/// Authorizes a remote start of a new Live Activity. One per device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct PushToStartToken {
    pub id: Uuid,
    pub token: String,
    pub device_id: String,
    pub bundle_id: String,
    pub grade: Option<u32>,
    pub class_number: Option<u32>,
    pub registered_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

/// Authorizes updates to, and the end of, one running activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ActivityToken {
    pub id: Uuid,
    pub token: String,
    pub activity_id: String,
    pub device_id: String,
    pub bundle_id: String,
    pub grade: Option<u32>,
    pub class_number: Option<u32>,
    pub registered_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

/// A plain remote-notification device token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ApnsToken {
    pub id: Uuid,
    pub token: String,
    pub device_id: String,
    pub bundle_id: String,
    pub registered_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl_token_record!(PushToStartToken);
impl_token_record!(ActivityToken);
impl_token_record!(ApnsToken);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub enum TokenKind {
    PushToStart,
    Activity,
    Apns,
}

// --- Requests ---

#[derive(Debug, Clone, Deserialize, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct RegisterPushToStartRequest {
    pub token: String,
    pub device_id: String,
    pub bundle_id: String,
    /// Client clock at registration, epoch seconds. Informational only.
    #[serde(default)]
    pub timestamp: Option<f64>,
    #[serde(default)]
    pub grade: Option<u32>,
    #[serde(default)]
    pub class_number: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct RegisterActivityRequest {
    pub token: String,
    pub activity_id: String,
    pub device_id: String,
    pub bundle_id: String,
    #[serde(default)]
    pub timestamp: Option<f64>,
    #[serde(default)]
    pub grade: Option<u32>,
    #[serde(default)]
    pub class_number: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct RegisterApnsRequest {
    pub token: String,
    pub device_id: String,
    pub bundle_id: String,
    #[serde(default)]
    pub timestamp: Option<f64>,
}

// --- Responses ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct RegisterPushToStartResponse {
    pub token_id: Uuid,
    pub grade: Option<u32>,
    pub class_number: Option<u32>,
    pub registered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct RegisterActivityResponse {
    pub token_id: Uuid,
    pub activity_id: String,
    pub grade: Option<u32>,
    pub class_number: Option<u32>,
    pub registered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct RegisterApnsResponse {
    pub token_id: Uuid,
    pub registered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AllTokens {
    pub push_to_start_tokens: Vec<PushToStartToken>,
    pub activity_tokens: Vec<ActivityToken>,
    /// Distinct device ids across every token kind.
    pub total_devices: usize,
}

/// Point-in-time copy of all three maps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenSnapshot {
    pub push_to_start: Vec<PushToStartToken>,
    pub activity: Vec<ActivityToken>,
    pub apns: Vec<ApnsToken>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct RecentRegistration {
    pub kind: TokenKind,
    pub device_id: String,
    pub activity_id: Option<String>,
    pub grade: Option<u32>,
    pub class_number: Option<u32>,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct TokenCounts {
    pub push_to_start: usize,
    pub activity: usize,
    pub apns: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct RegistryStats {
    pub counts: TokenCounts,
    /// Up to ten entries, most recently updated first.
    pub recent_registrations: Vec<RecentRegistration>,
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CleanupResult {
    pub removed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct RemoveDeviceResult {
    pub removed: bool,
}
