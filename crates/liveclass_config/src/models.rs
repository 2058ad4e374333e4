// --- File: crates/liveclass_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Which APNs host the provider talks to.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ApnsEnvironment {
    #[default]
    Production,
    Sandbox,
}

impl ApnsEnvironment {
    pub fn gateway_base(&self) -> &'static str {
        match self {
            ApnsEnvironment::Production => "https://api.push.apple.com",
            ApnsEnvironment::Sandbox => "https://api.sandbox.push.apple.com",
        }
    }
}

// --- APNs Config ---
// Signing material is usually injected with "secret_from_env":
// LIVECLASS_SECRET_APNS_PRIVATE_KEY / APNS_PRIVATE_KEY
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ApnsConfig {
    pub team_id: Option<String>,
    pub key_id: Option<String>,
    /// PEM contents of the .p8 signing key.
    pub private_key: Option<String>,
    /// Path to the .p8 signing key, used when `private_key` is absent.
    pub private_key_path: Option<String>,
    pub bundle_id: String,
    #[serde(default)]
    pub environment: ApnsEnvironment,
    /// Overrides the environment-derived host, e.g. for a local gateway stub.
    pub gateway_base: Option<String>,
}

impl ApnsConfig {
    pub fn resolved_gateway_base(&self) -> String {
        self.gateway_base
            .clone()
            .unwrap_or_else(|| self.environment.gateway_base().to_string())
    }
}

// --- Dispatch Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DispatchConfig {
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Whole-batch deadline; sends still outstanding when it passes count as failed.
    #[serde(default)]
    pub batch_deadline_secs: Option<u64>,
    /// How long a signed provider token is reused before re-signing.
    #[serde(default = "default_token_refresh_secs")]
    pub token_refresh_secs: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            request_timeout_secs: default_request_timeout_secs(),
            batch_deadline_secs: None,
            token_refresh_secs: default_token_refresh_secs(),
        }
    }
}

fn default_max_concurrency() -> usize {
    64
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_token_refresh_secs() -> u64 {
    55 * 60
}

// --- Registry Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RegistryConfig {
    #[serde(default = "default_token_ttl_days")]
    pub token_ttl_days: i64,
    #[serde(default = "default_cleanup_interval_secs")]
    pub cleanup_interval_secs: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            token_ttl_days: default_token_ttl_days(),
            cleanup_interval_secs: default_cleanup_interval_secs(),
        }
    }
}

fn default_token_ttl_days() -> i64 {
    30
}

fn default_cleanup_interval_secs() -> u64 {
    3600
}

/// A single bell-to-bell period, times as "HH:MM".
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct PeriodTimeConfig {
    pub start: String,
    pub end: String,
}

// --- School Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SchoolConfig {
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Seven periods; the built-in bell schedule is used when empty.
    #[serde(default)]
    pub periods: Vec<PeriodTimeConfig>,
    pub lunch_start: Option<String>,
    pub lunch_end: Option<String>,
    /// Interval of the automatic update fan-out; disabled when absent.
    pub update_interval_secs: Option<u64>,
    /// JSON timetable consumed by the schedule resolver.
    pub schedule_path: Option<String>,
}

impl Default for SchoolConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            periods: Vec::new(),
            lunch_start: None,
            lunch_end: None,
            update_interval_secs: None,
            schedule_path: None,
        }
    }
}

fn default_timezone() -> String {
    "Asia/Seoul".to_string()
}

// --- Live Activity presentation ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LiveActivityConfig {
    #[serde(default = "default_attributes_type")]
    pub attributes_type: String,
    #[serde(default = "default_alert_title")]
    pub alert_title: String,
    #[serde(default = "default_alert_body")]
    pub alert_body: String,
    #[serde(default = "default_dismissal_delay_secs")]
    pub dismissal_delay_secs: i64,
}

impl Default for LiveActivityConfig {
    fn default() -> Self {
        Self {
            attributes_type: default_attributes_type(),
            alert_title: default_alert_title(),
            alert_body: default_alert_body(),
            dismissal_delay_secs: default_dismissal_delay_secs(),
        }
    }
}

fn default_attributes_type() -> String {
    "ClassActivityAttributes".to_string()
}

fn default_alert_title() -> String {
    "Class schedule".to_string()
}

fn default_alert_body() -> String {
    "Today's classes are now live".to_string()
}

fn default_dismissal_delay_secs() -> i64 {
    15 * 60
}

// --- Unified App Configuration ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    // Server config is mandatory
    pub server: ServerConfig,

    // --- Runtime Flags (optional in config file, default to false) ---
    #[serde(default)]
    pub use_apns: bool,

    // --- Optional Feature Configurations ---
    #[serde(default)]
    pub apns: Option<ApnsConfig>,

    // --- Sections with defaults ---
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub school: SchoolConfig,
    #[serde(default)]
    pub live_activity: LiveActivityConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            use_apns: false,
            apns: None,
            dispatch: DispatchConfig::default(),
            registry: RegistryConfig::default(),
            school: SchoolConfig::default(),
            live_activity: LiveActivityConfig::default(),
        }
    }
}
