// --- File: crates/liveclass_common/src/lib.rs ---

pub mod error; // Error handling
pub mod features; // Feature flag handling
pub mod http; // HTTP utilities
pub mod logging; // Logging utilities

// Re-export error types and utilities for easier access
pub use error::{
    config_error, external_service_error, internal_error, not_ready, storage_error,
    validation_error, HttpStatusCode, LiveClassError,
};

// Re-export HTTP utilities for easier access
pub use http::{client::create_client, IntoHttpResponse};

pub use features::{is_apns_enabled, is_feature_enabled};

pub use logging::{init, init_with_level, log_result};
