//! Runtime feature flag handling.
//!
//! A feature is active only when its `use_*` flag is set *and* its
//! configuration section is present.

use liveclass_config::AppConfig;

/// Check if a feature is enabled at runtime based on configuration.
pub fn is_feature_enabled<T>(use_feature: bool, feature_config: Option<&T>) -> bool {
    use_feature && feature_config.is_some()
}

/// Check if APNs delivery is enabled at runtime.
pub fn is_apns_enabled(config: &AppConfig) -> bool {
    is_feature_enabled(config.use_apns, config.apns.as_ref())
}
