//! Error types for APNs delivery and payload construction

use liveclass_common::{external_service_error, internal_error, LiveClassError};
use liveclass_registry::RegistryError;
use thiserror::Error;

/// Errors that can occur while talking to the APNs gateway
#[derive(Error, Debug)]
pub enum ApnsError {
    /// Signing material or identifiers are missing; the subsystem is not ready
    #[error("APNs not configured: {0}")]
    Configuration(String),

    /// The provider token could not be signed
    #[error("Failed to sign provider token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    /// The gateway answered with a non-2xx status
    #[error("APNs rejected the notification ({status}): {reason}")]
    Delivery { status: u16, reason: String },

    /// The request never reached the gateway
    #[error("APNs transport error: {0}")]
    Transport(String),

    /// No answer before the per-request timeout or batch deadline
    #[error("APNs request timed out")]
    Timeout,

    /// The payload for a device could not be built
    #[error(transparent)]
    Payload(#[from] PayloadError),

    /// Reading the token registry failed
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl From<reqwest::Error> for ApnsError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApnsError::Timeout
        } else {
            ApnsError::Transport(err.to_string())
        }
    }
}

impl From<ApnsError> for LiveClassError {
    fn from(err: ApnsError) -> Self {
        match err {
            ApnsError::Configuration(msg) => LiveClassError::NotReadyError(msg),
            ApnsError::Signing(e) => internal_error(e),
            e @ ApnsError::Delivery { .. } => external_service_error("APNs", e),
            ApnsError::Transport(msg) => LiveClassError::HttpError(msg),
            ApnsError::Timeout => LiveClassError::TimeoutError("APNs request".to_string()),
            ApnsError::Payload(e) => e.into(),
            ApnsError::Registry(e) => e.into(),
        }
    }
}

/// Errors raised while building a payload for one device
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PayloadError {
    #[error("Missing identifier: {0}")]
    MissingIdentifier(&'static str),
}

impl From<PayloadError> for LiveClassError {
    fn from(err: PayloadError) -> Self {
        LiveClassError::ValidationError(err.to_string())
    }
}
