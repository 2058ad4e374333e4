// --- File: crates/liveclass_common/src/error.rs ---
use std::fmt;
use thiserror::Error;

/// The base error type for all LiveClass errors.
///
/// Each crate keeps its own error enum and implements
/// `From<SpecificError> for LiveClassError` so that handlers can render any
/// failure through one response shape.
#[derive(Error, Debug)]
pub enum LiveClassError {
    /// Error occurred during an HTTP request
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Error occurred while parsing data
    #[error("Failed to parse data: {0}")]
    ParseError(String),

    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A subsystem is disabled or lacks the material it needs to run
    #[error("Service not ready: {0}")]
    NotReadyError(String),

    /// Error occurred during validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// The backing token store failed
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Error occurred during external service call
    #[error("External service error: {service_name} - {message}")]
    ExternalServiceError {
        service_name: String,
        message: String,
    },

    /// Error occurred due to a timeout
    #[error("Timeout: {0}")]
    TimeoutError(String),

    /// Error occurred due to an internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for LiveClassError {
    fn status_code(&self) -> u16 {
        match self {
            LiveClassError::HttpError(_) => 502,
            LiveClassError::ParseError(_) => 400,
            LiveClassError::ConfigError(_) => 500,
            LiveClassError::NotReadyError(_) => 503,
            LiveClassError::ValidationError(_) => 400,
            LiveClassError::StorageError(_) => 503,
            LiveClassError::ExternalServiceError { .. } => 502,
            LiveClassError::TimeoutError(_) => 504,
            LiveClassError::InternalError(_) => 500,
        }
    }
}

// Common error conversions
impl From<reqwest::Error> for LiveClassError {
    fn from(err: reqwest::Error) -> Self {
        LiveClassError::HttpError(err.to_string())
    }
}

impl From<serde_json::Error> for LiveClassError {
    fn from(err: serde_json::Error) -> Self {
        LiveClassError::ParseError(err.to_string())
    }
}

// Utility functions for error handling
pub fn config_error<T: fmt::Display>(message: T) -> LiveClassError {
    LiveClassError::ConfigError(message.to_string())
}

pub fn not_ready<T: fmt::Display>(message: T) -> LiveClassError {
    LiveClassError::NotReadyError(message.to_string())
}

pub fn validation_error<T: fmt::Display>(message: T) -> LiveClassError {
    LiveClassError::ValidationError(message.to_string())
}

pub fn storage_error<T: fmt::Display>(message: T) -> LiveClassError {
    LiveClassError::StorageError(message.to_string())
}

pub fn external_service_error<T: fmt::Display>(service_name: &str, message: T) -> LiveClassError {
    LiveClassError::ExternalServiceError {
        service_name: service_name.to_string(),
        message: message.to_string(),
    }
}

pub fn internal_error<T: fmt::Display>(message: T) -> LiveClassError {
    LiveClassError::InternalError(message.to_string())
}
