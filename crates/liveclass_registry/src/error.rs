//! Error types for the token registry

use liveclass_common::LiveClassError;
use thiserror::Error;

/// Failures of the backing token store.
///
/// The in-memory store never produces these; a persistent backend reports
/// its outages here so callers can tell them apart from delivery failures.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Token store unavailable: {0}")]
    Storage(String),
}

impl From<RegistryError> for LiveClassError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::Storage(msg) => LiveClassError::StorageError(msg),
        }
    }
}
