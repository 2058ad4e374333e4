//! Storage seam behind [`TokenRegistry`](crate::TokenRegistry).

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::RegistryError;
use crate::models::{ActivityToken, ApnsToken, PushToStartToken, TokenCounts, TokenSnapshot};

/// Key-value storage for the three token kinds.
///
/// Upserts must apply [`TokenRecord::carry_over`](crate::models::TokenRecord::carry_over)
/// against any existing entry under the same key and return the stored value.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Keyed by device id.
    async fn upsert_push_to_start(
        &self,
        token: PushToStartToken,
    ) -> Result<PushToStartToken, RegistryError>;

    /// Keyed by activity id.
    async fn upsert_activity(&self, token: ActivityToken) -> Result<ActivityToken, RegistryError>;

    /// Keyed by device id.
    async fn upsert_apns(&self, token: ApnsToken) -> Result<ApnsToken, RegistryError>;

    async fn snapshot(&self) -> Result<TokenSnapshot, RegistryError>;

    async fn push_to_start_tokens(&self) -> Result<Vec<PushToStartToken>, RegistryError>;

    async fn activity_tokens(&self) -> Result<Vec<ActivityToken>, RegistryError>;

    async fn counts(&self) -> Result<TokenCounts, RegistryError>;

    /// Drops every entry belonging to `device_id`; `true` if anything went.
    async fn remove_device(&self, device_id: &str) -> Result<bool, RegistryError>;

    /// Drops entries whose `last_updated` is before `cutoff`, as one atomic pass.
    async fn remove_updated_before(&self, cutoff: DateTime<Utc>) -> Result<usize, RegistryError>;
}
