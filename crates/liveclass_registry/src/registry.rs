//! The registry service in front of a [`TokenStore`].

use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::RegistryError;
use crate::memory::InMemoryTokenStore;
use crate::models::{
    ActivityToken, AllTokens, ApnsToken, PushToStartToken, RecentRegistration,
    RegisterActivityRequest, RegisterActivityResponse, RegisterApnsRequest, RegisterApnsResponse,
    RegisterPushToStartRequest, RegisterPushToStartResponse, RegistryStats, TokenCounts, TokenKind,
};
use crate::store::TokenStore;

const RECENT_LIMIT: usize = 10;

/// Registration, lookup and expiry of device push tokens.
#[derive(Clone)]
pub struct TokenRegistry {
    store: Arc<dyn TokenStore>,
}

impl Default for TokenRegistry {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl TokenRegistry {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryTokenStore::new()))
    }

    pub async fn register_push_to_start(
        &self,
        request: RegisterPushToStartRequest,
    ) -> Result<RegisterPushToStartResponse, RegistryError> {
        self.register_push_to_start_at(request, Utc::now()).await
    }

    /// Upserts by device id. Re-registration replaces the token but keeps the
    /// entry's id and first registration time.
    pub async fn register_push_to_start_at(
        &self,
        request: RegisterPushToStartRequest,
        now: DateTime<Utc>,
    ) -> Result<RegisterPushToStartResponse, RegistryError> {
        debug!(
            device_id = %request.device_id,
            grade = ?request.grade,
            class_number = ?request.class_number,
            client_timestamp = ?request.timestamp,
            "registering push-to-start token"
        );

        let stored = self
            .store
            .upsert_push_to_start(PushToStartToken {
                id: Uuid::new_v4(),
                token: request.token,
                device_id: request.device_id,
                bundle_id: request.bundle_id,
                grade: request.grade,
                class_number: request.class_number,
                registered_at: now,
                last_updated: now,
            })
            .await?;

        Ok(RegisterPushToStartResponse {
            token_id: stored.id,
            grade: stored.grade,
            class_number: stored.class_number,
            registered_at: stored.registered_at,
        })
    }

    pub async fn register_activity(
        &self,
        request: RegisterActivityRequest,
    ) -> Result<RegisterActivityResponse, RegistryError> {
        self.register_activity_at(request, Utc::now()).await
    }

    /// Upserts by activity id.
    pub async fn register_activity_at(
        &self,
        request: RegisterActivityRequest,
        now: DateTime<Utc>,
    ) -> Result<RegisterActivityResponse, RegistryError> {
        debug!(
            device_id = %request.device_id,
            activity_id = %request.activity_id,
            client_timestamp = ?request.timestamp,
            "registering activity token"
        );

        let stored = self
            .store
            .upsert_activity(ActivityToken {
                id: Uuid::new_v4(),
                token: request.token,
                activity_id: request.activity_id,
                device_id: request.device_id,
                bundle_id: request.bundle_id,
                grade: request.grade,
                class_number: request.class_number,
                registered_at: now,
                last_updated: now,
            })
            .await?;

        Ok(RegisterActivityResponse {
            token_id: stored.id,
            activity_id: stored.activity_id,
            grade: stored.grade,
            class_number: stored.class_number,
            registered_at: stored.registered_at,
        })
    }

    pub async fn register_apns(
        &self,
        request: RegisterApnsRequest,
    ) -> Result<RegisterApnsResponse, RegistryError> {
        self.register_apns_at(request, Utc::now()).await
    }

    pub async fn register_apns_at(
        &self,
        request: RegisterApnsRequest,
        now: DateTime<Utc>,
    ) -> Result<RegisterApnsResponse, RegistryError> {
        debug!(
            device_id = %request.device_id,
            client_timestamp = ?request.timestamp,
            "registering APNs token"
        );

        let stored = self
            .store
            .upsert_apns(ApnsToken {
                id: Uuid::new_v4(),
                token: request.token,
                device_id: request.device_id,
                bundle_id: request.bundle_id,
                registered_at: now,
                last_updated: now,
            })
            .await?;

        Ok(RegisterApnsResponse {
            token_id: stored.id,
            registered_at: stored.registered_at,
        })
    }

    pub async fn all_push_to_start_tokens(&self) -> Result<Vec<PushToStartToken>, RegistryError> {
        self.store.push_to_start_tokens().await
    }

    pub async fn all_activity_tokens(&self) -> Result<Vec<ActivityToken>, RegistryError> {
        self.store.activity_tokens().await
    }

    pub async fn all_tokens(&self) -> Result<AllTokens, RegistryError> {
        let snapshot = self.store.snapshot().await?;

        let total_devices = snapshot
            .push_to_start
            .iter()
            .map(|t| t.device_id.as_str())
            .chain(snapshot.activity.iter().map(|t| t.device_id.as_str()))
            .chain(snapshot.apns.iter().map(|t| t.device_id.as_str()))
            .collect::<HashSet<_>>()
            .len();

        Ok(AllTokens {
            push_to_start_tokens: snapshot.push_to_start,
            activity_tokens: snapshot.activity,
            total_devices,
        })
    }

    /// Removes the device's push-to-start and APNs entries and every activity
    /// entry it registered.
    pub async fn remove_device_tokens(&self, device_id: &str) -> Result<bool, RegistryError> {
        let removed = self.store.remove_device(device_id).await?;
        info!(device_id, removed, "device tokens removed");
        Ok(removed)
    }

    pub async fn stats(&self) -> Result<RegistryStats, RegistryError> {
        let snapshot = self.store.snapshot().await?;
        let counts = TokenCounts {
            push_to_start: snapshot.push_to_start.len(),
            activity: snapshot.activity.len(),
            apns: snapshot.apns.len(),
        };

        let mut recent: Vec<RecentRegistration> = snapshot
            .push_to_start
            .into_iter()
            .map(|t| RecentRegistration {
                kind: TokenKind::PushToStart,
                device_id: t.device_id,
                activity_id: None,
                grade: t.grade,
                class_number: t.class_number,
                last_updated: t.last_updated,
            })
            .chain(snapshot.activity.into_iter().map(|t| RecentRegistration {
                kind: TokenKind::Activity,
                device_id: t.device_id,
                activity_id: Some(t.activity_id),
                grade: t.grade,
                class_number: t.class_number,
                last_updated: t.last_updated,
            }))
            .chain(snapshot.apns.into_iter().map(|t| RecentRegistration {
                kind: TokenKind::Apns,
                device_id: t.device_id,
                activity_id: None,
                grade: None,
                class_number: None,
                last_updated: t.last_updated,
            }))
            .collect();

        recent.sort_by(|a, b| b.last_updated.cmp(&a.last_updated));
        let last_updated = recent.first().map(|r| r.last_updated);
        recent.truncate(RECENT_LIMIT);

        Ok(RegistryStats {
            counts,
            recent_registrations: recent,
            last_updated,
        })
    }

    pub async fn counts(&self) -> Result<TokenCounts, RegistryError> {
        self.store.counts().await
    }

    /// Removes every entry not updated within `ttl`.
    pub async fn sweep(&self, ttl: Duration) -> Result<usize, RegistryError> {
        self.sweep_at(ttl, Utc::now()).await
    }

    /// Entries exactly `ttl` old survive; anything older goes.
    pub async fn sweep_at(&self, ttl: Duration, now: DateTime<Utc>) -> Result<usize, RegistryError> {
        let removed = self.store.remove_updated_before(now - ttl).await?;
        if removed > 0 {
            info!(removed, ttl_days = ttl.num_days(), "expired tokens swept");
        } else {
            debug!("token sweep found nothing to expire");
        }
        Ok(removed)
    }
}
