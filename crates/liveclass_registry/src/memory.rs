use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::RegistryError;
use crate::models::{
    ActivityToken, ApnsToken, PushToStartToken, TokenCounts, TokenRecord, TokenSnapshot,
};
use crate::store::TokenStore;

#[derive(Default)]
struct Maps {
    push_to_start: HashMap<String, PushToStartToken>,
    activity: HashMap<String, ActivityToken>,
    apns: HashMap<String, ApnsToken>,
}

/// In-memory implementation of TokenStore.
///
/// All three maps sit behind one lock so sweeps and removals see a
/// consistent view across token kinds.
#[derive(Clone, Default)]
pub struct InMemoryTokenStore {
    maps: Arc<RwLock<Maps>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn upsert<T: TokenRecord>(map: &mut HashMap<String, T>, key: String, mut record: T) -> T {
    if let Some(previous) = map.get(&key) {
        record.carry_over(previous);
    }
    map.insert(key, record.clone());
    record
}

fn sorted_values<T: TokenRecord>(map: &HashMap<String, T>) -> Vec<T> {
    let mut values: Vec<T> = map.values().cloned().collect();
    values.sort_by(|a, b| {
        a.last_updated()
            .cmp(&b.last_updated())
            .then_with(|| a.device_id().cmp(b.device_id()))
    });
    values
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn upsert_push_to_start(
        &self,
        token: PushToStartToken,
    ) -> Result<PushToStartToken, RegistryError> {
        let mut maps = self.maps.write().await;
        Ok(upsert(&mut maps.push_to_start, token.device_id.clone(), token))
    }

    async fn upsert_activity(&self, token: ActivityToken) -> Result<ActivityToken, RegistryError> {
        let mut maps = self.maps.write().await;
        Ok(upsert(&mut maps.activity, token.activity_id.clone(), token))
    }

    async fn upsert_apns(&self, token: ApnsToken) -> Result<ApnsToken, RegistryError> {
        let mut maps = self.maps.write().await;
        Ok(upsert(&mut maps.apns, token.device_id.clone(), token))
    }

    async fn snapshot(&self) -> Result<TokenSnapshot, RegistryError> {
        let maps = self.maps.read().await;
        Ok(TokenSnapshot {
            push_to_start: sorted_values(&maps.push_to_start),
            activity: sorted_values(&maps.activity),
            apns: sorted_values(&maps.apns),
        })
    }

    async fn push_to_start_tokens(&self) -> Result<Vec<PushToStartToken>, RegistryError> {
        let maps = self.maps.read().await;
        Ok(sorted_values(&maps.push_to_start))
    }

    async fn activity_tokens(&self) -> Result<Vec<ActivityToken>, RegistryError> {
        let maps = self.maps.read().await;
        Ok(sorted_values(&maps.activity))
    }

    async fn counts(&self) -> Result<TokenCounts, RegistryError> {
        let maps = self.maps.read().await;
        Ok(TokenCounts {
            push_to_start: maps.push_to_start.len(),
            activity: maps.activity.len(),
            apns: maps.apns.len(),
        })
    }

    async fn remove_device(&self, device_id: &str) -> Result<bool, RegistryError> {
        let mut maps = self.maps.write().await;
        let mut removed = maps.push_to_start.remove(device_id).is_some();
        removed |= maps.apns.remove(device_id).is_some();

        let before = maps.activity.len();
        maps.activity.retain(|_, t| t.device_id != device_id);
        removed |= maps.activity.len() != before;

        Ok(removed)
    }

    async fn remove_updated_before(&self, cutoff: DateTime<Utc>) -> Result<usize, RegistryError> {
        let mut maps = self.maps.write().await;
        let before = maps.push_to_start.len() + maps.activity.len() + maps.apns.len();

        maps.push_to_start.retain(|_, t| t.last_updated >= cutoff);
        maps.activity.retain(|_, t| t.last_updated >= cutoff);
        maps.apns.retain(|_, t| t.last_updated >= cutoff);

        let after = maps.push_to_start.len() + maps.activity.len() + maps.apns.len();
        Ok(before - after)
    }
}
