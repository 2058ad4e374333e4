//! HTTP client for the APNs provider API.

use liveclass_common::create_client;
use reqwest::{header, Client};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::ProviderTokenIssuer;
use crate::error::ApnsError;
use crate::payload::PushPayload;

/// Suffix APNs expects on the topic of Live Activity pushes.
pub const LIVE_ACTIVITY_TOPIC_SUFFIX: &str = ".push-type.liveactivity";

#[derive(Debug, Deserialize)]
struct ApnsErrorBody {
    reason: String,
}

/// Sends single notifications to the gateway.
///
/// One `reqwest::Client` is shared by every send, so connections (HTTP/2 when
/// the gateway negotiates it) are pooled across a batch.
pub struct ApnsClient {
    http: Client,
    gateway_base: String,
    issuer: Arc<ProviderTokenIssuer>,
    request_timeout: Duration,
}

impl ApnsClient {
    pub fn new(
        gateway_base: impl Into<String>,
        issuer: Arc<ProviderTokenIssuer>,
        request_timeout: Duration,
    ) -> Result<Self, ApnsError> {
        let http = create_client(request_timeout.as_secs().max(1), false)
            .map_err(|e| ApnsError::Configuration(format!("cannot build HTTP client: {}", e)))?;
        Ok(Self::with_http_client(
            http,
            gateway_base,
            issuer,
            request_timeout,
        ))
    }

    pub fn with_http_client(
        http: Client,
        gateway_base: impl Into<String>,
        issuer: Arc<ProviderTokenIssuer>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            http,
            gateway_base: gateway_base.into().trim_end_matches('/').to_string(),
            issuer,
            request_timeout,
        }
    }

    pub fn issuer(&self) -> &ProviderTokenIssuer {
        &self.issuer
    }

    pub fn is_ready(&self) -> bool {
        self.issuer.is_ready()
    }

    /// Posts `payload` to one device.
    ///
    /// Succeeds iff the gateway answers 2xx. Any other status becomes
    /// [`ApnsError::Delivery`] carrying the gateway's `reason` (or the raw body).
    pub async fn send_one(
        &self,
        device_token: &str,
        payload: &PushPayload,
        bundle_id: &str,
    ) -> Result<(), ApnsError> {
        let jwt = self.issuer.issue_token()?;
        let url = format!("{}/3/device/{}", self.gateway_base, device_token);

        let response = self
            .http
            .post(&url)
            .timeout(self.request_timeout)
            .header(header::AUTHORIZATION, format!("Bearer {}", jwt))
            .header(
                "apns-topic",
                format!("{}{}", bundle_id, LIVE_ACTIVITY_TOPIC_SUFFIX),
            )
            .header("apns-push-type", "liveactivity")
            .header("apns-priority", "10")
            .header("apns-expiration", "0")
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        let reason = serde_json::from_str::<ApnsErrorBody>(&body)
            .map(|b| b.reason)
            .unwrap_or(body);

        Err(ApnsError::Delivery {
            status: status.as_u16(),
            reason,
        })
    }
}
