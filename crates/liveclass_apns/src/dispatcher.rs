//! Concurrent fan-out of Live Activity pushes.
//!
//! Every batch resolves to exactly one outcome per token, so
//! `sent + failed == total` always holds. Sends run at most
//! `max_concurrency` at a time; a batch deadline turns every send still
//! outstanding when it passes into a failure.

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use liveclass_config::DispatchConfig;
use liveclass_registry::TokenRegistry;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::client::ApnsClient;
use crate::error::{ApnsError, PayloadError};
use crate::payload::{DeviceContext, LiveActivityEvent, PayloadBuilder, PushPayload};

/// Aggregate outcome of one fan-out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DispatchSummary {
    pub sent: usize,
    pub failed: usize,
    pub total: usize,
}

struct Delivery {
    device_id: String,
    token: String,
    bundle_id: String,
    payload: Result<Arc<PushPayload>, PayloadError>,
}

fn short(token: &str) -> &str {
    token.get(..8).unwrap_or(token)
}

pub struct Dispatcher {
    registry: TokenRegistry,
    client: Arc<ApnsClient>,
    builder: Arc<PayloadBuilder>,
    max_concurrency: usize,
    batch_deadline: Option<Duration>,
}

impl Dispatcher {
    pub fn new(
        registry: TokenRegistry,
        client: Arc<ApnsClient>,
        builder: Arc<PayloadBuilder>,
        config: &DispatchConfig,
    ) -> Self {
        Self {
            registry,
            client,
            builder,
            max_concurrency: config.max_concurrency.max(1),
            batch_deadline: config.batch_deadline_secs.map(Duration::from_secs),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.client.is_ready()
    }

    pub fn not_ready_reason(&self) -> Option<&str> {
        self.client.issuer().not_ready_reason()
    }

    pub fn builder(&self) -> &PayloadBuilder {
        &self.builder
    }

    fn default_deadline(&self) -> Option<Instant> {
        self.batch_deadline.map(|d| Instant::now() + d)
    }

    pub async fn fan_out_start(&self) -> Result<DispatchSummary, ApnsError> {
        self.fan_out(LiveActivityEvent::Start, self.default_deadline())
            .await
    }

    pub async fn fan_out_update(&self) -> Result<DispatchSummary, ApnsError> {
        self.fan_out(LiveActivityEvent::Update, self.default_deadline())
            .await
    }

    pub async fn fan_out_end(&self) -> Result<DispatchSummary, ApnsError> {
        self.fan_out(LiveActivityEvent::End, self.default_deadline())
            .await
    }

    /// Runs one batch. Fails as a whole only when the authenticator is not
    /// ready or the registry cannot be read; individual sends never abort it.
    pub async fn fan_out(
        &self,
        event: LiveActivityEvent,
        deadline: Option<Instant>,
    ) -> Result<DispatchSummary, ApnsError> {
        // Fail fast before touching the registry or the network.
        self.client.issuer().issue_token()?;

        let now = Utc::now();
        let deliveries = self.collect(event, now).await?;
        if deliveries.is_empty() {
            info!(?event, "no tokens registered; nothing to send");
            return Ok(DispatchSummary::default());
        }

        let summary = self.deliver(deliveries, deadline).await;
        info!(
            ?event,
            sent = summary.sent,
            failed = summary.failed,
            total = summary.total,
            "live activity fan-out finished"
        );
        Ok(summary)
    }

    async fn collect(
        &self,
        event: LiveActivityEvent,
        now: DateTime<Utc>,
    ) -> Result<Vec<Delivery>, ApnsError> {
        let deliveries = match event {
            LiveActivityEvent::Start => {
                let tokens = self.registry.all_push_to_start_tokens().await?;
                let payload = Arc::new(self.builder.build_start(now));
                tokens
                    .into_iter()
                    .map(|t| Delivery {
                        device_id: t.device_id,
                        token: t.token,
                        bundle_id: t.bundle_id,
                        payload: Ok(payload.clone()),
                    })
                    .collect()
            }
            LiveActivityEvent::Update => self
                .registry
                .all_tokens()
                .await?
                .activity_tokens
                .into_iter()
                .map(|t| {
                    let payload = self
                        .builder
                        .build_update(
                            &DeviceContext {
                                token: &t.token,
                                bundle_id: &t.bundle_id,
                                grade: t.grade,
                                class_number: t.class_number,
                            },
                            now,
                        )
                        .map(Arc::new);
                    Delivery {
                        device_id: t.device_id,
                        token: t.token,
                        bundle_id: t.bundle_id,
                        payload,
                    }
                })
                .collect(),
            LiveActivityEvent::End => {
                let tokens = self.registry.all_tokens().await?.activity_tokens;
                let payload = Arc::new(self.builder.build_end(now));
                tokens
                    .into_iter()
                    .map(|t| Delivery {
                        device_id: t.device_id,
                        token: t.token,
                        bundle_id: t.bundle_id,
                        payload: Ok(payload.clone()),
                    })
                    .collect()
            }
        };
        Ok(deliveries)
    }

    async fn deliver(&self, deliveries: Vec<Delivery>, deadline: Option<Instant>) -> DispatchSummary {
        let total = deliveries.len();

        stream::iter(deliveries)
            .map(|delivery| async move {
                let send = self.send(&delivery);
                let result = match deadline {
                    Some(deadline) => tokio::time::timeout_at(deadline, send)
                        .await
                        .unwrap_or(Err(ApnsError::Timeout)),
                    None => send.await,
                };
                if let Err(e) = &result {
                    warn!(
                        device_id = %delivery.device_id,
                        token = %short(&delivery.token),
                        error = %e,
                        "live activity push failed"
                    );
                }
                result.is_ok()
            })
            .buffer_unordered(self.max_concurrency)
            .fold(
                DispatchSummary {
                    total,
                    ..Default::default()
                },
                |mut summary, ok| async move {
                    if ok {
                        summary.sent += 1;
                    } else {
                        summary.failed += 1;
                    }
                    summary
                },
            )
            .await
    }

    async fn send(&self, delivery: &Delivery) -> Result<(), ApnsError> {
        let payload = delivery.payload.as_ref().map_err(|e| e.clone())?;
        self.client
            .send_one(&delivery.token, payload, &delivery.bundle_id)
            .await
    }
}
