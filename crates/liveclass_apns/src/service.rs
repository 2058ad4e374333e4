//! Wiring of the Live Activity subsystem from configuration.

use chrono::Duration;
use liveclass_common::{config_error, is_apns_enabled, LiveClassError};
use liveclass_config::AppConfig;
use liveclass_registry::TokenRegistry;
use liveclass_schedule::{PeriodClock, ScheduleResolver, StaticScheduleResolver};
use std::sync::Arc;
use tracing::{info, warn};

use crate::auth::ProviderTokenIssuer;
use crate::client::ApnsClient;
use crate::dispatcher::Dispatcher;
use crate::handlers::LiveActivityState;
use crate::payload::PayloadBuilder;

/// Builds the shared [`LiveActivityState`] from an [`AppConfig`].
pub struct LiveActivityServiceFactory {
    config: Arc<AppConfig>,
}

impl LiveActivityServiceFactory {
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self { config }
    }

    /// The timetable named by `school.schedule_path`, or an empty one when no
    /// path is set or the file cannot be loaded.
    pub fn resolver(&self) -> Arc<dyn ScheduleResolver> {
        match self.config.school.schedule_path.as_deref() {
            Some(path) => match StaticScheduleResolver::from_path(path) {
                Ok(resolver) => Arc::new(resolver),
                Err(e) => {
                    warn!(path, "timetable unavailable, using placeholders: {}", e);
                    Arc::new(StaticScheduleResolver::empty())
                }
            },
            None => Arc::new(StaticScheduleResolver::empty()),
        }
    }

    pub fn issuer(&self) -> ProviderTokenIssuer {
        let apns = is_apns_enabled(&self.config)
            .then_some(self.config.apns.as_ref())
            .flatten();
        ProviderTokenIssuer::from_config(apns, &self.config.dispatch)
    }

    pub fn build(&self) -> Result<LiveActivityState, LiveClassError> {
        self.build_with(TokenRegistry::in_memory(), self.resolver())
    }

    /// Builds the state around an existing registry and resolver.
    pub fn build_with(
        &self,
        registry: TokenRegistry,
        resolver: Arc<dyn ScheduleResolver>,
    ) -> Result<LiveActivityState, LiveClassError> {
        let clock = Arc::new(PeriodClock::from_config(&self.config.school).map_err(config_error)?);

        let gateway_base = self
            .config
            .apns
            .as_ref()
            .map(|apns| apns.resolved_gateway_base())
            .unwrap_or_else(|| liveclass_config::ApnsEnvironment::default().gateway_base().to_string());

        let client = ApnsClient::new(
            gateway_base,
            Arc::new(self.issuer()),
            std::time::Duration::from_secs(self.config.dispatch.request_timeout_secs),
        )?;

        let builder = PayloadBuilder::new(
            clock.clone(),
            resolver,
            self.config.live_activity.clone(),
        );

        let dispatcher = Dispatcher::new(
            registry.clone(),
            Arc::new(client),
            Arc::new(builder),
            &self.config.dispatch,
        );

        info!(
            ready = dispatcher.is_ready(),
            timezone = %clock.timezone(),
            "live activity service initialized"
        );

        Ok(LiveActivityState {
            registry,
            dispatcher: Arc::new(dispatcher),
            clock,
            token_ttl: Duration::days(self.config.registry.token_ttl_days),
        })
    }
}
