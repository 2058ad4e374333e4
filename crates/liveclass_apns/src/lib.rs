//! Live Activity push delivery for LiveClass
//!
//! This crate keeps a population of iOS Live Activities in step with the
//! school day by pushing start, update and end events through the APNs
//! provider API.
//!
//! # Features
//!
//! - ES256 provider tokens, cached and re-signed on an interval
//! - Start, update and end payload builders backed by the period clock and a timetable
//! - Concurrent fan-out with bounded parallelism, per-request timeouts and a batch deadline
//! - Axum routes for registration, dispatch and maintenance
//! - An update ticker that only pushes during school hours
//! - OpenAPI/Swagger documentation (with the `openapi` feature)
//!
//! # Example
//!
//! ```rust,no_run
//! use liveclass_apns::{routes, LiveActivityServiceFactory};
//! use liveclass_config::AppConfig;
//! use std::sync::Arc;
//!
//! fn setup_app() -> Result<axum::Router, liveclass_common::LiveClassError> {
//!     let config = Arc::new(AppConfig::default());
//!     let state = LiveActivityServiceFactory::new(config).build()?;
//!     Ok(routes(Arc::new(state)))
//! }
//! ```
//!
//! # API Endpoints
//!
//! - `POST /live-activity/register-push-to-start`
//! - `POST /live-activity/register-activity`
//! - `POST /live-activity/register-apns`
//! - `GET /live-activity/tokens`, `GET /live-activity/stats`
//! - `POST /live-activity/cleanup`, `DELETE /live-activity/devices/{device_id}`
//! - `POST /live-activity/start`, `POST /live-activity/update`, `POST /live-activity/end`
//! - `GET /live-activity/status`, `GET /live-activity/health`

pub mod auth;
pub mod client;
pub mod dispatcher;
#[cfg(test)]
mod dispatcher_test;
#[cfg(feature = "openapi")]
pub mod doc;
pub mod error;
pub mod handlers;
pub mod payload;
pub mod routes;
pub mod service;
#[cfg(test)]
mod test_support;
pub mod ticker;

pub use auth::{ApnsCredentials, ProviderTokenIssuer};
pub use client::ApnsClient;
pub use dispatcher::{DispatchSummary, Dispatcher};
pub use error::{ApnsError, PayloadError};
pub use handlers::LiveActivityState;
pub use payload::{LiveActivityEvent, PayloadBuilder, PushPayload};
pub use routes::routes;
pub use service::LiveActivityServiceFactory;
pub use ticker::{should_tick, spawn_update_ticker};

#[cfg(feature = "openapi")]
pub mod openapi {
    pub use crate::doc::LiveActivityApiDoc;
}
