//! Live Activity push payloads.
//!
//! Three shapes share one `aps` envelope:
//!
//! - `start`: alert plus attributes, no content-state (the device computes its
//!   own first state)
//! - `update`: a per-device content-state snapshot
//! - `end`: an after-school content-state plus a dismissal date

use chrono::{DateTime, Duration, Utc};
use liveclass_config::LiveActivityConfig;
use liveclass_schedule::{Lesson, PeriodClock, PeriodState, ScheduleResolver, PERIOD_COUNT};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::PayloadError;

/// Value of the `attributes.activityKind` field on start payloads.
pub const ACTIVITY_KIND: &str = "classSchedule";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum LiveActivityEvent {
    Start,
    Update,
    End,
}

/// What the activity displays right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ContentState {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_class: Option<Lesson>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_class: Option<Lesson>,
    pub start_epoch: i64,
    pub end_epoch: i64,
    pub last_updated_epoch: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ActivityAttributes {
    pub activity_kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Alert {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "kebab-case")]
pub struct Aps {
    pub timestamp: i64,
    pub event: LiveActivityEvent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_state: Option<ContentState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<ActivityAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert: Option<Alert>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dismissal_date: Option<i64>,
}

/// Body of one APNs request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PushPayload {
    pub aps: Aps,
}

impl PushPayload {
    pub fn event(&self) -> LiveActivityEvent {
        self.aps.event
    }
}

/// The addressing and class data of one activity token.
#[derive(Debug, Clone, Copy)]
pub struct DeviceContext<'a> {
    pub token: &'a str,
    pub bundle_id: &'a str,
    pub grade: Option<u32>,
    pub class_number: Option<u32>,
}

/// Builds payloads from the period clock and the timetable.
pub struct PayloadBuilder {
    clock: Arc<PeriodClock>,
    resolver: Arc<dyn ScheduleResolver>,
    settings: LiveActivityConfig,
}

impl PayloadBuilder {
    pub fn new(
        clock: Arc<PeriodClock>,
        resolver: Arc<dyn ScheduleResolver>,
        settings: LiveActivityConfig,
    ) -> Self {
        Self {
            clock,
            resolver,
            settings,
        }
    }

    pub fn clock(&self) -> &PeriodClock {
        &self.clock
    }

    pub fn build_start(&self, now: DateTime<Utc>) -> PushPayload {
        PushPayload {
            aps: Aps {
                timestamp: now.timestamp(),
                event: LiveActivityEvent::Start,
                content_state: None,
                attributes_type: Some(self.settings.attributes_type.clone()),
                attributes: Some(ActivityAttributes {
                    activity_kind: ACTIVITY_KIND.to_string(),
                }),
                alert: Some(Alert {
                    title: self.settings.alert_title.clone(),
                    body: self.settings.alert_body.clone(),
                }),
                dismissal_date: None,
            },
        }
    }

    /// Per-device update. Unknown lessons become placeholders; only a missing
    /// token or bundle id is an error.
    pub fn build_update(
        &self,
        device: &DeviceContext<'_>,
        now: DateTime<Utc>,
    ) -> Result<PushPayload, PayloadError> {
        if device.token.trim().is_empty() {
            return Err(PayloadError::MissingIdentifier("token"));
        }
        if device.bundle_id.trim().is_empty() {
            return Err(PayloadError::MissingIdentifier("bundleId"));
        }

        let snapshot = self.clock.snapshot(now);
        let lesson = |period: u8| self.lesson_or_placeholder(device, snapshot.weekday_index, period);

        let (current_class, next_class) = match snapshot.state {
            PeriodState::InClass(p) => {
                let next = (usize::from(p) < PERIOD_COUNT).then(|| lesson(p + 1));
                (Some(lesson(p)), next)
            }
            PeriodState::PreClass(p) | PeriodState::BreakTime(p) => (None, Some(lesson(p))),
            PeriodState::LunchTime | PeriodState::BeforeSchool | PeriodState::AfterSchool => {
                (None, None)
            }
        };

        Ok(PushPayload {
            aps: Aps {
                timestamp: now.timestamp(),
                event: LiveActivityEvent::Update,
                content_state: Some(ContentState {
                    status: snapshot.state.status_name().to_string(),
                    current_class,
                    next_class,
                    start_epoch: snapshot.start_epoch,
                    end_epoch: snapshot.end_epoch,
                    last_updated_epoch: now.timestamp(),
                }),
                attributes_type: None,
                attributes: None,
                alert: None,
                dismissal_date: None,
            },
        })
    }

    pub fn build_end(&self, now: DateTime<Utc>) -> PushPayload {
        let window = self.clock.after_school_window(now);
        PushPayload {
            aps: Aps {
                timestamp: now.timestamp(),
                event: LiveActivityEvent::End,
                content_state: Some(ContentState {
                    status: PeriodState::AfterSchool.status_name().to_string(),
                    current_class: None,
                    next_class: None,
                    start_epoch: window.start_epoch(),
                    end_epoch: window.end_epoch(),
                    last_updated_epoch: now.timestamp(),
                }),
                attributes_type: None,
                attributes: None,
                alert: None,
                dismissal_date: Some(
                    (now + Duration::seconds(self.settings.dismissal_delay_secs)).timestamp(),
                ),
            },
        }
    }

    fn lesson_or_placeholder(
        &self,
        device: &DeviceContext<'_>,
        weekday_index: u32,
        period: u8,
    ) -> Lesson {
        let resolved = match (device.grade, device.class_number) {
            (Some(grade), Some(class_number)) => {
                self.resolver
                    .lesson(grade, class_number, weekday_index, period)
            }
            _ => None,
        };

        resolved.unwrap_or_else(|| Lesson {
            period,
            subject: format!("Period {}", period),
            classroom: String::new(),
        })
    }
}
