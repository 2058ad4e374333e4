//! Periodic update fan-out while school is in session.

use chrono::{DateTime, Utc};
use liveclass_registry::cleanup::job_interval;
use liveclass_schedule::PeriodClock;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, warn};

use crate::dispatcher::Dispatcher;

/// Whether an update tick at `now` should push. Weekends, the time before
/// the first pre-class window and the time after the last bell are skipped.
pub fn should_tick(clock: &PeriodClock, now: DateTime<Utc>) -> bool {
    clock.status(now).is_school_hours()
}

/// Pushes an update to every activity token every `every`, reading wall time.
pub fn spawn_update_ticker(
    dispatcher: Arc<Dispatcher>,
    clock: Arc<PeriodClock>,
    every: Duration,
) -> JoinHandle<()> {
    spawn_update_ticker_with(dispatcher, clock, every, Utc::now)
}

/// Like [`spawn_update_ticker`], with the current time taken from `now`.
/// The first tick fires immediately.
pub fn spawn_update_ticker_with<F>(
    dispatcher: Arc<Dispatcher>,
    clock: Arc<PeriodClock>,
    every: Duration,
    now: F,
) -> JoinHandle<()>
where
    F: Fn() -> DateTime<Utc> + Send + 'static,
{
    let every = job_interval("live activity updates", every);
    tokio::spawn(async move {
        let mut interval = time::interval(every);
        interval.set_missed_tick_behavior(time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;

            let at = now();
            if !should_tick(&clock, at) {
                debug!(state = %clock.status(at), "outside school hours; skipping update tick");
                continue;
            }

            if let Err(e) = dispatcher.fan_out_update().await {
                warn!("scheduled update fan-out failed: {}", e);
            }
        }
    })
}
