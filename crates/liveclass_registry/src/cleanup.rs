//! Background job: expire tokens that have not been refreshed within the TTL.

use chrono::Duration as TtlDuration;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time;
use tracing::warn;

use crate::registry::TokenRegistry;

/// Shortest period a background job may tick at.
pub const MIN_JOB_INTERVAL: Duration = Duration::from_secs(1);

/// `every`, raised to [`MIN_JOB_INTERVAL`]. `tokio::time::interval` panics on zero.
pub fn job_interval(job: &str, every: Duration) -> Duration {
    if every < MIN_JOB_INTERVAL {
        warn!(job, requested = ?every, "job interval too short, using {:?}", MIN_JOB_INTERVAL);
        return MIN_JOB_INTERVAL;
    }
    every
}

/// Spawn the periodic sweep. The first tick fires immediately.
pub fn spawn(registry: TokenRegistry, every: Duration, ttl: TtlDuration) -> JoinHandle<()> {
    let every = job_interval("token cleanup", every);
    tokio::spawn(async move {
        let mut interval = time::interval(every);
        interval.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            if let Err(e) = registry.sweep(ttl).await {
                tracing::error!("token cleanup failed: {}", e);
            }
        }
    })
}
