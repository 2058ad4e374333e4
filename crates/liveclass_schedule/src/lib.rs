// --- File: crates/liveclass_schedule/src/lib.rs ---
//! School-day time model for LiveClass.
//!
//! [`PeriodClock`] maps a timestamp to a [`PeriodState`]; [`ScheduleResolver`]
//! supplies subject and classroom for a period.

pub mod error;
pub mod period;
#[cfg(test)]
mod period_proptest;
#[cfg(test)]
mod period_test;
pub mod resolver;

pub use error::ScheduleError;
pub use period::{
    is_school_day, PeriodBounds, PeriodClock, PeriodSnapshot, PeriodState, PeriodTable,
    TimeWindow, PERIOD_COUNT, PRE_CLASS_MINUTES,
};
pub use resolver::{Lesson, ScheduleResolver, StaticScheduleResolver};
