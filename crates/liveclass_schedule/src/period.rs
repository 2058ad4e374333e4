//! The school-day clock.
//!
//! Everything that needs to know "what period is it" goes through
//! [`PeriodClock`]; nothing else in the workspace keeps its own bell times.
//!
//! Classification is first-match-wins over minute-of-day:
//!
//! 1. before `first.start - 10min` → `BeforeSchool`
//! 2. after the last period's end minute → `AfterSchool`
//! 3. inside `[lunch_start, lunch_end)` → `LunchTime`
//! 4. inside a period's inclusive `[start, end]` → `InClass(n)`
//! 5. inside `[start - 10min, start)` of a period → `PreClass(n)`
//! 6. otherwise → `BreakTime(next)`
//!
//! Boundaries worth knowing with the built-in table: 12:10 (period 4's end
//! minute) reads as lunch because rule 3 wins over rule 4, and the pre-class
//! window of period 5 (12:50-13:00) is swallowed by lunch.

use chrono::{
    DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Timelike, Utc, Weekday,
};
use chrono_tz::Tz;
use liveclass_config::SchoolConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ScheduleError;

/// Number of periods in a school day.
pub const PERIOD_COUNT: usize = 7;

/// Length of the pre-class window before every period.
pub const PRE_CLASS_MINUTES: u32 = 10;

const MINUTES_PER_DAY: u32 = 24 * 60;

const CANONICAL_PERIODS: [(u32, u32); PERIOD_COUNT] = [
    (8 * 60 + 20, 9 * 60 + 10),
    (9 * 60 + 20, 10 * 60 + 10),
    (10 * 60 + 20, 11 * 60 + 10),
    (11 * 60 + 20, 12 * 60 + 10),
    (13 * 60, 13 * 60 + 50),
    (14 * 60, 14 * 60 + 50),
    (15 * 60 + 5, 15 * 60 + 55),
];

const CANONICAL_LUNCH: (u32, u32) = (12 * 60 + 10, 13 * 60);

/// Where the school day stands at a given minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(tag = "status", content = "period", rename_all = "camelCase")]
pub enum PeriodState {
    BeforeSchool,
    InClass(u8),
    PreClass(u8),
    BreakTime(u8),
    LunchTime,
    AfterSchool,
}

impl PeriodState {
    /// Wire name of the state, as used in content-state `status`.
    pub fn status_name(&self) -> &'static str {
        match self {
            PeriodState::BeforeSchool => "beforeSchool",
            PeriodState::InClass(_) => "inClass",
            PeriodState::PreClass(_) => "preClass",
            PeriodState::BreakTime(_) => "breakTime",
            PeriodState::LunchTime => "lunchTime",
            PeriodState::AfterSchool => "afterSchool",
        }
    }

    /// The period this state refers to, if any.
    pub fn period(&self) -> Option<u8> {
        match self {
            PeriodState::InClass(p) | PeriodState::PreClass(p) | PeriodState::BreakTime(p) => {
                Some(*p)
            }
            _ => None,
        }
    }

    /// True between the first pre-class window and the last bell.
    pub fn is_school_hours(&self) -> bool {
        !matches!(self, PeriodState::BeforeSchool | PeriodState::AfterSchool)
    }
}

impl fmt::Display for PeriodState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.period() {
            Some(p) => write!(f, "{}({})", self.status_name(), p),
            None => write!(f, "{}", self.status_name()),
        }
    }
}

/// Monday to Friday.
pub fn is_school_day(weekday: Weekday) -> bool {
    !matches!(weekday, Weekday::Sat | Weekday::Sun)
}

/// Start and end of one period, in minutes since local midnight. `end` is inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodBounds {
    pub period: u8,
    pub start: u32,
    pub end: u32,
}

fn parse_hhmm(value: &str) -> Result<u32, ScheduleError> {
    let time = NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|_| ScheduleError::InvalidTime(value.to_string()))?;
    Ok(time.hour() * 60 + time.minute())
}

/// The bell schedule: seven periods plus a lunch window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodTable {
    periods: Vec<PeriodBounds>,
    lunch_start: u32,
    lunch_end: u32,
}

impl Default for PeriodTable {
    fn default() -> Self {
        Self::canonical()
    }
}

impl PeriodTable {
    /// The built-in bell schedule.
    pub fn canonical() -> Self {
        Self {
            periods: CANONICAL_PERIODS
                .iter()
                .enumerate()
                .map(|(i, (start, end))| PeriodBounds {
                    period: i as u8 + 1,
                    start: *start,
                    end: *end,
                })
                .collect(),
            lunch_start: CANONICAL_LUNCH.0,
            lunch_end: CANONICAL_LUNCH.1,
        }
    }

    /// Builds a validated table from `(start, end)` minute pairs.
    pub fn new(
        periods: &[(u32, u32)],
        lunch_start: u32,
        lunch_end: u32,
    ) -> Result<Self, ScheduleError> {
        let table = Self {
            periods: periods
                .iter()
                .enumerate()
                .map(|(i, (start, end))| PeriodBounds {
                    period: i as u8 + 1,
                    start: *start,
                    end: *end,
                })
                .collect(),
            lunch_start,
            lunch_end,
        };
        table.validate()?;
        Ok(table)
    }

    /// Reads the table from the `school` config section, falling back to the
    /// built-in periods and lunch window for whatever is not configured.
    pub fn from_config(config: &SchoolConfig) -> Result<Self, ScheduleError> {
        let canonical = Self::canonical();

        let periods = if config.periods.is_empty() {
            CANONICAL_PERIODS.to_vec()
        } else {
            config
                .periods
                .iter()
                .map(|p| Ok((parse_hhmm(&p.start)?, parse_hhmm(&p.end)?)))
                .collect::<Result<Vec<_>, ScheduleError>>()?
        };

        let (lunch_start, lunch_end) = match (&config.lunch_start, &config.lunch_end) {
            (Some(start), Some(end)) => (parse_hhmm(start)?, parse_hhmm(end)?),
            (None, None) => (canonical.lunch_start, canonical.lunch_end),
            _ => {
                return Err(ScheduleError::InvalidTable(
                    "lunch_start and lunch_end must be set together".to_string(),
                ))
            }
        };

        Self::new(&periods, lunch_start, lunch_end)
    }

    fn validate(&self) -> Result<(), ScheduleError> {
        if self.periods.len() != PERIOD_COUNT {
            return Err(ScheduleError::InvalidTable(format!(
                "expected {} periods, got {}",
                PERIOD_COUNT,
                self.periods.len()
            )));
        }

        for (i, p) in self.periods.iter().enumerate() {
            if p.start >= p.end || p.end >= MINUTES_PER_DAY {
                return Err(ScheduleError::InvalidTable(format!(
                    "period {} has an empty or out-of-range window",
                    p.period
                )));
            }
            if i == 0 && p.start < PRE_CLASS_MINUTES {
                return Err(ScheduleError::InvalidTable(
                    "first period starts before the pre-class window fits".to_string(),
                ));
            }
            if i > 0 && p.start <= self.periods[i - 1].end {
                return Err(ScheduleError::InvalidTable(format!(
                    "period {} overlaps period {}",
                    p.period,
                    p.period - 1
                )));
            }
            if p.start < self.lunch_end && p.end > self.lunch_start {
                return Err(ScheduleError::InvalidTable(format!(
                    "period {} overlaps lunch",
                    p.period
                )));
            }
        }

        if self.lunch_start >= self.lunch_end {
            return Err(ScheduleError::InvalidTable(
                "lunch window is empty".to_string(),
            ));
        }

        Ok(())
    }

    pub fn periods(&self) -> &[PeriodBounds] {
        &self.periods
    }

    pub fn period(&self, period: u8) -> Option<&PeriodBounds> {
        self.periods.iter().find(|p| p.period == period)
    }

    fn first(&self) -> &PeriodBounds {
        &self.periods[0]
    }

    fn last(&self) -> &PeriodBounds {
        &self.periods[self.periods.len() - 1]
    }

    /// First minute of the school day (start of period 1's pre-class window).
    pub fn school_start_minute(&self) -> u32 {
        self.first().start.saturating_sub(PRE_CLASS_MINUTES)
    }

    /// First minute that counts as after school.
    pub fn school_end_minute(&self) -> u32 {
        self.last().end + 1
    }

    /// Classifies a wall-clock reading.
    pub fn status_at(&self, hour: u32, minute: u32, weekday: Weekday) -> PeriodState {
        if !is_school_day(weekday) {
            return PeriodState::AfterSchool;
        }
        self.status_at_minute(hour * 60 + minute)
    }

    /// Classifies a school-day minute of day.
    pub fn status_at_minute(&self, now: u32) -> PeriodState {
        if now < self.school_start_minute() {
            return PeriodState::BeforeSchool;
        }
        if now >= self.school_end_minute() {
            return PeriodState::AfterSchool;
        }
        if now >= self.lunch_start && now < self.lunch_end {
            return PeriodState::LunchTime;
        }
        if let Some(p) = self.periods.iter().find(|p| now >= p.start && now <= p.end) {
            return PeriodState::InClass(p.period);
        }
        if let Some(p) = self
            .periods
            .iter()
            .find(|p| now >= p.start.saturating_sub(PRE_CLASS_MINUTES) && now < p.start)
        {
            return PeriodState::PreClass(p.period);
        }
        match self.periods.iter().find(|p| p.start > now) {
            Some(next) => PeriodState::BreakTime(next.period),
            None => PeriodState::AfterSchool,
        }
    }

    /// The `[start, end]` minutes of the window a state occupies.
    ///
    /// `end` may be 1440 (next midnight). Returns `None` for a period number
    /// the table does not know.
    pub fn window_minutes(&self, state: PeriodState, school_day: bool) -> Option<(u32, u32)> {
        if !school_day {
            return Some((0, MINUTES_PER_DAY));
        }
        match state {
            PeriodState::BeforeSchool => Some((0, self.school_start_minute())),
            PeriodState::AfterSchool => Some((self.school_end_minute(), MINUTES_PER_DAY)),
            PeriodState::LunchTime => Some((self.lunch_start, self.lunch_end)),
            PeriodState::InClass(n) => self.period(n).map(|p| (p.start, p.end)),
            PeriodState::PreClass(n) => self
                .period(n)
                .map(|p| (p.start.saturating_sub(PRE_CLASS_MINUTES), p.start)),
            PeriodState::BreakTime(n) => {
                let next = self.period(n)?;
                let start = n
                    .checked_sub(1)
                    .and_then(|prev| self.period(prev))
                    .map(|prev| prev.end)
                    .unwrap_or_else(|| next.start.saturating_sub(PRE_CLASS_MINUTES));
                Some((start, next.start))
            }
        }
    }
}

/// A resolved time window in absolute time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn start_epoch(&self) -> i64 {
        self.start.timestamp()
    }

    pub fn end_epoch(&self) -> i64 {
        self.end.timestamp()
    }
}

/// State plus window, as reported by the status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct PeriodSnapshot {
    pub state: PeriodState,
    pub weekday_index: u32,
    pub start_epoch: i64,
    pub end_epoch: i64,
}

/// The canonical period clock, bound to the school's timezone.
#[derive(Debug, Clone)]
pub struct PeriodClock {
    table: PeriodTable,
    timezone: Tz,
}

impl PeriodClock {
    pub fn new(table: PeriodTable, timezone: Tz) -> Self {
        Self { table, timezone }
    }

    pub fn canonical(timezone: Tz) -> Self {
        Self::new(PeriodTable::canonical(), timezone)
    }

    pub fn from_config(config: &SchoolConfig) -> Result<Self, ScheduleError> {
        let timezone: Tz = config
            .timezone
            .parse()
            .map_err(|_| ScheduleError::UnknownTimezone(config.timezone.clone()))?;
        Ok(Self::new(PeriodTable::from_config(config)?, timezone))
    }

    pub fn table(&self) -> &PeriodTable {
        &self.table
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn status(&self, now: DateTime<Utc>) -> PeriodState {
        let local = now.with_timezone(&self.timezone);
        self.table
            .status_at(local.hour(), local.minute(), local.weekday())
    }

    /// Monday = 0 ... Sunday = 6, in school-local time.
    pub fn weekday_index(&self, now: DateTime<Utc>) -> u32 {
        now.with_timezone(&self.timezone)
            .weekday()
            .num_days_from_monday()
    }

    /// Absolute window for `state` on the local day containing `now`.
    pub fn window(&self, state: PeriodState, now: DateTime<Utc>) -> Option<TimeWindow> {
        let local = now.with_timezone(&self.timezone);
        let (start, end) = self
            .table
            .window_minutes(state, is_school_day(local.weekday()))?;
        let date = local.date_naive();
        Some(TimeWindow {
            start: self.at_minute(date, start),
            end: self.at_minute(date, end),
        })
    }

    /// Window for the after-school state of the day containing `now`.
    pub fn after_school_window(&self, now: DateTime<Utc>) -> TimeWindow {
        let local = now.with_timezone(&self.timezone);
        let date = local.date_naive();
        let start = if is_school_day(local.weekday()) {
            self.table.school_end_minute()
        } else {
            0
        };
        TimeWindow {
            start: self.at_minute(date, start),
            end: self.at_minute(date, MINUTES_PER_DAY),
        }
    }

    pub fn snapshot(&self, now: DateTime<Utc>) -> PeriodSnapshot {
        let state = self.status(now);
        let window = self
            .window(state, now)
            .unwrap_or_else(|| self.after_school_window(now));
        PeriodSnapshot {
            state,
            weekday_index: self.weekday_index(now),
            start_epoch: window.start_epoch(),
            end_epoch: window.end_epoch(),
        }
    }

    fn at_minute(&self, date: NaiveDate, minute: u32) -> DateTime<Utc> {
        let naive = date.and_time(NaiveTime::MIN) + Duration::minutes(i64::from(minute));
        self.timezone
            .from_local_datetime(&naive)
            .earliest()
            .unwrap_or_else(|| self.timezone.from_utc_datetime(&naive))
            .with_timezone(&Utc)
    }
}
