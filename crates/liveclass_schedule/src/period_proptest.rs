#[cfg(test)]
mod tests {
    use crate::period::{PeriodClock, PeriodState, PeriodTable, PERIOD_COUNT};
    use chrono::{Duration, TimeZone, Utc, Weekday};
    use chrono_tz::Tz;
    use proptest::prelude::*;

    const WEEKDAYS: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    fn valid_period(state: PeriodState) -> bool {
        match state.period() {
            Some(p) => (1..=PERIOD_COUNT as u8).contains(&p),
            None => true,
        }
    }

    proptest! {
        // Every minute of every day yields a state that refers to a real period
        #[test]
        fn test_status_is_total(minute in 0u32..1440, day in 0usize..7) {
            let table = PeriodTable::canonical();
            let state = table.status_at(minute / 60, minute % 60, WEEKDAYS[day]);
            prop_assert!(valid_period(state));
            prop_assert_eq!(state, table.status_at(minute / 60, minute % 60, WEEKDAYS[day]));
        }

        // The window reported for a minute's state contains that minute
        #[test]
        fn test_window_contains_minute(minute in 0u32..1440) {
            let table = PeriodTable::canonical();
            let state = table.status_at_minute(minute);
            let (start, end) = table.window_minutes(state, true).unwrap();
            prop_assert!(start <= minute && minute <= end, "{} not in {}..{} for {}", minute, start, end, state);
        }

        // Outside [first pre-class, last bell] only BeforeSchool/AfterSchool appear
        #[test]
        fn test_school_hours_bounded(minute in 0u32..1440) {
            let table = PeriodTable::canonical();
            let state = table.status_at_minute(minute);
            let inside = minute >= table.school_start_minute() && minute < table.school_end_minute();
            prop_assert_eq!(state.is_school_hours(), inside);
        }

        // Wall-clock round trip through the timezone keeps the window around `now`
        #[test]
        fn test_clock_window_brackets_now(offset_minutes in 0i64..(14 * 24 * 60)) {
            let clock = PeriodClock::canonical(Tz::Asia__Seoul);
            let base = Utc.with_ymd_and_hms(2025, 5, 4, 15, 0, 0).unwrap(); // Monday 00:00 KST
            let now = base + Duration::minutes(offset_minutes);
            let snapshot = clock.snapshot(now);
            prop_assert!(snapshot.start_epoch <= now.timestamp());
            prop_assert!(now.timestamp() <= snapshot.end_epoch + 59);
        }
    }
}
