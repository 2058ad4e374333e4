#[cfg(test)]
mod tests {
    use crate::error::ScheduleError;
    use crate::period::{PeriodClock, PeriodState, PeriodTable};
    use chrono::{TimeZone, Utc, Weekday};
    use chrono_tz::Tz;
    use liveclass_config::{PeriodTimeConfig, SchoolConfig};

    fn weekday(hour: u32, minute: u32) -> PeriodState {
        PeriodTable::canonical().status_at(hour, minute, Weekday::Wed)
    }

    #[test]
    fn test_mid_period_and_pre_class() {
        assert_eq!(weekday(10, 35), PeriodState::InClass(3));
        assert_eq!(weekday(10, 15), PeriodState::PreClass(3));
    }

    #[test]
    fn test_school_day_edges() {
        assert_eq!(weekday(0, 0), PeriodState::BeforeSchool);
        assert_eq!(weekday(8, 9), PeriodState::BeforeSchool);
        assert_eq!(weekday(8, 10), PeriodState::PreClass(1));
        assert_eq!(weekday(8, 20), PeriodState::InClass(1));
        assert_eq!(weekday(15, 55), PeriodState::InClass(7));
        assert_eq!(weekday(15, 56), PeriodState::AfterSchool);
        assert_eq!(weekday(23, 59), PeriodState::AfterSchool);
    }

    #[test]
    fn test_period_end_minute_is_inclusive() {
        assert_eq!(weekday(9, 10), PeriodState::InClass(1));
        assert_eq!(weekday(9, 11), PeriodState::PreClass(2));
        assert_eq!(weekday(11, 10), PeriodState::InClass(3));
        assert_eq!(weekday(11, 11), PeriodState::PreClass(4));
    }

    #[test]
    fn test_lunch_takes_precedence() {
        assert_eq!(weekday(12, 9), PeriodState::InClass(4));
        // Period 4's closing minute already reads as lunch.
        assert_eq!(weekday(12, 10), PeriodState::LunchTime);
        assert_eq!(weekday(12, 55), PeriodState::LunchTime);
        assert_eq!(weekday(12, 59), PeriodState::LunchTime);
        assert_eq!(weekday(13, 0), PeriodState::InClass(5));
    }

    #[test]
    fn test_break_before_seventh_period() {
        assert_eq!(weekday(14, 50), PeriodState::InClass(6));
        assert_eq!(weekday(14, 51), PeriodState::BreakTime(7));
        assert_eq!(weekday(14, 54), PeriodState::BreakTime(7));
        assert_eq!(weekday(14, 55), PeriodState::PreClass(7));
        assert_eq!(weekday(15, 5), PeriodState::InClass(7));
    }

    #[test]
    fn test_weekend_is_after_school() {
        let table = PeriodTable::canonical();
        assert_eq!(table.status_at(10, 35, Weekday::Sat), PeriodState::AfterSchool);
        assert_eq!(table.status_at(8, 0, Weekday::Sun), PeriodState::AfterSchool);
    }

    #[test]
    fn test_status_uses_school_timezone() {
        let clock = PeriodClock::canonical(Tz::Asia__Seoul);
        // Wednesday 2025-05-07 10:35 KST
        let now = Utc.with_ymd_and_hms(2025, 5, 7, 1, 35, 0).unwrap();
        assert_eq!(clock.status(now), PeriodState::InClass(3));
        assert_eq!(clock.weekday_index(now), 2);
    }

    #[test]
    fn test_window_for_in_class() {
        let clock = PeriodClock::canonical(Tz::Asia__Seoul);
        let now = Utc.with_ymd_and_hms(2025, 5, 7, 1, 35, 0).unwrap();
        let window = clock.window(PeriodState::InClass(3), now).unwrap();
        assert_eq!(window.start, Utc.with_ymd_and_hms(2025, 5, 7, 1, 20, 0).unwrap());
        assert_eq!(window.end, Utc.with_ymd_and_hms(2025, 5, 7, 2, 10, 0).unwrap());
    }

    #[test]
    fn test_window_for_break_and_lunch() {
        let clock = PeriodClock::canonical(Tz::Asia__Seoul);
        let now = Utc.with_ymd_and_hms(2025, 5, 7, 5, 52, 0).unwrap(); // 14:52 KST
        let state = clock.status(now);
        assert_eq!(state, PeriodState::BreakTime(7));
        let window = clock.window(state, now).unwrap();
        assert_eq!(window.start, Utc.with_ymd_and_hms(2025, 5, 7, 5, 50, 0).unwrap());
        assert_eq!(window.end, Utc.with_ymd_and_hms(2025, 5, 7, 6, 5, 0).unwrap());

        let lunch = clock.window(PeriodState::LunchTime, now).unwrap();
        assert_eq!(lunch.start, Utc.with_ymd_and_hms(2025, 5, 7, 3, 10, 0).unwrap());
        assert_eq!(lunch.end, Utc.with_ymd_and_hms(2025, 5, 7, 4, 0, 0).unwrap());
    }

    #[test]
    fn test_after_school_window_starts_with_state() {
        let clock = PeriodClock::canonical(Tz::Asia__Seoul);
        let last_bell = Utc.with_ymd_and_hms(2025, 5, 7, 6, 55, 0).unwrap(); // 15:55 KST
        let first_after = Utc.with_ymd_and_hms(2025, 5, 7, 6, 56, 0).unwrap();
        assert_eq!(clock.status(last_bell), PeriodState::InClass(7));
        assert_eq!(clock.status(first_after), PeriodState::AfterSchool);

        let window = clock.window(PeriodState::AfterSchool, first_after).unwrap();
        assert_eq!(window.start, first_after);
        assert_eq!(clock.after_school_window(last_bell), window);
        assert_eq!(clock.snapshot(first_after).start_epoch, first_after.timestamp());
    }

    #[test]
    fn test_window_unknown_period() {
        let clock = PeriodClock::canonical(Tz::Asia__Seoul);
        let now = Utc.with_ymd_and_hms(2025, 5, 7, 1, 35, 0).unwrap();
        assert!(clock.window(PeriodState::InClass(9), now).is_none());
    }

    #[test]
    fn test_snapshot_on_weekend_spans_day() {
        let clock = PeriodClock::canonical(Tz::Asia__Seoul);
        // Saturday 2025-05-10 11:00 KST
        let now = Utc.with_ymd_and_hms(2025, 5, 10, 2, 0, 0).unwrap();
        let snapshot = clock.snapshot(now);
        assert_eq!(snapshot.state, PeriodState::AfterSchool);
        assert_eq!(snapshot.weekday_index, 5);
        assert_eq!(snapshot.end_epoch - snapshot.start_epoch, 24 * 3600);
    }

    #[test]
    fn test_state_serialization() {
        let json = serde_json::to_value(PeriodState::InClass(3)).unwrap();
        assert_eq!(json, serde_json::json!({"status": "inClass", "period": 3}));
        let json = serde_json::to_value(PeriodState::LunchTime).unwrap();
        assert_eq!(json, serde_json::json!({"status": "lunchTime"}));
        assert_eq!(PeriodState::BreakTime(7).to_string(), "breakTime(7)");
    }

    #[test]
    fn test_from_config_defaults_to_canonical() {
        let clock = PeriodClock::from_config(&SchoolConfig::default()).unwrap();
        assert_eq!(clock.table(), &PeriodTable::canonical());
        assert_eq!(clock.timezone(), Tz::Asia__Seoul);
    }

    #[test]
    fn test_from_config_custom_table() {
        let times = [
            ("08:30", "09:15"),
            ("09:25", "10:10"),
            ("10:20", "11:05"),
            ("11:15", "12:00"),
            ("12:50", "13:35"),
            ("13:45", "14:30"),
            ("14:40", "15:25"),
        ];
        let config = SchoolConfig {
            periods: times
                .iter()
                .map(|(s, e)| PeriodTimeConfig {
                    start: s.to_string(),
                    end: e.to_string(),
                })
                .collect(),
            lunch_start: Some("12:00".to_string()),
            lunch_end: Some("12:50".to_string()),
            ..SchoolConfig::default()
        };
        let table = PeriodTable::from_config(&config).unwrap();
        assert_eq!(table.status_at(8, 25, Weekday::Mon), PeriodState::PreClass(1));
        assert_eq!(table.status_at(12, 30, Weekday::Mon), PeriodState::LunchTime);
        assert_eq!(table.status_at(15, 26, Weekday::Mon), PeriodState::AfterSchool);
    }

    #[test]
    fn test_from_config_rejects_bad_tables() {
        let short = SchoolConfig {
            periods: vec![PeriodTimeConfig {
                start: "08:20".to_string(),
                end: "09:10".to_string(),
            }],
            ..SchoolConfig::default()
        };
        assert!(matches!(
            PeriodTable::from_config(&short),
            Err(ScheduleError::InvalidTable(_))
        ));

        let half_lunch = SchoolConfig {
            lunch_start: Some("12:10".to_string()),
            ..SchoolConfig::default()
        };
        assert!(matches!(
            PeriodTable::from_config(&half_lunch),
            Err(ScheduleError::InvalidTable(_))
        ));

        let overlapping_lunch = SchoolConfig {
            lunch_start: Some("11:30".to_string()),
            lunch_end: Some("12:40".to_string()),
            ..SchoolConfig::default()
        };
        assert!(matches!(
            PeriodTable::from_config(&overlapping_lunch),
            Err(ScheduleError::InvalidTable(_))
        ));

        let garbled = SchoolConfig {
            lunch_start: Some("noon".to_string()),
            lunch_end: Some("13:00".to_string()),
            ..SchoolConfig::default()
        };
        assert!(matches!(
            PeriodTable::from_config(&garbled),
            Err(ScheduleError::InvalidTime(_))
        ));
    }

    #[test]
    fn test_unknown_timezone() {
        let config = SchoolConfig {
            timezone: "Mars/Olympus_Mons".to_string(),
            ..SchoolConfig::default()
        };
        assert!(matches!(
            PeriodClock::from_config(&config),
            Err(ScheduleError::UnknownTimezone(_))
        ));
    }
}
