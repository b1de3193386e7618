//! Tests for the schedule module.

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Datelike, Days, NaiveTime, TimeZone, Utc, Weekday};

    use rb_status_core::{ScheduleType, ValidationIssue};

    use crate::schedule::{
        compile_schedule, describe_cron, parse_time, parse_timezone, weekday_from_index,
        ScheduleInput,
    };

    /// Wednesday 2024-01-10 12:00 UTC, away from any DST transition.
    fn winter_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap()
    }

    fn weekly(time: &str, weekday: u8, tz: &str) -> ScheduleInput {
        ScheduleInput {
            schedule_type: ScheduleType::Weekly,
            time: Some(time.to_string()),
            weekday: Some(weekday),
            timezone: tz.to_string(),
            custom_cron: None,
        }
    }

    fn daily(time: &str, tz: &str) -> ScheduleInput {
        ScheduleInput {
            schedule_type: ScheduleType::Daily,
            time: Some(time.to_string()),
            weekday: None,
            timezone: tz.to_string(),
            custom_cron: None,
        }
    }

    fn custom(expr: &str) -> ScheduleInput {
        ScheduleInput {
            schedule_type: ScheduleType::Custom,
            time: None,
            weekday: None,
            timezone: String::new(),
            custom_cron: Some(expr.to_string()),
        }
    }

    // -- weekday rollover --------------------------------------------------

    #[test]
    fn friday_late_evening_in_negative_offset_becomes_saturday() {
        // Friday = 4; Bogota is UTC-5 all year.
        let compiled = compile_schedule(&weekly("23:30", 4, "America/Bogota"), winter_now()).unwrap();
        assert_eq!(compiled.cron.as_deref(), Some("30 4 * * 6"));
        assert_eq!(compiled.utc_time.as_deref(), Some("04:30"));
        assert_eq!(compiled.utc_weekday, Some(Weekday::Sat));
        assert_eq!(compiled.utc_weekday_index(), Some(5));
    }

    #[test]
    fn new_york_winter_matches_utc_minus_five() {
        let compiled =
            compile_schedule(&weekly("23:30", 4, "America/New_York"), winter_now()).unwrap();
        assert_eq!(compiled.cron.as_deref(), Some("30 4 * * 6"));
    }

    #[test]
    fn early_monday_in_positive_offset_rolls_back_to_sunday() {
        // Monday = 0; Tokyo is UTC+9.
        let compiled = compile_schedule(&weekly("02:00", 0, "Asia/Tokyo"), winter_now()).unwrap();
        assert_eq!(compiled.cron.as_deref(), Some("0 17 * * 0"));
        assert_eq!(compiled.utc_weekday, Some(Weekday::Sun));
    }

    #[test]
    fn daily_emits_wildcard_weekday() {
        let compiled = compile_schedule(&daily("23:30", "America/New_York"), winter_now()).unwrap();
        assert_eq!(compiled.cron.as_deref(), Some("30 4 * * *"));
        assert_eq!(compiled.utc_time.as_deref(), Some("04:30"));
        assert!(compiled.utc_weekday.is_none());
    }

    #[test]
    fn daily_uses_offset_in_effect_at_now() {
        let summer = Utc.with_ymd_and_hms(2024, 7, 10, 12, 0, 0).unwrap();
        let compiled = compile_schedule(&daily("09:00", "America/New_York"), summer).unwrap();
        assert_eq!(compiled.cron.as_deref(), Some("0 13 * * *"));
    }

    #[test]
    fn utc_timezone_is_identity() {
        let compiled = compile_schedule(&weekly("08:15", 2, "UTC"), winter_now()).unwrap();
        assert_eq!(compiled.cron.as_deref(), Some("15 8 * * 3"));
    }

    #[test]
    fn dst_gap_shifts_forward_one_hour() {
        // Wednesday 2024-03-06; the next Sunday (03-10) skips 02:00-03:00 in New York.
        let now = Utc.with_ymd_and_hms(2024, 3, 6, 12, 0, 0).unwrap();
        let compiled = compile_schedule(&weekly("02:30", 6, "America/New_York"), now).unwrap();
        assert_eq!(compiled.cron.as_deref(), Some("30 7 * * 0"));
    }

    // -- custom / manual ---------------------------------------------------

    #[test]
    fn manual_has_no_cron() {
        let input = ScheduleInput {
            schedule_type: ScheduleType::Manual,
            time: None,
            weekday: None,
            timezone: String::new(),
            custom_cron: None,
        };
        let compiled = compile_schedule(&input, winter_now()).unwrap();
        assert!(compiled.cron.is_none());
        assert!(compiled.utc_time.is_none());
    }

    #[test]
    fn custom_is_stored_verbatim() {
        let compiled = compile_schedule(&custom("  0 6 * * 1-5 "), winter_now()).unwrap();
        assert_eq!(compiled.cron.as_deref(), Some("0 6 * * 1-5"));
    }

    #[test]
    fn custom_must_be_well_formed() {
        let issues = compile_schedule(&custom("0 6 * *"), winter_now()).unwrap_err();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field(), "schedule_cron");

        let issues = compile_schedule(&custom("   "), winter_now()).unwrap_err();
        assert_eq!(issues, vec![ValidationIssue::empty_field("schedule_cron")]);
    }

    // -- errors ------------------------------------------------------------

    #[test]
    fn weekly_without_weekday_is_invalid() {
        let mut input = weekly("10:00", 0, "UTC");
        input.weekday = None;
        let issues = compile_schedule(&input, winter_now()).unwrap_err();
        assert!(matches!(
            &issues[0],
            ValidationIssue::InvalidSchedule { field, .. } if field == "schedule_weekday"
        ));
    }

    #[test]
    fn weekday_out_of_range_is_invalid() {
        let issues = compile_schedule(&weekly("10:00", 7, "UTC"), winter_now()).unwrap_err();
        assert_eq!(issues[0].field(), "schedule_weekday");
    }

    #[test]
    fn malformed_time_is_invalid() {
        let issues = compile_schedule(&daily("7pm", "UTC"), winter_now()).unwrap_err();
        assert!(matches!(
            &issues[0],
            ValidationIssue::InvalidSchedule { field, .. } if field == "schedule_time"
        ));
    }

    #[test]
    fn unknown_timezone_is_invalid() {
        let issues = compile_schedule(&daily("10:00", "Mars/Olympus"), winter_now()).unwrap_err();
        assert_eq!(issues[0].field(), "schedule_timezone");
    }

    #[test]
    fn all_schedule_problems_are_reported_together() {
        let mut input = weekly("99:99", 0, "Nowhere/Special");
        input.weekday = None;
        let issues = compile_schedule(&input, winter_now()).unwrap_err();
        let fields: Vec<&str> = issues.iter().map(|i| i.field()).collect();
        assert_eq!(fields, vec!["schedule_time", "schedule_weekday", "schedule_timezone"]);
    }

    // -- round trip --------------------------------------------------------

    /// Reading the compiled cron back and placing it on the matching UTC date
    /// must land on the requested local time and weekday in the source zone.
    #[test]
    fn compiled_cron_round_trips_through_timezone_offsets() {
        let now = winter_now();
        let zones = [
            "America/New_York",
            "America/Bogota",
            "Europe/Berlin",
            "Asia/Kolkata",
            "Asia/Tokyo",
            "Pacific/Auckland",
            "UTC",
        ];
        let times = ["00:15", "06:00", "12:45", "23:30"];

        for zone in zones {
            let tz = parse_timezone(zone).unwrap();
            for time in times {
                let local_time = parse_time(time).unwrap();
                for index in 0..7u8 {
                    let local_weekday = weekday_from_index(index).unwrap();
                    let compiled = compile_schedule(&weekly(time, index, zone), now).unwrap();
                    let cron = compiled.cron.unwrap();
                    let (utc_time, utc_weekday) = describe_cron(&cron).unwrap();
                    let utc_weekday = utc_weekday.unwrap();

                    let start = now.date_naive() - Days::new(1);
                    let found = (0..10u64)
                        .filter_map(|offset| start.checked_add_days(Days::new(offset)))
                        .filter(|date| date.weekday() == utc_weekday)
                        .map(|date| Utc.from_utc_datetime(&date.and_time(utc_time)))
                        .map(|instant| instant.with_timezone(&tz))
                        .any(|local| {
                            local.weekday() == local_weekday
                                && local.time() == local_time
                        });
                    assert!(found, "{zone} {time} weekday {index} compiled to {cron}");
                }
            }
        }
    }

    #[test]
    fn daily_round_trip_keeps_time_only() {
        let compiled = compile_schedule(&daily("12:45", "Asia/Kolkata"), winter_now()).unwrap();
        let (utc_time, weekday) = describe_cron(compiled.cron.as_deref().unwrap()).unwrap();
        assert_eq!(utc_time, NaiveTime::from_hms_opt(7, 15, 0).unwrap());
        assert!(weekday.is_none());
    }
}
