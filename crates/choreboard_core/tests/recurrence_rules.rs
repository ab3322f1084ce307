use chrono::NaiveDate;
use choreboard_core::{Recurrence, RecurrenceError};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

// 2024-01-01 is a Monday; 2024-01-01..=2024-01-07 covers Mon..Sun.
fn week() -> Vec<NaiveDate> {
    (1..=7).map(|day| date(2024, 1, day)).collect()
}

#[test]
fn daily_matches_every_date() {
    for day in week() {
        assert!(Recurrence::Daily.matches(day));
    }
    assert!(Recurrence::Daily.matches(date(2000, 2, 29)));
}

#[test]
fn weekday_matches_monday_through_friday_only() {
    let expected = [true, true, true, true, true, false, false];
    for (day, expected) in week().into_iter().zip(expected) {
        assert_eq!(Recurrence::Weekday.matches(day), expected, "date {day}");
    }
}

#[test]
fn weekend_matches_saturday_and_sunday_only() {
    let expected = [false, false, false, false, false, true, true];
    for (day, expected) in week().into_iter().zip(expected) {
        assert_eq!(Recurrence::Weekend.matches(day), expected, "date {day}");
    }
}

#[test]
fn weekday_and_weekend_partition_every_date() {
    for offset in 0..60 {
        let day = date(2024, 1, 1) + chrono::Days::new(offset);
        assert_ne!(
            Recurrence::Weekday.matches(day),
            Recurrence::Weekend.matches(day),
            "date {day}"
        );
    }
}

#[test]
fn single_weekday_variants_match_exactly_one_day_per_week() {
    let variants = [
        Recurrence::Monday,
        Recurrence::Tuesday,
        Recurrence::Wednesday,
        Recurrence::Thursday,
        Recurrence::Friday,
        Recurrence::Saturday,
        Recurrence::Sunday,
    ];

    for (index, rule) in variants.iter().enumerate() {
        let matched: Vec<_> = week().into_iter().filter(|day| rule.matches(*day)).collect();
        assert_eq!(matched, vec![date(2024, 1, index as u32 + 1)]);
    }
}

#[test]
fn weekly_days_uses_sunday_based_indices() {
    // 0 = Sunday, 3 = Wednesday.
    let rule = Recurrence::weekly_days(&[0, 3]).unwrap();

    assert!(rule.matches(date(2024, 1, 7)), "Sunday");
    assert!(rule.matches(date(2024, 1, 3)), "Wednesday");
    assert!(!rule.matches(date(2024, 1, 1)), "Monday");
    assert!(!rule.matches(date(2024, 1, 6)), "Saturday");
}

#[test]
fn every_n_days_matches_interval_steps_from_start() {
    let rule = Recurrence::every_n_days(date(2024, 1, 1), 3).unwrap();

    assert!(rule.matches(date(2024, 1, 1)));
    assert!(rule.matches(date(2024, 1, 4)));
    assert!(rule.matches(date(2024, 1, 7)));
    assert!(!rule.matches(date(2024, 1, 2)));
    assert!(!rule.matches(date(2024, 1, 3)));
    assert!(!rule.matches(date(2024, 1, 5)));
}

#[test]
fn every_n_days_never_matches_before_start() {
    let rule = Recurrence::every_n_days(date(2024, 1, 10), 3).unwrap();

    // Aligned to the interval grid, but before the anchor.
    assert!(!rule.matches(date(2024, 1, 7)));
    assert!(!rule.matches(date(2024, 1, 9)));
    assert!(rule.matches(date(2024, 1, 10)));
}

#[test]
fn every_n_days_with_interval_one_matches_from_start_onward() {
    let rule = Recurrence::every_n_days(date(2024, 2, 28), 1).unwrap();

    assert!(!rule.matches(date(2024, 2, 27)));
    assert!(rule.matches(date(2024, 2, 28)));
    assert!(rule.matches(date(2024, 2, 29)));
    assert!(rule.matches(date(2024, 3, 1)));
}

#[test]
fn invalid_rules_are_unconstructible() {
    assert_eq!(
        Recurrence::weekly_days(&[]).unwrap_err(),
        RecurrenceError::EmptyDaySet
    );
    assert_eq!(
        Recurrence::weekly_days(&[2, 9]).unwrap_err(),
        RecurrenceError::DayIndexOutOfRange(9)
    );
    assert_eq!(
        Recurrence::every_n_days(date(2024, 1, 1), 0).unwrap_err(),
        RecurrenceError::ZeroInterval
    );
}
