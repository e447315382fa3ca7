use chrono::{Datelike, NaiveDate, Weekday};
use pretty_assertions::assert_eq;
use price_forecast::calendar::{
    calendar_days, is_business_day, shift_days, working_days, Clock, FixedClock,
};
use rstest::rstest;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_working_days_excludes_endpoints_and_weekend() {
    let days = working_days(date(2024, 1, 1), date(2024, 1, 8));
    assert_eq!(
        days,
        vec![
            date(2024, 1, 2),
            date(2024, 1, 3),
            date(2024, 1, 4),
            date(2024, 1, 5),
        ]
    );
}

#[rstest]
#[case(date(2024, 1, 1))]
#[case(date(2024, 1, 6))]
#[case(date(2024, 2, 29))]
#[case(date(1999, 12, 31))]
fn test_working_days_equal_dates_is_empty(#[case] day: NaiveDate) {
    assert!(working_days(day, day).is_empty());
}

#[rstest]
#[case(date(2024, 1, 1), date(2024, 1, 8))]
#[case(date(2024, 6, 14), date(2024, 7, 14))]
#[case(date(2023, 12, 29), date(2024, 1, 2))]
#[case(date(2024, 3, 2), date(2024, 3, 3))]
fn test_working_days_is_symmetric(#[case] a: NaiveDate, #[case] b: NaiveDate) {
    assert_eq!(working_days(a, b), working_days(b, a));
}

#[rstest]
#[case(date(2024, 6, 14), 1, 0)]
#[case(date(2024, 6, 14), 7, 4)]
#[case(date(2024, 6, 14), 30, 20)]
#[case(date(2024, 6, 10), 7, 4)]
fn test_working_days_over_prediction_windows(
    #[case] today: NaiveDate,
    #[case] window: i64,
    #[case] expected: usize,
) {
    let days = working_days(today, shift_days(today, window));
    assert_eq!(days.len(), expected);
    assert!(days.iter().all(|d| is_business_day(*d)));
    assert!(days.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn test_working_days_adjacent_dates() {
    assert!(working_days(date(2024, 1, 2), date(2024, 1, 3)).is_empty());
}

#[test]
fn test_is_business_day() {
    assert!(is_business_day(date(2024, 1, 5)));
    assert!(!is_business_day(date(2024, 1, 6)));
    assert!(!is_business_day(date(2024, 1, 7)));
    assert_eq!(date(2024, 1, 7).weekday(), Weekday::Sun);
}

#[test]
fn test_calendar_days_are_consecutive() {
    let days = calendar_days(date(2024, 2, 27), 4);
    assert_eq!(
        days,
        vec![
            date(2024, 2, 27),
            date(2024, 2, 28),
            date(2024, 2, 29),
            date(2024, 3, 1),
        ]
    );
    assert!(calendar_days(date(2024, 2, 27), 0).is_empty());
}

#[test]
fn test_fixed_clock() {
    let clock = FixedClock(date(2024, 6, 14));
    assert_eq!(clock.today(), date(2024, 6, 14));
}
