//! Calendar arithmetic for forecast horizons

use chrono::{Datelike, Days, NaiveDate, Utc, Weekday};
use std::fmt::Debug;

/// Source of "today" for the pipeline
pub trait Clock: Debug + Send + Sync {
    /// Current calendar date
    fn today(&self) -> NaiveDate;
}

/// Clock reading the system time in UTC
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// Clock pinned to a single date
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// True unless the date falls on a Saturday or Sunday
pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Business days strictly between `start` and `end`, ascending.
///
/// Both endpoints are excluded. When `start` is after `end` the two are
/// swapped first, so the result does not depend on argument order.
pub fn working_days(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let (from, to) = if start <= end { (start, end) } else { (end, start) };

    from.iter_days()
        .skip(1)
        .take_while(|day| *day < to)
        .filter(|day| is_business_day(*day))
        .collect()
}

/// `count` consecutive calendar days beginning with `start`
pub fn calendar_days(start: NaiveDate, count: usize) -> Vec<NaiveDate> {
    start.iter_days().take(count).collect()
}

/// Shift a date by a signed number of days, saturating at the calendar limits
pub fn shift_days(date: NaiveDate, days: i64) -> NaiveDate {
    let magnitude = Days::new(days.unsigned_abs());
    let shifted = if days >= 0 {
        date.checked_add_days(magnitude)
    } else {
        date.checked_sub_days(magnitude)
    };

    shifted.unwrap_or(if days >= 0 {
        NaiveDate::MAX
    } else {
        NaiveDate::MIN
    })
}

/// Unix timestamp in whole seconds of midnight UTC on `date`
pub fn unix_seconds(date: NaiveDate) -> i64 {
    date.and_time(chrono::NaiveTime::MIN).and_utc().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unix_seconds() {
        let date = NaiveDate::from_ymd_opt(1970, 1, 2).unwrap();
        assert_eq!(unix_seconds(date), 86_400);
    }

    #[test]
    fn test_shift_days() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(shift_days(date, -1), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(shift_days(date, 365), NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        assert_eq!(shift_days(NaiveDate::MAX, 1), NaiveDate::MAX);
    }
}
