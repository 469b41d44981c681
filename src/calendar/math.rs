//! Week and month arithmetic for the sliding multi-week window.

use crate::models::{DateRange, FirstDayOfWeek};
use chrono::{Datelike, Duration, Months, NaiveDate};

pub type Week = [NaiveDate; 7];

/// Weeks shown before the one containing the focus date.
pub const WEEKS_BEFORE_CURRENT: i64 = 1;

pub fn week_start(date: NaiveDate, first_day: FirstDayOfWeek) -> NaiveDate {
    let offset = match first_day {
        FirstDayOfWeek::Monday => date.weekday().num_days_from_monday(),
        FirstDayOfWeek::Sunday => date.weekday().num_days_from_sunday(),
    };
    shift_days(date, -i64::from(offset))
}

pub fn week_dates(week_start: NaiveDate) -> Week {
    let mut week = [week_start; 7];
    for (i, slot) in week.iter_mut().enumerate() {
        *slot = shift_days(week_start, i as i64);
    }
    week
}

/// `count` consecutive weeks, starting one week before the focus week.
pub fn visible_weeks(focus: NaiveDate, first_day: FirstDayOfWeek, count: u32) -> Vec<Week> {
    let first = shift_weeks(week_start(focus, first_day), -WEEKS_BEFORE_CURRENT);
    (0..i64::from(count))
        .map(|i| week_dates(shift_weeks(first, i)))
        .collect()
}

/// Previous, current, next and following week.
pub fn four_weeks(focus: NaiveDate, first_day: FirstDayOfWeek) -> Vec<Week> {
    visible_weeks(focus, first_day, 4)
}

/// The inclusive day range covered by `visible_weeks`.
pub fn visible_range(focus: NaiveDate, first_day: FirstDayOfWeek, count: u32) -> DateRange {
    let count = count.max(1);
    let start = shift_weeks(week_start(focus, first_day), -WEEKS_BEFORE_CURRENT);
    let end = shift_days(start, i64::from(count) * 7 - 1);
    DateRange::new(start, end).unwrap_or_else(|_| DateRange::single(start))
}

pub fn shift_days(date: NaiveDate, days: i64) -> NaiveDate {
    date.checked_add_signed(Duration::days(days))
        .unwrap_or(if days < 0 { NaiveDate::MIN } else { NaiveDate::MAX })
}

pub fn shift_weeks(date: NaiveDate, weeks: i64) -> NaiveDate {
    shift_days(date, weeks * 7)
}

/// Clamps to the last day of the target month (Jan 31 + 1 month = Feb 28/29).
pub fn shift_months(date: NaiveDate, months: i32) -> NaiveDate {
    let shifted = if months >= 0 {
        date.checked_add_months(Months::new(months.unsigned_abs()))
    } else {
        date.checked_sub_months(Months::new(months.unsigned_abs()))
    };
    shifted.unwrap_or(if months < 0 { NaiveDate::MIN } else { NaiveDate::MAX })
}

pub fn days_between(a: NaiveDate, b: NaiveDate) -> i64 {
    (b - a).num_days().abs()
}

pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn month_end(date: NaiveDate) -> NaiveDate {
    month_start(date)
        .checked_add_months(Months::new(1))
        .and_then(|d| d.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}
