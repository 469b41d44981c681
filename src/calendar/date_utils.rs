//! Day-grain helpers: formatting, parsing, comparison and day boundaries.

use crate::error::{AppError, AppResult};
use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime, Weekday};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

/// `YYYY-MM-DD`
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(s: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).map_err(|_| {
        AppError::invalid_input(format!("Invalid date '{}'. Expected YYYY-MM-DD", s))
    })
}

/// `HH:MM`, 24-hour clock.
pub fn parse_time(s: &str) -> AppResult<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), TIME_FORMAT).map_err(|_| {
        AppError::invalid_input(format!("Invalid time '{}'. Expected HH:MM", s))
    })
}

pub fn is_same_day(a: NaiveDateTime, b: NaiveDateTime) -> bool {
    a.date() == b.date()
}

pub fn is_today(date: NaiveDate) -> bool {
    date == today()
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// 23:59:59.999
pub fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    let last = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
    date.and_time(last)
}

/// e.g. "January 2024"
pub fn format_month_year(date: NaiveDate) -> String {
    date.format("%B %Y").to_string()
}

pub fn is_first_day_of_month(date: NaiveDate) -> bool {
    date.day() == 1
}
