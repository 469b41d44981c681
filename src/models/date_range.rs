// file: src/models/date_range.rs
use crate::error::{AppError, AppResult};
use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed interval of calendar days, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> AppResult<Self> {
        if start > end {
            return Err(AppError::invalid_input(format!(
                "range start {} is after end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    pub fn single(date: NaiveDate) -> Self {
        Self { start: date, end: date }
    }

    /// First day of the previous month through the last day of the next one.
    pub fn around_month(date: NaiveDate) -> Self {
        let first = NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date);
        let start = first.checked_sub_months(Months::new(1)).unwrap_or(NaiveDate::MIN);
        let end = first
            .checked_add_months(Months::new(2))
            .and_then(|d| d.pred_opt())
            .unwrap_or(NaiveDate::MAX);
        Self { start, end }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of days covered, counting both ends.
    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Every day in the range, ascending.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + Clone {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }

    /// Widen by whole months on both sides, saturating at the calendar bounds.
    pub fn expand_months(&self, months: u32) -> Self {
        let months = Months::new(months);
        Self {
            start: self.start.checked_sub_months(months).unwrap_or(NaiveDate::MIN),
            end: self.end.checked_add_months(months).unwrap_or(NaiveDate::MAX),
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}
