//! Recurrence expansion: whether, and on which days, an event occurs.
//!
//! A recurring event never occurs before its anchor date. Monthly events
//! repeat on the anchor's day-of-month only, so an anchor on the 29th, 30th
//! or 31st simply has no occurrence in months that lack that day.

use crate::models::{CalendarEvent, DateRange, Recurrence};
use chrono::{Datelike, NaiveDate};

pub fn recurs_on(event: &CalendarEvent, target: NaiveDate) -> bool {
    if event.recurrence == Recurrence::None {
        return target == event.date;
    }
    if target < event.date {
        return false;
    }
    if target == event.date {
        return true;
    }

    match event.recurrence {
        Recurrence::Daily => true,
        Recurrence::Weekly => target.weekday() == event.date.weekday(),
        Recurrence::Monthly => target.day() == event.date.day(),
        Recurrence::None => false,
    }
}

/// Every day in `range` on which `event` occurs, ascending.
///
/// The iterator borrows the event, does no work until polled and can be
/// cloned to walk the same days again.
pub fn occurrences_in_range(
    event: &CalendarEvent,
    range: DateRange,
) -> impl Iterator<Item = NaiveDate> + Clone + '_ {
    let end = range.end();
    let start = range.start().max(event.date);
    start
        .iter_days()
        .take_while(move |d| *d <= end)
        .filter(move |d| recurs_on(event, *d))
}
