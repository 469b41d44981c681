use crate::models::{Occurrence, TimeFormat};
use chrono::{NaiveTime, Timelike};

pub fn format_time(time: NaiveTime, format: TimeFormat) -> String {
    match format {
        TimeFormat::TwentyFourHour => time.format("%H:%M").to_string(),
        TimeFormat::TwelveHour => {
            let (pm, hour) = time.hour12();
            format!("{}:{:02} {}", hour, time.minute(), if pm { "PM" } else { "AM" })
        }
    }
}

/// Clock label for an occurrence, "All day" when it has no time.
pub fn occurrence_label(occurrence: &Occurrence, format: TimeFormat) -> String {
    match occurrence.event.time {
        Some(time) => format_time(time, format),
        None => "All day".to_string(),
    }
}
