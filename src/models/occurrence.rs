// file: src/models/occurrence.rs
use super::CalendarEvent;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Identity of an occurrence within a resolved result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OccurrenceKey {
    pub event_id: String,
    pub date: NaiveDate,
}

/// An event projected onto one calendar day. Derived, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    pub event: CalendarEvent,
    pub date: NaiveDate,
}

impl Occurrence {
    pub fn new(event: CalendarEvent, date: NaiveDate) -> Self {
        Self { event, date }
    }

    pub fn key(&self) -> OccurrenceKey {
        OccurrenceKey {
            event_id: self.event.id.clone(),
            date: self.date,
        }
    }

    pub fn event_id(&self) -> &str {
        &self.event.id
    }

    pub fn anchor_date(&self) -> NaiveDate {
        self.event.date
    }

    /// All-day entries sort as midnight.
    pub fn sort_time(&self) -> NaiveTime {
        self.event.time.unwrap_or(NaiveTime::MIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewEvent;

    #[test]
    fn test_key_uses_occurrence_date() {
        let anchor = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let later = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
        let event = NewEvent::new("Review", anchor).into_event("a".to_string());

        let occurrence = Occurrence::new(event, later);
        assert_eq!(occurrence.key(), OccurrenceKey { event_id: "a".to_string(), date: later });
        assert_eq!(occurrence.anchor_date(), anchor);
        assert_eq!(occurrence.sort_time(), NaiveTime::MIN);
    }
}
