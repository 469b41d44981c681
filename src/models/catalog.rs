// file: src/models/catalog.rs
use super::CalendarEvent;
use crate::error::AppResult;
use log::warn;
use serde::{Deserialize, Serialize};

/// The full, unfiltered set of events a synchronizer holds. Order is kept
/// as inserted; it is the tie-break when occurrences share a date and time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    events: Vec<CalendarEvent>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_events(events: Vec<CalendarEvent>) -> Self {
        Self { events }
    }

    /// Build a catalog from decoded records, skipping any that failed to
    /// decode. One bad record must not blank the calendar.
    pub fn from_decoded<I>(records: I) -> Self
    where
        I: IntoIterator<Item = AppResult<CalendarEvent>>,
    {
        let mut events = Vec::new();
        for record in records {
            match record {
                Ok(event) => events.push(event),
                Err(e) => warn!("Skipping calendar record: {}", e),
            }
        }
        Self { events }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CalendarEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&CalendarEvent> {
        self.events.iter().find(|e| e.id == id)
    }

    /// Replace in place when the id is known, append otherwise.
    pub fn upsert(&mut self, event: CalendarEvent) {
        match self.events.iter_mut().find(|e| e.id == event.id) {
            Some(slot) => *slot = event,
            None => self.events.push(event),
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<CalendarEvent> {
        let pos = self.events.iter().position(|e| e.id == id)?;
        Some(self.events.remove(pos))
    }

    pub fn into_events(self) -> Vec<CalendarEvent> {
        self.events
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a CalendarEvent;
    type IntoIter = std::slice::Iter<'a, CalendarEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

impl FromIterator<CalendarEvent> for Catalog {
    fn from_iter<T: IntoIterator<Item = CalendarEvent>>(iter: T) -> Self {
        Self { events: iter.into_iter().collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::NewEvent;
    use chrono::NaiveDate;

    fn event(id: &str, title: &str) -> CalendarEvent {
        NewEvent::new(title, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()).into_event(id.to_string())
    }

    #[test]
    fn test_upsert_keeps_position() {
        let mut catalog = Catalog::from_events(vec![event("a", "A"), event("b", "B")]);
        catalog.upsert(event("a", "A2"));
        catalog.upsert(event("c", "C"));

        let titles: Vec<_> = catalog.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["A2", "B", "C"]);
    }

    #[test]
    fn test_remove() {
        let mut catalog = Catalog::from_events(vec![event("a", "A"), event("b", "B")]);
        assert!(catalog.remove("a").is_some());
        assert!(catalog.remove("a").is_none());
        assert_eq!(catalog.len(), 1);
        assert!(catalog.get("b").is_some());
    }

    #[test]
    fn test_from_decoded_skips_bad_records() {
        let catalog = Catalog::from_decoded(vec![
            Ok(event("a", "A")),
            Err(AppError::invalid_recurrence("unrecognized recurrence 'yearly'")),
            Ok(event("b", "B")),
        ]);
        assert_eq!(catalog.len(), 2);
    }
}
