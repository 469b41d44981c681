use super::{new_event_id, EventStore};
use crate::error::{AppError, AppResult};
use crate::models::{CalendarEvent, DateRange, NewEvent};
use async_trait::async_trait;
use tokio::sync::RwLock;

/// Process-local store. Keeps insertion order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    events: RwLock<Vec<CalendarEvent>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_events(events: Vec<CalendarEvent>) -> Self {
        Self { events: RwLock::new(events) }
    }

    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn fetch_by_range(&self, range: DateRange) -> AppResult<Vec<CalendarEvent>> {
        let events = self.events.read().await;
        let mut matching: Vec<CalendarEvent> = events
            .iter()
            .filter(|e| range.contains(e.date))
            .cloned()
            .collect();
        matching.sort_by_key(|e| (e.date, e.time));
        Ok(matching)
    }

    async fn get(&self, id: &str) -> AppResult<Option<CalendarEvent>> {
        Ok(self.events.read().await.iter().find(|e| e.id == id).cloned())
    }

    async fn insert(&self, event: NewEvent) -> AppResult<CalendarEvent> {
        let event = event.into_event(new_event_id());
        self.events.write().await.push(event.clone());
        Ok(event)
    }

    async fn replace(&self, id: &str, event: CalendarEvent) -> AppResult<CalendarEvent> {
        let mut events = self.events.write().await;
        let slot = events
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| AppError::not_found(format!("event {}", id)))?;
        let stored = CalendarEvent { id: id.to_string(), ..event };
        *slot = stored.clone();
        Ok(stored)
    }

    async fn remove(&self, id: &str) -> AppResult<()> {
        let mut events = self.events.write().await;
        let pos = events
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| AppError::not_found(format!("event {}", id)))?;
        events.remove(pos);
        Ok(())
    }
}
